use modkit_db::DbHandle;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Provider of module-specific configuration (raw JSON sections only).
pub trait ConfigProvider: Send + Sync {
    /// Returns raw JSON section for the module, if any.
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value>;
}

impl ConfigProvider for HashMap<String, serde_json::Value> {
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value> {
        self.get(module_name)
    }
}

#[derive(Clone)]
pub struct ModuleCtx {
    db: Option<Arc<DbHandle>>,
    config_provider: Option<Arc<dyn ConfigProvider>>,
    cancellation_token: CancellationToken,
    module_name: Option<Arc<str>>,
}

pub struct ModuleCtxBuilder {
    inner: ModuleCtx,
}

impl ModuleCtxBuilder {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            inner: ModuleCtx {
                db: None,
                config_provider: None,
                cancellation_token: token,
                module_name: None,
            },
        }
    }

    pub fn with_db(mut self, db: Arc<DbHandle>) -> Self {
        self.inner.db = Some(db);
        self
    }

    pub fn with_config_provider(mut self, p: Arc<dyn ConfigProvider>) -> Self {
        self.inner.config_provider = Some(p);
        self
    }

    pub fn build(self) -> ModuleCtx {
        self.inner
    }
}

impl ModuleCtx {
    /// Scope context to a specific module name (used by the registry).
    pub fn for_module(mut self, name: &str) -> Self {
        self.module_name = Some(Arc::<str>::from(name));
        self
    }

    pub fn db(&self) -> Option<Arc<DbHandle>> {
        self.db.clone()
    }

    pub fn db_required(&self) -> anyhow::Result<Arc<DbHandle>> {
        self.db.clone().ok_or_else(|| {
            anyhow::anyhow!(
                "module '{}' requires a database but none is configured",
                self.current_module().unwrap_or("<unscoped>")
            )
        })
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation_token
    }

    pub fn current_module(&self) -> Option<&str> {
        self.module_name.as_deref()
    }

    /// Deserialize the module's config section into `T`.
    /// A missing section yields `T::default()`; a malformed one is an error.
    pub fn module_config<T: DeserializeOwned + Default>(&self) -> anyhow::Result<T> {
        let (Some(name), Some(p)) = (&self.module_name, &self.config_provider) else {
            return Ok(T::default());
        };
        match p.get_module_config(name) {
            Some(v) => serde_json::from_value::<T>(v.clone())
                .map_err(|e| anyhow::anyhow!("invalid {name} config: {e}")),
            None => Ok(T::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(deny_unknown_fields)]
    struct Limits {
        #[serde(default)]
        list_limit: u64,
    }

    fn ctx_with(bag: serde_json::Value) -> ModuleCtx {
        let map: HashMap<String, serde_json::Value> = serde_json::from_value(bag).unwrap();
        ModuleCtxBuilder::new(CancellationToken::new())
            .with_config_provider(Arc::new(map))
            .build()
    }

    #[test]
    fn module_config_reads_scoped_section() {
        let ctx = ctx_with(serde_json::json!({ "cleaning_ops": { "list_limit": 50 } }))
            .for_module("cleaning_ops");
        let cfg: Limits = ctx.module_config().unwrap();
        assert_eq!(cfg.list_limit, 50);
        assert_eq!(ctx.current_module(), Some("cleaning_ops"));
    }

    #[test]
    fn module_config_missing_section_defaults() {
        let ctx = ctx_with(serde_json::json!({})).for_module("cleaning_ops");
        assert_eq!(ctx.module_config::<Limits>().unwrap(), Limits::default());
    }

    #[test]
    fn module_config_malformed_section_errors() {
        let ctx = ctx_with(serde_json::json!({ "cleaning_ops": { "nope": 1 } }))
            .for_module("cleaning_ops");
        let err = ctx.module_config::<Limits>().unwrap_err();
        assert!(err.to_string().contains("invalid cleaning_ops config"));
    }

    #[test]
    fn db_required_names_the_module() {
        let ctx = ModuleCtxBuilder::new(CancellationToken::new())
            .build()
            .for_module("cleaning_ops");
        assert!(ctx.db().is_none());
        let err = ctx.db_required().unwrap_err();
        assert!(err.to_string().contains("cleaning_ops"));
    }
}
