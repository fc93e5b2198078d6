use axum::Router;
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use thiserror::Error;

use crate::context;
use crate::contracts;

/// One module and the capabilities it exposes.
pub struct ModuleEntry {
    pub name: &'static str,
    pub core: Arc<dyn contracts::Module>,
    pub db: Option<Arc<dyn contracts::DbModule>>,
    pub rest: Option<Arc<dyn contracts::RestfulModule>>,
    pub rest_host: Option<Arc<dyn contracts::RestHostModule>>,
    pub stateful: Option<Arc<dyn contracts::StatefulModule>>,
}

impl ModuleEntry {
    pub fn new(name: &'static str, core: Arc<dyn contracts::Module>) -> Self {
        Self {
            name,
            core,
            db: None,
            rest: None,
            rest_host: None,
            stateful: None,
        }
    }

    pub fn with_db(mut self, m: Arc<dyn contracts::DbModule>) -> Self {
        self.db = Some(m);
        self
    }

    pub fn with_rest(mut self, m: Arc<dyn contracts::RestfulModule>) -> Self {
        self.rest = Some(m);
        self
    }

    pub fn with_rest_host(mut self, m: Arc<dyn contracts::RestHostModule>) -> Self {
        self.rest_host = Some(m);
        self
    }

    pub fn with_stateful(mut self, m: Arc<dyn contracts::StatefulModule>) -> Self {
        self.stateful = Some(m);
        self
    }
}

impl std::fmt::Debug for ModuleEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleEntry")
            .field("name", &self.name)
            .field("has_db", &self.db.is_some())
            .field("has_rest", &self.rest.is_some())
            .field("is_rest_host", &self.rest_host.is_some())
            .field("has_stateful", &self.stateful.is_some())
            .finish()
    }
}

/// Modules in registration order; the binary registers dependencies first.
pub struct ModuleRegistry {
    modules: Vec<ModuleEntry>,
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&'static str> = self.modules.iter().map(|m| m.name).collect();
        f.debug_struct("ModuleRegistry")
            .field("modules", &names)
            .finish()
    }
}

impl ModuleRegistry {
    pub fn modules(&self) -> &[ModuleEntry] {
        &self.modules
    }

    pub fn needs_db(&self) -> bool {
        self.modules.iter().any(|e| e.db.is_some())
    }

    // ---- Ordered phases: init → DB → REST (sync) → start → stop ----

    pub async fn run_init_phase(&self, base_ctx: &context::ModuleCtx) -> Result<(), RegistryError> {
        for e in &self.modules {
            let ctx = base_ctx.clone().for_module(e.name);
            e.core
                .init(&ctx)
                .await
                .map_err(|source| RegistryError::Init {
                    module: e.name,
                    source,
                })?;
        }
        Ok(())
    }

    pub async fn run_db_phase(&self, db: &modkit_db::DbHandle) -> Result<(), RegistryError> {
        for e in &self.modules {
            if let Some(dbm) = &e.db {
                tracing::info!(module = e.name, "running migrations");
                dbm.migrate(db)
                    .await
                    .map_err(|source| RegistryError::DbMigrate {
                        module: e.name,
                        source,
                    })?;
            }
        }
        Ok(())
    }

    pub fn run_rest_phase(
        &self,
        base_ctx: &context::ModuleCtx,
        mut router: Router,
    ) -> Result<Router, RegistryError> {
        let Some(host_entry) = self.modules.iter().find(|e| e.rest_host.is_some()) else {
            return if self.modules.iter().any(|e| e.rest.is_some()) {
                Err(RegistryError::RestRequiresHost)
            } else {
                Ok(router)
            };
        };
        let Some(host) = host_entry.rest_host.as_ref() else {
            return Err(RegistryError::RestRequiresHost);
        };
        let host_ctx = base_ctx.clone().for_module(host_entry.name);
        let registry = host.as_registry();

        router = host
            .rest_prepare(&host_ctx, router)
            .map_err(|source| RegistryError::RestPrepare {
                module: host_entry.name,
                source,
            })?;

        for e in &self.modules {
            if let Some(rest) = &e.rest {
                let ctx = base_ctx.clone().for_module(e.name);
                router = rest.register_rest(&ctx, router, registry).map_err(|source| {
                    RegistryError::RestRegister {
                        module: e.name,
                        source,
                    }
                })?;
            }
        }

        host.rest_finalize(&host_ctx, router)
            .map_err(|source| RegistryError::RestFinalize {
                module: host_entry.name,
                source,
            })
    }

    pub async fn run_start_phase(&self, cancel: CancellationToken) -> Result<(), RegistryError> {
        for e in &self.modules {
            if let Some(s) = &e.stateful {
                s.start(cancel.clone())
                    .await
                    .map_err(|source| RegistryError::Start {
                        module: e.name,
                        source,
                    })?;
            }
        }
        Ok(())
    }

    /// Stops in reverse order; failures are logged and do not abort the phase.
    pub async fn run_stop_phase(&self, cancel: CancellationToken) {
        for e in self.modules.iter().rev() {
            if let Some(s) = &e.stateful {
                if let Err(err) = s.stop(cancel.clone()).await {
                    tracing::warn!(module = e.name, error = %err, "Failed to stop module");
                }
            }
        }
    }
}

#[derive(Default)]
pub struct RegistryBuilder {
    modules: Vec<ModuleEntry>,
}

impl RegistryBuilder {
    pub fn register(mut self, entry: ModuleEntry) -> Self {
        self.modules.push(entry);
        self
    }

    pub fn build(self) -> Result<ModuleRegistry, RegistryError> {
        let mut seen = HashSet::new();
        for e in &self.modules {
            if !seen.insert(e.name) {
                return Err(RegistryError::DuplicateModule(e.name));
            }
        }
        let hosts = self
            .modules
            .iter()
            .filter(|e| e.rest_host.is_some())
            .count();
        if hosts > 1 {
            return Err(RegistryError::MultipleRestHosts);
        }
        Ok(ModuleRegistry {
            modules: self.modules,
        })
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("module '{0}' is registered more than once")]
    DuplicateModule(&'static str),
    #[error("multiple REST host modules registered")]
    MultipleRestHosts,
    #[error("REST modules are registered but no REST host is present")]
    RestRequiresHost,
    #[error("modules need a database but none was provided")]
    DbRequired,

    #[error("init failed for module '{module}'")]
    Init {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("migration failed for module '{module}'")]
    DbMigrate {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("REST prepare failed for host '{module}'")]
    RestPrepare {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("REST registration failed for module '{module}'")]
    RestRegister {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("REST finalize failed for host '{module}'")]
    RestFinalize {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("start failed for module '{module}'")]
    Start {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
}
