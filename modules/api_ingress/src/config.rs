use serde::{Deserialize, Serialize};

/// `modules.api_ingress` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct ApiIngressConfig {
    /// Exact origins allowed by CORS; `*` allows any.
    pub cors_allowed_origins: Vec<String>,
    /// Directory served under `/uploads`.
    pub uploads_dir: String,
    /// Serve the merged OpenAPI document at `/api/openapi.json`.
    pub enable_docs: bool,
    pub body_limit_mb: usize,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            cors_allowed_origins: vec!["http://localhost:5173".to_string()],
            uploads_dir: "uploads".to_string(),
            enable_docs: true,
            body_limit_mb: 16,
        }
    }
}

impl ApiIngressConfig {
    pub fn body_limit_bytes(&self) -> usize {
        self.body_limit_mb.saturating_mul(1024 * 1024)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_allowed_origins.iter().any(|o| o.trim() == "*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_section_keeps_defaults() {
        let cfg: ApiIngressConfig =
            serde_json::from_value(serde_json::json!({ "enable_docs": false })).unwrap();
        assert!(!cfg.enable_docs);
        assert_eq!(cfg.uploads_dir, "uploads");
        assert_eq!(cfg.body_limit_bytes(), 16 * 1024 * 1024);
        assert!(!cfg.allows_any_origin());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let res: Result<ApiIngressConfig, _> =
            serde_json::from_value(serde_json::json!({ "cors_enabled": true }));
        assert!(res.is_err());
    }
}
