use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for the cleaning_ops module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CleaningOpsConfig {
    #[serde(default = "default_list_limit")]
    pub list_limit: u64,
    #[serde(default = "default_recent_ppu_limit")]
    pub recent_ppu_limit: u64,
    #[serde(default = "default_top_cleaners_limit")]
    pub top_cleaners_limit: u64,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Default for CleaningOpsConfig {
    fn default() -> Self {
        Self {
            list_limit: default_list_limit(),
            recent_ppu_limit: default_recent_ppu_limit(),
            top_cleaners_limit: default_top_cleaners_limit(),
            storage: StorageConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,
    /// Prepended to local upload URLs; empty keeps them relative.
    #[serde(default)]
    pub public_base_url: String,
    #[serde(default)]
    pub s3: Option<S3Config>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            uploads_dir: default_uploads_dir(),
            public_base_url: String::new(),
            s3: None,
        }
    }
}

/// S3 is used only when bucket, region and both keys are set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct S3Config {
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
    /// S3-compatible endpoint (MinIO, LocalStack); AWS when unset.
    #[serde(default)]
    pub endpoint: Option<String>,
}

/// Complete S3 settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub endpoint: Option<String>,
}

impl S3Config {
    pub fn settings(&self) -> Option<S3Settings> {
        fn present(v: &Option<String>) -> Option<String> {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        }
        Some(S3Settings {
            bucket: present(&self.bucket)?,
            region: present(&self.region)?,
            access_key: present(&self.access_key)?,
            secret_key: present(&self.secret_key)?,
            endpoint: present(&self.endpoint),
        })
    }
}

fn default_list_limit() -> u64 {
    200
}

fn default_recent_ppu_limit() -> u64 {
    8
}

fn default_top_cleaners_limit() -> u64 {
    5
}

fn default_uploads_dir() -> PathBuf {
    PathBuf::from("uploads")
}
