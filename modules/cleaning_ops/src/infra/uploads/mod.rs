//! Object store adapters for registration photos.

use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use crate::config::StorageConfig;
use crate::domain::ports::ObjectStore;

pub mod local;
pub mod s3;

pub use local::LocalObjectStore;
pub use s3::S3ObjectStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("S3 {op} of '{key}' failed: {message}")]
    S3 {
        op: &'static str,
        key: String,
        message: String,
    },
}

/// S3 when fully configured, local disk otherwise.
pub fn build_store(cfg: &StorageConfig) -> Arc<dyn ObjectStore> {
    match cfg.s3.as_ref().and_then(|s| s.settings()) {
        Some(settings) => Arc::new(S3ObjectStore::new(&settings)),
        None => Arc::new(LocalObjectStore::new(
            cfg.uploads_dir.clone(),
            cfg.public_base_url.clone(),
        )),
    }
}

/// Base name of an uploaded file with path separators dropped and
/// whitespace runs collapsed to a single `-`.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let mut cleaned = String::with_capacity(base.len());
    let mut in_space = false;
    for c in base.chars() {
        if c.is_whitespace() {
            if !in_space {
                cleaned.push('-');
            }
            in_space = true;
        } else {
            cleaned.push(c);
            in_space = false;
        }
    }
    if cleaned.is_empty() {
        "upload".to_owned()
    } else {
        cleaned
    }
}

/// `{prefix}/{millis}-{sanitized name}`
pub fn object_key(prefix: &str, file_name: &str, millis: i64) -> String {
    format!("{prefix}/{millis}-{}", sanitize_file_name(file_name))
}

static LAST_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Wall-clock milliseconds, strictly increasing within the process so two
/// photos of one registration never share a key.
pub fn unique_millis() -> i64 {
    let now = Utc::now().timestamp_millis();
    let prev = LAST_MILLIS
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .unwrap_or_else(|last| last);
    now.max(prev + 1)
}
