use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use super::{object_key, unique_millis, StorageError};
use crate::contract::model::UploadedFile;
use crate::domain::ports::ObjectStore;

/// Files under `root`, served by the HTTP host at `/uploads`.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    pub fn url_for(&self, key: &str) -> String {
        format!("{}/uploads/{key}", self.public_base_url)
    }

    /// Inverse of [`Self::url_for`]; rejects anything that would escape `root`.
    fn key_from_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        let key = url
            .strip_prefix(self.public_base_url.as_str())?
            .strip_prefix("/uploads/")?;
        let safe = key
            .split('/')
            .all(|seg| !seg.is_empty() && seg != "." && seg != "..");
        safe.then_some(key)
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, prefix: &str, file: &UploadedFile) -> anyhow::Result<String> {
        let key = object_key(prefix, &file.file_name, unique_millis());
        let path = self.root.join(&key);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| StorageError::Write {
                    path: dir.to_path_buf(),
                    source,
                })?;
        }
        tokio::fs::write(&path, &file.bytes)
            .await
            .map_err(|source| StorageError::Write {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), bytes = file.bytes.len(), "Wrote upload");
        Ok(self.url_for(&key))
    }

    async fn delete(&self, url: &str) -> anyhow::Result<()> {
        let Some(key) = self.key_from_url(url) else {
            debug!(%url, "Not a local upload URL; nothing to delete");
            return Ok(());
        };
        let path = self.root.join(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Remove { path, source }.into()),
        }
    }

    fn backend(&self) -> &'static str {
        "local"
    }
}
