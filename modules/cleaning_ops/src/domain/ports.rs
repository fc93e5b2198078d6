use async_trait::async_trait;

use crate::contract::model::UploadedFile;

/// Where registration photos end up. Implementations return a URL a browser can load.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `file` under `prefix` and return its public URL.
    async fn put(&self, prefix: &str, file: &UploadedFile) -> anyhow::Result<String>;

    /// Remove an object previously returned by [`ObjectStore::put`]. Unknown URLs are ignored.
    async fn delete(&self, url: &str) -> anyhow::Result<()>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}
