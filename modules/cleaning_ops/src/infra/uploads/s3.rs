use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::debug;

use super::{object_key, unique_millis, StorageError};
use crate::config::S3Settings;
use crate::contract::model::UploadedFile;
use crate::domain::ports::ObjectStore;

/// Objects in one S3 bucket, addressed by public virtual-hosted URLs.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    base_url: String,
}

impl S3ObjectStore {
    pub fn new(settings: &S3Settings) -> Self {
        let credentials = Credentials::new(
            settings.access_key.clone(),
            settings.secret_key.clone(),
            None,
            None,
            "cleaning-ops-config",
        );
        let mut builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .credentials_provider(credentials);

        // S3-compatible endpoints are addressed path-style.
        let base_url = match &settings.endpoint {
            Some(endpoint) => {
                let endpoint = endpoint.trim_end_matches('/');
                builder = builder.endpoint_url(endpoint).force_path_style(true);
                format!("{endpoint}/{}", settings.bucket)
            }
            None => format!(
                "https://{}.s3.{}.amazonaws.com",
                settings.bucket, settings.region
            ),
        };

        Self {
            client: Client::from_conf(builder.build()),
            bucket: settings.bucket.clone(),
            base_url,
        }
    }

    pub fn url_for(&self, key: &str) -> String {
        format!("{}/{key}", self.base_url)
    }

    fn key_from_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(self.base_url.as_str())?
            .strip_prefix('/')
            .filter(|k| !k.is_empty())
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, prefix: &str, file: &UploadedFile) -> anyhow::Result<String> {
        let key = object_key(prefix, &file.file_name, unique_millis());
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .set_content_type(file.content_type.clone())
            .body(ByteStream::from(file.bytes.clone()))
            .send()
            .await
            .map_err(|e| StorageError::S3 {
                op: "put",
                key: key.clone(),
                message: DisplayErrorContext(&e).to_string(),
            })?;
        debug!(bucket = %self.bucket, %key, "Uploaded object");
        Ok(self.url_for(&key))
    }

    async fn delete(&self, url: &str) -> anyhow::Result<()> {
        let Some(key) = self.key_from_url(url) else {
            debug!(%url, "Not an object of this bucket; nothing to delete");
            return Ok(());
        };
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::S3 {
                op: "delete",
                key: key.to_owned(),
                message: DisplayErrorContext(&e).to_string(),
            })?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "s3"
    }
}
