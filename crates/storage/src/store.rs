//! Object store backends.

use std::{collections::BTreeMap, path::Path, time::Duration};

use {
    async_trait::async_trait,
    aws_sdk_s3::{
        config::{Credentials, Region},
        presigning::PresigningConfig,
        primitives::ByteStream,
    },
    secrecy::ExposeSecret,
    tokio::sync::Mutex,
    tracing::debug,
};

use websteer_config::StorageConfig;

use crate::error::StorageError;

/// Write-and-presign interface over an artifact bucket.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_bytes(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;

    async fn put_file(&self, key: &str, path: &Path) -> Result<(), StorageError>;

    /// Time-limited retrieval URL for an already-written object.
    async fn presigned_get(&self, key: &str, ttl: Duration) -> Result<String, StorageError>;
}

/// S3-compatible backend (AWS, R2, minio).
pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Store {
    /// Builds a client from the storage section. Fails when `bucket` is
    /// unset; callers gate on [`StorageConfig::enabled`] first.
    pub async fn connect(cfg: &StorageConfig) -> Result<Self, StorageError> {
        let bucket = cfg
            .bucket
            .clone()
            .ok_or_else(|| StorageError::Config("no bucket configured".into()))?;

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()));
        if let (Some(access_key), Some(secret_key)) =
            (&cfg.access_key_id, &cfg.secret_access_key)
        {
            loader = loader.credentials_provider(Credentials::new(
                access_key.expose_secret(),
                secret_key.expose_secret(),
                None,
                None,
                "websteer-config",
            ));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &cfg.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        let client = aws_sdk_s3::Client::from_conf(builder.build());

        debug!(bucket, region = cfg.region, "object store connected");
        Ok(Self { client, bucket })
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put_bytes(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|err| StorageError::Request(format!("put_object {key}: {err}")))?;
        Ok(())
    }

    async fn put_file(&self, key: &str, path: &Path) -> Result<(), StorageError> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|err| StorageError::Request(format!("read {}: {err}", path.display())))?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|err| StorageError::Request(format!("put_object {key}: {err}")))?;
        Ok(())
    }

    async fn presigned_get(&self, key: &str, ttl: Duration) -> Result<String, StorageError> {
        let config = PresigningConfig::expires_in(ttl)
            .map_err(|err| StorageError::Config(format!("invalid presign ttl: {err}")))?;
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(config)
            .await
            .map_err(|err| StorageError::Request(format!("presign {key}: {err}")))?;
        Ok(presigned.uri().to_string())
    }
}

/// In-process store used by tests and local development.
#[derive(Default)]
pub struct InMemoryStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().await.get(key).cloned()
    }

    pub async fn keys(&self) -> Vec<String> {
        self.objects.lock().await.keys().cloned().collect()
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn put_bytes(
        &self,
        key: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), StorageError> {
        self.objects.lock().await.insert(key.to_string(), bytes);
        Ok(())
    }

    async fn put_file(&self, key: &str, path: &Path) -> Result<(), StorageError> {
        let bytes = tokio::fs::read(path).await?;
        self.objects.lock().await.insert(key.to_string(), bytes);
        Ok(())
    }

    async fn presigned_get(&self, key: &str, ttl: Duration) -> Result<String, StorageError> {
        if !self.objects.lock().await.contains_key(key) {
            return Err(StorageError::Request(format!("no such object: {key}")));
        }
        Ok(format!("memory://{key}?expires_in={}", ttl.as_secs()))
    }
}
