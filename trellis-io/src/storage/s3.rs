//! S3 storage backend

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use opendal::Operator;
use opendal::services::S3;

use super::{StorageBackend, split_bucket_path};

const SCHEME: &str = "s3://";
const DEFAULT_REGION: &str = "us-east-1";

/// Loads/saves data from/to S3 buckets under `s3://` paths
///
/// Operators are built lazily and cached per bucket; credentials come from
/// the ambient environment the way the SDK resolves them.
pub struct S3Storage {
    region: String,
    operators: Mutex<HashMap<String, Operator>>,
}

impl S3Storage {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            operators: Mutex::new(HashMap::new()),
        }
    }

    /// Region from `AWS_REGION`, falling back to the SDK default
    pub fn from_env() -> Self {
        let region = std::env::var("AWS_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string());
        Self::new(region)
    }

    fn operator_for(&self, bucket: &str) -> std::io::Result<Operator> {
        let mut cache = self
            .operators
            .lock()
            .map_err(|e| std::io::Error::other(format!("operator cache poisoned: {e}")))?;
        if let Some(op) = cache.get(bucket) {
            return Ok(op.clone());
        }
        let builder = S3::default().bucket(bucket).region(&self.region);
        let op = Operator::new(builder)
            .map_err(std::io::Error::from)?
            .finish();
        cache.insert(bucket.to_string(), op.clone());
        Ok(op)
    }
}

#[async_trait]
impl StorageBackend for S3Storage {
    fn scheme(&self) -> &'static str {
        SCHEME
    }

    async fn read(&self, path: &str) -> std::io::Result<Vec<u8>> {
        let (bucket, key) = split_bucket_path(path, SCHEME)?;
        let op = self.operator_for(&bucket)?;
        let buffer = op.read(&key).await.map_err(std::io::Error::from)?;
        Ok(buffer.to_vec())
    }

    async fn write(&self, data: &[u8], path: &str) -> std::io::Result<()> {
        let (bucket, key) = split_bucket_path(path, SCHEME)?;
        let op = self.operator_for(&bucket)?;
        op.write(&key, data.to_vec())
            .await
            .map_err(std::io::Error::from)?;
        Ok(())
    }

    async fn exists(&self, path: &str) -> std::io::Result<bool> {
        let (bucket, key) = split_bucket_path(path, SCHEME)?;
        let op = self.operator_for(&bucket)?;
        op.exists(&key).await.map_err(std::io::Error::from)
    }
}
