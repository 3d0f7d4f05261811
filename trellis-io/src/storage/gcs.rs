//! GCS storage backend

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use opendal::Operator;
use opendal::services::Gcs;

use super::{StorageBackend, split_bucket_path};

const SCHEME: &str = "gs://";

/// Loads/saves data from/to GCS buckets under `gs://` paths
///
/// Operators are built lazily and cached per bucket; credentials resolve
/// from the ambient environment (application default credentials).
#[derive(Default)]
pub struct GcsStorage {
    operators: Mutex<HashMap<String, Operator>>,
}

impl GcsStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn operator_for(&self, bucket: &str) -> std::io::Result<Operator> {
        let mut cache = self
            .operators
            .lock()
            .map_err(|e| std::io::Error::other(format!("operator cache poisoned: {e}")))?;
        if let Some(op) = cache.get(bucket) {
            return Ok(op.clone());
        }
        let builder = Gcs::default().bucket(bucket);
        let op = Operator::new(builder)
            .map_err(std::io::Error::from)?
            .finish();
        cache.insert(bucket.to_string(), op.clone());
        Ok(op)
    }
}

#[async_trait]
impl StorageBackend for GcsStorage {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageClient;

    #[tokio::test]
    async fn test_scheme_enforced() {
        let client = StorageClient::new(GcsStorage::new());
        let err = client
            .load("s3://trellis-data/input/iris.csv")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("gs://"));
    }
}
