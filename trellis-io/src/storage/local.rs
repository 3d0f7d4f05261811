//! Local filesystem storage backend

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::StorageBackend;

const SCHEME: &str = "fs://";

/// Loads/saves data from/to the local filesystem under `fs://` paths
#[derive(Debug, Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }

    fn resolve(&self, path: &str) -> std::io::Result<PathBuf> {
        let stripped = path.strip_prefix(SCHEME).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("path must start with '{SCHEME}'"),
            )
        })?;
        Ok(PathBuf::from(stripped))
    }
}

#[async_trait]
impl StorageBackend for LocalStorage {
    fn scheme(&self) -> &'static str {
        SCHEME
    }

    async fn read(&self, path: &str) -> std::io::Result<Vec<u8>> {
        let path = self.resolve(path)?;
        tokio::fs::read(&path).await
    }

    async fn write(&self, data: &[u8], path: &str) -> std::io::Result<()> {
        let path = self.resolve(path)?;
        if let Some(parent) = path.parent().filter(|p| *p != Path::new("")) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, data).await
    }

    async fn exists(&self, path: &str) -> std::io::Result<bool> {
        let path = self.resolve(path)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }
}
