//! Storage clients
//!
//! A [`StorageClient`] wraps one [`StorageBackend`] and gives every backend
//! the same discipline: the path must carry the backend's scheme prefix,
//! `.gz` paths are transparently (de)compressed, and any backend failure is
//! normalized into [`Error::Storage`] carrying the path and the cause.
//! Gzip is a side channel orthogonal to backend selection.

mod gcs;
mod local;
mod s3;

pub use gcs::GcsStorage;
pub use local::LocalStorage;
pub use s3::S3Storage;

use std::io::{Read, Write};

use async_trait::async_trait;
use tracing::debug;

use crate::platform::Platform;
use trellis_core::{Error, Result};

/// Raw byte access to one addressable object store
///
/// Implementations receive the full backend-prefixed path and resolve it
/// themselves; error normalization and gzip handling live in the wrapper.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Scheme prefix every path must carry, e.g. `fs://`
    fn scheme(&self) -> &'static str;

    async fn read(&self, path: &str) -> std::io::Result<Vec<u8>>;

    async fn write(&self, data: &[u8], path: &str) -> std::io::Result<()>;

    async fn exists(&self, path: &str) -> std::io::Result<bool>;
}

/// Uniform load/save/exists contract over an object store
pub struct StorageClient {
    backend: Box<dyn StorageBackend>,
}

impl StorageClient {
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    pub fn scheme(&self) -> &'static str {
        self.backend.scheme()
    }

    /// Loads the object at `path`, gunzipping when the path ends in `.gz`
    pub async fn load(&self, path: &str) -> Result<Vec<u8>> {
        self.check_scheme(path)?;
        debug!(path, "loading object");
        let raw = self
            .backend
            .read(path)
            .await
            .map_err(|e| Error::storage(path, e))?;
        if path.ends_with(".gz") {
            gunzip(&raw).map_err(|e| Error::storage(path, e))
        } else {
            Ok(raw)
        }
    }

    /// Saves `data` at `path`, gzipping when the path ends in `.gz`
    pub async fn save(&self, data: &[u8], path: &str) -> Result<()> {
        self.check_scheme(path)?;
        debug!(path, bytes = data.len(), "saving object");
        if path.ends_with(".gz") {
            let compressed = gzip(data).map_err(|e| Error::storage(path, e))?;
            self.backend
                .write(&compressed, path)
                .await
                .map_err(|e| Error::storage(path, e))
        } else {
            self.backend
                .write(data, path)
                .await
                .map_err(|e| Error::storage(path, e))
        }
    }

    /// Checks whether an object exists at `path`
    pub async fn exists(&self, path: &str) -> Result<bool> {
        self.check_scheme(path)?;
        self.backend
            .exists(path)
            .await
            .map_err(|e| Error::storage(path, e))
    }

    fn check_scheme(&self, path: &str) -> Result<()> {
        let scheme = self.backend.scheme();
        if !path.starts_with(scheme) {
            return Err(Error::storage(
                path,
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("path must start with '{scheme}'"),
                ),
            ));
        }
        Ok(())
    }
}

/// Instantiates the storage client for a platform
pub fn client(platform: Platform) -> Result<StorageClient> {
    let client = match platform {
        Platform::Local => StorageClient::new(LocalStorage::new()),
        Platform::Aws => StorageClient::new(S3Storage::from_env()),
        Platform::Gcp => StorageClient::new(GcsStorage::new()),
    };
    Ok(client)
}

/// Splits an `s3://bucket/key`-style path into bucket and object key
pub(crate) fn split_bucket_path(path: &str, scheme: &str) -> std::io::Result<(String, String)> {
    let rest = path.strip_prefix(scheme).ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("path must start with '{scheme}'"),
        )
    })?;
    match rest.split_once('/') {
        Some((bucket, key)) if !bucket.is_empty() && !key.is_empty() => {
            Ok((bucket.to_string(), key.to_string()))
        }
        _ => Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("`{path}` does not address an object inside a bucket"),
        )),
    }
}

fn gzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

fn gunzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = flate2::read::GzDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}
