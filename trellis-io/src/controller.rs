//! IO controller
//!
//! Binds `(project_id, run_id)` to the canonical artifact layout on one
//! backend and exposes the typed load/save surface the pipeline runner works
//! against. Path derivation is pure: the same identifiers always yield the
//! same locations, which is what lets a predict run find its training run's
//! metadata and model from `train_id` alone.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use trellis_core::domain::dataset::Dataset;
use trellis_core::domain::run::{RunKind, RunStatus, StatusRecord};
use trellis_core::{Error, Result};

use crate::codec::codec_for;
use crate::platform::Platform;
use crate::storage::{self, StorageClient};

/// Bucket all pipeline artifacts live under
pub const DEFAULT_BUCKET: &str = "trellis-pipeline";

/// Builds [`IoController`]s bound to a platform and bucket
#[derive(Debug, Clone)]
pub struct IoControllerFactory {
    platform: Platform,
    bucket: String,
}

impl IoControllerFactory {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            bucket: DEFAULT_BUCKET.to_string(),
        }
    }

    /// Overrides the artifact bucket
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Binds a controller to one run's artifact namespace
    pub fn bind(&self, project_id: Uuid, run_id: Uuid) -> Result<IoController> {
        let client = storage::client(self.platform)
            .map_err(|e| Error::Init(format!("io controller error: {e}")))?;
        Ok(IoController::new(
            project_id,
            run_id,
            self.platform,
            &self.bucket,
            Arc::new(client),
        ))
    }
}

/// Canonical artifact locations of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub metadata: String,
    pub metrics: String,
    pub model: String,
}

/// Typed IO surface of one `(project_id, run_id)` on one backend
pub struct IoController {
    project_id: Uuid,
    run_id: Uuid,
    prefix: String,
    prefix_per_run: String,
    paths: ArtifactPaths,
    storage: Arc<StorageClient>,
}

impl IoController {
    fn new(
        project_id: Uuid,
        run_id: Uuid,
        platform: Platform,
        bucket: &str,
        storage: Arc<StorageClient>,
    ) -> Self {
        let prefix = format!("{}{bucket}/{project_id}", platform.uri_prefix());
        let prefix_per_run = format!("{prefix}/runs/{run_id}");
        let paths = ArtifactPaths {
            metadata: format!("{prefix_per_run}/metadata_{run_id}.json"),
            metrics: format!("{prefix_per_run}/metrics_{run_id}.json"),
            model: format!("{prefix_per_run}/model/model_{run_id}.bin"),
        };
        Self {
            project_id,
            run_id,
            prefix,
            prefix_per_run,
            paths,
            storage,
        }
    }

    pub fn project_id(&self) -> Uuid {
        self.project_id
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Project-level artifact prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Per-run artifact prefix
    pub fn prefix_per_run(&self) -> &str {
        &self.prefix_per_run
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    pub fn storage(&self) -> &StorageClient {
        &self.storage
    }

    /// Read operations
    pub fn load(&self) -> Load<'_> {
        Load { ctl: self }
    }

    /// Write operations
    pub fn save(&self) -> Save<'_> {
        Save { ctl: self }
    }

    /// Object name of a data path, used for codec lookup
    fn object_name(path: &str) -> &str {
        path.rsplit('/').next().unwrap_or(path)
    }
}

/// Read side of the controller
pub struct Load<'a> {
    ctl: &'a IoController,
}

impl Load<'_> {
    /// Reads and decodes a dataset
    pub async fn data(&self, path: &str) -> Result<Dataset> {
        let raw = self.ctl.storage.load(path).await?;
        let codec = codec_for(IoController::object_name(path))?;
        codec.decode(&raw)
    }

    /// Reads the run's metadata (the accepted config)
    pub async fn metadata(&self) -> Result<Value> {
        let raw = self.ctl.storage.load(&self.ctl.paths.metadata).await?;
        serde_json::from_slice(&raw).map_err(|e| Error::Decoding {
            format: "json".to_string(),
            message: format!("metadata for run {}: {e}", self.ctl.run_id),
        })
    }

    /// Reads the serialized model bytes
    pub async fn model(&self) -> Result<Vec<u8>> {
        self.ctl.storage.load(&self.ctl.paths.model).await
    }
}

/// Write side of the controller
pub struct Save<'a> {
    ctl: &'a IoController,
}

impl Save<'_> {
    /// Encodes and writes a dataset
    pub async fn data(&self, dataset: &Dataset, path: &str) -> Result<()> {
        let codec = codec_for(IoController::object_name(path))?;
        let raw = codec.encode(dataset)?;
        self.ctl.storage.save(&raw, path).await
    }

    /// Writes the run's metadata (the accepted config)
    pub async fn metadata(&self, config: &Value) -> Result<()> {
        let raw = to_json(config)?;
        self.ctl.storage.save(&raw, &self.ctl.paths.metadata).await
    }

    /// Writes the run's metrics
    pub async fn metrics<T: Serialize>(&self, metrics: &T) -> Result<()> {
        let raw = to_json(metrics)?;
        self.ctl.storage.save(&raw, &self.ctl.paths.metrics).await
    }

    /// Writes the serialized model bytes
    pub async fn model(&self, model: &[u8]) -> Result<()> {
        self.ctl.storage.save(model, &self.ctl.paths.model).await
    }

    /// Writes the zero-byte marker that lets runs be enumerated by kind
    pub async fn run_kind(&self, kind: RunKind) -> Result<()> {
        let path = format!("{}/{kind}/{}", self.ctl.prefix, self.ctl.run_id);
        self.ctl.storage.save(b"", &path).await
    }

    /// Records a run status
    ///
    /// Appends a timestamped record to the per-run status history and
    /// overwrites the project-level last-status pointer with the same
    /// payload.
    pub async fn status(&self, status: RunStatus, error: Option<String>) -> Result<()> {
        let record = StatusRecord::now(self.ctl.project_id, self.ctl.run_id, status, error);
        let raw = to_json(&record)?;
        let epoch = record.timestamp.timestamp();

        let history = format!(
            "{}/status/{}_{epoch}.json",
            self.ctl.prefix_per_run, self.ctl.run_id
        );
        let last = format!("{}/status/last.json", self.ctl.prefix);

        self.ctl.storage.save(&raw, &history).await?;
        self.ctl.storage.save(&raw, &last).await
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| Error::Encoding {
        format: "json".to_string(),
        message: e.to_string(),
    })
}
