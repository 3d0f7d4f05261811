//! Bus clients
//!
//! A [`BusClient`] wraps one [`BusBackend`] with the shared publish
//! discipline: null payloads are rejected and any backend failure is
//! normalized into [`Error::Bus`]. The bus is only exercised by
//! trigger-based transports that re-publish a run request asynchronously,
//! never by the synchronous train/predict path.

mod local;
mod pubsub;
mod sns;

pub use local::LocalBus;
pub use pubsub::PubSubBus;
pub use sns::SnsBus;

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::platform::Platform;
use trellis_core::{Error, Result};

/// Publish access to one message broker
#[async_trait]
pub trait BusBackend: Send + Sync {
    /// Fully-qualified topic path for a topic name
    fn topic_path(&self, topic: &str) -> String;

    async fn send(&self, topic_path: &str, payload: &Value) -> anyhow::Result<()>;
}

/// Uniform publish contract for asynchronous run triggering
pub struct BusClient {
    backend: Box<dyn BusBackend>,
}

impl BusClient {
    pub fn new(backend: impl BusBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    pub fn topic_path(&self, topic: &str) -> String {
        self.backend.topic_path(topic)
    }

    /// Publishes a JSON payload to a topic
    pub async fn publish(&self, topic: &str, payload: &Value) -> Result<()> {
        if payload.is_null() {
            return Err(Error::bus(topic, "publishing a null payload is not allowed"));
        }
        let path = self.backend.topic_path(topic);
        debug!(topic = %path, "publishing message");
        self.backend
            .send(&path, payload)
            .await
            .map_err(|e| Error::bus(topic, format!("{e:#}")))
    }
}

/// Per-platform bus settings, resolvable from the environment
#[derive(Debug, Clone, Default)]
pub struct BusSettings {
    /// Spool directory for the local bus
    pub spool_root: Option<PathBuf>,
    /// AWS region hosting the SNS topics
    pub region: Option<String>,
    /// AWS account owning the SNS topics
    pub account_id: Option<String>,
    /// GCP project owning the Pub/Sub topics
    pub project: Option<String>,
}

impl BusSettings {
    /// Reads `TRELLIS_BUS_SPOOL`, `AWS_REGION`, `AWS_ACCOUNT_ID` and
    /// `GOOGLE_CLOUD_PROJECT`
    pub fn from_env() -> Self {
        Self {
            spool_root: std::env::var("TRELLIS_BUS_SPOOL").ok().map(PathBuf::from),
            region: std::env::var("AWS_REGION").ok(),
            account_id: std::env::var("AWS_ACCOUNT_ID").ok(),
            project: std::env::var("GOOGLE_CLOUD_PROJECT").ok(),
        }
    }
}

/// Instantiates the bus client for a platform
pub fn client(platform: Platform, settings: &BusSettings) -> Result<BusClient> {
    let client = match platform {
        Platform::Local => {
            let root = settings
                .spool_root
                .clone()
                .unwrap_or_else(|| PathBuf::from("trellis-bus"));
            BusClient::new(LocalBus::new(root))
        }
        Platform::Aws => {
            let region = settings
                .region
                .clone()
                .unwrap_or_else(|| "us-east-1".to_string());
            let account_id = settings.account_id.clone().ok_or_else(|| {
                Error::Init("AWS account id is required for the sns bus client".to_string())
            })?;
            BusClient::new(SnsBus::new(region, account_id))
        }
        Platform::Gcp => {
            let project = settings.project.clone().ok_or_else(|| {
                Error::Init("GCP project is required for the pubsub bus client".to_string())
            })?;
            BusClient::new(PubSubBus::new(project))
        }
    };
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_null_payload_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let client = BusClient::new(LocalBus::new(dir.path().to_path_buf()));
        let err = client.publish("trigger", &Value::Null).await.unwrap_err();
        assert!(matches!(err, Error::Bus { .. }));
        assert!(err.to_string().contains("null"));
    }

    #[tokio::test]
    async fn test_factory_requires_account_for_aws() {
        let settings = BusSettings {
            region: Some("eu-west-1".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            client(Platform::Aws, &settings),
            Err(Error::Init(_))
        ));
    }

    #[tokio::test]
    async fn test_local_publish_spools() {
        let dir = tempfile::tempdir().unwrap();
        let client = BusClient::new(LocalBus::new(dir.path().to_path_buf()));
        client
            .publish("trigger_train", &json!({"run_id": "abc"}))
            .await
            .unwrap();
        let spooled = std::fs::read_to_string(dir.path().join("trigger_train.jsonl")).unwrap();
        assert!(spooled.contains("\"run_id\""));
    }
}
