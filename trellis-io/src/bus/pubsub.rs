//! GCP Pub/Sub bus backend

use async_trait::async_trait;
use base64::Engine as _;
use serde_json::{Value, json};

use super::BusBackend;

/// Publishes messages to Pub/Sub topics over the REST API
///
/// An access token, when present in `GOOGLE_OAUTH_ACCESS_TOKEN`, is attached
/// as a bearer header; otherwise auth is delegated to the ambient
/// environment.
pub struct PubSubBus {
    project: String,
    http: reqwest::Client,
}

impl PubSubBus {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl BusBackend for PubSubBus {
    fn topic_path(&self, topic: &str) -> String {
        format!("projects/{}/topics/{topic}", self.project)
    }

    async fn send(&self, topic_path: &str, payload: &Value) -> anyhow::Result<()> {
        let data = base64::engine::general_purpose::STANDARD.encode(serde_json::to_vec(payload)?);
        let body = json!({"messages": [{"data": data}]});

        let mut request = self
            .http
            .post(format!("https://pubsub.googleapis.com/v1/{topic_path}:publish"))
            .json(&body);
        if let Ok(token) = std::env::var("GOOGLE_OAUTH_ACCESS_TOKEN") {
            request = request.bearer_auth(token);
        }
        request.send().await?.error_for_status()?;
        Ok(())
    }
}
