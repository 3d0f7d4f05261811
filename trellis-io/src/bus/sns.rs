//! AWS SNS bus backend

use async_trait::async_trait;
use serde_json::Value;

use super::BusBackend;

/// Publishes messages to SNS topics over the HTTP query API
///
/// Request signing is delegated to the ambient environment (credential
/// proxy/sidecar); the client only shapes the publish call.
pub struct SnsBus {
    region: String,
    account_id: String,
    http: reqwest::Client,
}

impl SnsBus {
    pub fn new(region: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            account_id: account_id.into(),
            http: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("https://sns.{}.amazonaws.com/", self.region)
    }
}

#[async_trait]
impl BusBackend for SnsBus {
    fn topic_path(&self, topic: &str) -> String {
        format!("arn:aws:sns:{}:{}:{topic}", self.region, self.account_id)
    }

    async fn send(&self, topic_path: &str, payload: &Value) -> anyhow::Result<()> {
        let message = serde_json::to_string(payload)?;
        self.http
            .post(self.endpoint())
            .form(&[
                ("Action", "Publish"),
                ("Version", "2010-03-31"),
                ("TopicArn", topic_path),
                ("Message", &message),
            ])
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
