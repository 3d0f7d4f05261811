//! Local spool-file bus backend

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;

use super::BusBackend;

/// Appends messages to a per-topic JSONL spool file
///
/// A local poller drains the spool the way a queue consumer would; one line
/// per published message.
pub struct LocalBus {
    spool_root: PathBuf,
}

impl LocalBus {
    pub fn new(spool_root: PathBuf) -> Self {
        Self { spool_root }
    }
}

#[async_trait]
impl BusBackend for LocalBus {
    fn topic_path(&self, topic: &str) -> String {
        self.spool_root
            .join(format!("{topic}.jsonl"))
            .display()
            .to_string()
    }

    async fn send(&self, topic_path: &str, payload: &Value) -> anyhow::Result<()> {
        use tokio::io::AsyncWriteExt;

        let path = PathBuf::from(topic_path);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut line = serde_json::to_vec(payload)?;
        line.push(b'\n');
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::BusClient;
    use serde_json::json;

    #[tokio::test]
    async fn test_messages_append() {
        let dir = tempfile::tempdir().unwrap();
        let client = BusClient::new(LocalBus::new(dir.path().to_path_buf()));

        client.publish("t", &json!({"seq": 1})).await.unwrap();
        client.publish("t", &json!({"seq": 2})).await.unwrap();

        let spooled = std::fs::read_to_string(dir.path().join("t.jsonl")).unwrap();
        let lines: Vec<&str> = spooled.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"seq\":1"));
        assert!(lines[1].contains("\"seq\":2"));
    }

    #[test]
    fn test_topic_path() {
        let bus = LocalBus::new(PathBuf::from("/var/spool/trellis"));
        assert_eq!(bus.topic_path("trigger"), "/var/spool/trellis/trigger.jsonl");
    }
}
