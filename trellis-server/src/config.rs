//! Server configuration
//!
//! All knobs come from the environment so the same binary serves local
//! development and the cloud deployments.

use trellis_io::Platform;
use trellis_io::bus::BusSettings;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend platform the deployment runs against
    pub platform: Platform,

    /// Artifact bucket override; the platform default applies when unset
    pub bucket: Option<String>,

    /// Address the HTTP server binds to
    pub bind_addr: String,

    /// Bus settings for the asynchronous submit flow
    pub bus: BusSettings,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - TRELLIS_PLATFORM (optional, local|aws|gcp, default: local)
    /// - TRELLIS_BUCKET (optional, overrides the artifact bucket)
    /// - TRELLIS_BIND_ADDR (optional, default: 0.0.0.0:8080)
    /// - TRELLIS_BUS_SPOOL / AWS_REGION / AWS_ACCOUNT_ID /
    ///   GOOGLE_CLOUD_PROJECT (optional, per-platform bus settings)
    pub fn from_env() -> anyhow::Result<Self> {
        let platform = std::env::var("TRELLIS_PLATFORM")
            .unwrap_or_else(|_| "local".to_string())
            .parse::<Platform>()
            .map_err(|e| anyhow::anyhow!("{e}"))?;

        let bucket = std::env::var("TRELLIS_BUCKET").ok();

        let bind_addr =
            std::env::var("TRELLIS_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        Ok(Self {
            platform,
            bucket,
            bind_addr,
            bus: BusSettings::from_env(),
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_addr.is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }
        if let Some(bucket) = &self.bucket {
            if bucket.is_empty() {
                anyhow::bail!("bucket override cannot be empty");
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            platform: Platform::Local,
            bucket: None,
            bind_addr: "0.0.0.0:8080".to_string(),
            bus: BusSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.platform, Platform::Local);
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.bind_addr = String::new();
        assert!(config.validate().is_err());

        config.bind_addr = "127.0.0.1:9000".to_string();
        config.bucket = Some(String::new());
        assert!(config.validate().is_err());

        config.bucket = Some("trellis-staging".to_string());
        assert!(config.validate().is_ok());
    }
}
