//! Backend platform selection

use trellis_core::{Error, Result};

/// The storage/bus backend a deployment runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Local,
    Aws,
    Gcp,
}

pub const SUPPORTED_PLATFORMS: &[&str] = &["local", "aws", "gcp"];

impl Platform {
    /// URI scheme prefix of the platform's object store
    pub fn uri_prefix(&self) -> &'static str {
        match self {
            Platform::Local => "fs://",
            Platform::Aws => "s3://",
            Platform::Gcp => "gs://",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Local => "local",
            Platform::Aws => "aws",
            Platform::Gcp => "gcp",
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "local" => Ok(Platform::Local),
            "aws" => Ok(Platform::Aws),
            "gcp" => Ok(Platform::Gcp),
            other => Err(Error::Init(format!(
                "`{other}` is not supported, set one of: {}",
                SUPPORTED_PLATFORMS.join(", ")
            ))),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("local".parse::<Platform>().unwrap(), Platform::Local);
        assert_eq!("aws".parse::<Platform>().unwrap(), Platform::Aws);
        assert_eq!("gcp".parse::<Platform>().unwrap(), Platform::Gcp);
    }

    #[test]
    fn test_unknown_platform_lists_supported() {
        let err = "azure".parse::<Platform>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("azure"));
        assert!(message.contains("local"));
        assert!(message.contains("aws"));
        assert!(message.contains("gcp"));
    }

    #[test]
    fn test_uri_prefixes() {
        assert_eq!(Platform::Local.uri_prefix(), "fs://");
        assert_eq!(Platform::Aws.uri_prefix(), "s3://");
        assert_eq!(Platform::Gcp.uri_prefix(), "gs://");
    }
}
