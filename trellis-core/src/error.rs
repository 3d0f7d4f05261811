//! Error types for the Trellis pipeline engine

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur across the pipeline engine
///
/// Every component raises one of these kinds. An error already of the
/// expected kind crosses component boundaries unchanged; anything foreign is
/// wrapped with operation context at the nearest boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// Client or plugin instantiation failed
    #[error("init error: {0}")]
    Init(String),

    /// Storage backend IO failed
    #[error("storage error for {path}: {source}")]
    Storage {
        /// Object path the operation was addressing
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Message bus publish failed
    #[error("bus error for topic {topic}: {message}")]
    Bus {
        /// Topic the message was destined for
        topic: String,
        /// Underlying failure
        message: String,
    },

    /// Failed to encode a dataset into raw bytes
    #[error("failed to encode dataset as {format}: {message}")]
    Encoding { format: String, message: String },

    /// Failed to decode raw bytes into a dataset
    #[error("failed to decode dataset as {format}: {message}")]
    Decoding { format: String, message: String },

    /// No codec registered for the file extension
    #[error("`{extension}` is not supported, set one of: {supported}")]
    UnsupportedFormat {
        extension: String,
        /// Comma-separated list of the extensions the registry knows
        supported: String,
    },

    /// Request payload failed schema validation
    #[error("pipeline config error: {0}")]
    Config(String),

    /// Plugin resolution or instantiation failed
    #[error("model definition error: {0}")]
    ModelDefinition(String),

    /// User-defined data preparation failed
    #[error("data processing error: {0}")]
    DataProcessing(String),

    /// Terminal run failure not covered by a more specific kind
    #[error("pipeline running error: {0}")]
    Running(String),
}

impl Error {
    /// Create a storage error from a path and an IO cause
    pub fn storage(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a bus error from a topic and a message
    pub fn bus(topic: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Bus {
            topic: topic.into(),
            message: message.into(),
        }
    }

    /// Check if this error is a config validation failure
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this error already carries a domain-specific run-failure kind
    ///
    /// The pipeline runner re-raises these unchanged instead of wrapping them
    /// into the catch-all running error.
    pub fn is_run_specific(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::ModelDefinition(_) | Self::DataProcessing(_) | Self::Running(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_format_lists_known_extensions() {
        let err = Error::UnsupportedFormat {
            extension: "parquet".to_string(),
            supported: "csv, json".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("parquet"));
        assert!(message.contains("csv"));
        assert!(message.contains("json"));
    }

    #[test]
    fn test_storage_error_keeps_cause() {
        let cause = std::io::Error::new(std::io::ErrorKind::NotFound, "no such object");
        let err = Error::storage("fs://data/input.csv", cause);
        assert!(err.to_string().contains("fs://data/input.csv"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_run_specific_kinds() {
        assert!(Error::Config("bad".into()).is_run_specific());
        assert!(Error::ModelDefinition("bad".into()).is_run_specific());
        assert!(Error::DataProcessing("bad".into()).is_run_specific());
        assert!(!Error::Init("bad".into()).is_run_specific());
    }
}
