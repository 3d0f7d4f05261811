//! Request config validation
//!
//! Schema-checks incoming train/predict payloads before any side effect
//! occurs: serde deserialization into the closed config types enforces
//! required fields and rejects unknown ones, and the pattern checks below
//! enforce value formats. Every violation surfaces as [`Error::Config`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::config::{PredictConfig, TrainConfig};
use crate::error::{Error, Result};

static CODE_HASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-fA-F0-9]{40}$").unwrap());
static MODEL_VERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_\-.|]{1,40}$").unwrap());
static PATH_FS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^fs://.+$").unwrap());
static PATH_GCS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^gs://[a-zA-Z0-9_\-.]{3,63}/.+$").unwrap());
static PATH_S3: Lazy<Regex> = Lazy::new(|| Regex::new(r"^s3://[a-zA-Z0-9-.]{3,63}/.+$").unwrap());

/// Validator for train and predict pipeline configs
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator;

impl Validator {
    pub fn new() -> Self {
        Self
    }

    /// Validates a train pipeline config
    pub fn train(&self, config: &Value) -> Result<TrainConfig> {
        let config: TrainConfig =
            serde_json::from_value(config.clone()).map_err(|e| Error::Config(e.to_string()))?;

        check_uuid4("project_id", &config.project_id)?;
        check_uuid4("run_id", &config.run_id)?;
        check_pattern("code_hash", &config.code_hash, &CODE_HASH)?;
        check_pattern(
            "pipeline_config.model.version",
            &config.pipeline_config.model.version,
            &MODEL_VERSION,
        )?;
        check_path(
            "pipeline_config.data.location.source",
            &config.pipeline_config.data.location.source,
        )?;

        Ok(config)
    }

    /// Validates a predict pipeline config
    pub fn predict(&self, config: &Value) -> Result<PredictConfig> {
        let config: PredictConfig =
            serde_json::from_value(config.clone()).map_err(|e| Error::Config(e.to_string()))?;

        check_uuid4("project_id", &config.project_id)?;
        check_uuid4("run_id", &config.run_id)?;
        check_uuid4("pipeline_config.train_id", &config.pipeline_config.train_id)?;
        check_path(
            "pipeline_config.data.location.source",
            &config.pipeline_config.data.location.source,
        )?;
        check_path(
            "pipeline_config.data.location.destination",
            &config.pipeline_config.data.location.destination,
        )?;

        Ok(config)
    }
}

fn check_uuid4(field: &str, id: &Uuid) -> Result<()> {
    if id.get_version_num() != 4 {
        return Err(Error::Config(format!("{field} must be a UUIDv4, got {id}")));
    }
    Ok(())
}

fn check_pattern(field: &str, value: &str, pattern: &Regex) -> Result<()> {
    if !pattern.is_match(value) {
        return Err(Error::Config(format!(
            "{field} `{value}` does not match {}",
            pattern.as_str()
        )));
    }
    Ok(())
}

fn check_path(field: &str, path: &str) -> Result<()> {
    if PATH_FS.is_match(path) || PATH_GCS.is_match(path) || PATH_S3.is_match(path) {
        return Ok(());
    }
    Err(Error::Config(format!(
        "{field} `{path}` must be a backend-prefixed URI (fs://, gs://<bucket>/, s3://<bucket>/)"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn train_payload() -> Value {
        json!({
            "project_id": "0cba82ff-9790-454d-b7b9-22570e7ba28c",
            "run_id": "c77d0a32-2b29-47f6-9ac5-67a21f7953b9",
            "code_hash": "8c2f3d3c5dd853231c7429b099347d13c8bb2c37",
            "pipeline_config": {
                "data": {
                    "location": {"source": "fs://storage/data/input/iris.csv"},
                    "prep_config": {"test_size": 0.33, "seed": 42}
                },
                "model": {
                    "hyperparameters": {"n_neighbors": 3, "seed": 42},
                    "version": "trellis_demo.v1"
                }
            }
        })
    }

    fn predict_payload() -> Value {
        json!({
            "project_id": "0cba82ff-9790-454d-b7b9-22570e7ba28c",
            "run_id": "9a3a8c44-da7a-4e42-9232-2fd1af91fb3e",
            "pipeline_config": {
                "train_id": "c77d0a32-2b29-47f6-9ac5-67a21f7953b9",
                "data": {
                    "location": {
                        "source": "s3://trellis-data/input/prediction_input.csv",
                        "destination": "s3://trellis-data/output/prediction_output.csv"
                    }
                }
            }
        })
    }

    #[test]
    fn test_valid_train_config() {
        let config = Validator::new().train(&train_payload()).unwrap();
        assert_eq!(config.pipeline_config.model.version, "trellis_demo.v1");
    }

    #[test]
    fn test_valid_predict_config() {
        let config = Validator::new().predict(&predict_payload()).unwrap();
        assert!(
            config
                .pipeline_config
                .data
                .location
                .destination
                .starts_with("s3://")
        );
    }

    #[test]
    fn test_missing_run_id() {
        let mut payload = train_payload();
        payload.as_object_mut().unwrap().remove("run_id");
        let err = Validator::new().train(&payload).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("run_id"));
    }

    #[test]
    fn test_non_v4_uuid_rejected() {
        let mut payload = train_payload();
        // valid UUID, but version 1
        payload["run_id"] = json!("8c26e584-7b2c-11eb-9439-0242ac130002");
        let err = Validator::new().train(&payload).unwrap_err();
        assert!(err.to_string().contains("UUIDv4"));
    }

    #[test]
    fn test_bad_code_hash() {
        let mut payload = train_payload();
        payload["code_hash"] = json!("not-a-sha1");
        assert!(Validator::new().train(&payload).is_err());
    }

    #[test]
    fn test_bad_source_scheme() {
        let mut payload = train_payload();
        payload["pipeline_config"]["data"]["location"]["source"] =
            json!("ftp://somewhere/iris.csv");
        let err = Validator::new().train(&payload).unwrap_err();
        assert!(err.to_string().contains("backend-prefixed"));
    }

    #[test]
    fn test_bad_model_version() {
        let mut payload = train_payload();
        payload["pipeline_config"]["model"]["version"] = json!("has spaces in it");
        assert!(Validator::new().train(&payload).is_err());
    }

    #[test]
    fn test_predict_requires_destination() {
        let mut payload = predict_payload();
        payload["pipeline_config"]["data"]["location"]
            .as_object_mut()
            .unwrap()
            .remove("destination");
        assert!(Validator::new().predict(&payload).is_err());
    }

    #[test]
    fn test_additional_property_rejected_in_location() {
        let mut payload = train_payload();
        payload["pipeline_config"]["data"]["location"]["extra"] = json!("nope");
        assert!(Validator::new().train(&payload).is_err());
    }
}
