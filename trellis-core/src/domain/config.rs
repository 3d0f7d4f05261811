//! Pipeline request payloads
//!
//! Typed shapes of the train/predict trigger configs. Every level is closed
//! (`deny_unknown_fields`) except `prep_config` and `hyperparameters`, which
//! are deliberately schema-free pass-throughs validated by the plugin itself.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Train trigger config
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrainConfig {
    /// ML project ID
    pub project_id: Uuid,
    /// Modelling run ID
    pub run_id: Uuid,
    /// Codebase (git commit) SHA1 hash value
    pub code_hash: String,
    pub pipeline_config: TrainPipelineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrainPipelineConfig {
    pub data: TrainDataConfig,
    pub model: ModelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrainDataConfig {
    pub location: TrainDataLocation,
    /// Config to prepare the data set for model training; opaque to the core
    pub prep_config: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrainDataLocation {
    /// Backend-prefixed URI of the input data object
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    /// Model hyperparameters; opaque to the core
    pub hyperparameters: Map<String, Value>,
    /// Version string resolvable by the plugin registry
    pub version: String,
}

/// Prediction trigger config
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PredictConfig {
    pub project_id: Uuid,
    pub run_id: Uuid,
    pub pipeline_config: PredictPipelineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PredictPipelineConfig {
    /// The training run whose model and metadata this prediction uses
    pub train_id: Uuid,
    pub data: PredictDataConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PredictDataConfig {
    pub location: PredictDataLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PredictDataLocation {
    pub source: String,
    pub destination: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_train_config_round_trip() {
        let value = json!({
            "project_id": "0cba82ff-9790-454d-b7b9-22570e7ba28c",
            "run_id": "c77d0a32-2b29-47f6-9ac5-67a21f7953b9",
            "code_hash": "8c2f3d3c5dd853231c7429b099347d13c8bb2c37",
            "pipeline_config": {
                "data": {
                    "location": {"source": "fs://data/input/iris.csv"},
                    "prep_config": {"test_size": 0.33, "seed": 42}
                },
                "model": {
                    "hyperparameters": {"n_neighbors": 3, "seed": 42},
                    "version": "trellis_demo.v1"
                }
            }
        });
        let config: TrainConfig = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(config.pipeline_config.model.version, "trellis_demo.v1");
        assert_eq!(serde_json::to_value(&config).unwrap(), value);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let value = json!({
            "project_id": "0cba82ff-9790-454d-b7b9-22570e7ba28c",
            "run_id": "c77d0a32-2b29-47f6-9ac5-67a21f7953b9",
            "code_hash": "8c2f3d3c5dd853231c7429b099347d13c8bb2c37",
            "surprise": true,
            "pipeline_config": {
                "data": {
                    "location": {"source": "fs://data/input/iris.csv"},
                    "prep_config": {}
                },
                "model": {"hyperparameters": {}, "version": "trellis_demo.v1"}
            }
        });
        assert!(serde_json::from_value::<TrainConfig>(value).is_err());
    }

    #[test]
    fn test_prep_config_is_open() {
        let value = json!({
            "project_id": "0cba82ff-9790-454d-b7b9-22570e7ba28c",
            "run_id": "c77d0a32-2b29-47f6-9ac5-67a21f7953b9",
            "code_hash": "8c2f3d3c5dd853231c7429b099347d13c8bb2c37",
            "pipeline_config": {
                "data": {
                    "location": {"source": "fs://data/input/iris.csv"},
                    "prep_config": {"anything": {"goes": ["here", 1, 2.5]}}
                },
                "model": {"hyperparameters": {"custom": "knob"}, "version": "trellis_demo.v1"}
            }
        });
        let config: TrainConfig = serde_json::from_value(value).unwrap();
        assert!(config.pipeline_config.data.prep_config.contains_key("anything"));
    }
}
