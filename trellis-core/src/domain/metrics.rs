//! Run metrics payloads

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metrics artifact of a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainMetrics {
    pub elapsed: TrainElapsed,
    /// Metrics reported by the user-defined model; opaque to the core
    pub user_defined_metrics: Vec<Value>,
}

/// Elapsed wall-clock seconds per training stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainElapsed {
    pub data_read: f64,
    pub data_prep: f64,
    pub train: f64,
}

/// Metrics artifact of a prediction run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictMetrics {
    pub elapsed: PredictElapsed,
}

/// Elapsed wall-clock seconds per prediction stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictElapsed {
    pub data_read: f64,
    pub prediction: f64,
}
