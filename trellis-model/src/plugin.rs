//! Plugin capability contracts

use serde_json::{Map, Value};

use trellis_core::Result;
use trellis_core::domain::dataset::{Column, Dataset};

/// Output of data preparation: features and targets, each split train/test
#[derive(Debug, Clone)]
pub struct PreparedData {
    /// `(train, test)` feature tables
    pub features: (Dataset, Dataset),
    /// `(train, test)` target columns
    pub target: (Column, Column),
}

/// Turns a raw input dataset into model-ready train/test splits
///
/// Instantiated per run from the request's `prep_config`; failures surface
/// as [`trellis_core::Error::DataProcessing`].
pub trait DataPreparation: Send {
    fn run(&self, dataset: Dataset) -> Result<PreparedData>;
}

/// A trainable/predicting model
///
/// Instantiated either from hyperparameters (training) or from previously
/// serialized model bytes (prediction).
pub trait Model: Send {
    /// Fits the model and returns `(serialized model bytes, user metrics)`
    fn train(
        &mut self,
        features: &(Dataset, Dataset),
        target: &(Column, Column),
    ) -> Result<(Vec<u8>, Vec<Value>)>;

    /// Runs prediction over a dataset, returning the output dataset
    fn predict(&self, dataset: &Dataset) -> Result<Dataset>;
}

/// A versioned unit of user-supplied pipeline code
///
/// One registered module per supported version string; the factories fail
/// with [`trellis_core::Error::ModelDefinition`] when the config or the
/// serialized bytes cannot produce an instance.
pub trait PluginModule: Send + Sync {
    /// Instantiates data preparation from the request's `prep_config`
    fn data_preparation(&self, config: &Map<String, Value>) -> Result<Box<dyn DataPreparation>>;

    /// Instantiates a fresh model from hyperparameters
    fn model(&self, hyperparameters: &Map<String, Value>) -> Result<Box<dyn Model>>;

    /// Reconstructs a model from serialized bytes
    fn model_from_bytes(&self, model_obj: &[u8]) -> Result<Box<dyn Model>>;
}
