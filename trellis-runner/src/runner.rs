//! Train/predict pipeline execution

use std::time::Instant;

use serde_json::Value;
use tracing::{debug, error, info};

use trellis_core::domain::config::{PredictConfig, TrainConfig};
use trellis_core::domain::metrics::{
    PredictElapsed, PredictMetrics, TrainElapsed, TrainMetrics,
};
use trellis_core::domain::run::{RunKind, RunStatus};
use trellis_core::validator::Validator;
use trellis_core::{Error, Result};
use trellis_io::{IoController, IoControllerFactory};
use trellis_model::registry;

/// Executes ML pipelines
///
/// Holds no per-run state; every run binds its own IO controller and walks
/// the state machine end-to-end within one call.
pub struct Runner {
    io: IoControllerFactory,
    validate: Validator,
}

impl Runner {
    pub fn new(io: IoControllerFactory) -> Self {
        Self {
            io,
            validate: Validator::new(),
        }
    }

    /// Runs a training pipeline
    ///
    /// Validation happens before any persistent side effect; every failure
    /// after the IO controller is bound is recorded as a FAILED status
    /// before the error is returned.
    pub async fn train(&self, config: &Value) -> Result<()> {
        debug!("running train pipeline");
        let config = self.validate.train(config)?;
        let ctl = self.bind(&config.project_id, &config.run_id)?;
        let result = self.run_train(&ctl, &config).await;
        self.finish(&ctl, config.run_id, result).await
    }

    /// Runs a prediction pipeline
    pub async fn predict(&self, config: &Value) -> Result<()> {
        debug!("running prediction pipeline");
        let config = self.validate.predict(config)?;
        let ctl = self.bind(&config.project_id, &config.run_id)?;
        let result = self.run_predict(&ctl, &config).await;
        self.finish(&ctl, config.run_id, result).await
    }

    fn bind(&self, project_id: &uuid::Uuid, run_id: &uuid::Uuid) -> Result<IoController> {
        self.io.bind(*project_id, *run_id).map_err(|e| {
            error!(%run_id, error = %e, "failed to bind the io controller");
            e
        })
    }

    async fn run_train(&self, ctl: &IoController, config: &TrainConfig) -> Result<()> {
        ctl.save().status(RunStatus::Running, None).await?;
        ctl.save().run_kind(RunKind::Train).await?;
        ctl.save()
            .metadata(&serde_json::to_value(config).map_err(|e| Error::Running(e.to_string()))?)
            .await?;

        let pipeline = &config.pipeline_config;
        let module = registry::resolve(&pipeline.model.version)?;

        let started = Instant::now();
        let dataset = ctl
            .load()
            .data(&pipeline.data.location.source)
            .await
            .map_err(|e| Error::Running(format!("failed to load data: {e}")))?;
        let data_read = started.elapsed().as_secs_f64();

        let started = Instant::now();
        let prepared = module
            .data_preparation(&pipeline.data.prep_config)
            .and_then(|prep| prep.run(dataset))
            .map_err(|e| match e {
                e @ Error::DataProcessing(_) => e,
                other => Error::DataProcessing(format!(
                    "failed while running user defined data preparation methods: {other}"
                )),
            })?;
        let data_prep = started.elapsed().as_secs_f64();

        let started = Instant::now();
        let (model_bytes, user_metrics) = module
            .model(&pipeline.model.hyperparameters)
            .and_then(|mut model| model.train(&prepared.features, &prepared.target))
            .map_err(|e| match e {
                e @ (Error::ModelDefinition(_) | Error::Running(_)) => e,
                other => Error::Running(format!(
                    "failed while running user defined model methods: {other}"
                )),
            })?;
        let train = started.elapsed().as_secs_f64();

        ctl.save().model(&model_bytes).await?;
        ctl.save()
            .metrics(&TrainMetrics {
                elapsed: TrainElapsed {
                    data_read,
                    data_prep,
                    train,
                },
                user_defined_metrics: user_metrics,
            })
            .await?;
        ctl.save().status(RunStatus::Success, None).await
    }

    async fn run_predict(&self, ctl: &IoController, config: &PredictConfig) -> Result<()> {
        ctl.save().status(RunStatus::Running, None).await?;
        ctl.save().run_kind(RunKind::Predict).await?;
        ctl.save()
            .metadata(&serde_json::to_value(config).map_err(|e| Error::Running(e.to_string()))?)
            .await?;

        let pipeline = &config.pipeline_config;
        let train_id = pipeline.train_id;

        // a second, read-only binding onto the referenced training run
        let train_ctl = self.io.bind(config.project_id, train_id)?;
        let train_meta = train_ctl.load().metadata().await.map_err(|e| {
            Error::Running(format!("failed to load metadata of train run {train_id}: {e}"))
        })?;
        let train_config: TrainConfig = serde_json::from_value(train_meta).map_err(|e| {
            Error::Running(format!("metadata of train run {train_id} is not readable: {e}"))
        })?;

        let module = registry::resolve(&train_config.pipeline_config.model.version)?;
        let model_bytes = train_ctl.load().model().await.map_err(|e| {
            Error::Running(format!("failed to load model of train run {train_id}: {e}"))
        })?;

        let started = Instant::now();
        let dataset_in = ctl
            .load()
            .data(&pipeline.data.location.source)
            .await
            .map_err(|e| Error::Running(format!("failed to load data: {e}")))?;
        let data_read = started.elapsed().as_secs_f64();

        let started = Instant::now();
        let dataset_out = module
            .model_from_bytes(&model_bytes)
            .and_then(|model| model.predict(&dataset_in))
            .map_err(|e| match e {
                e @ (Error::ModelDefinition(_) | Error::Running(_)) => e,
                other => Error::Running(format!("failed while running prediction: {other}")),
            })?;
        let prediction = started.elapsed().as_secs_f64();

        ctl.save()
            .data(&dataset_out, &pipeline.data.location.destination)
            .await?;
        ctl.save()
            .metrics(&PredictMetrics {
                elapsed: PredictElapsed {
                    data_read,
                    prediction,
                },
            })
            .await?;
        ctl.save().status(RunStatus::Success, None).await
    }

    /// Terminal bookkeeping shared by both pipelines
    ///
    /// On failure the FAILED status is always persisted before the error is
    /// returned; errors already carrying a run-specific kind pass through
    /// unchanged, anything else becomes the catch-all running error.
    async fn finish(
        &self,
        ctl: &IoController,
        run_id: uuid::Uuid,
        result: Result<()>,
    ) -> Result<()> {
        match result {
            Ok(()) => {
                info!(%run_id, "pipeline finished");
                Ok(())
            }
            Err(err) => {
                let message = err.to_string();
                error!(%run_id, error = %message, "pipeline failed");
                if let Err(status_err) = ctl
                    .save()
                    .status(RunStatus::Failed, Some(message.clone()))
                    .await
                {
                    error!(%run_id, error = %status_err, "failed to record the FAILED status");
                }
                if err.is_run_specific() {
                    Err(err)
                } else {
                    Err(Error::Running(message))
                }
            }
        }
    }
}
