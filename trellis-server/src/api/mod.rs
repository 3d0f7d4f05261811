//! API Module
//!
//! HTTP transport for the pipeline engine. The handlers are thin: decode the
//! trigger payload, call into the runner (or the bus for asynchronous
//! submission), and translate the outcome into a status code.

pub mod error;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use trellis_core::domain::run::{RunKind, RunStatus};
use trellis_core::validator::Validator;
use trellis_io::IoControllerFactory;
use trellis_io::bus::BusClient;
use trellis_runner::Runner;

use crate::api::error::{ApiError, ApiResult};

/// Shared server state
pub struct AppState {
    pub runner: Runner,
    pub io: IoControllerFactory,
    pub bus: BusClient,
    pub validate: Validator,
}

/// Create the main API router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/status", get(health_check))
        .route("/train", post(train))
        .route("/predict", post(predict))
        .route("/submit/{kind}", post(submit))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// GET /status
/// Healthcheck endpoint
async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// POST /train
/// Runs a training pipeline synchronously
async fn train(State(state): State<Arc<AppState>>, Json(payload): Json<Value>) -> ApiResult<StatusCode> {
    tracing::info!(run_id = %run_id_of(&payload), "train request accepted");
    state.runner.train(&payload).await?;
    Ok(StatusCode::OK)
}

/// POST /predict
/// Runs a prediction pipeline synchronously
async fn predict(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Value>,
) -> ApiResult<StatusCode> {
    tracing::info!(run_id = %run_id_of(&payload), "predict request accepted");
    state.runner.predict(&payload).await?;
    Ok(StatusCode::OK)
}

/// POST /submit/{kind}
/// Accepts a run request and re-publishes it for asynchronous execution
///
/// The config is validated up front, a SUBMITTED status record is written
/// into the run's namespace, and the payload is published to the project's
/// trigger topic for a worker to pick up.
async fn submit(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Json(payload): Json<Value>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let kind = match kind.as_str() {
        "train" => RunKind::Train,
        "predict" => RunKind::Predict,
        other => {
            return Err(ApiError::BadRequest(format!(
                "unknown run kind `{other}`, set one of: train, predict"
            )));
        }
    };

    let (project_id, run_id) = match kind {
        RunKind::Train => {
            let config = state.validate.train(&payload)?;
            (config.project_id, config.run_id)
        }
        RunKind::Predict => {
            let config = state.validate.predict(&payload)?;
            (config.project_id, config.run_id)
        }
    };

    let ctl = state.io.bind(project_id, run_id)?;
    ctl.save().status(RunStatus::Submitted, None).await?;

    let topic = format!("trigger_{project_id}_{kind}");
    state.bus.publish(&topic, &payload).await?;

    tracing::info!(%run_id, topic, "run submitted");
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({"project_id": project_id, "run_id": run_id})),
    ))
}

fn run_id_of(payload: &Value) -> Uuid {
    payload
        .get("run_id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or(Uuid::nil())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_of_reads_payload() {
        let payload = json!({"run_id": "c77d0a32-2b29-47f6-9ac5-67a21f7953b9"});
        assert_eq!(
            run_id_of(&payload).to_string(),
            "c77d0a32-2b29-47f6-9ac5-67a21f7953b9"
        );
    }

    #[test]
    fn test_run_id_of_tolerates_garbage() {
        assert_eq!(run_id_of(&json!({})), Uuid::nil());
        assert_eq!(run_id_of(&json!({"run_id": 42})), Uuid::nil());
    }
}
