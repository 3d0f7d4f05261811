//! API Error Handling
//!
//! Maps pipeline errors onto HTTP responses: config violations are the
//! caller's fault (422), everything else is a server-side run failure (500).

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use trellis_core::Error;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    UnprocessableConfig(String),
    RunFailed(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::UnprocessableConfig(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::RunFailed(msg) => {
                tracing::error!("Run failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Config(msg) => ApiError::UnprocessableConfig(msg),
            other => ApiError::RunFailed(other.to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_maps_to_422() {
        let api: ApiError = Error::Config("missing run_id".to_string()).into();
        assert!(matches!(api, ApiError::UnprocessableConfig(_)));
    }

    #[test]
    fn test_other_errors_map_to_500() {
        let api: ApiError = Error::Running("boom".to_string()).into();
        assert!(matches!(api, ApiError::RunFailed(_)));
    }
}
