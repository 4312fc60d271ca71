use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use brevity_core::{RefinementError, TransformError, WorkbenchError};
use brevity_llm::LLMError;
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    Busy,
    InvalidBody(String),
    Timeout,
    Internal(String),
    Workbench(WorkbenchError),
}

impl From<WorkbenchError> for ApiError {
    fn from(err: WorkbenchError) -> Self {
        ApiError::Workbench(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        let err = match self {
            ApiError::Busy => return (StatusCode::CONFLICT, "busy"),
            ApiError::InvalidBody(_) => return (StatusCode::BAD_REQUEST, "validation"),
            ApiError::Timeout => return (StatusCode::GATEWAY_TIMEOUT, "timeout"),
            ApiError::Internal(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
            ApiError::Workbench(err) => err,
        };

        match err {
            WorkbenchError::NoSession => (StatusCode::CONFLICT, "no_session"),
            WorkbenchError::StaleSession(_) => (StatusCode::CONFLICT, "stale_session"),
            WorkbenchError::Transform(TransformError::Validation(_))
            | WorkbenchError::Refinement(RefinementError::Validation(_)) => {
                (StatusCode::BAD_REQUEST, "validation")
            }
            WorkbenchError::Transform(TransformError::Auth(_)) => {
                (StatusCode::UNAUTHORIZED, "unauthorized")
            }
            WorkbenchError::Transform(TransformError::EmptyResponse)
            | WorkbenchError::Refinement(RefinementError::EmptyResponse) => {
                (StatusCode::BAD_GATEWAY, "empty_response")
            }
            WorkbenchError::Refinement(RefinementError::NotReady(_)) => {
                (StatusCode::CONFLICT, "session_not_ready")
            }
            WorkbenchError::Transform(TransformError::Failed(LLMError::Timeout(_)))
            | WorkbenchError::Refinement(RefinementError::Failed(LLMError::Timeout(_))) => {
                (StatusCode::GATEWAY_TIMEOUT, "timeout")
            }
            WorkbenchError::Transform(TransformError::Failed(_)) => {
                (StatusCode::BAD_GATEWAY, "transform_failed")
            }
            WorkbenchError::Refinement(RefinementError::Failed(_)) => {
                (StatusCode::BAD_GATEWAY, "refinement_failed")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match &self {
            ApiError::Busy => "Another request is still being processed".to_string(),
            ApiError::InvalidBody(message) | ApiError::Internal(message) => message.clone(),
            ApiError::Timeout => "The request took too long to complete".to_string(),
            ApiError::Workbench(err) => err.to_string(),
        };

        if status.is_server_error() {
            tracing::error!("{}: {}", code, message);
        } else {
            tracing::warn!("{}: {}", code, message);
        }

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}
