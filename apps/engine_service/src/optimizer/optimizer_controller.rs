use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use brevity_core::{
    logical_len, ArtifactOrigin, EditingSession, HistoryEntry, SessionState, TransformRequest,
    Workbench, DEFAULT_LIMIT, MAX_LIMIT, MIN_LIMIT,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::MutexGuard;
use uuid::Uuid;

use super::optimizer_error::ApiError;
use crate::app_module::AppState;

#[derive(Debug, Deserialize)]
pub struct CountRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct RefineRequest {
    pub session_id: Uuid,
    pub instruction: String,
}

#[derive(Debug, Deserialize)]
pub struct EditRequest {
    pub session_id: Uuid,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct SessionView<'a> {
    pub session_id: Uuid,
    pub text: &'a str,
    pub length: usize,
    pub max_length: usize,
    pub over_limit: bool,
    pub origin: ArtifactOrigin,
    pub version: u32,
    pub state: SessionState,
    pub history: &'a [HistoryEntry],
}

impl<'a> From<&'a EditingSession> for SessionView<'a> {
    fn from(editing: &'a EditingSession) -> Self {
        Self {
            session_id: editing.id(),
            text: editing.artifact.text(),
            length: editing.artifact.length(),
            max_length: editing.artifact.max_length().get(),
            over_limit: editing.artifact.over_limit(),
            origin: editing.artifact.origin(),
            version: editing.artifact.version(),
            state: editing.session.state(),
            history: editing.session.history(),
        }
    }
}

pub fn optimizer_router() -> Router {
    Router::new()
        .route("/limits", get(limits))
        .route("/count", post(count))
        .route("/transform", post(transform))
        .route("/refine", post(refine))
        .route("/artifact", put(edit_artifact))
        .route("/session", get(current_session).delete(reset_session))
}

/// One request at a time: a second caller is turned away instead of queued.
fn acquire(state: &AppState) -> Result<MutexGuard<'_, Workbench>, ApiError> {
    state
        .service
        .workbench
        .try_lock()
        .map_err(|_| ApiError::Busy)
}

fn view(editing: &EditingSession) -> Json<SessionView<'_>> {
    Json(SessionView::from(editing))
}

pub async fn limits() -> impl IntoResponse {
    Json(json!({
        "min": MIN_LIMIT,
        "max": MAX_LIMIT,
        "default": DEFAULT_LIMIT,
    }))
}

pub async fn count(
    payload: Result<Json<CountRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    Ok(Json(json!({ "length": logical_len(&request.text) })))
}

pub async fn transform(
    Extension(ctx): Extension<AppState>,
    payload: Result<Json<TransformRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let mut workbench = acquire(&ctx)?;
    let editing = workbench.submit(&request).await?;
    Ok((StatusCode::OK, view(editing)).into_response())
}

pub async fn refine(
    Extension(ctx): Extension<AppState>,
    payload: Result<Json<RefineRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let mut workbench = acquire(&ctx)?;
    workbench.ensure_session(request.session_id)?;
    let editing = workbench.refine(&request.instruction).await?;
    Ok(view(editing).into_response())
}

pub async fn edit_artifact(
    Extension(ctx): Extension<AppState>,
    payload: Result<Json<EditRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let mut workbench = acquire(&ctx)?;
    workbench.ensure_session(request.session_id)?;
    let editing = workbench.edit(request.text)?;
    Ok(view(editing).into_response())
}

pub async fn current_session(
    Extension(ctx): Extension<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let workbench = acquire(&ctx)?;
    let response = match workbench.current() {
        Some(editing) => view(editing).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "no_session", "message": "No message is being edited" })),
        )
            .into_response(),
    };
    Ok(response)
}

pub async fn reset_session(
    Extension(ctx): Extension<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let mut workbench = acquire(&ctx)?;
    workbench.reset();
    Ok(StatusCode::NO_CONTENT)
}
