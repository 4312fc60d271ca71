use std::time::Duration;

use axum::{
    error_handling::HandleErrorLayer, response::IntoResponse, routing::get, BoxError, Extension,
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    app_module::AppState,
    health::health_controller,
    optimizer::{optimizer_controller::optimizer_router, optimizer_error::ApiError},
};

pub fn application_router() -> Router {
    Router::new()
        .route("/v1/health", get(health_controller::health))
        .nest("/v1/optimizer", optimizer_router())
}

pub fn build_application(state: AppState, request_timeout: Duration) -> Router {
    Router::new().merge(application_router()).layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(|error: BoxError| async move {
                if error.is::<tower::timeout::error::Elapsed>() {
                    ApiError::Timeout.into_response()
                } else {
                    ApiError::Internal(format!("Unhandled internal error: {}", error))
                        .into_response()
                }
            }))
            .timeout(request_timeout)
            .layer(TraceLayer::new_for_http())
            .layer(Extension(state))
            .layer(
                CorsLayer::new()
                    .allow_origin(tower_http::cors::Any)
                    .allow_methods(tower_http::cors::Any)
                    .allow_headers(tower_http::cors::Any),
            )
            .into_inner(),
    )
}
