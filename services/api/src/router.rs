//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the REST API and OpenAPI documentation.

use crate::{
    handlers,
    models::{
        ApiSafetyStatus, ErrorResponse, ExplanationPayload, SessionCreated, SessionView,
        SummaryResponse, TurnPayload, TurnResponse,
    },
    state::AppState,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::create_session,
        handlers::post_turn,
        handlers::post_explanation,
        handlers::get_summary,
        handlers::get_session,
    ),
    components(
        schemas(SessionCreated, TurnPayload, ExplanationPayload, TurnResponse, SummaryResponse, SessionView, ApiSafetyStatus, ErrorResponse)
    ),
    tags(
        (name = "MindFlow API", description = "Session management and learning turns for the MindFlow agent pipeline")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Group all routes that require AppState into their own router.
    let api_router = Router::new()
        .route("/sessions", post(handlers::create_session))
        .route("/sessions/{id}", get(handlers::get_session))
        .route("/sessions/{id}/turns", post(handlers::post_turn))
        .route("/sessions/{id}/explanation", post(handlers::post_explanation))
        .route("/sessions/{id}/summary", get(handlers::get_summary))
        // Apply the state ONLY to this group of routes.
        .with_state(app_state);

    // Merge the stateful routes with the stateless Swagger UI routes.
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}
