//! Axum Handlers for the REST API
//!
//! This module contains the logic for handling HTTP requests for session
//! management and learning turns. It uses `utoipa` doc comments to generate
//! OpenAPI documentation.

use axum::{
    extract::{ConnectInfo, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::{
    models::{
        ErrorResponse, ExplanationPayload, SessionCreated, SessionView, SummaryResponse,
        TurnPayload, TurnResponse,
    },
    state::{AppState, SharedEngine},
};

pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    InternalServerError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(ErrorResponse { message })).into_response()
            }
            ApiError::InternalServerError(err) => {
                error!("Internal Server Error: {:?}", err);
                let message = "An internal server error occurred.".to_string();
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse { message }),
                )
                    .into_response()
            }
        }
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::InternalServerError(err.into())
    }
}

async fn find_engine(state: &AppState, id: Uuid) -> Result<SharedEngine, ApiError> {
    state
        .engine(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Session with id '{}' not found", id)))
}

/// Create a new learning session.
#[utoipa::path(
    post,
    path = "/sessions",
    responses(
        (status = 201, description = "Session created successfully", body = SessionCreated),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<impl IntoResponse, ApiError> {
    let session_id = state.create_session(Some(addr.ip().to_string())).await;
    Ok((StatusCode::CREATED, Json(SessionCreated { session_id })))
}

/// Submit one user turn to a session's pipeline.
///
/// Backs both "start a topic" and "answer the pending question": the engine
/// decides what the input means. Concurrent turns for the same session queue
/// in arrival order.
#[utoipa::path(
    post,
    path = "/sessions/{id}/turns",
    request_body = TurnPayload,
    responses(
        (status = 200, description = "Turn processed", body = TurnResponse),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID")
    )
)]
pub async fn post_turn(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TurnPayload>,
) -> Result<Json<TurnResponse>, ApiError> {
    if payload.text.trim().is_empty() {
        return Err(ApiError::BadRequest("text must not be empty".to_string()));
    }

    let engine = find_engine(&state, id).await?;
    let result = engine.lock().await.handle_turn(&payload.text).await?;
    Ok(Json(result.into()))
}

/// Request a detailed breakdown of one subtopic.
#[utoipa::path(
    post,
    path = "/sessions/{id}/explanation",
    request_body = ExplanationPayload,
    responses(
        (status = 200, description = "Explanation generated", body = TurnResponse),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID")
    )
)]
pub async fn post_explanation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ExplanationPayload>,
) -> Result<Json<TurnResponse>, ApiError> {
    if payload.subtopic.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "subtopic must not be empty".to_string(),
        ));
    }

    let engine = find_engine(&state, id).await?;
    let result = engine
        .lock()
        .await
        .get_explanation(&payload.subtopic)
        .await?;
    Ok(Json(result.into()))
}

/// Consolidate the session history into an updated context summary.
#[utoipa::path(
    get,
    path = "/sessions/{id}/summary",
    responses(
        (status = 200, description = "Consolidated summary", body = SummaryResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID")
    )
)]
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let engine = find_engine(&state, id).await?;
    let result = engine.lock().await.get_session_summary().await?;
    Ok(Json(result.into()))
}

/// Get a read-only snapshot of a session's learning state.
#[utoipa::path(
    get,
    path = "/sessions/{id}",
    responses(
        (status = 200, description = "Session state", body = SessionView),
        (status = 404, description = "Session not found", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID")
    )
)]
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let engine = find_engine(&state, id).await?;
    let snapshot = SessionView::snapshot(id, engine.lock().await.session());
    Ok(Json(snapshot))
}
