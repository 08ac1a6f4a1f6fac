//! Session handlers: finish the night, session history and live totals.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{ConfirmQuery, RemovedResponse, SessionDto, SessionListResponse, StatsDto};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, TrackerError};

/// `POST /session/finish?confirm=true`: Close the night.
///
/// # Errors
///
/// Returns [`TrackerError::NothingToSave`] with no player records (checked
/// before confirmation), [`TrackerError::ConfirmationRequired`] without
/// `confirm=true`, or a persistence failure.
#[utoipa::path(
    post,
    path = "/api/v1/session/finish",
    tag = "Sessions",
    summary = "Finish the session",
    description = "Summarizes every player record into a session, then clears players and seats.",
    params(ConfirmQuery),
    responses(
        (status = 201, description = "Saved session", body = SessionDto),
        (status = 422, description = "No player records to save", body = ErrorResponse),
        (status = 428, description = "Confirmation missing", body = ErrorResponse),
    )
)]
pub async fn finish_session(
    State(state): State<AppState>,
    Query(confirm): Query<ConfirmQuery>,
) -> Result<impl IntoResponse, TrackerError> {
    if state.session_service.players().await.is_empty() {
        return Err(TrackerError::NothingToSave);
    }
    confirm.require("finishing the session")?;
    let record = state.session_service.finish_session().await?;
    Ok((StatusCode::CREATED, Json(SessionDto::from(&record))))
}

/// `GET /sessions`: Saved sessions, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/sessions",
    tag = "Sessions",
    summary = "List saved sessions",
    responses(
        (status = 200, description = "Session history", body = SessionListResponse),
    )
)]
pub async fn list_sessions(State(state): State<AppState>) -> impl IntoResponse {
    let data = state
        .session_service
        .sessions()
        .await
        .iter()
        .map(SessionDto::from)
        .collect();
    Json(SessionListResponse { data })
}

/// `DELETE /sessions?confirm=true`: Drop all saved sessions.
///
/// # Errors
///
/// Returns [`TrackerError::ConfirmationRequired`] without `confirm=true`,
/// or a persistence failure.
#[utoipa::path(
    delete,
    path = "/api/v1/sessions",
    tag = "Sessions",
    summary = "Clear the session history",
    params(ConfirmQuery),
    responses(
        (status = 200, description = "Number of sessions removed", body = RemovedResponse),
        (status = 428, description = "Confirmation missing", body = ErrorResponse),
    )
)]
pub async fn clear_sessions(
    State(state): State<AppState>,
    Query(confirm): Query<ConfirmQuery>,
) -> Result<impl IntoResponse, TrackerError> {
    confirm.require("clearing the session history")?;
    let removed = state.session_service.clear_sessions().await?;
    Ok(Json(RemovedResponse { removed }))
}

/// `GET /stats`: Live table totals.
#[utoipa::path(
    get,
    path = "/api/v1/stats",
    tag = "Sessions",
    summary = "Table statistics",
    description = "Counts and money totals over every player record of the current session.",
    responses(
        (status = 200, description = "Current totals", body = StatsDto),
    )
)]
pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(StatsDto::from(&state.session_service.stats().await))
}

/// Session routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/session/finish", post(finish_session))
        .route("/sessions", get(list_sessions).delete(clear_sessions))
        .route("/stats", get(stats))
}
