//! Upcoming game handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get};
use axum::{Json, Router};

use crate::api::dto::{CreateScheduleRequest, ScheduleDto, ScheduleListResponse};
use crate::app_state::AppState;
use crate::domain::EntityId;
use crate::error::{ErrorResponse, TrackerError};

/// `GET /schedule`: Upcoming games, soonest first.
#[utoipa::path(
    get,
    path = "/api/v1/schedule",
    tag = "Schedule",
    summary = "List scheduled games",
    responses(
        (status = 200, description = "Scheduled games", body = ScheduleListResponse),
    )
)]
pub async fn list_schedule(State(state): State<AppState>) -> impl IntoResponse {
    let data = state
        .session_service
        .schedule()
        .await
        .iter()
        .map(ScheduleDto::from)
        .collect();
    Json(ScheduleListResponse { data })
}

/// `POST /schedule`: Schedule a game.
///
/// # Errors
///
/// Returns [`TrackerError::InvalidRequest`] for a blank title, or a
/// persistence failure.
#[utoipa::path(
    post,
    path = "/api/v1/schedule",
    tag = "Schedule",
    summary = "Schedule a game",
    request_body = CreateScheduleRequest,
    responses(
        (status = 201, description = "Scheduled game", body = ScheduleDto),
        (status = 400, description = "Blank title", body = ErrorResponse),
    )
)]
pub async fn create_schedule(
    State(state): State<AppState>,
    Json(req): Json<CreateScheduleRequest>,
) -> Result<impl IntoResponse, TrackerError> {
    let entry = state
        .session_service
        .add_schedule(&req.title, req.date)
        .await?;
    Ok((StatusCode::CREATED, Json(ScheduleDto::from(&entry))))
}

/// `DELETE /schedule/{id}`: Cancel a scheduled game.
///
/// # Errors
///
/// Returns [`TrackerError::NotFound`] for an unknown id.
#[utoipa::path(
    delete,
    path = "/api/v1/schedule/{id}",
    tag = "Schedule",
    summary = "Delete a scheduled game",
    params(("id" = i64, Path, description = "Schedule entry id")),
    responses(
        (status = 200, description = "Removed entry", body = ScheduleDto),
        (status = 404, description = "Unknown entry", body = ErrorResponse),
    )
)]
pub async fn delete_schedule(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> Result<impl IntoResponse, TrackerError> {
    let entry = state.session_service.delete_schedule(id).await?;
    Ok(Json(ScheduleDto::from(&entry)))
}

/// Schedule routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/schedule", get(list_schedule).post(create_schedule))
        .route("/schedule/{id}", delete(delete_schedule))
}
