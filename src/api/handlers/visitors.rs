//! Visitor handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get};
use axum::{Json, Router};

use crate::api::dto::{CreateVisitorRequest, VisitorDto, VisitorListResponse};
use crate::app_state::AppState;
use crate::domain::EntityId;
use crate::error::{ErrorResponse, TrackerError};

/// `GET /visitors`
#[utoipa::path(
    get,
    path = "/api/v1/visitors",
    tag = "Visitors",
    summary = "List visitors",
    responses(
        (status = 200, description = "Visitors present", body = VisitorListResponse),
    )
)]
pub async fn list_visitors(State(state): State<AppState>) -> impl IntoResponse {
    let data = state
        .session_service
        .visitors()
        .await
        .iter()
        .map(VisitorDto::from)
        .collect();
    Json(VisitorListResponse { data })
}

/// `POST /visitors`
///
/// # Errors
///
/// Returns [`TrackerError::InvalidRequest`] for a blank name.
#[utoipa::path(
    post,
    path = "/api/v1/visitors",
    tag = "Visitors",
    summary = "Register a visitor",
    request_body = CreateVisitorRequest,
    responses(
        (status = 201, description = "Visitor added", body = VisitorDto),
        (status = 400, description = "Blank name", body = ErrorResponse),
    )
)]
pub async fn create_visitor(
    State(state): State<AppState>,
    Json(req): Json<CreateVisitorRequest>,
) -> Result<impl IntoResponse, TrackerError> {
    let visitor = state.session_service.add_visitor(&req.name).await?;
    Ok((StatusCode::CREATED, Json(VisitorDto::from(&visitor))))
}

/// `DELETE /visitors/{id}`
///
/// # Errors
///
/// Returns [`TrackerError::NotFound`] for an unknown id.
#[utoipa::path(
    delete,
    path = "/api/v1/visitors/{id}",
    tag = "Visitors",
    summary = "Remove a visitor",
    params(("id" = i64, Path, description = "Visitor id")),
    responses(
        (status = 200, description = "Removed visitor", body = VisitorDto),
        (status = 404, description = "Unknown visitor", body = ErrorResponse),
    )
)]
pub async fn delete_visitor(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> Result<impl IntoResponse, TrackerError> {
    let visitor = state.session_service.remove_visitor(id).await?;
    Ok(Json(VisitorDto::from(&visitor)))
}

/// Visitor routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/visitors", get(list_visitors).post(create_visitor))
        .route("/visitors/{id}", delete(delete_visitor))
}
