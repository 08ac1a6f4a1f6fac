//! Seat handlers: layout, moves, swaps and visual removal.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use crate::api::dto::{ConfirmQuery, MoveSeatRequest, SeatDto, SeatListResponse, SwapSeatsRequest, SwapSeatsResponse};
use crate::app_state::AppState;
use crate::domain::{EntityId, SeatNumber};
use crate::error::{ErrorResponse, TrackerError};

/// `GET /seats`: Current table layout.
#[utoipa::path(
    get,
    path = "/api/v1/seats",
    tag = "Seats",
    summary = "List seat assignments",
    description = "Returns every seated player ordered by seat number, plus the seats still free.",
    responses(
        (status = 200, description = "Table layout", body = SeatListResponse),
    )
)]
pub async fn list_seats(State(state): State<AppState>) -> impl IntoResponse {
    let seats = state.session_service.seats().await;
    let free_seats = SeatNumber::all()
        .filter(|n| !seats.iter().any(|s| s.seat == *n))
        .collect();
    Json(SeatListResponse {
        data: seats.iter().map(SeatDto::from).collect(),
        free_seats,
    })
}

/// `PUT /seats/{player_id}`: Move a seated player to an empty seat.
///
/// # Errors
///
/// Returns [`TrackerError::InvalidRequest`] for a seat outside 1..=12,
/// [`TrackerError::SeatOccupied`] when someone else sits there, or
/// [`TrackerError::SeatNotHeld`] when the player has no seat.
#[utoipa::path(
    put,
    path = "/api/v1/seats/{player_id}",
    tag = "Seats",
    summary = "Move a player",
    params(("player_id" = i64, Path, description = "Seated player id")),
    request_body = MoveSeatRequest,
    responses(
        (status = 200, description = "New assignment", body = SeatDto),
        (status = 400, description = "Seat out of range", body = ErrorResponse),
        (status = 404, description = "Player not seated", body = ErrorResponse),
        (status = 409, description = "Seat occupied", body = ErrorResponse),
    )
)]
pub async fn move_seat(
    State(state): State<AppState>,
    Path(player_id): Path<EntityId>,
    Json(req): Json<MoveSeatRequest>,
) -> Result<impl IntoResponse, TrackerError> {
    let seat = SeatNumber::new(req.seat)?;
    let assignment = state
        .session_service
        .update_seat_position(player_id, seat)
        .await?;
    Ok(Json(SeatDto::from(&assignment)))
}

/// `POST /seats/swap`: Exchange two players' seats.
///
/// # Errors
///
/// Returns [`TrackerError::SeatNotHeld`] when either player is unseated.
#[utoipa::path(
    post,
    path = "/api/v1/seats/swap",
    tag = "Seats",
    summary = "Swap two seats",
    request_body = SwapSeatsRequest,
    responses(
        (status = 200, description = "Both assignments after the swap", body = SwapSeatsResponse),
        (status = 404, description = "A player is not seated", body = ErrorResponse),
    )
)]
pub async fn swap_seats(
    State(state): State<AppState>,
    Json(req): Json<SwapSeatsRequest>,
) -> Result<impl IntoResponse, TrackerError> {
    let (a, b) = state
        .session_service
        .swap_seats(req.player_a, req.player_b)
        .await?;
    Ok(Json(SwapSeatsResponse {
        player_a: SeatDto::from(&a),
        player_b: SeatDto::from(&b),
    }))
}

/// `DELETE /seats/{player_id}?confirm=true`: Clear a seat, keeping the
/// player record.
///
/// # Errors
///
/// Returns [`TrackerError::ConfirmationRequired`] without `confirm=true`,
/// or [`TrackerError::SeatNotHeld`] when the player has no seat.
#[utoipa::path(
    delete,
    path = "/api/v1/seats/{player_id}",
    tag = "Seats",
    summary = "Remove a player from the table view",
    description = "Frees the seat. The player stays playing and their money is untouched.",
    params(("player_id" = i64, Path, description = "Seated player id"), ConfirmQuery),
    responses(
        (status = 200, description = "Removed assignment", body = SeatDto),
        (status = 404, description = "Player not seated", body = ErrorResponse),
        (status = 428, description = "Confirmation missing", body = ErrorResponse),
    )
)]
pub async fn remove_seat(
    State(state): State<AppState>,
    Path(player_id): Path<EntityId>,
    Query(confirm): Query<ConfirmQuery>,
) -> Result<impl IntoResponse, TrackerError> {
    confirm.require("removing a seat")?;
    let removed = state.session_service.remove_visual_seat(player_id).await?;
    Ok(Json(SeatDto::from(&removed)))
}

/// Seat routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/seats", get(list_seats))
        .route("/seats/swap", post(swap_seats))
        .route("/seats/{player_id}", put(move_seat).delete(remove_seat))
}
