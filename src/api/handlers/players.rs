//! Player handlers: buy-in, rebuy, checkout, cancel, and the history.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use crate::api::dto::{
    AdmissionResponse, CheckoutRequest, ConfirmQuery, CreatePlayerRequest, PlayerDto,
    PlayerListResponse, RebuyRequest, RemovedResponse, parse_money,
};
use crate::app_state::AppState;
use crate::domain::{Collection, EntityId, NewPlayer};
use crate::error::{ErrorResponse, TrackerError};

/// `POST /players`: Buy a player in.
///
/// # Errors
///
/// Returns [`TrackerError`] on a blank name, a negative buy-in or a
/// persistence failure.
#[utoipa::path(
    post,
    path = "/api/v1/players",
    tag = "Players",
    summary = "Buy a player in",
    description = "Creates a playing player and seats them at the lowest free seat. When all 12 seats are taken the player is created unseated and `table_full` is set.",
    request_body = CreatePlayerRequest,
    responses(
        (status = 201, description = "Player created", body = AdmissionResponse),
        (status = 400, description = "Blank name or negative buy-in", body = ErrorResponse),
        (status = 500, description = "Persistence failure", body = ErrorResponse),
    )
)]
pub async fn create_player(
    State(state): State<AppState>,
    Json(req): Json<CreatePlayerRequest>,
) -> Result<impl IntoResponse, TrackerError> {
    let new = NewPlayer {
        name: req.name,
        buy_in: parse_money(req.buy_in, "buy_in")?,
        photo: req.photo.filter(|p| !p.trim().is_empty()),
        is_dealer: req.is_dealer,
    };
    let admission = state.session_service.add_player(new).await?;
    Ok((StatusCode::CREATED, Json(AdmissionResponse::from(&admission))))
}

/// `GET /players`: List players still at the table.
#[utoipa::path(
    get,
    path = "/api/v1/players",
    tag = "Players",
    summary = "List active players",
    responses(
        (status = 200, description = "Playing players, newest first", body = PlayerListResponse),
    )
)]
pub async fn list_players(State(state): State<AppState>) -> impl IntoResponse {
    let data = state
        .session_service
        .active_players()
        .await
        .iter()
        .map(PlayerDto::from)
        .collect();
    Json(PlayerListResponse { data })
}

/// `GET /players/{id}`: Get one player record.
///
/// # Errors
///
/// Returns [`TrackerError::NotFound`] for an unknown id.
#[utoipa::path(
    get,
    path = "/api/v1/players/{id}",
    tag = "Players",
    summary = "Get a player",
    params(("id" = i64, Path, description = "Player id")),
    responses(
        (status = 200, description = "Player record", body = PlayerDto),
        (status = 404, description = "Unknown player", body = ErrorResponse),
    )
)]
pub async fn get_player(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> Result<impl IntoResponse, TrackerError> {
    let player = state.session_service.player(id).await?;
    Ok(Json(PlayerDto::from(&player)))
}

/// `POST /players/{id}/rebuy`: Add to a player's rebuy.
///
/// # Errors
///
/// Returns [`TrackerError::NotFound`] for an unknown id, or a persistence
/// failure.
#[utoipa::path(
    post,
    path = "/api/v1/players/{id}/rebuy",
    tag = "Players",
    summary = "Record a rebuy",
    description = "Adds the amount to the player's cumulative rebuy. The amount is not sign-checked.",
    params(("id" = i64, Path, description = "Player id")),
    request_body = RebuyRequest,
    responses(
        (status = 200, description = "Updated player", body = PlayerDto),
        (status = 404, description = "Unknown player", body = ErrorResponse),
    )
)]
pub async fn rebuy(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(req): Json<RebuyRequest>,
) -> Result<impl IntoResponse, TrackerError> {
    let amount = parse_money(req.amount, "amount")?;
    let player = state
        .session_service
        .update_rebuy(id, amount)
        .await?
        .ok_or(TrackerError::NotFound {
            collection: Collection::Players,
            id,
        })?;
    Ok(Json(PlayerDto::from(&player)))
}

/// `POST /players/{id}/checkout`: Cash a player out.
///
/// # Errors
///
/// Returns [`TrackerError::NotFound`] for an unknown id, or a persistence
/// failure.
#[utoipa::path(
    post,
    path = "/api/v1/players/{id}/checkout",
    tag = "Players",
    summary = "Check a player out",
    description = "Records the cash-out, marks the player finished and frees their seat. The record moves to the history.",
    params(("id" = i64, Path, description = "Player id")),
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Finished player", body = PlayerDto),
        (status = 404, description = "Unknown player", body = ErrorResponse),
    )
)]
pub async fn checkout(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(req): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, TrackerError> {
    let cash_out = parse_money(req.cash_out, "cash_out")?;
    let player = state
        .session_service
        .checkout_player(id, cash_out)
        .await?
        .ok_or(TrackerError::NotFound {
            collection: Collection::Players,
            id,
        })?;
    Ok(Json(PlayerDto::from(&player)))
}

/// `DELETE /players/{id}?confirm=true`: Cancel a buy-in.
///
/// # Errors
///
/// Returns [`TrackerError::ConfirmationRequired`] without `confirm=true`,
/// [`TrackerError::NotFound`] for an unknown id, or
/// [`TrackerError::InvalidRequest`] for a finished player.
#[utoipa::path(
    delete,
    path = "/api/v1/players/{id}",
    tag = "Players",
    summary = "Cancel an entry",
    description = "Deletes a playing player's record and seat, as if they never bought in.",
    params(("id" = i64, Path, description = "Player id"), ConfirmQuery),
    responses(
        (status = 200, description = "Removed player", body = PlayerDto),
        (status = 404, description = "Unknown player", body = ErrorResponse),
        (status = 428, description = "Confirmation missing", body = ErrorResponse),
    )
)]
pub async fn cancel_entry(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Query(confirm): Query<ConfirmQuery>,
) -> Result<impl IntoResponse, TrackerError> {
    confirm.require("cancelling an entry")?;
    let player = state.session_service.cancel_entry(id).await?;
    Ok(Json(PlayerDto::from(&player)))
}

/// `GET /history`: List checked-out players.
#[utoipa::path(
    get,
    path = "/api/v1/history",
    tag = "History",
    summary = "List the history",
    responses(
        (status = 200, description = "Finished players, latest checkout first", body = PlayerListResponse),
    )
)]
pub async fn list_history(State(state): State<AppState>) -> impl IntoResponse {
    let data = state
        .session_service
        .history()
        .await
        .iter()
        .map(PlayerDto::from)
        .collect();
    Json(PlayerListResponse { data })
}

/// `DELETE /history/{id}?confirm=true`: Delete one history entry.
///
/// # Errors
///
/// Returns [`TrackerError::ConfirmationRequired`] without `confirm=true`,
/// or [`TrackerError::NotFound`] unless `id` is a finished player.
#[utoipa::path(
    delete,
    path = "/api/v1/history/{id}",
    tag = "History",
    summary = "Delete a history entry",
    params(("id" = i64, Path, description = "Player id"), ConfirmQuery),
    responses(
        (status = 200, description = "Removed record", body = PlayerDto),
        (status = 404, description = "Not a finished player", body = ErrorResponse),
        (status = 428, description = "Confirmation missing", body = ErrorResponse),
    )
)]
pub async fn delete_history_item(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Query(confirm): Query<ConfirmQuery>,
) -> Result<impl IntoResponse, TrackerError> {
    confirm.require("deleting a history entry")?;
    let player = state.session_service.delete_history_item(id).await?;
    Ok(Json(PlayerDto::from(&player)))
}

/// `DELETE /history?confirm=true`: Delete every history entry.
///
/// # Errors
///
/// Returns [`TrackerError::ConfirmationRequired`] without `confirm=true`,
/// or a persistence failure.
#[utoipa::path(
    delete,
    path = "/api/v1/history",
    tag = "History",
    summary = "Clear the history",
    description = "Deletes every finished player. Playing players are untouched.",
    params(ConfirmQuery),
    responses(
        (status = 200, description = "Number of records removed", body = RemovedResponse),
        (status = 428, description = "Confirmation missing", body = ErrorResponse),
    )
)]
pub async fn clear_history(
    State(state): State<AppState>,
    Query(confirm): Query<ConfirmQuery>,
) -> Result<impl IntoResponse, TrackerError> {
    confirm.require("clearing the history")?;
    let removed = state.session_service.clear_history().await?;
    Ok(Json(RemovedResponse { removed }))
}

/// Player and history routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/players", post(create_player).get(list_players))
        .route("/players/{id}", get(get_player).delete(cancel_entry))
        .route("/players/{id}/rebuy", post(rebuy))
        .route("/players/{id}/checkout", post(checkout))
        .route("/history", get(list_history).delete(clear_history))
        .route("/history/{id}", delete(delete_history_item))
}
