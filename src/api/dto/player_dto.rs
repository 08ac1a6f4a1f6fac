//! Player and history DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Admission, EntityId, Money, Player, PlayerStatus, SeatNumber};

/// Request body for `POST /players`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePlayerRequest {
    /// Display name; surrounding whitespace is trimmed.
    pub name: String,
    /// Initial buy-in in reais; must not be negative.
    pub buy_in: f64,
    /// Optional photo reference.
    #[serde(default)]
    pub photo: Option<String>,
    /// Whether this player deals; clears the flag on everyone else.
    #[serde(default)]
    pub is_dealer: bool,
}

/// Request body for `POST /players/{id}/rebuy`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RebuyRequest {
    /// Amount added to the cumulative rebuy, in reais.
    pub amount: f64,
}

/// Request body for `POST /players/{id}/checkout`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    /// Chips cashed out, in reais.
    pub cash_out: f64,
}

/// A player record with derived totals.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlayerDto {
    /// Player id.
    pub player_id: EntityId,
    /// Display name.
    pub name: String,
    /// Initial buy-in.
    pub buy_in: Money,
    /// Cumulative rebuy.
    pub rebuy: Money,
    /// Cash-out; zero while playing.
    pub cash_out: Money,
    /// Buy-in plus rebuy.
    pub invested: Money,
    /// Cash-out minus invested ("lucro").
    pub profit: Money,
    /// `playing` or `finished`.
    pub status: String,
    /// Buy-in time.
    pub start_time: DateTime<Utc>,
    /// Checkout time.
    pub end_time: Option<DateTime<Utc>>,
    /// Photo reference.
    pub photo: Option<String>,
    /// Dealer marker.
    pub is_dealer: bool,
}

impl From<&Player> for PlayerDto {
    fn from(p: &Player) -> Self {
        Self {
            player_id: p.id,
            name: p.name.clone(),
            buy_in: p.buy_in,
            rebuy: p.rebuy,
            cash_out: p.cash_out,
            invested: p.invested(),
            profit: p.profit(),
            status: p.status.as_str().to_string(),
            start_time: p.start_time,
            end_time: p.end_time,
            photo: p.photo.clone(),
            is_dealer: p.is_dealer,
        }
    }
}

impl PlayerDto {
    /// Whether the player is still at the table.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.status == PlayerStatus::Playing.as_str()
    }
}

/// Response body for `POST /players`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdmissionResponse {
    /// Created player.
    pub player: PlayerDto,
    /// Assigned seat; absent when the table was full.
    pub seat: Option<SeatNumber>,
    /// `true` when no seat was free.
    pub table_full: bool,
}

impl From<&Admission> for AdmissionResponse {
    fn from(a: &Admission) -> Self {
        Self {
            player: PlayerDto::from(&a.player),
            seat: a.seat,
            table_full: a.seat.is_none(),
        }
    }
}

/// List of player records.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlayerListResponse {
    /// Players, newest first (history: latest checkout first).
    pub data: Vec<PlayerDto>,
}
