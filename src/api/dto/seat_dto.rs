//! Seat DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{EntityId, SeatAssignment, SeatNumber};

/// A seated player.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SeatDto {
    /// Seated player's id.
    pub player_id: EntityId,
    /// Display name.
    pub name: String,
    /// Photo reference.
    pub photo: Option<String>,
    /// Seat number, 1 to 12.
    pub seat: SeatNumber,
    /// Dealer marker.
    pub is_dealer: bool,
}

impl From<&SeatAssignment> for SeatDto {
    fn from(s: &SeatAssignment) -> Self {
        Self {
            player_id: s.id,
            name: s.name.clone(),
            photo: s.photo.clone(),
            seat: s.seat,
            is_dealer: s.is_dealer,
        }
    }
}

/// Request body for `PUT /seats/{player_id}`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MoveSeatRequest {
    /// Destination seat, 1 to 12.
    pub seat: u8,
}

/// Request body for `POST /seats/swap`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SwapSeatsRequest {
    /// First seated player.
    pub player_a: EntityId,
    /// Second seated player.
    pub player_b: EntityId,
}

/// Response body for `POST /seats/swap`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SwapSeatsResponse {
    /// First player's new seat.
    pub player_a: SeatDto,
    /// Second player's new seat.
    pub player_b: SeatDto,
}

/// The table layout.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SeatListResponse {
    /// Seated players ordered by seat.
    pub data: Vec<SeatDto>,
    /// Unoccupied seat numbers, ascending.
    pub free_seats: Vec<SeatNumber>,
}
