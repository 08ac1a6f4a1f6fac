//! Table seats and seat assignments.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{EntityId, Player};
use crate::error::TrackerError;

/// Number of positions around the table.
pub const TABLE_SEATS: u8 = 12;

/// A validated seat position in `1..=12`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(try_from = "u8", into = "u8")]
#[schema(value_type = u8)]
pub struct SeatNumber(u8);

impl SeatNumber {
    /// Validates a raw seat number.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidRequest`] when `raw` is outside
    /// `1..=12`.
    pub fn new(raw: u8) -> Result<Self, TrackerError> {
        if (1..=TABLE_SEATS).contains(&raw) {
            Ok(Self(raw))
        } else {
            Err(TrackerError::InvalidRequest(format!(
                "seat must be between 1 and {TABLE_SEATS}, got {raw}"
            )))
        }
    }

    /// Returns the raw seat number.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Iterates every seat in increasing order.
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=TABLE_SEATS).map(Self)
    }
}

impl TryFrom<u8> for SeatNumber {
    type Error = TrackerError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<SeatNumber> for u8 {
    fn from(seat: SeatNumber) -> Self {
        seat.0
    }
}

impl fmt::Display for SeatNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A player occupying a table position ("confirmed player").
///
/// The id is the occupying player's id. Name, photo and dealer flag are
/// copied from the player at seating time so the table can be rendered
/// without joining against the player list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeatAssignment {
    /// Id of the seated player.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Photo reference.
    #[serde(default)]
    pub photo: Option<String>,
    /// Seat position.
    pub seat: SeatNumber,
    /// Dealer button marker.
    #[serde(default)]
    pub is_dealer: bool,
}

impl SeatAssignment {
    /// Seats `player` at `seat`.
    #[must_use]
    pub fn for_player(player: &Player, seat: SeatNumber) -> Self {
        Self {
            id: player.id,
            name: player.name.clone(),
            photo: player.photo.clone(),
            seat,
            is_dealer: player.is_dealer,
        }
    }
}
