//! Session participants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{EntityId, Money};

/// Lifecycle of a player inside the live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    /// Bought in and still at the table.
    Playing,
    /// Checked out; the record is now part of the history.
    Finished,
}

impl PlayerStatus {
    /// Returns the status as stored in the `player.status` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Playing => "playing",
            Self::Finished => "finished",
        }
    }

    /// Parses a stored status string.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "playing" => Some(Self::Playing),
            "finished" => Some(Self::Finished),
            _ => None,
        }
    }
}

/// A participant in the current session.
///
/// `cash_out` is zero and `end_time` is `None` until checkout; a finished
/// player always has both set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Creation-time id.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Initial stake.
    pub buy_in: Money,
    /// Cumulative rebuys.
    #[serde(default)]
    pub rebuy: Money,
    /// Amount withdrawn at checkout.
    #[serde(default)]
    pub cash_out: Money,
    /// When the player bought in.
    pub start_time: DateTime<Utc>,
    /// When the player checked out.
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// Lifecycle status.
    pub status: PlayerStatus,
    /// Photo reference (URL or data URI).
    #[serde(default)]
    pub photo: Option<String>,
    /// Dealer button marker.
    #[serde(default)]
    pub is_dealer: bool,
}

impl Player {
    /// Creates a freshly bought-in player.
    #[must_use]
    pub fn new(
        id: EntityId,
        name: String,
        buy_in: Money,
        photo: Option<String>,
        is_dealer: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            buy_in,
            rebuy: Money::ZERO,
            cash_out: Money::ZERO,
            start_time: now,
            end_time: None,
            status: PlayerStatus::Playing,
            photo,
            is_dealer,
        }
    }

    /// Buy-in plus rebuys.
    #[must_use]
    pub fn invested(&self) -> Money {
        self.buy_in + self.rebuy
    }

    /// Cash-out minus everything invested ("lucro").
    #[must_use]
    pub fn profit(&self) -> Money {
        self.cash_out - self.invested()
    }

    /// Returns `true` while the player is still at the table.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.status == PlayerStatus::Playing
    }

    /// Returns `true` once the player has checked out.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.status == PlayerStatus::Finished
    }

    /// Closes the player's participation.
    pub fn check_out(&mut self, cash_out: Money, now: DateTime<Utc>) {
        self.cash_out = cash_out;
        self.status = PlayerStatus::Finished;
        self.end_time = Some(now);
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn alice() -> Player {
        Player::new(
            EntityId::new(1),
            "Alice".to_string(),
            Money::from_reais(50),
            None,
            false,
            Utc::now(),
        )
    }

    #[test]
    fn new_player_is_playing_with_no_rebuy() {
        let p = alice();
        assert!(p.is_playing());
        assert_eq!(p.rebuy, Money::ZERO);
        assert_eq!(p.cash_out, Money::ZERO);
        assert!(p.end_time.is_none());
    }

    #[test]
    fn checkout_sets_finished_fields() {
        let mut p = alice();
        p.rebuy += Money::from_reais(30);
        p.check_out(Money::from_reais(70), Utc::now());
        assert!(p.is_finished());
        assert!(p.end_time.is_some());
        assert_eq!(p.invested(), Money::from_reais(80));
        assert_eq!(p.profit(), Money::from_reais(-10));
    }

    #[test]
    fn stored_json_uses_camel_case() {
        let json = serde_json::to_value(alice()).unwrap_or_default();
        assert_eq!(json["buyIn"], 50);
        assert_eq!(json["status"], "playing");
        assert_eq!(json["isDealer"], false);
    }

    #[test]
    fn status_round_trips_through_column_text() {
        for status in [PlayerStatus::Playing, PlayerStatus::Finished] {
            assert_eq!(PlayerStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(PlayerStatus::parse("busted"), None);
    }
}
