//! Database row models and their mapping to domain records.
//!
//! Money columns hold centavos (`BIGINT`); seats are `SMALLINT` in `1..=12`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    EntityId, Money, Notification, Player, PlayerStatus, ScheduleEntry, SeatAssignment,
    SeatNumber, SessionRecord, SessionSummary, Severity, Visitor,
};
use crate::error::TrackerError;

/// Login credentials.
///
/// Passwords are stored and compared as plaintext; the lookup is an exact
/// match on both columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AppUser {
    /// Unique login name.
    pub username: String,
    /// Plaintext password.
    pub password: String,
    /// Whether the user may move every seat.
    #[serde(default)]
    pub is_admin: bool,
}

/// A row of the `player` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlayerRow {
    /// Primary key.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Buy-in in centavos.
    pub buy_in: i64,
    /// Cumulative rebuy in centavos.
    pub rebuy: i64,
    /// Cash-out in centavos.
    pub cash_out: i64,
    /// Buy-in time.
    pub start_time: DateTime<Utc>,
    /// Checkout time.
    pub end_time: Option<DateTime<Utc>>,
    /// `playing` or `finished`.
    pub status: String,
    /// Photo reference.
    pub photo: Option<String>,
    /// Dealer marker.
    pub is_dealer: bool,
}

impl From<&Player> for PlayerRow {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id.get(),
            name: p.name.clone(),
            buy_in: p.buy_in.cents(),
            rebuy: p.rebuy.cents(),
            cash_out: p.cash_out.cents(),
            start_time: p.start_time,
            end_time: p.end_time,
            status: p.status.as_str().to_string(),
            photo: p.photo.clone(),
            is_dealer: p.is_dealer,
        }
    }
}

impl TryFrom<PlayerRow> for Player {
    type Error = TrackerError;

    fn try_from(row: PlayerRow) -> Result<Self, Self::Error> {
        let status = PlayerStatus::parse(&row.status).ok_or_else(|| {
            TrackerError::PersistenceError(format!(
                "player {} has unknown status {:?}",
                row.id, row.status
            ))
        })?;
        Ok(Self {
            id: EntityId::new(row.id),
            name: row.name,
            buy_in: Money::from_cents(row.buy_in),
            rebuy: Money::from_cents(row.rebuy),
            cash_out: Money::from_cents(row.cash_out),
            start_time: row.start_time,
            end_time: row.end_time,
            status,
            photo: row.photo,
            is_dealer: row.is_dealer,
        })
    }
}

/// A row of the `confirmed_player` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SeatRow {
    /// Primary key, equal to the seated player's id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Photo reference.
    pub photo: Option<String>,
    /// Seat number.
    pub seat: i16,
    /// Dealer marker.
    pub is_dealer: bool,
}

impl From<&SeatAssignment> for SeatRow {
    fn from(s: &SeatAssignment) -> Self {
        Self {
            id: s.id.get(),
            name: s.name.clone(),
            photo: s.photo.clone(),
            seat: i16::from(s.seat.get()),
            is_dealer: s.is_dealer,
        }
    }
}

impl TryFrom<SeatRow> for SeatAssignment {
    type Error = TrackerError;

    fn try_from(row: SeatRow) -> Result<Self, Self::Error> {
        let seat = u8::try_from(row.seat)
            .ok()
            .and_then(|raw| SeatNumber::new(raw).ok())
            .ok_or_else(|| {
                TrackerError::PersistenceError(format!(
                    "seat row {} has invalid seat {}",
                    row.id, row.seat
                ))
            })?;
        Ok(Self {
            id: EntityId::new(row.id),
            name: row.name,
            photo: row.photo,
            seat,
            is_dealer: row.is_dealer,
        })
    }
}

/// A row of the `schedule_item` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScheduleRow {
    /// Primary key.
    pub id: i64,
    /// Title.
    pub title: String,
    /// Planned date.
    pub date: DateTime<Utc>,
}

impl From<&ScheduleEntry> for ScheduleRow {
    fn from(s: &ScheduleEntry) -> Self {
        Self {
            id: s.id.get(),
            title: s.title.clone(),
            date: s.date,
        }
    }
}

impl From<ScheduleRow> for ScheduleEntry {
    fn from(row: ScheduleRow) -> Self {
        Self {
            id: EntityId::new(row.id),
            title: row.title,
            date: row.date,
        }
    }
}

/// A row of the `session_record` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionRow {
    /// Primary key.
    pub id: i64,
    /// Close time.
    pub date: DateTime<Utc>,
    /// Total invested in centavos.
    pub total_in: i64,
    /// Total cashed out in centavos.
    pub total_out: i64,
    /// Balance in centavos.
    pub balance: i64,
    /// Number of player records.
    pub player_count: i32,
}

impl From<&SessionRecord> for SessionRow {
    fn from(s: &SessionRecord) -> Self {
        Self {
            id: s.id.get(),
            date: s.date,
            total_in: s.summary.total_in.cents(),
            total_out: s.summary.total_out.cents(),
            balance: s.summary.balance.cents(),
            player_count: i32::try_from(s.summary.player_count).unwrap_or(i32::MAX),
        }
    }
}

impl From<SessionRow> for SessionRecord {
    fn from(row: SessionRow) -> Self {
        Self {
            id: EntityId::new(row.id),
            date: row.date,
            summary: SessionSummary {
                total_in: Money::from_cents(row.total_in),
                total_out: Money::from_cents(row.total_out),
                balance: Money::from_cents(row.balance),
                player_count: u32::try_from(row.player_count).unwrap_or(0),
            },
        }
    }
}

/// A row of the `notification` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NotificationRow {
    /// Primary key.
    pub id: i64,
    /// Message text.
    pub message: String,
    /// Severity column (`info`, `success`, `alert`).
    pub kind: String,
    /// Read flag.
    pub read: bool,
    /// Creation time.
    pub date: DateTime<Utc>,
}

impl From<&Notification> for NotificationRow {
    fn from(n: &Notification) -> Self {
        Self {
            id: n.id.get(),
            message: n.message.clone(),
            kind: n.severity.as_str().to_string(),
            read: n.read,
            date: n.date,
        }
    }
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Self {
            id: EntityId::new(row.id),
            message: row.message,
            severity: Severity::parse_lossy(&row.kind),
            read: row.read,
            date: row.date,
        }
    }
}

/// A row of the `visitor` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VisitorRow {
    /// Primary key.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Arrival time.
    pub since: DateTime<Utc>,
}

impl From<&Visitor> for VisitorRow {
    fn from(v: &Visitor) -> Self {
        Self {
            id: v.id.get(),
            name: v.name.clone(),
            since: v.since,
        }
    }
}

impl From<VisitorRow> for Visitor {
    fn from(row: VisitorRow) -> Self {
        Self {
            id: EntityId::new(row.id),
            name: row.name,
            since: row.since,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn player_row_round_trip_keeps_cents() {
        let mut player = Player::new(
            EntityId::new(3),
            "Ana".to_string(),
            Money::from_cents(5050),
            None,
            true,
            Utc::now(),
        );
        player.check_out(Money::from_reais(80), Utc::now());
        let row = PlayerRow::from(&player);
        assert_eq!(row.buy_in, 5050);
        assert_eq!(row.status, "finished");
        let Ok(back) = Player::try_from(row) else {
            panic!("row should decode");
        };
        assert_eq!(back, player);
    }

    #[test]
    fn seat_row_rejects_out_of_range_seat() {
        let row = SeatRow {
            id: 1,
            name: "x".to_string(),
            photo: None,
            seat: 13,
            is_dealer: false,
        };
        assert!(SeatAssignment::try_from(row).is_err());
    }

    #[test]
    fn unknown_status_is_a_persistence_error() {
        let row = PlayerRow {
            id: 1,
            name: "x".to_string(),
            buy_in: 0,
            rebuy: 0,
            cash_out: 0,
            start_time: Utc::now(),
            end_time: None,
            status: "sleeping".to_string(),
            photo: None,
            is_dealer: false,
        };
        assert!(matches!(
            Player::try_from(row),
            Err(TrackerError::PersistenceError(_))
        ));
    }
}
