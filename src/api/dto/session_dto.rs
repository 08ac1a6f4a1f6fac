//! Session archive and table stats DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{EntityId, Money, SessionRecord, TableStats};

/// An archived session.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionDto {
    /// Session id.
    pub session_id: EntityId,
    /// When the session was closed.
    pub date: DateTime<Utc>,
    /// Total bought in and rebought.
    pub total_in: Money,
    /// Total cashed out.
    pub total_out: Money,
    /// `total_in - total_out`.
    pub balance: Money,
    /// Number of player records archived.
    pub player_count: u32,
}

impl From<&SessionRecord> for SessionDto {
    fn from(s: &SessionRecord) -> Self {
        Self {
            session_id: s.id,
            date: s.date,
            total_in: s.summary.total_in,
            total_out: s.summary.total_out,
            balance: s.summary.balance,
            player_count: s.summary.player_count,
        }
    }
}

/// List of archived sessions.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionListResponse {
    /// Sessions, newest first.
    pub data: Vec<SessionDto>,
}

/// Live table aggregates.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatsDto {
    /// Players still playing ("Jogando").
    pub active_count: u32,
    /// Players checked out ("Saíram").
    pub finished_count: u32,
    /// Occupied seats.
    pub seated_count: u32,
    /// Total invested by everyone ("Na Mesa").
    pub total_invested: Money,
    /// Total cashed out.
    pub total_cash_out: Money,
    /// Invested minus cash-out ("Balanço").
    pub balance: Money,
}

impl From<&TableStats> for StatsDto {
    fn from(s: &TableStats) -> Self {
        Self {
            active_count: s.active_count,
            finished_count: s.finished_count,
            seated_count: s.seated_count,
            total_invested: s.total_invested,
            total_cash_out: s.total_cash_out,
            balance: s.balance,
        }
    }
}
