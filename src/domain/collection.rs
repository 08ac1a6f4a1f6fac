//! Names of the persisted collections.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One independently stored collection of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// Player records, playing and finished.
    Players,
    /// Seat assignments ("confirmed players").
    Seats,
    /// Upcoming games.
    Schedule,
    /// Archived session summaries.
    Sessions,
    /// Notification log.
    Notifications,
    /// Spectators.
    Visitors,
}

impl Collection {
    /// Every collection, in load order.
    pub const ALL: [Self; 6] = [
        Self::Players,
        Self::Seats,
        Self::Schedule,
        Self::Sessions,
        Self::Notifications,
        Self::Visitors,
    ];

    /// Key stem used by the local key/value store. The store appends its
    /// version suffix (`pokerData` becomes `pokerData_v33`).
    #[must_use]
    pub const fn storage_key(self) -> &'static str {
        match self {
            Self::Players => "pokerData",
            Self::Seats => "pokerConfirmed",
            Self::Schedule => "pokerSchedule",
            Self::Sessions => "pokerSessions",
            Self::Notifications => "pokerNotifs",
            Self::Visitors => "pokerVisitors",
        }
    }

    /// Table backing the collection in PostgreSQL.
    #[must_use]
    pub const fn table_name(self) -> &'static str {
        match self {
            Self::Players => "player",
            Self::Seats => "confirmed_player",
            Self::Schedule => "schedule_item",
            Self::Sessions => "session_record",
            Self::Notifications => "notification",
            Self::Visitors => "visitor",
        }
    }

    /// Maps a PostgreSQL table name back to its collection.
    #[must_use]
    pub fn from_table_name(table: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.table_name() == table)
    }

    /// Parses the snake_case wire name (`"players"`, `"seats"`, ...).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == raw)
    }

    /// Snake_case wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Players => "players",
            Self::Seats => "seats",
            Self::Schedule => "schedule",
            Self::Sessions => "sessions",
            Self::Notifications => "notifications",
            Self::Visitors => "visitors",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_map_back() {
        for c in Collection::ALL {
            assert_eq!(Collection::from_table_name(c.table_name()), Some(c));
            assert_eq!(Collection::parse(c.as_str()), Some(c));
        }
        assert_eq!(Collection::from_table_name("app_user"), None);
    }

    #[test]
    fn wire_name_matches_serde() {
        let json = serde_json::to_string(&Collection::Seats).unwrap_or_default();
        assert_eq!(json, "\"seats\"");
    }
}
