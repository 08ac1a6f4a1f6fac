//! Upcoming games.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::EntityId;

/// A planned game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScheduleEntry {
    /// Creation-time id.
    pub id: EntityId,
    /// Free-form title shown in the "next game" banner.
    pub title: String,
    /// When the game is planned.
    pub date: DateTime<Utc>,
}

impl ScheduleEntry {
    /// Returns `true` when the entry is dated within one day of `now`,
    /// in either direction.
    ///
    /// Finishing a session drops these entries: the game they announced is
    /// assumed to be the one that just ended.
    #[must_use]
    pub fn is_within_a_day_of(&self, now: DateTime<Utc>) -> bool {
        (now - self.date).abs() <= Duration::days(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_at(date: DateTime<Utc>) -> ScheduleEntry {
        ScheduleEntry {
            id: EntityId::new(1),
            title: "Sexta".to_string(),
            date,
        }
    }

    #[test]
    fn window_covers_both_sides() {
        let now = Utc::now();
        assert!(entry_at(now - Duration::hours(23)).is_within_a_day_of(now));
        assert!(entry_at(now + Duration::hours(23)).is_within_a_day_of(now));
        assert!(!entry_at(now + Duration::hours(25)).is_within_a_day_of(now));
        assert!(!entry_at(now - Duration::days(3)).is_within_a_day_of(now));
    }
}
