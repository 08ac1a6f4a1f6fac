//! Numeric record identifiers.
//!
//! [`EntityId`] is a newtype over `i64` holding the millisecond wall-clock
//! timestamp at which a record was created. [`IdGenerator`] hands them out
//! and bumps colliding values so ids stay strictly increasing even when
//! several records are created within the same millisecond.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Opaque identifier shared by players, seats, schedule entries, sessions,
/// notifications and visitors.
///
/// A seat assignment reuses the id of the player occupying it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct EntityId(i64);

impl EntityId {
    /// Wraps a raw numeric id.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric id.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<i64> for EntityId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl From<EntityId> for i64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// How far ahead of the wall clock a loaded id may be (one day).
pub const MAX_CLOCK_LEAD_MS: i64 = 24 * 60 * 60 * 1_000;

/// Creation-time id source.
///
/// Shared by every collection so that ids are unique across the whole
/// state, not only within one collection.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    /// Creates a generator with no history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes sure future ids are greater than `seen`.
    ///
    /// Called after loading persisted records so restarts never reuse ids.
    /// Ids more than [`MAX_CLOCK_LEAD_MS`] ahead of the clock are ignored,
    /// so one corrupt row cannot pin the generator at `i64::MAX`. Returns
    /// whether `seen` was taken into account.
    pub fn observe(&self, seen: EntityId) -> bool {
        let horizon = Utc::now()
            .timestamp_millis()
            .saturating_add(MAX_CLOCK_LEAD_MS);
        if seen.get() > horizon {
            tracing::warn!(id = seen.get(), "ignoring implausible record id");
            return false;
        }
        self.last.fetch_max(seen.get(), Ordering::SeqCst);
        true
    }

    /// Returns the next id: the current millisecond, or one past the last
    /// issued id if the clock has not moved forward.
    pub fn next_id(&self) -> EntityId {
        let now = Utc::now().timestamp_millis();
        let mut current = self.last.load(Ordering::SeqCst);
        loop {
            let candidate = now.max(current.saturating_add(1));
            match self.last.compare_exchange(
                current,
                candidate,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return EntityId(candidate),
                Err(actual) => current = actual,
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_strictly_increasing() {
        let ids = IdGenerator::new();
        let a = ids.next_id();
        let b = ids.next_id();
        let c = ids.next_id();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn observe_skips_past_loaded_ids() {
        let ids = IdGenerator::new();
        let ahead = EntityId::new(Utc::now().timestamp_millis() + 60_000);
        assert!(ids.observe(ahead));
        assert!(ids.next_id() > ahead);
    }

    #[test]
    fn implausible_ids_do_not_exhaust_the_generator() {
        let ids = IdGenerator::new();
        assert!(!ids.observe(EntityId::new(i64::MAX)));
        let a = ids.next_id();
        let b = ids.next_id();
        assert!(a < b);
        assert!(b.get() < i64::MAX);
    }

    #[test]
    fn parses_from_path_segment() {
        let Ok(id) = "1700000000000".parse::<EntityId>() else {
            panic!("expected numeric id to parse");
        };
        assert_eq!(id.get(), 1_700_000_000_000);
        assert!("abc".parse::<EntityId>().is_err());
    }

    #[test]
    fn serializes_as_bare_number() {
        let json = serde_json::to_string(&EntityId::new(42)).unwrap_or_default();
        assert_eq!(json, "42");
    }
}
