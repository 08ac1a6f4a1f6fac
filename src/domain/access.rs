//! Advisory capability checks for seat moves.
//!
//! These checks run where the client gesture is interpreted (the seat-click
//! protocol) and only decide whether a gesture is turned into a call. They
//! are not a security boundary: the REST endpoints do not consult them, so
//! any client can still move any seat directly.

use std::fmt;

use super::SeatAssignment;

/// The user behind a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Login name.
    pub username: String,
    /// Administrators may move every seat.
    pub is_admin: bool,
}

impl Actor {
    /// Returns `true` when the seat belongs to this user, matching the
    /// seated name against the username case-insensitively.
    #[must_use]
    pub fn owns(&self, seat: &SeatAssignment) -> bool {
        seat.name.trim().eq_ignore_ascii_case(self.username.trim())
    }
}

/// Decides whether an actor may move a seated player.
pub trait AccessPolicy: Send + Sync + fmt::Debug {
    /// Returns `true` when `actor` may select or move `target`.
    fn can_move(&self, actor: Option<&Actor>, target: &SeatAssignment) -> bool;
}

/// Everyone may move everything, anonymous clients included.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAccess;

impl AccessPolicy for OpenAccess {
    fn can_move(&self, _actor: Option<&Actor>, _target: &SeatAssignment) -> bool {
        true
    }
}

/// Users may move their own seat; administrators may move any seat.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnerOrAdmin;

impl AccessPolicy for OwnerOrAdmin {
    fn can_move(&self, actor: Option<&Actor>, target: &SeatAssignment) -> bool {
        actor.is_some_and(|actor| actor.is_admin || actor.owns(target))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{EntityId, SeatNumber};

    fn seat_of(name: &str) -> SeatAssignment {
        let Ok(seat) = SeatNumber::new(3) else {
            panic!("valid seat");
        };
        SeatAssignment {
            id: EntityId::new(1),
            name: name.to_string(),
            photo: None,
            seat,
            is_dealer: false,
        }
    }

    fn actor(name: &str, is_admin: bool) -> Actor {
        Actor {
            username: name.to_string(),
            is_admin,
        }
    }

    #[test]
    fn owner_or_admin_rules() {
        let policy = OwnerOrAdmin;
        let target = seat_of("Alice");
        assert!(policy.can_move(Some(&actor("alice", false)), &target));
        assert!(policy.can_move(Some(&actor("root", true)), &target));
        assert!(!policy.can_move(Some(&actor("bob", false)), &target));
        assert!(!policy.can_move(None, &target));
    }

    #[test]
    fn open_access_allows_anonymous() {
        assert!(OpenAccess.can_move(None, &seat_of("Alice")));
    }
}
