//! Seat-click protocol.
//!
//! One [`SeatPicker`] lives per connected client and remembers which seated
//! player the client has selected. A click either selects, deselects, or
//! resolves into a swap or a move that the caller then performs through the
//! session service.

use super::{AccessPolicy, Actor, EntityId, SeatNumber, SessionState};

/// What a click resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeatAction {
    /// Empty seat clicked with nothing selected.
    Ignore,
    /// The player was selected.
    Select(EntityId),
    /// The selected player's own seat was clicked again.
    Deselect,
    /// Exchange the seats of the selected player and the clicked occupant.
    Swap {
        /// Originally selected player.
        selected: EntityId,
        /// Occupant of the clicked seat.
        other: EntityId,
    },
    /// Move the selected player to the clicked empty seat.
    Move {
        /// Originally selected player.
        selected: EntityId,
        /// Destination seat.
        seat: SeatNumber,
    },
    /// The access policy refused the gesture; the message is a warning for
    /// the acting client.
    Refused(String),
}

/// Per-client selection state: idle or holding a selected player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeatPicker {
    selected: Option<EntityId>,
}

impl SeatPicker {
    /// Creates an idle picker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently selected player.
    #[must_use]
    pub const fn selected(&self) -> Option<EntityId> {
        self.selected
    }

    /// Drops the selection.
    pub fn reset(&mut self) {
        self.selected = None;
    }

    /// Drops the selection if it points at `id` (used when that player's
    /// seat is removed).
    pub fn forget(&mut self, id: EntityId) {
        if self.selected == Some(id) {
            self.selected = None;
        }
    }

    /// Interprets a click on `seat`.
    ///
    /// A selection whose player is no longer seated is discarded and the
    /// click is handled as if nothing were selected.
    pub fn click(
        &mut self,
        seat: SeatNumber,
        state: &SessionState,
        actor: Option<&Actor>,
        policy: &dyn AccessPolicy,
    ) -> SeatAction {
        let occupant = state.occupant(seat);

        let selected = self
            .selected
            .and_then(|id| state.seats().iter().find(|s| s.id == id));
        let Some(selected) = selected else {
            self.selected = None;
            return match occupant {
                None => SeatAction::Ignore,
                Some(target) if !policy.can_move(actor, target) => SeatAction::Refused(format!(
                    "Você não pode mover {} (cadeira {seat})",
                    target.name
                )),
                Some(target) => {
                    self.selected = Some(target.id);
                    SeatAction::Select(target.id)
                }
            };
        };

        self.selected = None;
        if occupant.is_some_and(|o| o.id == selected.id) {
            return SeatAction::Deselect;
        }
        if !policy.can_move(actor, selected) {
            return SeatAction::Refused(format!(
                "Apenas {} ou um administrador pode mover esta cadeira",
                selected.name
            ));
        }
        match occupant {
            Some(other) => SeatAction::Swap {
                selected: selected.id,
                other: other.id,
            },
            None => SeatAction::Move {
                selected: selected.id,
                seat,
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Money, NewPlayer, OpenAccess, OwnerOrAdmin};
    use chrono::Utc;

    fn seat(n: u8) -> SeatNumber {
        let Ok(seat) = SeatNumber::new(n) else {
            panic!("invalid seat {n}");
        };
        seat
    }

    fn table(names: &[&str]) -> SessionState {
        let mut state = SessionState::new();
        for (i, name) in names.iter().enumerate() {
            let id = EntityId::new(i64::try_from(i).unwrap_or(0) + 1);
            let new = NewPlayer {
                name: (*name).to_string(),
                buy_in: Money::from_reais(50),
                photo: None,
                is_dealer: false,
            };
            let Ok(_) = state.add_player(id, new, Utc::now()) else {
                panic!("add failed");
            };
        }
        state
    }

    #[test]
    fn idle_click_on_empty_seat_is_ignored() {
        let state = table(&["A"]);
        let mut picker = SeatPicker::new();
        assert_eq!(picker.click(seat(5), &state, None, &OpenAccess), SeatAction::Ignore);
        assert_eq!(picker.selected(), None);
    }

    #[test]
    fn select_then_click_same_seat_deselects() {
        let state = table(&["A"]);
        let mut picker = SeatPicker::new();
        let a = EntityId::new(1);
        assert_eq!(picker.click(seat(1), &state, None, &OpenAccess), SeatAction::Select(a));
        assert_eq!(picker.selected(), Some(a));
        assert_eq!(picker.click(seat(1), &state, None, &OpenAccess), SeatAction::Deselect);
        assert_eq!(picker.selected(), None);
    }

    #[test]
    fn selected_then_occupied_seat_swaps() {
        let state = table(&["A", "B"]);
        let mut picker = SeatPicker::new();
        picker.click(seat(1), &state, None, &OpenAccess);
        let action = picker.click(seat(2), &state, None, &OpenAccess);
        assert_eq!(
            action,
            SeatAction::Swap {
                selected: EntityId::new(1),
                other: EntityId::new(2),
            }
        );
        assert_eq!(picker.selected(), None);
    }

    #[test]
    fn selected_then_empty_seat_moves() {
        let state = table(&["A"]);
        let mut picker = SeatPicker::new();
        picker.click(seat(1), &state, None, &OpenAccess);
        let action = picker.click(seat(8), &state, None, &OpenAccess);
        assert_eq!(
            action,
            SeatAction::Move {
                selected: EntityId::new(1),
                seat: seat(8),
            }
        );
    }

    #[test]
    fn access_policy_refuses_foreign_selection() {
        let state = table(&["Alice", "Bob"]);
        let bob = Actor {
            username: "bob".to_string(),
            is_admin: false,
        };
        let mut picker = SeatPicker::new();
        let action = picker.click(seat(1), &state, Some(&bob), &OwnerOrAdmin);
        assert!(matches!(action, SeatAction::Refused(_)));
        assert_eq!(picker.selected(), None);

        // Bob may pick his own seat and swap it with Alice's.
        assert_eq!(
            picker.click(seat(2), &state, Some(&bob), &OwnerOrAdmin),
            SeatAction::Select(EntityId::new(2))
        );
        assert!(matches!(
            picker.click(seat(1), &state, Some(&bob), &OwnerOrAdmin),
            SeatAction::Swap { .. }
        ));
    }

    #[test]
    fn stale_selection_is_discarded() {
        let mut state = table(&["A", "B"]);
        let mut picker = SeatPicker::new();
        picker.click(seat(1), &state, None, &OpenAccess);
        assert!(state.remove_visual_seat(EntityId::new(1)).is_ok());
        assert_eq!(
            picker.click(seat(2), &state, None, &OpenAccess),
            SeatAction::Select(EntityId::new(2))
        );
    }

    #[test]
    fn forget_clears_matching_selection_only() {
        let state = table(&["A"]);
        let mut picker = SeatPicker::new();
        picker.click(seat(1), &state, None, &OpenAccess);
        picker.forget(EntityId::new(9));
        assert_eq!(picker.selected(), Some(EntityId::new(1)));
        picker.forget(EntityId::new(1));
        assert_eq!(picker.selected(), None);
    }
}
