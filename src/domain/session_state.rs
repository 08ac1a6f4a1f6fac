//! In-memory session state and its transitions.
//!
//! [`SessionState`] owns the live collections (players, seats, schedule,
//! archived sessions, visitors). Every operation mutates the collections
//! synchronously and returns a [`Transition`] listing the row writes the
//! persistence layer must replay, in order, plus the notice to show the
//! user. No I/O happens here.
//!
//! Ids and timestamps are passed in by the caller so transitions are
//! deterministic under test.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{
    ChangeKind, Collection, EntityId, Money, Notice, Player, ScheduleEntry, SeatAssignment,
    SeatNumber, SessionRecord, SessionSummary, TableStats, Visitor,
};
use crate::error::TrackerError;

/// A single persistence write implied by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum RowWrite {
    /// Insert or replace a row.
    Put {
        /// Target collection.
        collection: Collection,
        /// Row id.
        id: EntityId,
        /// Whether the row is new.
        change: ChangeKind,
        /// Serialized row.
        row: serde_json::Value,
    },
    /// Delete a row.
    Delete {
        /// Target collection.
        collection: Collection,
        /// Row id.
        id: EntityId,
    },
    /// Delete every row of a collection.
    Clear {
        /// Target collection.
        collection: Collection,
    },
}

impl RowWrite {
    fn insert<T: Serialize>(
        collection: Collection,
        id: EntityId,
        row: &T,
    ) -> Result<Self, TrackerError> {
        Self::put(collection, id, ChangeKind::Insert, row)
    }

    fn update<T: Serialize>(
        collection: Collection,
        id: EntityId,
        row: &T,
    ) -> Result<Self, TrackerError> {
        Self::put(collection, id, ChangeKind::Update, row)
    }

    fn put<T: Serialize>(
        collection: Collection,
        id: EntityId,
        change: ChangeKind,
        row: &T,
    ) -> Result<Self, TrackerError> {
        let row = serde_json::to_value(row)
            .map_err(|e| TrackerError::Internal(format!("cannot encode {collection} row: {e}")))?;
        Ok(Self::Put {
            collection,
            id,
            change,
            row,
        })
    }

    /// Collection touched by the write.
    #[must_use]
    pub const fn collection(&self) -> Collection {
        match self {
            Self::Put { collection, .. }
            | Self::Delete { collection, .. }
            | Self::Clear { collection } => *collection,
        }
    }
}

/// Result of a state operation: a value for the caller, the writes to
/// persist and an optional user-facing notice.
#[derive(Debug, Clone)]
pub struct Transition<T> {
    /// Operation result.
    pub value: T,
    /// Writes in the order they must be issued.
    pub writes: Vec<RowWrite>,
    /// Notice to log and toast once the writes succeed.
    pub notice: Option<Notice>,
}

impl<T> Transition<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            writes: Vec::new(),
            notice: None,
        }
    }

    fn with_notice(mut self, notice: Notice) -> Self {
        self.notice = Some(notice);
        self
    }

    /// Returns `true` when nothing needs to be persisted.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.writes.is_empty()
    }
}

/// Input of [`SessionState::add_player`].
#[derive(Debug, Clone)]
pub struct NewPlayer {
    /// Display name; surrounding whitespace is trimmed.
    pub name: String,
    /// Initial stake; must not be negative.
    pub buy_in: Money,
    /// Photo reference.
    pub photo: Option<String>,
    /// Whether the player takes the dealer button.
    pub is_dealer: bool,
}

/// Player created by [`SessionState::add_player`] and where it sat down.
#[derive(Debug, Clone, PartialEq)]
pub struct Admission {
    /// The created record.
    pub player: Player,
    /// Auto-assigned seat, `None` when the table was full.
    pub seat: Option<SeatNumber>,
}

/// Live collections of a session.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    players: Vec<Player>,
    seats: Vec<SeatAssignment>,
    schedule: Vec<ScheduleEntry>,
    sessions: Vec<SessionRecord>,
    visitors: Vec<Visitor>,
}

impl SessionState {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// All player records, newest first.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Players still at the table.
    pub fn active_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_playing())
    }

    /// Checked-out players, most recent checkout first.
    #[must_use]
    pub fn history(&self) -> Vec<Player> {
        let mut finished: Vec<Player> =
            self.players.iter().filter(|p| p.is_finished()).cloned().collect();
        finished.sort_by(|a, b| b.end_time.cmp(&a.end_time));
        finished
    }

    /// Looks up a player by id.
    #[must_use]
    pub fn player(&self, id: EntityId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Occupied seats.
    #[must_use]
    pub fn seats(&self) -> &[SeatAssignment] {
        &self.seats
    }

    /// Seat held by the given player.
    #[must_use]
    pub fn seat_of(&self, id: EntityId) -> Option<SeatNumber> {
        self.seats.iter().find(|s| s.id == id).map(|s| s.seat)
    }

    /// Assignment occupying the given seat.
    #[must_use]
    pub fn occupant(&self, seat: SeatNumber) -> Option<&SeatAssignment> {
        self.seats.iter().find(|s| s.seat == seat)
    }

    /// Lowest-numbered unoccupied seat.
    #[must_use]
    pub fn first_free_seat(&self) -> Option<SeatNumber> {
        SeatNumber::all().find(|seat| self.occupant(*seat).is_none())
    }

    /// Upcoming games in insertion order.
    #[must_use]
    pub fn schedule(&self) -> &[ScheduleEntry] {
        &self.schedule
    }

    /// Archived sessions, newest first.
    #[must_use]
    pub fn sessions(&self) -> &[SessionRecord] {
        &self.sessions
    }

    /// Spectators.
    #[must_use]
    pub fn visitors(&self) -> &[Visitor] {
        &self.visitors
    }

    /// Dashboard numbers.
    #[must_use]
    pub fn stats(&self) -> TableStats {
        TableStats::compute(&self.players, self.seats.len())
    }

    /// Largest id held by any collection, used to seed the id generator.
    #[must_use]
    pub fn max_id(&self) -> Option<EntityId> {
        let players = self.players.iter().map(|p| p.id);
        let seats = self.seats.iter().map(|s| s.id);
        let schedule = self.schedule.iter().map(|s| s.id);
        let sessions = self.sessions.iter().map(|s| s.id);
        let visitors = self.visitors.iter().map(|v| v.id);
        players
            .chain(seats)
            .chain(schedule)
            .chain(sessions)
            .chain(visitors)
            .max()
    }

    // ── Players ─────────────────────────────────────────────────────────

    /// Buys a new player in and seats them at the lowest free seat.
    ///
    /// A dealer clears the flag on every other player and seat first. When
    /// all twelve seats are taken the player is still created, unseated.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidRequest`] for a blank name or a
    /// negative buy-in.
    pub fn add_player(
        &mut self,
        id: EntityId,
        new: NewPlayer,
        now: DateTime<Utc>,
    ) -> Result<Transition<Admission>, TrackerError> {
        let name = new.name.trim().to_string();
        if name.is_empty() {
            return Err(TrackerError::InvalidRequest("name is required".to_string()));
        }
        if new.buy_in.is_negative() {
            return Err(TrackerError::InvalidRequest(
                "buy-in must not be negative".to_string(),
            ));
        }

        let mut writes = Vec::new();
        if new.is_dealer {
            writes.extend(self.clear_dealer()?);
        }

        let player = Player::new(id, name, new.buy_in, new.photo, new.is_dealer, now);
        writes.push(RowWrite::insert(Collection::Players, id, &player)?);
        self.players.insert(0, player.clone());

        let seat = self.first_free_seat();
        let notice = match seat {
            Some(seat) => {
                let assignment = SeatAssignment::for_player(&player, seat);
                writes.push(RowWrite::insert(Collection::Seats, id, &assignment)?);
                self.seats.push(assignment);
                Notice::success(format!("{} entrou na mesa (Cadeira {seat})", player.name))
            }
            None => Notice::alert(format!("{} entrou (Mesa cheia)", player.name)),
        };

        Ok(Transition {
            value: Admission { player, seat },
            writes,
            notice: Some(notice),
        })
    }

    fn clear_dealer(&mut self) -> Result<Vec<RowWrite>, TrackerError> {
        let mut writes = Vec::new();
        for player in self.players.iter_mut().filter(|p| p.is_dealer) {
            player.is_dealer = false;
            writes.push(RowWrite::update(Collection::Players, player.id, &*player)?);
        }
        for seat in self.seats.iter_mut().filter(|s| s.is_dealer) {
            seat.is_dealer = false;
            writes.push(RowWrite::update(Collection::Seats, seat.id, &*seat)?);
        }
        Ok(writes)
    }

    /// Adds `amount` to a player's cumulative rebuy.
    ///
    /// The amount is not sign-checked. Unknown ids are a silent no-op.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Internal`] if the updated row cannot be
    /// encoded.
    pub fn update_rebuy(
        &mut self,
        id: EntityId,
        amount: Money,
    ) -> Result<Transition<Option<Player>>, TrackerError> {
        let Some(player) = self.players.iter_mut().find(|p| p.id == id) else {
            return Ok(Transition::new(None));
        };
        player.rebuy += amount;
        let updated = player.clone();
        let mut transition = Transition::new(Some(updated.clone())).with_notice(Notice::info(
            format!("{} fez rebuy de R$ {amount}", updated.name),
        ));
        transition
            .writes
            .push(RowWrite::update(Collection::Players, id, &updated)?);
        Ok(transition)
    }

    /// Records a player's cash-out and frees their seat.
    ///
    /// The player record stays as history. Unknown ids are a silent no-op.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Internal`] if the updated row cannot be
    /// encoded.
    pub fn checkout_player(
        &mut self,
        id: EntityId,
        cash_out: Money,
        now: DateTime<Utc>,
    ) -> Result<Transition<Option<Player>>, TrackerError> {
        let Some(player) = self.players.iter_mut().find(|p| p.id == id) else {
            return Ok(Transition::new(None));
        };
        player.check_out(cash_out, now);
        let updated = player.clone();

        let mut transition = Transition::new(Some(updated.clone())).with_notice(Notice::info(
            format!("{} saiu (Cashout: R$ {cash_out})", updated.name),
        ));
        transition
            .writes
            .push(RowWrite::update(Collection::Players, id, &updated)?);
        if self.take_seat(id).is_some() {
            transition.writes.push(RowWrite::Delete {
                collection: Collection::Seats,
                id,
            });
        }
        Ok(transition)
    }

    /// Cancels a buy-in that should not have happened: deletes a playing
    /// player and their seat.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NotFound`] for unknown ids and
    /// [`TrackerError::InvalidRequest`] when the player already checked out.
    pub fn cancel_entry(&mut self, id: EntityId) -> Result<Transition<Player>, TrackerError> {
        let player = self.player(id).ok_or(TrackerError::NotFound {
            collection: Collection::Players,
            id,
        })?;
        if player.is_finished() {
            return Err(TrackerError::InvalidRequest(format!(
                "player {id} already checked out; delete it from the history instead"
            )));
        }
        let removed = self.take_player(id).ok_or(TrackerError::NotFound {
            collection: Collection::Players,
            id,
        })?;

        let mut transition = Transition::new(removed);
        transition.writes.push(RowWrite::Delete {
            collection: Collection::Players,
            id,
        });
        if self.take_seat(id).is_some() {
            transition.writes.push(RowWrite::Delete {
                collection: Collection::Seats,
                id,
            });
        }
        Ok(transition)
    }

    /// Deletes one checked-out player record.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NotFound`] when no finished player has this
    /// id. Playing players are never touched.
    pub fn delete_history_item(&mut self, id: EntityId) -> Result<Transition<Player>, TrackerError> {
        let is_history = self.player(id).is_some_and(Player::is_finished);
        if !is_history {
            return Err(TrackerError::NotFound {
                collection: Collection::Players,
                id,
            });
        }
        let removed = self.take_player(id).ok_or(TrackerError::NotFound {
            collection: Collection::Players,
            id,
        })?;
        let mut transition = Transition::new(removed);
        transition.writes.push(RowWrite::Delete {
            collection: Collection::Players,
            id,
        });
        Ok(transition)
    }

    /// Deletes every checked-out player record, returning how many were
    /// removed.
    #[must_use]
    pub fn clear_history(&mut self) -> Transition<usize> {
        let (finished, playing): (Vec<Player>, Vec<Player>) =
            self.players.drain(..).partition(Player::is_finished);
        self.players = playing;
        let mut transition = Transition::new(finished.len());
        transition.writes = finished
            .iter()
            .map(|p| RowWrite::Delete {
                collection: Collection::Players,
                id: p.id,
            })
            .collect();
        transition
    }

    // ── Session ─────────────────────────────────────────────────────────

    /// Archives the live session and clears the table.
    ///
    /// The summary covers every player record. Schedule entries dated
    /// within one day of `now` are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NothingToSave`] when there are no players.
    pub fn finish_session(
        &mut self,
        id: EntityId,
        now: DateTime<Utc>,
    ) -> Result<Transition<SessionRecord>, TrackerError> {
        if self.players.is_empty() {
            return Err(TrackerError::NothingToSave);
        }

        let record = SessionRecord {
            id,
            date: now,
            summary: SessionSummary::from_players(&self.players),
        };
        let mut writes = vec![RowWrite::insert(Collection::Sessions, id, &record)?];
        self.sessions.insert(0, record.clone());

        self.players.clear();
        self.seats.clear();
        writes.push(RowWrite::Clear {
            collection: Collection::Players,
        });
        writes.push(RowWrite::Clear {
            collection: Collection::Seats,
        });

        let (dropped, kept): (Vec<ScheduleEntry>, Vec<ScheduleEntry>) = self
            .schedule
            .drain(..)
            .partition(|entry| entry.is_within_a_day_of(now));
        self.schedule = kept;
        writes.extend(dropped.iter().map(|entry| RowWrite::Delete {
            collection: Collection::Schedule,
            id: entry.id,
        }));

        Ok(Transition {
            value: record,
            writes,
            notice: Some(Notice::success("Sessão salva e finalizada!")),
        })
    }

    /// Deletes every archived session.
    #[must_use]
    pub fn clear_sessions(&mut self) -> Transition<usize> {
        let removed = self.sessions.len();
        self.sessions.clear();
        let mut transition = Transition::new(removed);
        transition.writes.push(RowWrite::Clear {
            collection: Collection::Sessions,
        });
        transition
    }

    // ── Seats ───────────────────────────────────────────────────────────

    /// Moves a player to `seat`.
    ///
    /// A playing player without a seat is seated. Moving onto one's own
    /// seat changes nothing.
    ///
    /// # Errors
    ///
    /// - [`TrackerError::SeatOccupied`] when another player holds `seat`.
    /// - [`TrackerError::NotFound`] when `id` is not a playing player.
    pub fn update_seat_position(
        &mut self,
        id: EntityId,
        seat: SeatNumber,
    ) -> Result<Transition<SeatAssignment>, TrackerError> {
        if let Some(occupant) = self.occupant(seat) {
            if occupant.id != id {
                return Err(TrackerError::SeatOccupied {
                    seat: seat.get(),
                    occupant: occupant.name.clone(),
                });
            }
            return Ok(Transition::new(occupant.clone()));
        }

        if let Some(assignment) = self.seats.iter_mut().find(|s| s.id == id) {
            assignment.seat = seat;
            let updated = assignment.clone();
            let mut transition = Transition::new(updated.clone());
            transition
                .writes
                .push(RowWrite::update(Collection::Seats, id, &updated)?);
            return Ok(transition);
        }

        let player = self
            .player(id)
            .filter(|p| p.is_playing())
            .ok_or(TrackerError::NotFound {
                collection: Collection::Players,
                id,
            })?;
        let assignment = SeatAssignment::for_player(player, seat);
        self.seats.push(assignment.clone());
        let mut transition = Transition::new(assignment.clone());
        transition
            .writes
            .push(RowWrite::insert(Collection::Seats, id, &assignment)?);
        Ok(transition)
    }

    /// Exchanges the seats of two seated players.
    ///
    /// Produces two independent writes, `a` first. Nothing makes them
    /// atomic: a concurrent writer can observe or cause a duplicate seat
    /// between them.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::SeatNotHeld`] when either player is not
    /// seated.
    pub fn swap_seats(
        &mut self,
        a: EntityId,
        b: EntityId,
    ) -> Result<Transition<(SeatAssignment, SeatAssignment)>, TrackerError> {
        let seat_a = self.seat_of(a).ok_or(TrackerError::SeatNotHeld(a))?;
        let seat_b = self.seat_of(b).ok_or(TrackerError::SeatNotHeld(b))?;

        let mut writes = Vec::with_capacity(2);
        let mut moved_a = None;
        let mut moved_b = None;
        for assignment in &mut self.seats {
            if assignment.id == a {
                assignment.seat = seat_b;
                moved_a = Some(assignment.clone());
            } else if assignment.id == b {
                assignment.seat = seat_a;
                moved_b = Some(assignment.clone());
            }
        }
        let (Some(moved_a), Some(moved_b)) = (moved_a, moved_b) else {
            // a == b: both lookups hit the same seat, nothing to exchange.
            let same = self
                .seats
                .iter()
                .find(|s| s.id == a)
                .cloned()
                .ok_or(TrackerError::SeatNotHeld(a))?;
            return Ok(Transition::new((same.clone(), same)));
        };
        writes.push(RowWrite::update(Collection::Seats, a, &moved_a)?);
        writes.push(RowWrite::update(Collection::Seats, b, &moved_b)?);

        Ok(Transition {
            value: (moved_a, moved_b),
            writes,
            notice: None,
        })
    }

    /// Removes a seat assignment only.
    ///
    /// The player record keeps its "playing" status and simply has no
    /// table position anymore.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::SeatNotHeld`] when the player has no seat.
    pub fn remove_visual_seat(
        &mut self,
        id: EntityId,
    ) -> Result<Transition<SeatAssignment>, TrackerError> {
        let removed = self.take_seat(id).ok_or(TrackerError::SeatNotHeld(id))?;
        let mut transition = Transition::new(removed);
        transition.writes.push(RowWrite::Delete {
            collection: Collection::Seats,
            id,
        });
        Ok(transition)
    }

    // ── Schedule ────────────────────────────────────────────────────────

    /// Plans a game. No conflict checks against other entries.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidRequest`] for a blank title.
    pub fn add_schedule(
        &mut self,
        id: EntityId,
        title: &str,
        date: DateTime<Utc>,
    ) -> Result<Transition<ScheduleEntry>, TrackerError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(TrackerError::InvalidRequest("title is required".to_string()));
        }
        let entry = ScheduleEntry {
            id,
            title: title.to_string(),
            date,
        };
        self.schedule.push(entry.clone());
        let mut transition = Transition::new(entry.clone())
            .with_notice(Notice::success(format!("Agendado: {}", entry.title)));
        transition
            .writes
            .push(RowWrite::insert(Collection::Schedule, id, &entry)?);
        Ok(transition)
    }

    /// Removes a planned game.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NotFound`] for unknown ids.
    pub fn delete_schedule(
        &mut self,
        id: EntityId,
    ) -> Result<Transition<ScheduleEntry>, TrackerError> {
        let pos = self
            .schedule
            .iter()
            .position(|s| s.id == id)
            .ok_or(TrackerError::NotFound {
                collection: Collection::Schedule,
                id,
            })?;
        let removed = self.schedule.remove(pos);
        let mut transition = Transition::new(removed);
        transition.writes.push(RowWrite::Delete {
            collection: Collection::Schedule,
            id,
        });
        Ok(transition)
    }

    // ── Visitors ────────────────────────────────────────────────────────

    /// Registers a spectator.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidRequest`] for a blank name.
    pub fn add_visitor(
        &mut self,
        id: EntityId,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<Transition<Visitor>, TrackerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TrackerError::InvalidRequest("name is required".to_string()));
        }
        let visitor = Visitor {
            id,
            name: name.to_string(),
            since: now,
        };
        self.visitors.push(visitor.clone());
        let mut transition = Transition::new(visitor.clone());
        transition
            .writes
            .push(RowWrite::insert(Collection::Visitors, id, &visitor)?);
        Ok(transition)
    }

    /// Removes a spectator.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NotFound`] for unknown ids.
    pub fn remove_visitor(&mut self, id: EntityId) -> Result<Transition<Visitor>, TrackerError> {
        let pos = self
            .visitors
            .iter()
            .position(|v| v.id == id)
            .ok_or(TrackerError::NotFound {
                collection: Collection::Visitors,
                id,
            })?;
        let removed = self.visitors.remove(pos);
        let mut transition = Transition::new(removed);
        transition.writes.push(RowWrite::Delete {
            collection: Collection::Visitors,
            id,
        });
        Ok(transition)
    }

    // ── Resync ──────────────────────────────────────────────────────────

    /// Replaces one collection wholesale with records reloaded from the
    /// store. Applying the same records twice yields the same state.
    ///
    /// Returns the number of records now held.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::PersistenceError`] when a record does not
    /// decode, and [`TrackerError::Internal`] for the notification log,
    /// which this state does not own.
    pub fn resync(
        &mut self,
        collection: Collection,
        records: Vec<serde_json::Value>,
    ) -> Result<usize, TrackerError> {
        match collection {
            Collection::Players => {
                let mut players: Vec<Player> = decode_all(collection, records)?;
                players.sort_by(|a, b| b.id.cmp(&a.id));
                self.players = players;
                Ok(self.players.len())
            }
            Collection::Seats => {
                let mut seats: Vec<SeatAssignment> = decode_all(collection, records)?;
                seats.sort_by_key(|s| s.seat);
                self.seats = seats;
                Ok(self.seats.len())
            }
            Collection::Schedule => {
                let mut schedule: Vec<ScheduleEntry> = decode_all(collection, records)?;
                schedule.sort_by_key(|s| s.id);
                self.schedule = schedule;
                Ok(self.schedule.len())
            }
            Collection::Sessions => {
                let mut sessions: Vec<SessionRecord> = decode_all(collection, records)?;
                sessions.sort_by(|a, b| b.id.cmp(&a.id));
                self.sessions = sessions;
                Ok(self.sessions.len())
            }
            Collection::Visitors => {
                let mut visitors: Vec<Visitor> = decode_all(collection, records)?;
                visitors.sort_by_key(|v| v.id);
                self.visitors = visitors;
                Ok(self.visitors.len())
            }
            Collection::Notifications => Err(TrackerError::Internal(
                "notification log is owned by the notifier".to_string(),
            )),
        }
    }

    fn take_player(&mut self, id: EntityId) -> Option<Player> {
        let pos = self.players.iter().position(|p| p.id == id)?;
        Some(self.players.remove(pos))
    }

    fn take_seat(&mut self, id: EntityId) -> Option<SeatAssignment> {
        let pos = self.seats.iter().position(|s| s.id == id)?;
        Some(self.seats.remove(pos))
    }
}

fn decode_all<T: serde::de::DeserializeOwned>(
    collection: Collection,
    records: Vec<serde_json::Value>,
) -> Result<Vec<T>, TrackerError> {
    records
        .into_iter()
        .map(|record| {
            serde_json::from_value(record).map_err(|e| {
                TrackerError::PersistenceError(format!("corrupt {collection} record: {e}"))
            })
        })
        .collect()
}
