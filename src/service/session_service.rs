//! Session service: orchestrates state transitions, persistence writes,
//! change events and notifications.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};

use crate::domain::{
    AccessPolicy, Actor, Admission, ChangeKind, Collection, EntityId, EventBus, IdGenerator,
    Money, NewPlayer, Player, PresenceEntry, PresenceTracker, RowWrite, ScheduleEntry,
    SeatAction, SeatAssignment, SeatNumber, SeatPicker, SessionRecord, SessionState, TableEvent,
    TableStats, Transition, Visitor,
};
use crate::error::TrackerError;
use crate::notify::Notifier;
use crate::persistence::{self, AppUser, Store};

/// Orchestration layer for every session operation.
///
/// Every mutation follows the same pattern: take the operation lock →
/// snapshot and transition the state under its write lock → release it →
/// issue the transition's writes in order → publish change events →
/// notify. When a write fails the snapshot is restored and an alert is
/// emitted instead.
#[derive(Debug)]
pub struct SessionService {
    state: RwLock<SessionState>,
    /// Serializes mutations and reloads so a restored snapshot never
    /// discards another operation's changes or a resync.
    op_lock: Mutex<()>,
    store: Arc<dyn Store>,
    event_bus: EventBus,
    notifier: Arc<Notifier>,
    ids: Arc<IdGenerator>,
    presence: PresenceTracker,
    access: Arc<dyn AccessPolicy>,
    admin_usernames: Vec<String>,
}

impl SessionService {
    /// Creates a service over an empty state. Call [`Self::load_all`] to
    /// populate it from the store.
    #[must_use]
    pub fn new(
        store: Arc<dyn Store>,
        event_bus: EventBus,
        notifier: Arc<Notifier>,
        ids: Arc<IdGenerator>,
        access: Arc<dyn AccessPolicy>,
        admin_usernames: Vec<String>,
    ) -> Self {
        Self {
            state: RwLock::new(SessionState::new()),
            op_lock: Mutex::new(()),
            store,
            event_bus,
            notifier,
            ids,
            presence: PresenceTracker::new(),
            access,
            admin_usernames,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns a reference to the inner [`Notifier`].
    #[must_use]
    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    // ── Loading and resync ──────────────────────────────────────────────

    /// Loads every collection and the notifier state from the store.
    ///
    /// # Errors
    ///
    /// Returns the first load or decode failure.
    pub async fn load_all(&self) -> Result<(), TrackerError> {
        let _op = self.op_lock.lock().await;
        for collection in Collection::ALL {
            if collection == Collection::Notifications {
                continue;
            }
            let records = self.store.load(collection).await?;
            let len = self.state.write().await.resync(collection, records)?;
            tracing::info!(%collection, len, "collection loaded");
        }
        self.notifier.load().await;
        if let Some(max) = self.state.read().await.max_id() {
            self.ids.observe(max);
        }
        Ok(())
    }

    /// Reloads one collection wholesale from the store and tells clients
    /// to reload it. Safe to call any number of times.
    ///
    /// # Errors
    ///
    /// Returns a [`TrackerError::PersistenceError`] when the load fails or
    /// a record does not decode; the in-memory collection is left as is.
    pub async fn resync(&self, collection: Collection) -> Result<usize, TrackerError> {
        let _op = self.op_lock.lock().await;
        let records = self.store.load(collection).await?;
        let len = if collection == Collection::Notifications {
            self.notifier.resync(records).await
        } else {
            let mut state = self.state.write().await;
            let len = state.resync(collection, records)?;
            if let Some(max) = state.max_id() {
                self.ids.observe(max);
            }
            len
        };
        tracing::debug!(%collection, len, "collection resynced");
        self.event_bus.publish(TableEvent::CollectionReloaded {
            collection,
            len,
            timestamp: Utc::now(),
        });
        Ok(len)
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// All player records, newest first.
    pub async fn players(&self) -> Vec<Player> {
        self.state.read().await.players().to_vec()
    }

    /// Players still at the table, newest first.
    pub async fn active_players(&self) -> Vec<Player> {
        self.state.read().await.active_players().cloned().collect()
    }

    /// Checked-out players, latest checkout first.
    pub async fn history(&self) -> Vec<Player> {
        self.state.read().await.history()
    }

    /// One player record.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NotFound`] for an unknown id.
    pub async fn player(&self, id: EntityId) -> Result<Player, TrackerError> {
        self.state
            .read()
            .await
            .player(id)
            .cloned()
            .ok_or(TrackerError::NotFound {
                collection: Collection::Players,
                id,
            })
    }

    /// Seat assignments ordered by seat.
    pub async fn seats(&self) -> Vec<SeatAssignment> {
        let mut seats = self.state.read().await.seats().to_vec();
        seats.sort_by_key(|s| s.seat);
        seats
    }

    /// Upcoming games in insertion order.
    pub async fn schedule(&self) -> Vec<ScheduleEntry> {
        self.state.read().await.schedule().to_vec()
    }

    /// Archived sessions, newest first.
    pub async fn sessions(&self) -> Vec<SessionRecord> {
        self.state.read().await.sessions().to_vec()
    }

    /// Visitors in arrival order.
    pub async fn visitors(&self) -> Vec<Visitor> {
        self.state.read().await.visitors().to_vec()
    }

    /// Live table aggregates.
    pub async fn stats(&self) -> TableStats {
        self.state.read().await.stats()
    }

    // ── Players ─────────────────────────────────────────────────────────

    /// Buys a player in and seats them at the lowest free seat.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidRequest`] for a blank name or a
    /// negative buy-in, or a persistence error.
    pub async fn add_player(&self, new: NewPlayer) -> Result<Admission, TrackerError> {
        let id = self.ids.next_id();
        let admission = self
            .commit("add_player", |state, now| state.add_player(id, new, now))
            .await?;
        tracing::info!(
            player_id = %admission.player.id,
            seat = admission.seat.map(SeatNumber::get),
            "player bought in"
        );
        Ok(admission)
    }

    /// Adds `amount` to a player's cumulative rebuy. Unknown ids are a
    /// no-op and return `None`.
    ///
    /// # Errors
    ///
    /// Returns a persistence error.
    pub async fn update_rebuy(
        &self,
        id: EntityId,
        amount: Money,
    ) -> Result<Option<Player>, TrackerError> {
        let player = self
            .commit("update_rebuy", |state, _| state.update_rebuy(id, amount))
            .await?;
        if player.is_some() {
            tracing::info!(player_id = %id, %amount, "rebuy recorded");
        }
        Ok(player)
    }

    /// Checks a player out, freeing their seat. Unknown ids are a no-op
    /// and return `None`.
    ///
    /// # Errors
    ///
    /// Returns a persistence error.
    pub async fn checkout_player(
        &self,
        id: EntityId,
        cash_out: Money,
    ) -> Result<Option<Player>, TrackerError> {
        let player = self
            .commit("checkout_player", |state, now| {
                state.checkout_player(id, cash_out, now)
            })
            .await?;
        if let Some(player) = &player {
            tracing::info!(player_id = %id, %cash_out, profit = %player.profit(), "player checked out");
        }
        Ok(player)
    }

    /// Deletes a playing player's record and seat.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NotFound`] for an unknown id,
    /// [`TrackerError::InvalidRequest`] for a finished player, or a
    /// persistence error.
    pub async fn cancel_entry(&self, id: EntityId) -> Result<Player, TrackerError> {
        let player = self
            .commit("cancel_entry", |state, _| state.cancel_entry(id))
            .await?;
        tracing::info!(player_id = %id, "entry cancelled");
        Ok(player)
    }

    /// Deletes one finished player.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NotFound`] unless `id` names a finished
    /// player, or a persistence error.
    pub async fn delete_history_item(&self, id: EntityId) -> Result<Player, TrackerError> {
        let player = self
            .commit("delete_history_item", |state, _| state.delete_history_item(id))
            .await?;
        tracing::info!(player_id = %id, "history item deleted");
        Ok(player)
    }

    /// Deletes every finished player. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns a persistence error.
    pub async fn clear_history(&self) -> Result<usize, TrackerError> {
        let removed = self
            .commit("clear_history", |state, _| Ok(state.clear_history()))
            .await?;
        tracing::info!(removed, "history cleared");
        Ok(removed)
    }

    // ── Session ─────────────────────────────────────────────────────────

    /// Archives the session summary and resets the table.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NothingToSave`] when there are no players,
    /// or a persistence error.
    pub async fn finish_session(&self) -> Result<SessionRecord, TrackerError> {
        let id = self.ids.next_id();
        let record = self
            .commit("finish_session", |state, now| state.finish_session(id, now))
            .await?;
        tracing::info!(
            session_id = %record.id,
            players = record.summary.player_count,
            balance = %record.summary.balance,
            "session finished"
        );
        Ok(record)
    }

    /// Deletes every archived session. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns a persistence error.
    pub async fn clear_sessions(&self) -> Result<usize, TrackerError> {
        let removed = self
            .commit("clear_sessions", |state, _| Ok(state.clear_sessions()))
            .await?;
        tracing::info!(removed, "session history cleared");
        Ok(removed)
    }

    // ── Seats ───────────────────────────────────────────────────────────

    /// Moves a player to `seat`, seating them if they had no seat.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::SeatOccupied`] (with an alert notification)
    /// when another player holds the seat, [`TrackerError::NotFound`] for
    /// an unknown or finished player, or a persistence error.
    pub async fn update_seat_position(
        &self,
        id: EntityId,
        seat: SeatNumber,
    ) -> Result<SeatAssignment, TrackerError> {
        let assignment = self
            .commit("update_seat_position", |state, _| {
                state.update_seat_position(id, seat)
            })
            .await?;
        tracing::info!(player_id = %id, seat = seat.get(), "seat updated");
        Ok(assignment)
    }

    /// Exchanges the seats of two seated players.
    ///
    /// The two seat rows are written one after the other with no enclosing
    /// transaction, so a concurrent writer may observe the intermediate
    /// state until the change feed resyncs it.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::SeatNotHeld`] when either player is
    /// unseated, or a persistence error.
    pub async fn swap_seats(
        &self,
        a: EntityId,
        b: EntityId,
    ) -> Result<(SeatAssignment, SeatAssignment), TrackerError> {
        let pair = self
            .commit("swap_seats", |state, _| state.swap_seats(a, b))
            .await?;
        tracing::info!(
            player_a = %a,
            player_b = %b,
            seat_a = pair.0.seat.get(),
            seat_b = pair.1.seat.get(),
            "seats swapped"
        );
        Ok(pair)
    }

    /// Removes a seat assignment, leaving the player playing.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::SeatNotHeld`] when the player has no seat,
    /// or a persistence error.
    pub async fn remove_visual_seat(&self, id: EntityId) -> Result<SeatAssignment, TrackerError> {
        let removed = self
            .commit("remove_visual_seat", |state, _| state.remove_visual_seat(id))
            .await?;
        tracing::info!(player_id = %id, seat = removed.seat.get(), "seat removed");
        Ok(removed)
    }

    /// Interprets a seat click for one client and performs the resulting
    /// swap or move.
    ///
    /// # Errors
    ///
    /// Propagates errors of the swap or move. A refused gesture is not an
    /// error; it is returned as [`SeatAction::Refused`].
    pub async fn seat_click(
        &self,
        picker: &mut SeatPicker,
        seat: SeatNumber,
        actor: Option<&Actor>,
    ) -> Result<SeatAction, TrackerError> {
        let action = {
            let state = self.state.read().await;
            picker.click(seat, &state, actor, self.access.as_ref())
        };
        match &action {
            SeatAction::Swap { selected, other } => {
                self.swap_seats(*selected, *other).await?;
            }
            SeatAction::Move { selected, seat } => {
                self.update_seat_position(*selected, *seat).await?;
            }
            SeatAction::Refused(message) => {
                tracing::warn!(
                    actor = actor.map(|a| a.username.as_str()),
                    seat = seat.get(),
                    message = %message,
                    "seat gesture refused"
                );
            }
            SeatAction::Ignore | SeatAction::Select(_) | SeatAction::Deselect => {}
        }
        Ok(action)
    }

    // ── Schedule ────────────────────────────────────────────────────────

    /// Plans a game.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidRequest`] for a blank title, or a
    /// persistence error.
    pub async fn add_schedule(
        &self,
        title: &str,
        date: DateTime<Utc>,
    ) -> Result<ScheduleEntry, TrackerError> {
        let id = self.ids.next_id();
        let entry = self
            .commit("add_schedule", |state, _| state.add_schedule(id, title, date))
            .await?;
        tracing::info!(schedule_id = %entry.id, date = %entry.date, "game scheduled");
        Ok(entry)
    }

    /// Removes a planned game.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NotFound`] for an unknown id, or a
    /// persistence error.
    pub async fn delete_schedule(&self, id: EntityId) -> Result<ScheduleEntry, TrackerError> {
        let entry = self
            .commit("delete_schedule", |state, _| state.delete_schedule(id))
            .await?;
        tracing::info!(schedule_id = %id, "schedule entry deleted");
        Ok(entry)
    }

    // ── Visitors ────────────────────────────────────────────────────────

    /// Records a visitor.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidRequest`] for a blank name, or a
    /// persistence error.
    pub async fn add_visitor(&self, name: &str) -> Result<Visitor, TrackerError> {
        let id = self.ids.next_id();
        let visitor = self
            .commit("add_visitor", |state, now| state.add_visitor(id, name, now))
            .await?;
        tracing::info!(visitor_id = %visitor.id, "visitor arrived");
        Ok(visitor)
    }

    /// Removes a visitor.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NotFound`] for an unknown id, or a
    /// persistence error.
    pub async fn remove_visitor(&self, id: EntityId) -> Result<Visitor, TrackerError> {
        let visitor = self
            .commit("remove_visitor", |state, _| state.remove_visitor(id))
            .await?;
        tracing::info!(visitor_id = %id, "visitor left");
        Ok(visitor)
    }

    // ── Auth ────────────────────────────────────────────────────────────

    /// Checks credentials and returns the matching actor.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidCredentials`] when no user matches,
    /// or a persistence error.
    pub async fn login(&self, username: &str, password: &str) -> Result<Actor, TrackerError> {
        let user = self
            .store
            .find_user(username.trim(), password)
            .await?
            .ok_or(TrackerError::InvalidCredentials)?;
        tracing::info!(username = %user.username, "user logged in");
        Ok(self.actor_for(&user))
    }

    /// Creates a user and returns the matching actor.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidRequest`] for a blank username or
    /// password, [`TrackerError::DuplicateUsername`] when the name is
    /// taken, or a persistence error.
    pub async fn register(&self, username: &str, password: &str) -> Result<Actor, TrackerError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(TrackerError::InvalidRequest(
                "username and password are required".to_string(),
            ));
        }
        let user = AppUser {
            username: username.to_string(),
            password: password.to_string(),
            is_admin: false,
        };
        self.store.create_user(&user).await?;
        tracing::info!(username, "user registered");
        Ok(self.actor_for(&user))
    }

    fn actor_for(&self, user: &AppUser) -> Actor {
        let listed = self
            .admin_usernames
            .iter()
            .any(|admin| admin.eq_ignore_ascii_case(&user.username));
        Actor {
            username: user.username.clone(),
            is_admin: user.is_admin || listed,
        }
    }

    /// Resolves a username announced by a client into an actor, without a
    /// password check.
    #[must_use]
    pub fn actor_named(&self, username: &str) -> Actor {
        self.actor_for(&AppUser {
            username: username.trim().to_string(),
            password: String::new(),
            is_admin: false,
        })
    }

    // ── Presence ────────────────────────────────────────────────────────

    /// Registers a connected client and broadcasts the new count.
    pub async fn announce_presence(&self, key: &str, username: Option<String>) -> usize {
        let online = self.presence.announce(key, username).await;
        self.publish_presence(online);
        online
    }

    /// Drops a client and broadcasts the new count.
    pub async fn leave_presence(&self, key: &str) -> usize {
        let online = self.presence.leave(key).await;
        self.publish_presence(online);
        online
    }

    /// Number of connected clients.
    pub async fn presence_count(&self) -> usize {
        self.presence.count().await
    }

    /// Connected clients, oldest first.
    pub async fn presence(&self) -> Vec<PresenceEntry> {
        self.presence.list().await
    }

    fn publish_presence(&self, online: usize) {
        tracing::debug!(online, "presence changed");
        self.event_bus.publish(TableEvent::PresenceChanged {
            online,
            timestamp: Utc::now(),
        });
    }

    // ── Commit pipeline ─────────────────────────────────────────────────

    async fn commit<T, F>(&self, op: &'static str, f: F) -> Result<T, TrackerError>
    where
        F: FnOnce(&mut SessionState, DateTime<Utc>) -> Result<Transition<T>, TrackerError>,
    {
        let _op = self.op_lock.lock().await;
        let now = Utc::now();

        let (snapshot, outcome) = {
            let mut state = self.state.write().await;
            let snapshot = state.clone();
            let outcome = f(&mut state, now);
            (snapshot, outcome)
        };

        let transition = match outcome {
            Ok(transition) => transition,
            Err(e) => {
                if matches!(e, TrackerError::PersistenceError(_) | TrackerError::Internal(_)) {
                    *self.state.write().await = snapshot;
                }
                tracing::debug!(op, error = %e, "operation rejected");
                self.alert(&e).await;
                return Err(e);
            }
        };

        for (issued, write) in transition.writes.iter().enumerate() {
            if let Err(e) = persistence::apply(self.store.as_ref(), write).await {
                tracing::error!(op, issued, error = %e, "persistence write failed, restoring state");
                *self.state.write().await = snapshot;
                self.publish_reloads(&transition.writes).await;
                self.alert(&e).await;
                return Err(e);
            }
        }

        self.publish_writes(&transition.writes).await;
        if let Some(notice) = transition.notice {
            self.notifier.notify(notice).await;
        }
        Ok(transition.value)
    }

    async fn alert(&self, error: &TrackerError) {
        if let Some(notice) = error.alert_notice() {
            self.notifier.notify(notice).await;
        }
    }

    async fn publish_writes(&self, writes: &[RowWrite]) {
        let timestamp = Utc::now();
        for write in writes {
            let event = match write {
                RowWrite::Put {
                    collection,
                    id,
                    change,
                    row,
                } => TableEvent::RowChanged {
                    collection: *collection,
                    change: *change,
                    id: *id,
                    row: Some(row.clone()),
                    timestamp,
                },
                RowWrite::Delete { collection, id } => TableEvent::RowChanged {
                    collection: *collection,
                    change: ChangeKind::Delete,
                    id: *id,
                    row: None,
                    timestamp,
                },
                RowWrite::Clear { collection } => TableEvent::CollectionReloaded {
                    collection: *collection,
                    len: self.collection_len(*collection).await,
                    timestamp,
                },
            };
            self.event_bus.publish(event);
        }
    }

    /// After a failed commit, tells clients to reload every collection the
    /// transition touched, since earlier writes may have landed.
    async fn publish_reloads(&self, writes: &[RowWrite]) {
        let mut touched: Vec<Collection> = Vec::new();
        for collection in writes.iter().map(RowWrite::collection) {
            if !touched.contains(&collection) {
                touched.push(collection);
            }
        }
        let timestamp = Utc::now();
        for collection in touched {
            self.event_bus.publish(TableEvent::CollectionReloaded {
                collection,
                len: self.collection_len(collection).await,
                timestamp,
            });
        }
    }

    async fn collection_len(&self, collection: Collection) -> usize {
        let state = self.state.read().await;
        match collection {
            Collection::Players => state.players().len(),
            Collection::Seats => state.seats().len(),
            Collection::Schedule => state.schedule().len(),
            Collection::Sessions => state.sessions().len(),
            Collection::Visitors => state.visitors().len(),
            Collection::Notifications => self.notifier.notifications().await.len(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::Value;

    use super::*;
    use crate::domain::{OpenAccess, OwnerOrAdmin, Severity};
    use crate::persistence::MemoryStore;

    /// Memory store whose row writes to one collection always fail.
    #[derive(Debug)]
    struct BrokenCollection {
        inner: MemoryStore,
        broken: Collection,
    }

    impl BrokenCollection {
        fn check(&self, collection: Collection) -> Result<(), TrackerError> {
            if collection == self.broken {
                return Err(TrackerError::PersistenceError("disk on fire".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl Store for BrokenCollection {
        async fn load(&self, collection: Collection) -> Result<Vec<Value>, TrackerError> {
            self.inner.load(collection).await
        }
        async fn save(&self, collection: Collection, records: &[Value]) -> Result<(), TrackerError> {
            self.check(collection)?;
            self.inner.save(collection, records).await
        }
        async fn upsert(
            &self,
            collection: Collection,
            id: EntityId,
            record: &Value,
        ) -> Result<(), TrackerError> {
            self.check(collection)?;
            self.inner.upsert(collection, id, record).await
        }
        async fn delete(&self, collection: Collection, id: EntityId) -> Result<(), TrackerError> {
            self.check(collection)?;
            self.inner.delete(collection, id).await
        }
        async fn clear(&self, collection: Collection) -> Result<(), TrackerError> {
            self.check(collection)?;
            self.inner.clear(collection).await
        }
        async fn load_sound_enabled(&self) -> Result<Option<bool>, TrackerError> {
            self.inner.load_sound_enabled().await
        }
        async fn save_sound_enabled(&self, enabled: bool) -> Result<(), TrackerError> {
            self.inner.save_sound_enabled(enabled).await
        }
        async fn find_user(
            &self,
            username: &str,
            password: &str,
        ) -> Result<Option<AppUser>, TrackerError> {
            self.inner.find_user(username, password).await
        }
        async fn create_user(&self, user: &AppUser) -> Result<(), TrackerError> {
            self.inner.create_user(user).await
        }
    }

    /// Memory store whose seat writes hang for a while and then fail.
    #[derive(Debug)]
    struct StallingSeats {
        inner: Arc<MemoryStore>,
        stall: Duration,
    }

    impl StallingSeats {
        async fn check(&self, collection: Collection) -> Result<(), TrackerError> {
            if collection == Collection::Seats {
                tokio::time::sleep(self.stall).await;
                return Err(TrackerError::PersistenceError("seat table locked".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl Store for StallingSeats {
        async fn load(&self, collection: Collection) -> Result<Vec<Value>, TrackerError> {
            self.inner.load(collection).await
        }
        async fn save(&self, collection: Collection, records: &[Value]) -> Result<(), TrackerError> {
            self.check(collection).await?;
            self.inner.save(collection, records).await
        }
        async fn upsert(
            &self,
            collection: Collection,
            id: EntityId,
            record: &Value,
        ) -> Result<(), TrackerError> {
            self.check(collection).await?;
            self.inner.upsert(collection, id, record).await
        }
        async fn delete(&self, collection: Collection, id: EntityId) -> Result<(), TrackerError> {
            self.check(collection).await?;
            self.inner.delete(collection, id).await
        }
        async fn clear(&self, collection: Collection) -> Result<(), TrackerError> {
            self.check(collection).await?;
            self.inner.clear(collection).await
        }
        async fn load_sound_enabled(&self) -> Result<Option<bool>, TrackerError> {
            self.inner.load_sound_enabled().await
        }
        async fn save_sound_enabled(&self, enabled: bool) -> Result<(), TrackerError> {
            self.inner.save_sound_enabled(enabled).await
        }
        async fn find_user(
            &self,
            username: &str,
            password: &str,
        ) -> Result<Option<AppUser>, TrackerError> {
            self.inner.find_user(username, password).await
        }
        async fn create_user(&self, user: &AppUser) -> Result<(), TrackerError> {
            self.inner.create_user(user).await
        }
    }

    fn service_with(store: Arc<dyn Store>, access: Arc<dyn AccessPolicy>) -> SessionService {
        let bus = EventBus::new(256);
        let ids = Arc::new(IdGenerator::new());
        let notifier = Arc::new(Notifier::new(
            Arc::clone(&store),
            bus.clone(),
            Arc::clone(&ids),
            Duration::from_secs(4),
        ));
        SessionService::new(store, bus, notifier, ids, access, vec!["host".to_string()])
    }

    fn service() -> (Arc<MemoryStore>, SessionService) {
        let store = Arc::new(MemoryStore::new());
        let service = service_with(Arc::clone(&store) as Arc<dyn Store>, Arc::new(OpenAccess));
        (store, service)
    }

    fn new_player(name: &str, reais: i64) -> NewPlayer {
        NewPlayer {
            name: name.to_string(),
            buy_in: Money::from_reais(reais),
            photo: None,
            is_dealer: false,
        }
    }

    fn seat(n: u8) -> SeatNumber {
        let Ok(seat) = SeatNumber::new(n) else {
            panic!("invalid seat {n}");
        };
        seat
    }

    async fn admit(service: &SessionService, name: &str, reais: i64) -> Admission {
        let Ok(admission) = service.add_player(new_player(name, reais)).await else {
            panic!("add_player should succeed");
        };
        admission
    }

    #[tokio::test]
    async fn alice_scenario() {
        let (store, service) = service();
        let alice = admit(&service, "Alice", 50).await;
        assert_eq!(alice.seat, Some(seat(1)));

        let stats = service.stats().await;
        assert_eq!(stats.active_count, 1);
        assert_eq!(stats.total_invested, Money::from_reais(50));

        let Ok(Some(rebought)) = service
            .update_rebuy(alice.player.id, Money::from_reais(30))
            .await
        else {
            panic!("rebuy should succeed");
        };
        assert_eq!(rebought.invested(), Money::from_reais(80));
        let stats = service.stats().await;
        assert_eq!(stats.active_count, 1);
        assert_eq!(stats.total_invested, Money::from_reais(80));

        let Ok(Some(done)) = service
            .checkout_player(alice.player.id, Money::from_reais(70))
            .await
        else {
            panic!("checkout should succeed");
        };
        assert_eq!(done.profit(), Money::from_reais(-10));
        assert!(service.seats().await.is_empty());
        assert_eq!(service.history().await.len(), 1);

        let stats = service.stats().await;
        assert_eq!(stats.active_count, 0);
        assert_eq!(stats.finished_count, 1);
        assert_eq!(stats.total_invested, Money::from_reais(80));
        assert_eq!(stats.total_cash_out, Money::from_reais(70));
        assert_eq!(stats.balance, Money::from_reais(10));

        let Ok(stored) = store.load(Collection::Seats).await else {
            panic!("load should succeed");
        };
        assert!(stored.is_empty());

        let messages: Vec<String> = service
            .notifier()
            .notifications()
            .await
            .into_iter()
            .map(|n| n.message)
            .collect();
        assert_eq!(
            messages,
            vec![
                "Alice saiu (Cashout: R$ 70)".to_string(),
                "Alice fez rebuy de R$ 30".to_string(),
                "Alice entrou na mesa (Cadeira 1)".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn state_survives_a_reload_from_the_store() {
        let (store, service) = service();
        admit(&service, "Ana", 100).await;
        admit(&service, "Beto", 50).await;
        let Ok(_) = service.add_schedule("Sexta", Utc::now()).await else {
            panic!("add_schedule should succeed");
        };

        let reloaded = service_with(store as Arc<dyn Store>, Arc::new(OpenAccess));
        tokio_test::assert_ok!(reloaded.load_all().await);
        assert_eq!(reloaded.players().await, service.players().await);
        assert_eq!(reloaded.seats().await, service.seats().await);
        assert_eq!(reloaded.schedule().await.len(), 1);

        let fresh = admit(&reloaded, "Caio", 10).await;
        assert!(reloaded.players().await.iter().all(|p| p.id <= fresh.player.id));
    }

    #[tokio::test]
    async fn failed_write_restores_state_and_alerts() {
        let store: Arc<dyn Store> = Arc::new(BrokenCollection {
            inner: MemoryStore::new(),
            broken: Collection::Seats,
        });
        let service = service_with(store, Arc::new(OpenAccess));
        let result = service.add_player(new_player("Ana", 50)).await;
        assert!(matches!(result, Err(TrackerError::PersistenceError(_))));
        assert!(service.players().await.is_empty());
        assert!(service.seats().await.is_empty());

        let log = service.notifier().notifications().await;
        assert_eq!(log.len(), 1);
        assert_eq!(log.first().map(|n| n.severity), Some(Severity::Alert));
    }

    #[tokio::test]
    async fn resync_during_failed_write_keeps_foreign_rows() {
        let inner = Arc::new(MemoryStore::new());
        let store: Arc<dyn Store> = Arc::new(StallingSeats {
            inner: Arc::clone(&inner),
            stall: Duration::from_millis(200),
        });
        let service = Arc::new(service_with(store, Arc::new(OpenAccess)));

        let adding = tokio::spawn({
            let service = Arc::clone(&service);
            async move { service.add_player(new_player("Ana", 50)).await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        let foreign = Player::new(
            EntityId::new(1),
            "Foreign".to_string(),
            Money::from_reais(20),
            None,
            false,
            Utc::now(),
        );
        let Ok(row) = serde_json::to_value(&foreign) else {
            panic!("player should encode");
        };
        tokio_test::assert_ok!(inner.upsert(Collection::Players, foreign.id, &row).await);
        tokio_test::assert_ok!(service.resync(Collection::Players).await);

        let Ok(added) = adding.await else {
            panic!("add_player task panicked");
        };
        assert!(matches!(added, Err(TrackerError::PersistenceError(_))));

        let names: Vec<String> = service.players().await.into_iter().map(|p| p.name).collect();
        assert!(names.contains(&"Foreign".to_string()), "lost foreign row: {names:?}");
        let Ok(stored) = inner.load(Collection::Players).await else {
            panic!("load should succeed");
        };
        assert_eq!(stored.len(), names.len());
    }

    #[tokio::test]
    async fn occupied_seat_is_rejected_with_alert() {
        let (_store, service) = service();
        let ana = admit(&service, "Ana", 50).await;
        admit(&service, "Beto", 50).await;

        let result = service.update_seat_position(ana.player.id, seat(2)).await;
        assert!(matches!(result, Err(TrackerError::SeatOccupied { seat: 2, .. })));
        assert_eq!(service.seats().await.first().map(|s| s.id), Some(ana.player.id));

        let log = service.notifier().notifications().await;
        assert_eq!(
            log.first().map(|n| n.message.as_str()),
            Some("Cadeira 2 já está ocupada por Beto")
        );
    }

    #[tokio::test]
    async fn swap_publishes_two_row_changes() {
        let (_store, service) = service();
        let ana = admit(&service, "Ana", 50).await;
        let beto = admit(&service, "Beto", 50).await;
        let mut rx = service.event_bus().subscribe();

        let Ok((a, b)) = service.swap_seats(ana.player.id, beto.player.id).await else {
            panic!("swap should succeed");
        };
        assert_eq!(a.seat, seat(2));
        assert_eq!(b.seat, seat(1));

        for expected in [ana.player.id, beto.player.id] {
            let Ok(TableEvent::RowChanged { id, collection, .. }) = rx.recv().await else {
                panic!("expected RowChanged");
            };
            assert_eq!(collection, Collection::Seats);
            assert_eq!(id, expected);
        }
    }

    #[tokio::test]
    async fn finish_session_requires_players() {
        let (_store, service) = service();
        assert!(matches!(
            service.finish_session().await,
            Err(TrackerError::NothingToSave)
        ));

        admit(&service, "Ana", 100).await;
        let Ok(record) = service.finish_session().await else {
            panic!("finish should succeed");
        };
        assert_eq!(record.summary.total_in, Money::from_reais(100));
        assert!(service.players().await.is_empty());
        assert_eq!(service.sessions().await.len(), 1);
    }

    #[tokio::test]
    async fn resync_picks_up_foreign_writes() {
        let (store, service) = service();
        let ana = admit(&service, "Ana", 50).await;

        let Ok(()) = store.clear(Collection::Seats).await else {
            panic!("clear should succeed");
        };
        let Ok(len) = service.resync(Collection::Seats).await else {
            panic!("resync should succeed");
        };
        assert_eq!(len, 0);
        let Ok(again) = service.resync(Collection::Seats).await else {
            panic!("resync should succeed");
        };
        assert_eq!(again, 0);
        assert!(service.player(ana.player.id).await.is_ok());
    }

    #[tokio::test]
    async fn seat_clicks_swap_and_move() {
        let (_store, service) = service();
        let ana = admit(&service, "Ana", 50).await;
        let beto = admit(&service, "Beto", 50).await;
        let mut picker = SeatPicker::new();

        let Ok(action) = service.seat_click(&mut picker, seat(1), None).await else {
            panic!("click should succeed");
        };
        assert_eq!(action, SeatAction::Select(ana.player.id));
        let Ok(action) = service.seat_click(&mut picker, seat(2), None).await else {
            panic!("click should succeed");
        };
        assert!(matches!(action, SeatAction::Swap { .. }));
        assert_eq!(picker.selected(), None);

        let Ok(_) = service.seat_click(&mut picker, seat(2), None).await else {
            panic!("click should succeed");
        };
        let Ok(action) = service.seat_click(&mut picker, seat(7), None).await else {
            panic!("click should succeed");
        };
        assert_eq!(
            action,
            SeatAction::Move {
                selected: ana.player.id,
                seat: seat(7)
            }
        );
        let seats = service.seats().await;
        assert_eq!(seats.first().map(|s| s.id), Some(beto.player.id));
        assert_eq!(seats.get(1).map(|s| s.seat), Some(seat(7)));
    }

    #[tokio::test]
    async fn owner_policy_refuses_strangers() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let service = service_with(store, Arc::new(OwnerOrAdmin));
        admit(&service, "Ana", 50).await;
        let mut picker = SeatPicker::new();

        let beto = service.actor_named("beto");
        let Ok(action) = service.seat_click(&mut picker, seat(1), Some(&beto)).await else {
            panic!("click should succeed");
        };
        assert!(matches!(action, SeatAction::Refused(_)));

        let host = service.actor_named("Host");
        assert!(host.is_admin);
        let Ok(action) = service.seat_click(&mut picker, seat(1), Some(&host)).await else {
            panic!("click should succeed");
        };
        assert!(matches!(action, SeatAction::Select(_)));
    }

    #[tokio::test]
    async fn register_then_login() {
        let (_store, service) = service();
        let Ok(actor) = service.register("ana", "segredo").await else {
            panic!("register should succeed");
        };
        assert!(!actor.is_admin);
        assert!(matches!(
            service.register("ana", "outra").await,
            Err(TrackerError::DuplicateUsername(_))
        ));
        assert!(matches!(
            service.login("ana", "errada").await,
            Err(TrackerError::InvalidCredentials)
        ));
        let Ok(actor) = service.login("ana", "segredo").await else {
            panic!("login should succeed");
        };
        assert_eq!(actor.username, "ana");
    }

    #[tokio::test]
    async fn presence_counts_are_broadcast() {
        let (_store, service) = service();
        let mut rx = service.event_bus().subscribe();
        assert_eq!(service.announce_presence("tab-1", None).await, 1);
        assert_eq!(service.announce_presence("tab-2", Some("ana".to_string())).await, 2);
        assert_eq!(service.leave_presence("tab-1").await, 1);

        let mut counts = Vec::new();
        for _ in 0..3 {
            let Ok(TableEvent::PresenceChanged { online, .. }) = rx.recv().await else {
                panic!("expected PresenceChanged");
            };
            counts.push(online);
        }
        assert_eq!(counts, vec![1, 2, 1]);
    }
}
