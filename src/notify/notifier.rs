//! Notification log and toast queue.
//!
//! [`Notifier`] turns each [`Notice`] into a logged [`Notification`] and a
//! short-lived [`Toast`], persists the log and publishes a
//! [`TableEvent::NotificationPosted`]. Persistence failures are logged and
//! swallowed: a notification never fails the operation that caused it.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::{
    Chime, Collection, EntityId, EventBus, IdGenerator, Notice, Notification, TableEvent, Toast,
};
use crate::persistence::Store;

#[derive(Debug)]
struct NotifierState {
    /// Newest first.
    log: Vec<Notification>,
    toasts: Vec<Toast>,
    sound_enabled: bool,
}

/// Emits notifications and keeps the toast queue.
#[derive(Debug)]
pub struct Notifier {
    state: RwLock<NotifierState>,
    store: Arc<dyn Store>,
    event_bus: EventBus,
    ids: Arc<IdGenerator>,
    toast_ttl: chrono::Duration,
}

impl Notifier {
    /// Creates a notifier with an empty log and sound enabled.
    #[must_use]
    pub fn new(
        store: Arc<dyn Store>,
        event_bus: EventBus,
        ids: Arc<IdGenerator>,
        toast_ttl: Duration,
    ) -> Self {
        Self {
            state: RwLock::new(NotifierState {
                log: Vec::new(),
                toasts: Vec::new(),
                sound_enabled: true,
            }),
            store,
            event_bus,
            ids,
            toast_ttl: chrono::Duration::from_std(toast_ttl)
                .unwrap_or_else(|_| chrono::Duration::seconds(4)),
        }
    }

    /// Loads the persisted log and sound preference.
    ///
    /// Unreadable data is logged and leaves the defaults in place.
    pub async fn load(&self) {
        match self.store.load(Collection::Notifications).await {
            Ok(records) => {
                let len = self.resync(records).await;
                tracing::info!(len, "notification log loaded");
            }
            Err(e) => tracing::warn!(error = %e, "failed to load notification log"),
        }
        match self.store.load_sound_enabled().await {
            Ok(Some(enabled)) => self.state.write().await.sound_enabled = enabled,
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "failed to load sound preference"),
        }
    }

    /// Replaces the log with records reloaded from the store. Records that
    /// do not decode are skipped.
    ///
    /// Returns the number of entries now held.
    pub async fn resync(&self, records: Vec<serde_json::Value>) -> usize {
        let mut log: Vec<Notification> = records
            .into_iter()
            .filter_map(|record| match serde_json::from_value(record) {
                Ok(n) => Some(n),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping corrupt notification record");
                    None
                }
            })
            .collect();
        log.sort_by(|a, b| b.id.cmp(&a.id));
        if let Some(newest) = log.first() {
            self.ids.observe(newest.id);
        }
        let mut state = self.state.write().await;
        state.log = log;
        state.log.len()
    }

    /// Logs a notice, queues its toast and publishes both.
    pub async fn notify(&self, notice: Notice) -> Notification {
        let now = Utc::now();
        let notification = Notification {
            id: self.ids.next_id(),
            message: notice.message,
            severity: notice.severity,
            read: false,
            date: now,
        };
        let toast = Toast {
            id: notification.id,
            message: notification.message.clone(),
            severity: notification.severity,
            expires_at: now + self.toast_ttl,
        };

        let chime = {
            let mut state = self.state.write().await;
            state.toasts.retain(|t| !t.is_expired(now));
            state.log.insert(0, notification.clone());
            state.toasts.push(toast.clone());
            state.sound_enabled.then_some(Chime::BELL)
        };

        tracing::info!(
            id = %notification.id,
            severity = notification.severity.as_str(),
            message = %notification.message,
            "notification"
        );

        match serde_json::to_value(&notification) {
            Ok(row) => {
                if let Err(e) = self
                    .store
                    .upsert(Collection::Notifications, notification.id, &row)
                    .await
                {
                    tracing::warn!(error = %e, "failed to persist notification");
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to encode notification"),
        }

        self.event_bus.publish(TableEvent::NotificationPosted {
            notification: notification.clone(),
            toast,
            chime,
        });
        notification
    }

    /// The log, newest first.
    pub async fn notifications(&self) -> Vec<Notification> {
        self.state.read().await.log.clone()
    }

    /// Number of unread entries.
    pub async fn unread_count(&self) -> usize {
        self.state.read().await.log.iter().filter(|n| !n.read).count()
    }

    /// Marks every entry read. Returns how many changed.
    pub async fn mark_all_read(&self) -> usize {
        let (changed, snapshot) = {
            let mut state = self.state.write().await;
            let mut changed = 0;
            for n in state.log.iter_mut().filter(|n| !n.read) {
                n.read = true;
                changed += 1;
            }
            (changed, state.log.clone())
        };
        if changed > 0 {
            self.persist_log(&snapshot).await;
        }
        changed
    }

    /// Empties the log. Returns how many entries were removed.
    pub async fn clear(&self) -> usize {
        let removed = {
            let mut state = self.state.write().await;
            let removed = state.log.len();
            state.log.clear();
            removed
        };
        if let Err(e) = self.store.clear(Collection::Notifications).await {
            tracing::warn!(error = %e, "failed to clear notification log");
        }
        self.publish_reloaded(0);
        removed
    }

    /// Live toasts, oldest first. Expired ones are pruned.
    pub async fn toasts(&self) -> Vec<Toast> {
        let now = Utc::now();
        let mut state = self.state.write().await;
        state.toasts.retain(|t| !t.is_expired(now));
        state.toasts.clone()
    }

    /// Removes a toast before it expires. Returns `false` when it was
    /// already gone.
    pub async fn dismiss_toast(&self, id: EntityId) -> bool {
        let mut state = self.state.write().await;
        let before = state.toasts.len();
        state.toasts.retain(|t| t.id != id);
        state.toasts.len() != before
    }

    /// Drops toasts expired at `now`. Returns how many were removed.
    pub async fn prune_toasts(&self, now: DateTime<Utc>) -> usize {
        let mut state = self.state.write().await;
        let before = state.toasts.len();
        state.toasts.retain(|t| !t.is_expired(now));
        before - state.toasts.len()
    }

    /// Whether published notifications carry a chime.
    pub async fn sound_enabled(&self) -> bool {
        self.state.read().await.sound_enabled
    }

    /// Turns the chime on or off and persists the choice.
    pub async fn set_sound_enabled(&self, enabled: bool) {
        self.state.write().await.sound_enabled = enabled;
        if let Err(e) = self.store.save_sound_enabled(enabled).await {
            tracing::warn!(error = %e, "failed to persist sound preference");
        }
    }

    /// Prunes expired toasts every `period` until the process exits.
    pub async fn run_toast_sweeper(self: Arc<Self>, period: Duration) {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let pruned = self.prune_toasts(Utc::now()).await;
            if pruned > 0 {
                tracing::trace!(pruned, "expired toasts swept");
            }
        }
    }

    async fn persist_log(&self, log: &[Notification]) {
        let records: Result<Vec<_>, _> = log.iter().map(serde_json::to_value).collect();
        match records {
            Ok(records) => {
                if let Err(e) = self.store.save(Collection::Notifications, &records).await {
                    tracing::warn!(error = %e, "failed to persist notification log");
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to encode notification log"),
        }
        self.publish_reloaded(log.len());
    }

    fn publish_reloaded(&self, len: usize) {
        self.event_bus.publish(TableEvent::CollectionReloaded {
            collection: Collection::Notifications,
            len,
            timestamp: Utc::now(),
        });
    }
}
