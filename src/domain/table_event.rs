//! Change events reflecting session state mutations.
//!
//! Every persisted mutation emits a [`TableEvent`] through the
//! [`super::EventBus`]. Events are forwarded to WebSocket subscribers, which
//! either patch their copy of the row or reload the collection.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Chime, Collection, EntityId, Notification, Toast};

/// Row-level change discriminator, mirroring the database change feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// A row was created.
    Insert,
    /// A row was modified.
    Update,
    /// A row was removed.
    Delete,
}

impl ChangeKind {
    /// Parses the `TG_OP`-style operation name sent by the database
    /// trigger (`INSERT`, `UPDATE`, `DELETE`), case-insensitively.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "insert" => Some(Self::Insert),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }
}

/// Domain event emitted after every state mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum TableEvent {
    /// A single row changed.
    RowChanged {
        /// Collection the row belongs to.
        collection: Collection,
        /// Insert, update or delete.
        change: ChangeKind,
        /// Id of the affected row.
        id: EntityId,
        /// New row contents; absent for deletes.
        #[serde(skip_serializing_if = "Option::is_none")]
        row: Option<serde_json::Value>,
        /// When the change was applied.
        timestamp: DateTime<Utc>,
    },

    /// A collection was replaced wholesale (clear, finish, resync).
    /// Clients should reload it.
    CollectionReloaded {
        /// Collection that changed.
        collection: Collection,
        /// Number of records after the reload.
        len: usize,
        /// When the reload happened.
        timestamp: DateTime<Utc>,
    },

    /// A notification was logged and a toast queued.
    NotificationPosted {
        /// Logged notification.
        notification: Notification,
        /// Toast mirroring it.
        toast: Toast,
        /// Audio cue, present when sound is enabled.
        #[serde(skip_serializing_if = "Option::is_none")]
        chime: Option<Chime>,
    },

    /// The number of connected clients changed.
    PresenceChanged {
        /// Connected clients.
        online: usize,
        /// When the count changed.
        timestamp: DateTime<Utc>,
    },
}

impl TableEvent {
    /// Returns the collection this event concerns, or `None` for events
    /// every client receives regardless of subscriptions.
    #[must_use]
    pub fn collection(&self) -> Option<Collection> {
        match self {
            Self::RowChanged { collection, .. } | Self::CollectionReloaded { collection, .. } => {
                Some(*collection)
            }
            Self::NotificationPosted { .. } => Some(Collection::Notifications),
            Self::PresenceChanged { .. } => None,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::RowChanged { .. } => "row_changed",
            Self::CollectionReloaded { .. } => "collection_reloaded",
            Self::NotificationPosted { .. } => "notification_posted",
            Self::PresenceChanged { .. } => "presence_changed",
        }
    }
}
