//! Connected-client tracking for the "online" counter.
//!
//! Presence is display-only: nothing in the session logic reads it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use utoipa::ToSchema;

/// One connected client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PresenceEntry {
    /// Client-chosen key, unique per browser tab.
    pub key: String,
    /// Logged-in user, if the client announced one.
    pub username: Option<String>,
    /// When the client connected.
    pub since: DateTime<Utc>,
}

/// Registry of connected clients keyed by client key.
#[derive(Debug, Default)]
pub struct PresenceTracker {
    clients: RwLock<HashMap<String, PresenceEntry>>,
}

impl PresenceTracker {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or refreshes a client and returns the new online count.
    ///
    /// Re-announcing the same key replaces its username but keeps its
    /// original `since`.
    pub async fn announce(&self, key: &str, username: Option<String>) -> usize {
        let mut clients = self.clients.write().await;
        clients
            .entry(key.to_string())
            .and_modify(|entry| entry.username.clone_from(&username))
            .or_insert_with(|| PresenceEntry {
                key: key.to_string(),
                username,
                since: Utc::now(),
            });
        clients.len()
    }

    /// Drops a client and returns the new online count.
    pub async fn leave(&self, key: &str) -> usize {
        let mut clients = self.clients.write().await;
        clients.remove(key);
        clients.len()
    }

    /// Number of connected clients.
    pub async fn count(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Connected clients, oldest first.
    pub async fn list(&self) -> Vec<PresenceEntry> {
        let mut entries: Vec<PresenceEntry> = self.clients.read().await.values().cloned().collect();
        entries.sort_by_key(|e| e.since);
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn announce_and_leave_track_count() {
        let presence = PresenceTracker::new();
        assert_eq!(presence.announce("tab-1", None).await, 1);
        assert_eq!(presence.announce("tab-2", Some("bob".to_string())).await, 2);
        assert_eq!(presence.announce("tab-1", Some("alice".to_string())).await, 2);
        assert_eq!(presence.leave("tab-2").await, 1);
        assert_eq!(presence.leave("unknown").await, 1);

        let list = presence.list().await;
        assert_eq!(list.len(), 1);
        assert_eq!(list.first().and_then(|e| e.username.clone()), Some("alice".to_string()));
    }
}
