//! Realtime change feed over PostgreSQL `LISTEN/NOTIFY`.
//!
//! Every table trigger publishes `{"table", "event", "id"}` on the
//! configured channel. The feed maps each payload to a [`ChangeNotice`]
//! and hands it to a handler, which reloads the affected collection.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use sqlx::PgPool;
use sqlx::postgres::PgListener;

use crate::domain::{ChangeKind, Collection, EntityId};
use crate::error::TrackerError;

/// A row change announced by another writer (or echoed from our own).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeNotice {
    /// Collection whose table changed.
    pub collection: Collection,
    /// Kind of change.
    pub change: ChangeKind,
    /// Affected row, when the payload carried one.
    pub id: Option<EntityId>,
}

#[derive(Debug, Deserialize)]
struct Payload {
    table: String,
    event: String,
    #[serde(default)]
    id: Option<i64>,
}

/// Parses a NOTIFY payload. Returns `None` for malformed payloads and
/// tables outside the session collections.
#[must_use]
pub fn parse_payload(raw: &str) -> Option<ChangeNotice> {
    let payload: Payload = serde_json::from_str(raw).ok()?;
    Some(ChangeNotice {
        collection: Collection::from_table_name(&payload.table)?,
        change: ChangeKind::parse(&payload.event)?,
        id: payload.id.map(EntityId::new),
    })
}

/// Listener bound to the change channel.
pub struct ChangeFeed {
    listener: PgListener,
    channel: String,
}

impl fmt::Debug for ChangeFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeFeed")
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}

impl ChangeFeed {
    /// Connects a dedicated listener and subscribes to `channel`.
    ///
    /// # Errors
    ///
    /// Returns a [`TrackerError::PersistenceError`] when the listener
    /// cannot connect or subscribe.
    pub async fn subscribe(pool: &PgPool, channel: &str) -> Result<Self, TrackerError> {
        let mut listener = PgListener::connect_with(pool).await?;
        listener.listen(channel).await?;
        tracing::info!(channel, "subscribed to change feed");
        Ok(Self {
            listener,
            channel: channel.to_string(),
        })
    }

    /// Dispatches notices to `handler` until the process exits.
    ///
    /// Connection errors are logged; the listener reconnects on the next
    /// receive. Since notifications may have been missed meanwhile, every
    /// collection is announced once after an error.
    pub async fn run<F, Fut>(mut self, mut handler: F)
    where
        F: FnMut(ChangeNotice) -> Fut,
        Fut: Future<Output = ()>,
    {
        loop {
            match self.listener.recv().await {
                Ok(notification) => {
                    let payload = notification.payload();
                    match parse_payload(payload) {
                        Some(notice) => {
                            tracing::debug!(
                                collection = %notice.collection,
                                change = ?notice.change,
                                "change notification"
                            );
                            handler(notice).await;
                        }
                        None => {
                            tracing::warn!(payload, "ignoring unrecognised change notification");
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(channel = %self.channel, error = %e, "change feed interrupted");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    for collection in Collection::ALL {
                        handler(ChangeNotice {
                            collection,
                            change: ChangeKind::Update,
                            id: None,
                        })
                        .await;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn trigger_payload_maps_to_collection() {
        let Some(notice) = parse_payload(r#"{"table":"confirmed_player","event":"UPDATE","id":42}"#)
        else {
            panic!("payload should parse");
        };
        assert_eq!(notice.collection, Collection::Seats);
        assert_eq!(notice.change, ChangeKind::Update);
        assert_eq!(notice.id, Some(EntityId::new(42)));
    }

    #[test]
    fn unknown_tables_and_garbage_are_ignored() {
        assert!(parse_payload(r#"{"table":"app_user","event":"INSERT","id":1}"#).is_none());
        assert!(parse_payload("not json").is_none());
        assert!(parse_payload(r#"{"table":"player","event":"TRUNCATE"}"#).is_none());
    }

    #[test]
    fn id_is_optional() {
        let notice = parse_payload(r#"{"table":"player","event":"DELETE"}"#);
        assert_eq!(
            notice,
            Some(ChangeNotice {
                collection: Collection::Players,
                change: ChangeKind::Delete,
                id: None,
            })
        );
    }
}
