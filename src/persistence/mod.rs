//! Persistence layer: interchangeable stores for the session collections.
//!
//! Every strategy implements the object-safe [`Store`] trait. Records
//! cross the boundary as JSON documents tagged with their [`Collection`];
//! the session state decodes them into typed records.
//!
//! - [`LocalStore`]: one JSON array file per collection key on local disk.
//! - [`MemoryStore`]: process memory, used when persistence is disabled.
//! - [`PostgresStore`]: typed tables with row-level writes, plus a
//!   `LISTEN/NOTIFY` change feed (see [`change_feed`]).

pub mod change_feed;
pub mod local;
pub mod memory;
pub mod models;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{Collection, EntityId, RowWrite};
use crate::error::TrackerError;

pub use local::LocalStore;
pub use memory::MemoryStore;
pub use models::AppUser;
pub use postgres::PostgresStore;

/// Durable storage for collections, the sound preference and user
/// credentials.
#[async_trait]
pub trait Store: Send + Sync + fmt::Debug {
    /// Loads every record of a collection.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::PersistenceError`] when the backend fails.
    async fn load(&self, collection: Collection) -> Result<Vec<Value>, TrackerError>;

    /// Replaces a whole collection.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::PersistenceError`] when the backend fails.
    async fn save(&self, collection: Collection, records: &[Value]) -> Result<(), TrackerError>;

    /// Inserts or replaces the record with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::PersistenceError`] when the backend fails.
    async fn upsert(
        &self,
        collection: Collection,
        id: EntityId,
        record: &Value,
    ) -> Result<(), TrackerError>;

    /// Deletes the record with the given id. Missing records are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::PersistenceError`] when the backend fails.
    async fn delete(&self, collection: Collection, id: EntityId) -> Result<(), TrackerError>;

    /// Deletes every record of a collection.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::PersistenceError`] when the backend fails.
    async fn clear(&self, collection: Collection) -> Result<(), TrackerError>;

    /// Reads the persisted sound preference, if any was ever saved.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::PersistenceError`] when the backend fails.
    async fn load_sound_enabled(&self) -> Result<Option<bool>, TrackerError>;

    /// Persists the sound preference.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::PersistenceError`] when the backend fails.
    async fn save_sound_enabled(&self, enabled: bool) -> Result<(), TrackerError>;

    /// Looks up a user by exact username and password match.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::PersistenceError`] when the backend fails.
    async fn find_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<AppUser>, TrackerError>;

    /// Creates a user.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::DuplicateUsername`] when the username is
    /// taken, or [`TrackerError::PersistenceError`] when the backend fails.
    async fn create_user(&self, user: &AppUser) -> Result<(), TrackerError>;
}

/// Issues a single row write against a store.
///
/// # Errors
///
/// Propagates the store's error.
pub async fn apply(store: &dyn Store, write: &RowWrite) -> Result<(), TrackerError> {
    match write {
        RowWrite::Put {
            collection,
            id,
            row,
            ..
        } => store.upsert(*collection, *id, row).await,
        RowWrite::Delete { collection, id } => store.delete(*collection, *id).await,
        RowWrite::Clear { collection } => store.clear(*collection).await,
    }
}

/// Reads the `id` field of a stored record.
#[must_use]
pub fn record_id(record: &Value) -> Option<EntityId> {
    record.get("id").and_then(Value::as_i64).map(EntityId::new)
}

/// Replaces the record with matching id in place, or appends it.
pub fn upsert_record(records: &mut Vec<Value>, id: EntityId, record: &Value) {
    match records.iter_mut().find(|r| record_id(r) == Some(id)) {
        Some(existing) => existing.clone_from(record),
        None => records.push(record.clone()),
    }
}

/// Removes the record with matching id.
pub fn remove_record(records: &mut Vec<Value>, id: EntityId) {
    records.retain(|r| record_id(r) != Some(id));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn upsert_replaces_matching_id() {
        let mut records = vec![json!({"id": 1, "name": "a"}), json!({"id": 2, "name": "b"})];
        upsert_record(&mut records, EntityId::new(2), &json!({"id": 2, "name": "B"}));
        upsert_record(&mut records, EntityId::new(3), &json!({"id": 3, "name": "c"}));
        assert_eq!(records.len(), 3);
        assert_eq!(records.get(1), Some(&json!({"id": 2, "name": "B"})));
    }

    #[test]
    fn remove_ignores_missing_ids() {
        let mut records = vec![json!({"id": 1})];
        remove_record(&mut records, EntityId::new(9));
        assert_eq!(records.len(), 1);
        remove_record(&mut records, EntityId::new(1));
        assert!(records.is_empty());
    }
}
