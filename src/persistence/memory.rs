//! Process-memory store.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{AppUser, Store, remove_record, upsert_record};
use crate::domain::{Collection, EntityId};
use crate::error::TrackerError;

#[derive(Debug, Default)]
struct Inner {
    collections: HashMap<Collection, Vec<Value>>,
    sound_enabled: Option<bool>,
    users: Vec<AppUser>,
}

/// Store that keeps everything in memory and forgets it on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn load(&self, collection: Collection) -> Result<Vec<Value>, TrackerError> {
        let inner = self.inner.read().await;
        Ok(inner
            .collections
            .get(&collection)
            .cloned()
            .unwrap_or_default())
    }

    async fn save(&self, collection: Collection, records: &[Value]) -> Result<(), TrackerError> {
        let mut inner = self.inner.write().await;
        inner.collections.insert(collection, records.to_vec());
        Ok(())
    }

    async fn upsert(
        &self,
        collection: Collection,
        id: EntityId,
        record: &Value,
    ) -> Result<(), TrackerError> {
        let mut inner = self.inner.write().await;
        upsert_record(inner.collections.entry(collection).or_default(), id, record);
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: EntityId) -> Result<(), TrackerError> {
        let mut inner = self.inner.write().await;
        if let Some(records) = inner.collections.get_mut(&collection) {
            remove_record(records, id);
        }
        Ok(())
    }

    async fn clear(&self, collection: Collection) -> Result<(), TrackerError> {
        let mut inner = self.inner.write().await;
        inner.collections.remove(&collection);
        Ok(())
    }

    async fn load_sound_enabled(&self) -> Result<Option<bool>, TrackerError> {
        Ok(self.inner.read().await.sound_enabled)
    }

    async fn save_sound_enabled(&self, enabled: bool) -> Result<(), TrackerError> {
        self.inner.write().await.sound_enabled = Some(enabled);
        Ok(())
    }

    async fn find_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<AppUser>, TrackerError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .iter()
            .find(|u| u.username == username && u.password == password)
            .cloned())
    }

    async fn create_user(&self, user: &AppUser) -> Result<(), TrackerError> {
        let mut inner = self.inner.write().await;
        if inner.users.iter().any(|u| u.username == user.username) {
            return Err(TrackerError::DuplicateUsername(user.username.clone()));
        }
        inner.users.push(user.clone());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn row_writes_update_the_collection() {
        let store = MemoryStore::new();
        let id = EntityId::new(7);
        let Ok(()) = store
            .upsert(Collection::Visitors, id, &json!({"id": 7, "name": "Rui"}))
            .await
        else {
            panic!("upsert should succeed");
        };
        let Ok(records) = store.load(Collection::Visitors).await else {
            panic!("load should succeed");
        };
        assert_eq!(records.len(), 1);

        let Ok(()) = store.delete(Collection::Visitors, id).await else {
            panic!("delete should succeed");
        };
        let Ok(records) = store.load(Collection::Visitors).await else {
            panic!("load should succeed");
        };
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let store = MemoryStore::new();
        let user = AppUser {
            username: "ana".to_string(),
            password: "x".to_string(),
            is_admin: false,
        };
        tokio_test::assert_ok!(store.create_user(&user).await);
        assert!(matches!(
            store.create_user(&user).await,
            Err(TrackerError::DuplicateUsername(_))
        ));
    }

    #[tokio::test]
    async fn login_requires_exact_password() {
        let store = MemoryStore::new();
        let user = AppUser {
            username: "ana".to_string(),
            password: "segredo".to_string(),
            is_admin: true,
        };
        tokio_test::assert_ok!(store.create_user(&user).await);
        let Ok(found) = store.find_user("ana", "segredo").await else {
            panic!("lookup should succeed");
        };
        assert_eq!(found, Some(user));
        let Ok(missing) = store.find_user("ana", "Segredo").await else {
            panic!("lookup should succeed");
        };
        assert!(missing.is_none());
    }
}
