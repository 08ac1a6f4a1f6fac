//! Local-disk store: one JSON document per storage key.
//!
//! Each collection lives in `{data_dir}/{key}_{suffix}.json` as a JSON
//! array, e.g. `pokerData_v33.json`. Bumping the suffix starts from a
//! clean slate without touching old files. Writes go to a temporary file
//! first and are renamed into place.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;

use super::{AppUser, Store, remove_record, upsert_record};
use crate::domain::{Collection, EntityId};
use crate::error::TrackerError;

const USERS_KEY: &str = "pokerUsers";
const SOUND_KEY: &str = "pokerSound";

/// JSON-file store rooted at a data directory.
#[derive(Debug)]
pub struct LocalStore {
    data_dir: PathBuf,
    suffix: String,
    /// Serializes read-modify-write cycles.
    write_lock: Mutex<()>,
}

impl LocalStore {
    /// Creates a store rooted at `data_dir`, appending `suffix` to every
    /// key.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            suffix: suffix.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// File path backing a storage key.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{key}_{}.json", self.suffix))
    }

    async fn read_key<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, TrackerError> {
        let path = self.path_for(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                TrackerError::PersistenceError(format!("corrupt {}: {e}", path.display()))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_key<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), TrackerError> {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| TrackerError::Internal(format!("cannot encode {key}: {e}")))?;
        tokio::fs::create_dir_all(&self.data_dir).await?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        tracing::debug!(path = %path.display(), "wrote local storage key");
        Ok(())
    }

    async fn modify<F>(&self, collection: Collection, f: F) -> Result<(), TrackerError>
    where
        F: FnOnce(&mut Vec<Value>) + Send,
    {
        let _guard = self.write_lock.lock().await;
        let key = collection.storage_key();
        let mut records: Vec<Value> = self.read_key(key).await?;
        f(&mut records);
        self.write_key(key, &records).await
    }

    /// Root directory of the store.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[async_trait]
impl Store for LocalStore {
    async fn load(&self, collection: Collection) -> Result<Vec<Value>, TrackerError> {
        self.read_key(collection.storage_key()).await
    }

    async fn save(&self, collection: Collection, records: &[Value]) -> Result<(), TrackerError> {
        let _guard = self.write_lock.lock().await;
        self.write_key(collection.storage_key(), records).await
    }

    async fn upsert(
        &self,
        collection: Collection,
        id: EntityId,
        record: &Value,
    ) -> Result<(), TrackerError> {
        self.modify(collection, |records| upsert_record(records, id, record))
            .await
    }

    async fn delete(&self, collection: Collection, id: EntityId) -> Result<(), TrackerError> {
        self.modify(collection, |records| remove_record(records, id))
            .await
    }

    async fn clear(&self, collection: Collection) -> Result<(), TrackerError> {
        self.save(collection, &[]).await
    }

    async fn load_sound_enabled(&self) -> Result<Option<bool>, TrackerError> {
        self.read_key(SOUND_KEY).await
    }

    async fn save_sound_enabled(&self, enabled: bool) -> Result<(), TrackerError> {
        let _guard = self.write_lock.lock().await;
        self.write_key(SOUND_KEY, &enabled).await
    }

    async fn find_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<AppUser>, TrackerError> {
        let users: Vec<AppUser> = self.read_key(USERS_KEY).await?;
        Ok(users
            .into_iter()
            .find(|u| u.username == username && u.password == password))
    }

    async fn create_user(&self, user: &AppUser) -> Result<(), TrackerError> {
        let _guard = self.write_lock.lock().await;
        let mut users: Vec<AppUser> = self.read_key(USERS_KEY).await?;
        if users.iter().any(|u| u.username == user.username) {
            return Err(TrackerError::DuplicateUsername(user.username.clone()));
        }
        users.push(user.clone());
        self.write_key(USERS_KEY, &users).await
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_store() -> (tempfile::TempDir, LocalStore) {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("cannot create temp dir");
        };
        let store = LocalStore::new(dir.path(), "v33");
        (dir, store)
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let (_dir, store) = temp_store();
        let Ok(records) = store.load(Collection::Players).await else {
            panic!("load should succeed");
        };
        assert!(records.is_empty());
        let Ok(sound) = store.load_sound_enabled().await else {
            panic!("load should succeed");
        };
        assert_eq!(sound, None);
    }

    #[tokio::test]
    async fn keys_are_versioned() {
        let (dir, store) = temp_store();
        tokio_test::assert_ok!(
            store
                .upsert(Collection::Players, EntityId::new(1), &json!({"id": 1}))
                .await
        );
        assert!(dir.path().join("pokerData_v33.json").exists());
        assert_eq!(
            store.path_for("pokerConfirmed"),
            dir.path().join("pokerConfirmed_v33.json")
        );
    }

    #[tokio::test]
    async fn upsert_delete_and_clear_persist() {
        let (_dir, store) = temp_store();
        tokio_test::assert_ok!(
            store
                .upsert(Collection::Schedule, EntityId::new(1), &json!({"id": 1, "title": "a"}))
                .await
        );
        tokio_test::assert_ok!(
            store
                .upsert(Collection::Schedule, EntityId::new(2), &json!({"id": 2, "title": "b"}))
                .await
        );
        tokio_test::assert_ok!(store.delete(Collection::Schedule, EntityId::new(1)).await);
        let Ok(records) = store.load(Collection::Schedule).await else {
            panic!("load should succeed");
        };
        assert_eq!(records, vec![json!({"id": 2, "title": "b"})]);

        tokio_test::assert_ok!(store.clear(Collection::Schedule).await);
        let Ok(records) = store.load(Collection::Schedule).await else {
            panic!("load should succeed");
        };
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_is_a_persistence_error() {
        let (dir, store) = temp_store();
        let Ok(()) = std::fs::write(dir.path().join("pokerSessions_v33.json"), b"{not json") else {
            panic!("cannot write fixture");
        };
        assert!(matches!(
            store.load(Collection::Sessions).await,
            Err(TrackerError::PersistenceError(_))
        ));
    }

    #[tokio::test]
    async fn users_and_preferences_survive_reopen() {
        let (dir, store) = temp_store();
        let user = AppUser {
            username: "beto".to_string(),
            password: "123".to_string(),
            is_admin: false,
        };
        tokio_test::assert_ok!(store.create_user(&user).await);
        tokio_test::assert_ok!(store.save_sound_enabled(false).await);

        let reopened = LocalStore::new(dir.path(), "v33");
        let Ok(found) = reopened.find_user("beto", "123").await else {
            panic!("lookup should succeed");
        };
        assert_eq!(found, Some(user));
        let Ok(sound) = reopened.load_sound_enabled().await else {
            panic!("load should succeed");
        };
        assert_eq!(sound, Some(false));
    }
}
