//! PostgreSQL implementation of the persistence layer.
//!
//! Each collection maps to a typed table (see `migrations/`). Writes are
//! row-level upserts and deletes; a trigger on every table publishes a
//! `NOTIFY` that [`super::change_feed`] turns into resyncs.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgConnection, PgPool};

use super::models::{
    NotificationRow, PlayerRow, ScheduleRow, SeatRow, SessionRow, VisitorRow,
};
use super::{AppUser, Store};
use crate::config::TrackerConfig;
use crate::domain::{
    Collection, EntityId, Notification, Player, ScheduleEntry, SeatAssignment, SessionRecord,
    Visitor,
};
use crate::error::TrackerError;

const SOUND_PREFERENCE: &str = "sound_enabled";

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool sized from the configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`TrackerError::PersistenceError`] when the database is
    /// unreachable.
    pub async fn connect(config: &TrackerConfig) -> Result<Self, TrackerError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Runs the embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`TrackerError::PersistenceError`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), TrackerError> {
        sqlx::migrate!()
            .run(&self.pool)
            .await
            .map_err(|e| TrackerError::PersistenceError(e.to_string()))
    }

    /// Underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn decode<T: DeserializeOwned>(collection: Collection, record: &Value) -> Result<T, TrackerError> {
    T::deserialize(record).map_err(|e| {
        TrackerError::Internal(format!("malformed {collection} record: {e}"))
    })
}

fn encode<T: Serialize>(collection: Collection, value: &T) -> Result<Value, TrackerError> {
    serde_json::to_value(value)
        .map_err(|e| TrackerError::Internal(format!("cannot encode {collection} record: {e}")))
}

fn encode_all<T: Serialize>(collection: Collection, values: &[T]) -> Result<Vec<Value>, TrackerError> {
    values.iter().map(|v| encode(collection, v)).collect()
}

async fn upsert_row(
    conn: &mut PgConnection,
    collection: Collection,
    record: &Value,
) -> Result<(), TrackerError> {
    match collection {
        Collection::Players => {
            let row = PlayerRow::from(&decode::<Player>(collection, record)?);
            sqlx::query(
                "INSERT INTO player (id, name, buy_in, rebuy, cash_out, start_time, end_time, status, photo, is_dealer) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
                 ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, buy_in = EXCLUDED.buy_in, \
                 rebuy = EXCLUDED.rebuy, cash_out = EXCLUDED.cash_out, start_time = EXCLUDED.start_time, \
                 end_time = EXCLUDED.end_time, status = EXCLUDED.status, photo = EXCLUDED.photo, \
                 is_dealer = EXCLUDED.is_dealer",
            )
            .bind(row.id)
            .bind(row.name)
            .bind(row.buy_in)
            .bind(row.rebuy)
            .bind(row.cash_out)
            .bind(row.start_time)
            .bind(row.end_time)
            .bind(row.status)
            .bind(row.photo)
            .bind(row.is_dealer)
            .execute(&mut *conn)
            .await?;
        }
        Collection::Seats => {
            let row = SeatRow::from(&decode::<SeatAssignment>(collection, record)?);
            sqlx::query(
                "INSERT INTO confirmed_player (id, name, photo, seat, is_dealer) \
                 VALUES ($1, $2, $3, $4, $5) \
                 ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, photo = EXCLUDED.photo, \
                 seat = EXCLUDED.seat, is_dealer = EXCLUDED.is_dealer",
            )
            .bind(row.id)
            .bind(row.name)
            .bind(row.photo)
            .bind(row.seat)
            .bind(row.is_dealer)
            .execute(&mut *conn)
            .await?;
        }
        Collection::Schedule => {
            let row = ScheduleRow::from(&decode::<ScheduleEntry>(collection, record)?);
            sqlx::query(
                "INSERT INTO schedule_item (id, title, date) VALUES ($1, $2, $3) \
                 ON CONFLICT (id) DO UPDATE SET title = EXCLUDED.title, date = EXCLUDED.date",
            )
            .bind(row.id)
            .bind(row.title)
            .bind(row.date)
            .execute(&mut *conn)
            .await?;
        }
        Collection::Sessions => {
            let row = SessionRow::from(&decode::<SessionRecord>(collection, record)?);
            sqlx::query(
                "INSERT INTO session_record (id, date, total_in, total_out, balance, player_count) \
                 VALUES ($1, $2, $3, $4, $5, $6) \
                 ON CONFLICT (id) DO UPDATE SET date = EXCLUDED.date, total_in = EXCLUDED.total_in, \
                 total_out = EXCLUDED.total_out, balance = EXCLUDED.balance, \
                 player_count = EXCLUDED.player_count",
            )
            .bind(row.id)
            .bind(row.date)
            .bind(row.total_in)
            .bind(row.total_out)
            .bind(row.balance)
            .bind(row.player_count)
            .execute(&mut *conn)
            .await?;
        }
        Collection::Notifications => {
            let row = NotificationRow::from(&decode::<Notification>(collection, record)?);
            sqlx::query(
                "INSERT INTO notification (id, message, kind, read, date) VALUES ($1, $2, $3, $4, $5) \
                 ON CONFLICT (id) DO UPDATE SET message = EXCLUDED.message, kind = EXCLUDED.kind, \
                 read = EXCLUDED.read, date = EXCLUDED.date",
            )
            .bind(row.id)
            .bind(row.message)
            .bind(row.kind)
            .bind(row.read)
            .bind(row.date)
            .execute(&mut *conn)
            .await?;
        }
        Collection::Visitors => {
            let row = VisitorRow::from(&decode::<Visitor>(collection, record)?);
            sqlx::query(
                "INSERT INTO visitor (id, name, since) VALUES ($1, $2, $3) \
                 ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, since = EXCLUDED.since",
            )
            .bind(row.id)
            .bind(row.name)
            .bind(row.since)
            .execute(&mut *conn)
            .await?;
        }
    }
    Ok(())
}

#[async_trait]
impl Store for PostgresStore {
    async fn load(&self, collection: Collection) -> Result<Vec<Value>, TrackerError> {
        match collection {
            Collection::Players => {
                let rows = sqlx::query_as::<_, PlayerRow>(
                    "SELECT id, name, buy_in, rebuy, cash_out, start_time, end_time, status, photo, is_dealer \
                     FROM player ORDER BY id DESC",
                )
                .fetch_all(&self.pool)
                .await?;
                let players = rows
                    .into_iter()
                    .map(Player::try_from)
                    .collect::<Result<Vec<_>, _>>()?;
                encode_all(collection, &players)
            }
            Collection::Seats => {
                let rows = sqlx::query_as::<_, SeatRow>(
                    "SELECT id, name, photo, seat, is_dealer FROM confirmed_player ORDER BY seat",
                )
                .fetch_all(&self.pool)
                .await?;
                let seats = rows
                    .into_iter()
                    .map(SeatAssignment::try_from)
                    .collect::<Result<Vec<_>, _>>()?;
                encode_all(collection, &seats)
            }
            Collection::Schedule => {
                let rows = sqlx::query_as::<_, ScheduleRow>(
                    "SELECT id, title, date FROM schedule_item ORDER BY id",
                )
                .fetch_all(&self.pool)
                .await?;
                let entries: Vec<ScheduleEntry> = rows.into_iter().map(Into::into).collect();
                encode_all(collection, &entries)
            }
            Collection::Sessions => {
                let rows = sqlx::query_as::<_, SessionRow>(
                    "SELECT id, date, total_in, total_out, balance, player_count \
                     FROM session_record ORDER BY id DESC",
                )
                .fetch_all(&self.pool)
                .await?;
                let sessions: Vec<SessionRecord> = rows.into_iter().map(Into::into).collect();
                encode_all(collection, &sessions)
            }
            Collection::Notifications => {
                let rows = sqlx::query_as::<_, NotificationRow>(
                    "SELECT id, message, kind, read, date FROM notification ORDER BY id DESC",
                )
                .fetch_all(&self.pool)
                .await?;
                let log: Vec<Notification> = rows.into_iter().map(Into::into).collect();
                encode_all(collection, &log)
            }
            Collection::Visitors => {
                let rows = sqlx::query_as::<_, VisitorRow>(
                    "SELECT id, name, since FROM visitor ORDER BY id",
                )
                .fetch_all(&self.pool)
                .await?;
                let visitors: Vec<Visitor> = rows.into_iter().map(Into::into).collect();
                encode_all(collection, &visitors)
            }
        }
    }

    async fn save(&self, collection: Collection, records: &[Value]) -> Result<(), TrackerError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(&format!("DELETE FROM {}", collection.table_name()))
            .execute(&mut *tx)
            .await?;
        for record in records {
            upsert_row(&mut *tx, collection, record).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn upsert(
        &self,
        collection: Collection,
        id: EntityId,
        record: &Value,
    ) -> Result<(), TrackerError> {
        let mut conn = self.pool.acquire().await?;
        upsert_row(&mut *conn, collection, record).await?;
        tracing::debug!(%collection, %id, "row upserted");
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: EntityId) -> Result<(), TrackerError> {
        sqlx::query(&format!("DELETE FROM {} WHERE id = $1", collection.table_name()))
            .bind(id.get())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn clear(&self, collection: Collection) -> Result<(), TrackerError> {
        sqlx::query(&format!("DELETE FROM {}", collection.table_name()))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn load_sound_enabled(&self) -> Result<Option<bool>, TrackerError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM preference WHERE key = $1")
            .bind(SOUND_PREFERENCE)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value.map(|v| v == "true"))
    }

    async fn save_sound_enabled(&self, enabled: bool) -> Result<(), TrackerError> {
        sqlx::query(
            "INSERT INTO preference (key, value) VALUES ($1, $2) \
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value",
        )
        .bind(SOUND_PREFERENCE)
        .bind(enabled.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<AppUser>, TrackerError> {
        let user = sqlx::query_as::<_, AppUser>(
            "SELECT username, password, is_admin FROM app_user WHERE username = $1 AND password = $2",
        )
        .bind(username)
        .bind(password)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, user: &AppUser) -> Result<(), TrackerError> {
        let result = sqlx::query("INSERT INTO app_user (username, password, is_admin) VALUES ($1, $2, $3)")
            .bind(&user.username)
            .bind(&user.password)
            .bind(user.is_admin)
            .execute(&self.pool)
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(TrackerError::DuplicateUsername(user.username.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
