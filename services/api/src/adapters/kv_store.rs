//! services/api/src/adapters/kv_store.rs
//!
//! This module contains the storage adapter, the concrete implementation of the
//! `KeyValueStore` port from the `core` crate. Each namespace holds one JSON blob
//! in a SQLite table managed by `sqlx`.

use async_trait::async_trait;
use chrono::Utc;
use course_advisor_core::ports::{KeyValueStore, PortError, PortResult};
use sqlx::{sqlite::SqlitePoolOptions, FromRow, SqlitePool};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A storage adapter that implements the `KeyValueStore` port.
#[derive(Clone)]
pub struct SqliteKvStore {
    pool: SqlitePool,
}

impl SqliteKvStore {
    /// Creates a new `SqliteKvStore`.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens a single-connection in-memory store with migrations applied.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        // One connection: every new in-memory connection is a fresh database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let store = Self::new(pool);
        store.run_migrations().await?;
        Ok(store)
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct KvRecord {
    value: String,
}

//=========================================================================================
// `KeyValueStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl KeyValueStore for SqliteKvStore {
    async fn get(&self, namespace: &str) -> PortResult<Option<String>> {
        let record = sqlx::query_as::<_, KvRecord>(
            "SELECT value FROM kv_store WHERE namespace = ?",
        )
        .bind(namespace)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(record.map(|r| r.value))
    }

    async fn put(&self, namespace: &str, value: &str) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO kv_store (namespace, value, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT (namespace) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(namespace)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }
}
