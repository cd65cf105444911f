use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::Row;
use tokio::sync::RwLock;

use crate::repositories::RepositoryError;
use crate::DbPool;

pub const MATERIALS_COLLECTION: &str = "materials";
pub const QUOTES_COLLECTION: &str = "quotes";
pub const CLIENTS_COLLECTION: &str = "clients";

/// Keyed whole-collection storage, the durable medium behind every
/// repository. Collections are JSON payloads written and read as a unit;
/// there is no per-record schema below this interface.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<String>, RepositoryError>;
    async fn save(&self, key: &str, payload: &str) -> Result<(), RepositoryError>;
}

pub struct SqliteCollectionStore {
    pool: DbPool,
}

impl SqliteCollectionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CollectionStore for SqliteCollectionStore {
    async fn load(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        let row = sqlx::query("SELECT payload FROM collections WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| row.get::<String, _>("payload")))
    }

    async fn save(&self, key: &str, payload: &str) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO collections (key, payload, updated_at)
             VALUES (?1, ?2, CURRENT_TIMESTAMP)
             ON CONFLICT (key) DO UPDATE
             SET payload = excluded.payload, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(payload)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryCollectionStore {
    collections: RwLock<HashMap<String, String>>,
}

#[async_trait]
impl CollectionStore for InMemoryCollectionStore {
    async fn load(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        let collections = self.collections.read().await;
        Ok(collections.get(key).cloned())
    }

    async fn save(&self, key: &str, payload: &str) -> Result<(), RepositoryError> {
        let mut collections = self.collections.write().await;
        collections.insert(key.to_string(), payload.to_string());
        Ok(())
    }
}
