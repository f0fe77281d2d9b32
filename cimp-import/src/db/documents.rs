//! Actor and item documents in SQLite
//!
//! The stored actor name is the trimmed input name; that is the name handed
//! back in the `EntityHandle`. Items of one batch are written in a single
//! transaction, in input order.

use crate::record::{ActorPayload, EntityHandle, ItemRecord};
use crate::store::{DocumentStore, StoreError};
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

/// Name stored for items that carry none
pub const UNNAMED_ITEM: &str = "Unnamed Item";

/// Actor row
#[derive(Debug, Clone, PartialEq)]
pub struct StoredActor {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub document: Value,
    pub created_at: String,
}

/// Item row
#[derive(Debug, Clone, PartialEq)]
pub struct StoredItem {
    pub id: String,
    pub actor_id: String,
    pub position: i64,
    pub name: String,
    pub kind: Option<String>,
    pub document: Value,
}

/// `DocumentStore` over a SQLite pool
#[derive(Debug, Clone)]
pub struct SqliteDocumentStore {
    db: SqlitePool,
}

impl SqliteDocumentStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db
    }

    /// Load one actor by id
    pub async fn get_actor(&self, id: &str) -> Result<Option<StoredActor>, StoreError> {
        let row = sqlx::query_as::<_, (String, String, String, String, String)>(
            "SELECT id, name, kind, document, created_at FROM actors WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.map(|(id, name, kind, document, created_at)| {
            Ok(StoredActor {
                id,
                name,
                kind,
                document: serde_json::from_str(&document)?,
                created_at,
            })
        })
        .transpose()
    }

    /// Items owned by `actor_id`, in input order
    pub async fn list_items(&self, actor_id: &str) -> Result<Vec<StoredItem>, StoreError> {
        let rows = sqlx::query_as::<_, (String, String, i64, String, Option<String>, String)>(
            r#"
            SELECT id, actor_id, position, name, kind, document
            FROM items
            WHERE actor_id = ?
            ORDER BY position
            "#,
        )
        .bind(actor_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter()
            .map(|(id, actor_id, position, name, kind, document)| {
                Ok(StoredItem {
                    id,
                    actor_id,
                    position,
                    name,
                    kind,
                    document: serde_json::from_str(&document)?,
                })
            })
            .collect()
    }

    pub async fn count_actors(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM actors")
            .fetch_one(&self.db)
            .await?;
        Ok(count)
    }

    async fn actor_exists(&self, id: &str) -> Result<bool, StoreError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM actors WHERE id = ?)")
                .bind(id)
                .fetch_one(&self.db)
                .await?;
        Ok(exists)
    }
}

#[async_trait::async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn create_entity(
        &self,
        payload: &ActorPayload,
    ) -> Result<Option<EntityHandle>, StoreError> {
        let name = payload.name.trim();
        if name.is_empty() {
            return Err(StoreError::Rejected("actor name is empty".to_string()));
        }

        let id = Uuid::new_v4().to_string();
        let mut document = payload.to_value();
        document["name"] = Value::String(name.to_string());
        let document = serde_json::to_string(&document)?;

        sqlx::query(
            "INSERT INTO actors (id, name, kind, document, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(name)
        .bind(&payload.kind)
        .bind(&document)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.db)
        .await?;

        debug!("Stored actor {} ({} bytes)", id, document.len());
        Ok(Some(EntityHandle::new(id, name)))
    }

    async fn create_child_entities(
        &self,
        payloads: &[ItemRecord],
        parent: &EntityHandle,
    ) -> Result<Vec<EntityHandle>, StoreError> {
        if !self.actor_exists(&parent.id).await? {
            return Err(StoreError::ParentNotFound(parent.id.clone()));
        }
        if let Some(position) = payloads.iter().position(|item| item.as_object().is_none()) {
            return Err(StoreError::Rejected(format!("item {} is not a mapping", position)));
        }

        let mut tx = self.db.begin().await?;
        let mut handles = Vec::with_capacity(payloads.len());
        let timestamp = chrono::Utc::now().to_rfc3339();

        for (position, item) in payloads.iter().enumerate() {
            let id = Uuid::new_v4().to_string();
            let name = item
                .name()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .unwrap_or(UNNAMED_ITEM);
            let document = serde_json::to_string(&item.0)?;

            sqlx::query(
                r#"
                INSERT INTO items (id, actor_id, position, name, kind, document, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&id)
            .bind(&parent.id)
            .bind(position as i64)
            .bind(name)
            .bind(item.kind())
            .bind(&document)
            .bind(&timestamp)
            .execute(&mut *tx)
            .await?;

            handles.push(EntityHandle::new(id, name));
        }

        tx.commit().await?;

        info!("Stored {} items for actor {}", handles.len(), parent.id);
        Ok(handles)
    }
}
