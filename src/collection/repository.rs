//! Collection store backed by the `collections` table.

use sqlx::{QueryBuilder, SqlitePool};
use uuid::Uuid;

use crate::datetime::now_millis;
use crate::tree::{assign_collection_id_in_place, decode_directories_str, encode_directories};
use crate::tree::{Collection, Node};
use crate::{NoteError, Result};

/// A row of the `collections` table, before the forest is decoded.
#[derive(Debug, Clone, sqlx::FromRow)]
struct CollectionRow {
    id: String,
    name: String,
    directories: String,
    created_at: i64,
    updated_at: i64,
}

impl From<CollectionRow> for Collection {
    fn from(row: CollectionRow) -> Self {
        let mut directories = decode_directories_str(&row.directories);
        assign_collection_id_in_place(&mut directories, &row.id);
        Collection {
            id: row.id,
            name: row.name,
            directories,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Data for creating a new collection.
#[derive(Debug, Clone)]
pub struct NewCollection {
    /// Explicit ID; a fresh UUID is assigned when `None`.
    pub id: Option<String>,
    /// Display name.
    pub name: String,
    /// Initial forest.
    pub directories: Vec<Node>,
}

impl NewCollection {
    /// Create a new, empty collection description.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            directories: Vec::new(),
        }
    }

    /// Set an explicit ID.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the initial forest.
    pub fn with_directories(mut self, directories: Vec<Node>) -> Self {
        self.directories = directories;
        self
    }
}

/// Builder for updating a collection.
#[derive(Debug, Clone, Default)]
pub struct CollectionUpdate {
    /// New name.
    pub name: Option<String>,
    /// Replacement forest, written wholesale.
    pub directories: Option<Vec<Node>>,
}

impl CollectionUpdate {
    /// Create a new CollectionUpdate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the forest.
    pub fn directories(mut self, directories: Vec<Node>) -> Self {
        self.directories = Some(directories);
        self
    }

    /// Check if any fields are set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.directories.is_none()
    }
}

/// Repository for collection operations.
pub struct CollectionRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CollectionRepository<'a> {
    /// Create a new CollectionRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new collection.
    pub async fn create(&self, collection: &NewCollection) -> Result<Collection> {
        let id = collection
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let now = now_millis();

        sqlx::query(
            "INSERT INTO collections (id, name, directories, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&collection.name)
        .bind(encode_directories(&collection.directories))
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await
        .map_err(|e| NoteError::Database(e.to_string()))?;

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| NoteError::NotFound("collection".to_string()))
    }

    /// Get a collection by ID.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Collection>> {
        let row = sqlx::query_as::<_, CollectionRow>(
            "SELECT id, name, directories, created_at, updated_at
             FROM collections WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| NoteError::Database(e.to_string()))?;

        Ok(row.map(Collection::from))
    }

    /// Get the oldest collection with the given name.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Collection>> {
        let row = sqlx::query_as::<_, CollectionRow>(
            "SELECT id, name, directories, created_at, updated_at
             FROM collections WHERE name = ? ORDER BY created_at, rowid LIMIT 1",
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| NoteError::Database(e.to_string()))?;

        Ok(row.map(Collection::from))
    }

    /// List all collections in creation order.
    pub async fn find_all(&self) -> Result<Vec<Collection>> {
        let rows = sqlx::query_as::<_, CollectionRow>(
            "SELECT id, name, directories, created_at, updated_at
             FROM collections ORDER BY created_at, rowid",
        )
        .fetch_all(self.pool)
        .await
        .map_err(|e| NoteError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(Collection::from).collect())
    }

    /// Update a collection.
    ///
    /// Returns the updated collection, or `None` if it does not exist.
    pub async fn update(&self, id: &str, update: &CollectionUpdate) -> Result<Option<Collection>> {
        if update.is_empty() {
            return self.find_by_id(id).await;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE collections SET ");
        let mut separated = query.separated(", ");

        if let Some(ref name) = update.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name);
        }

        if let Some(ref directories) = update.directories {
            separated.push("directories = ");
            separated.push_bind_unseparated(encode_directories(directories));
        }

        separated.push("updated_at = ");
        separated.push_bind_unseparated(now_millis());

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query
            .build()
            .execute(self.pool)
            .await
            .map_err(|e| NoteError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.find_by_id(id).await
    }

    /// Count collections.
    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM collections")
            .fetch_one(self.pool)
            .await
            .map_err(|e| NoteError::Database(e.to_string()))?;
        Ok(count)
    }
}
