//! File records and their repository.

use serde::Serialize;
use sqlx::{QueryBuilder, SqlitePool};
use tracing::warn;
use uuid::Uuid;

use crate::datetime::now_millis;
use crate::tree::Tag;
use crate::{NoteError, Result};

/// A stored file: the editable payload behind a file node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Unique file ID, shared with the file's tree node.
    pub id: String,
    /// Owning collection.
    pub collection_id: Option<String>,
    /// File name.
    pub name: String,
    /// Markdown content.
    pub content: Option<String>,
    /// Icon identifier.
    pub icon: Option<String>,
    /// Tags, in display order.
    pub tags: Vec<Tag>,
    /// Creation time (epoch millis).
    pub created_at: i64,
    /// Last modification time (epoch millis).
    pub updated_at: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct FileRow {
    id: String,
    collection_id: Option<String>,
    name: String,
    content: Option<String>,
    icon: Option<String>,
    tags: String,
    created_at: i64,
    updated_at: i64,
}

impl From<FileRow> for FileRecord {
    fn from(row: FileRow) -> Self {
        let tags = decode_tags(&row.id, &row.tags);
        FileRecord {
            id: row.id,
            collection_id: row.collection_id,
            name: row.name,
            content: row.content,
            icon: row.icon,
            tags,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn decode_tags(file_id: &str, raw: &str) -> Vec<Tag> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!(file_id, error = %e, "Unreadable tags column, treating as empty");
        Vec::new()
    })
}

fn encode_tags(tags: &[Tag]) -> Result<String> {
    serde_json::to_string(tags).map_err(|e| NoteError::Validation(format!("invalid tags: {e}")))
}

/// Data for creating a new file record.
#[derive(Debug, Clone, Default)]
pub struct NewFile {
    /// Explicit ID; a fresh UUID is assigned when `None`.
    pub id: Option<String>,
    /// Collection the file is saved into.
    pub collection_id: Option<String>,
    /// File name.
    pub name: String,
    /// Initial content.
    pub content: Option<String>,
    /// Icon identifier.
    pub icon: Option<String>,
    /// Initial tags.
    pub tags: Vec<Tag>,
}

impl NewFile {
    /// Create a new NewFile.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set an explicit ID.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the collection.
    pub fn with_collection(mut self, collection_id: impl Into<String>) -> Self {
        self.collection_id = Some(collection_id.into());
        self
    }

    /// Set the content.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Set the icon.
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Set the tags.
    pub fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = tags;
        self
    }
}

/// Builder for updating a file record.
#[derive(Debug, Clone, Default)]
pub struct FileUpdate {
    /// New name.
    pub name: Option<String>,
    /// New content (`Some(None)` clears it).
    pub content: Option<Option<String>>,
    /// New icon (`Some(None)` resets to the default).
    pub icon: Option<Option<String>>,
    /// Replacement tag list.
    pub tags: Option<Vec<Tag>>,
}

impl FileUpdate {
    /// Create a new FileUpdate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the content.
    pub fn content(mut self, content: Option<impl Into<String>>) -> Self {
        self.content = Some(content.map(|s| s.into()));
        self
    }

    /// Set the icon.
    pub fn icon(mut self, icon: Option<impl Into<String>>) -> Self {
        self.icon = Some(icon.map(|s| s.into()));
        self
    }

    /// Set the tags.
    pub fn tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Check if any fields are set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.content.is_none() && self.icon.is_none() && self.tags.is_none()
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, collection_id, name, content, icon, tags, created_at, updated_at FROM files";

/// Repository for file record operations.
pub struct FileRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FileRepository<'a> {
    /// Create a new FileRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new file record.
    pub async fn create(&self, file: &NewFile) -> Result<FileRecord> {
        let id = file
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let now = now_millis();

        sqlx::query(
            "INSERT INTO files
                 (id, collection_id, name, content, icon, tags, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&file.collection_id)
        .bind(&file.name)
        .bind(&file.content)
        .bind(&file.icon)
        .bind(encode_tags(&file.tags)?)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await
        .map_err(|e| NoteError::Database(e.to_string()))?;

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| NoteError::NotFound("file".to_string()))
    }

    /// Get a file by ID.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<FileRecord>> {
        let row = sqlx::query_as::<_, FileRow>(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| NoteError::Database(e.to_string()))?;

        Ok(row.map(FileRecord::from))
    }

    /// List the files of a collection, oldest first.
    pub async fn list_by_collection(&self, collection_id: &str) -> Result<Vec<FileRecord>> {
        let rows = sqlx::query_as::<_, FileRow>(&format!(
            "{SELECT_COLUMNS} WHERE collection_id = ? ORDER BY created_at, rowid"
        ))
        .bind(collection_id)
        .fetch_all(self.pool)
        .await
        .map_err(|e| NoteError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(FileRecord::from).collect())
    }

    /// Update a file record.
    ///
    /// Returns the updated record, or `None` if it does not exist.
    pub async fn update(&self, id: &str, update: &FileUpdate) -> Result<Option<FileRecord>> {
        if update.is_empty() {
            return self.find_by_id(id).await;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE files SET ");
        let mut separated = query.separated(", ");

        if let Some(ref name) = update.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name);
        }

        if let Some(ref content) = update.content {
            separated.push("content = ");
            separated.push_bind_unseparated(content);
        }

        if let Some(ref icon) = update.icon {
            separated.push("icon = ");
            separated.push_bind_unseparated(icon);
        }

        if let Some(ref tags) = update.tags {
            separated.push("tags = ");
            separated.push_bind_unseparated(encode_tags(tags)?);
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

    /// Set the icon of a file, stamping `updated_at` with the caller's timestamp.
    pub async fn update_icon(
        &self,
        id: &str,
        icon: &str,
        timestamp: i64,
    ) -> Result<Option<FileRecord>> {
        let result = sqlx::query("UPDATE files SET icon = ?, updated_at = ? WHERE id = ?")
            .bind(icon)
            .bind(timestamp)
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| NoteError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.find_by_id(id).await
    }

    /// Replace the tag list of a file.
    pub async fn update_tags(&self, id: &str, tags: &[Tag]) -> Result<Option<FileRecord>> {
        self.update(id, &FileUpdate::new().tags(tags.to_vec())).await
    }

    /// Write every editable field of `record` back, `updated_at` included.
    ///
    /// Returns `false` if the file no longer exists.
    pub async fn restore(&self, record: &FileRecord) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE files SET name = ?, content = ?, icon = ?, tags = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&record.name)
        .bind(&record.content)
        .bind(&record.icon)
        .bind(encode_tags(&record.tags)?)
        .bind(record.updated_at)
        .bind(&record.id)
        .execute(self.pool)
        .await
        .map_err(|e| NoteError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a file by ID.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| NoteError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Count files in a collection.
    pub async fn count_by_collection(&self, collection_id: &str) -> Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM files WHERE collection_id = ?")
                .bind(collection_id)
                .fetch_one(self.pool)
                .await
                .map_err(|e| NoteError::Database(e.to_string()))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn test_create_file() {
        let db = setup_db().await;
        let repo = FileRepository::new(db.pool());

        let new_file = NewFile::new("notes.md")
            .with_collection("c1")
            .with_content("# Notes")
            .with_tags(vec![Tag::new("todo", "#f44336")]);
        let file = repo.create(&new_file).await.unwrap();

        assert_eq!(file.name, "notes.md");
        assert_eq!(file.collection_id.as_deref(), Some("c1"));
        assert_eq!(file.content.as_deref(), Some("# Notes"));
        assert_eq!(file.tags.len(), 1);
        assert_eq!(file.tags[0].label, "todo");
        assert!(file.icon.is_none());
        assert_eq!(file.created_at, file.updated_at);
    }

    #[tokio::test]
    async fn test_create_with_explicit_id() {
        let db = setup_db().await;
        let repo = FileRepository::new(db.pool());

        let file = repo.create(&NewFile::new("a.md").with_id("f1")).await.unwrap();
        assert_eq!(file.id, "f1");
        assert!(repo.find_by_id("f1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_find_by_id_not_found() {
        let db = setup_db().await;
        let repo = FileRepository::new(db.pool());
        assert!(repo.find_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_by_collection() {
        let db = setup_db().await;
        let repo = FileRepository::new(db.pool());

        repo.create(&NewFile::new("a.md").with_collection("c1")).await.unwrap();
        repo.create(&NewFile::new("b.md").with_collection("c1")).await.unwrap();
        repo.create(&NewFile::new("c.md").with_collection("c2")).await.unwrap();

        let files = repo.list_by_collection("c1").await.unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].name, "a.md");
        assert_eq!(files[1].name, "b.md");
        assert_eq!(repo.count_by_collection("c2").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_file() {
        let db = setup_db().await;
        let repo = FileRepository::new(db.pool());
        let file = repo
            .create(&NewFile::new("a.md").with_content("old"))
            .await
            .unwrap();

        let update = FileUpdate::new().name("b.md").content(Some("new"));
        let updated = repo.update(&file.id, &update).await.unwrap().unwrap();

        assert_eq!(updated.name, "b.md");
        assert_eq!(updated.content.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_update_clears_content() {
        let db = setup_db().await;
        let repo = FileRepository::new(db.pool());
        let file = repo
            .create(&NewFile::new("a.md").with_content("text"))
            .await
            .unwrap();

        let update = FileUpdate::new().content(None::<String>);
        let updated = repo.update(&file.id, &update).await.unwrap().unwrap();
        assert!(updated.content.is_none());
    }

    #[tokio::test]
    async fn test_update_not_found() {
        let db = setup_db().await;
        let repo = FileRepository::new(db.pool());

        let result = repo
            .update("missing", &FileUpdate::new().name("x.md"))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_update_icon_uses_given_timestamp() {
        let db = setup_db().await;
        let repo = FileRepository::new(db.pool());
        let file = repo.create(&NewFile::new("a.md")).await.unwrap();

        let updated = repo
            .update_icon(&file.id, "star", 1_700_000_000_000)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.icon.as_deref(), Some("star"));
        assert_eq!(updated.updated_at, 1_700_000_000_000);

        assert!(repo.update_icon("missing", "star", 0).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_tags() {
        let db = setup_db().await;
        let repo = FileRepository::new(db.pool());
        let file = repo
            .create(&NewFile::new("a.md").with_tags(vec![Tag::new("old", "#9e9e9e")]))
            .await
            .unwrap();

        let tags = vec![Tag::new("idea", "#4caf50"), Tag::new("work", "#2196f3")];
        let updated = repo.update_tags(&file.id, &tags).await.unwrap().unwrap();
        assert_eq!(updated.tags, tags);

        let cleared = repo.update_tags(&file.id, &[]).await.unwrap().unwrap();
        assert!(cleared.tags.is_empty());
    }

    #[tokio::test]
    async fn test_delete_file() {
        let db = setup_db().await;
        let repo = FileRepository::new(db.pool());
        let file = repo.create(&NewFile::new("a.md")).await.unwrap();

        assert!(repo.delete(&file.id).await.unwrap());
        assert!(!repo.delete(&file.id).await.unwrap());
        assert!(repo.find_by_id(&file.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unreadable_tags_column() {
        let db = setup_db().await;
        sqlx::query(
            "INSERT INTO files (id, name, tags, created_at, updated_at)
             VALUES ('f1', 'a.md', 'oops', 0, 0)",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let repo = FileRepository::new(db.pool());
        let file = repo.find_by_id("f1").await.unwrap().unwrap();
        assert!(file.tags.is_empty());
    }
}
