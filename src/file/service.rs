//! File operations that keep file records and tree nodes in step.
//!
//! The `files` table holds the authoritative record; the matching file node
//! in the owning collection's forest mirrors its name, content, icon and tags.

use sqlx::SqlitePool;
use tracing::{error, info, warn};

use crate::collection::DEFAULT_COLLECTION_NAME;
use crate::datetime::now_millis;
use crate::sync::{DirectoryStore, Effect, Location, Mutation, NodePatch, Workspace};
use crate::tree::{self, Node, Placement, Tag, Target};
use crate::{NoteError, Result};

use super::record::{FileRecord, FileRepository, FileUpdate, NewFile};

/// Maximum number of tags on one file.
pub const MAX_TAGS: usize = 32;

/// File service for saving and editing files.
pub struct FileService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FileService<'a> {
    /// Create a new FileService.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    fn repo(&self) -> FileRepository<'a> {
        FileRepository::new(self.pool)
    }

    /// Get a file by ID.
    pub async fn get(&self, id: &str) -> Result<FileRecord> {
        self.repo()
            .find_by_id(id)
            .await?
            .ok_or_else(|| NoteError::NotFound(format!("file {id}")))
    }

    /// Save a new file and append its node to the root of its collection.
    ///
    /// A missing or unknown collection reference sends the file to the
    /// "Default" collection, which is created on first use.
    pub async fn save<S: DirectoryStore>(
        &self,
        workspace: &mut Workspace<S>,
        mut file: NewFile,
    ) -> Result<FileRecord> {
        tree::validate_name(&file.name)?;
        validate_tags(&file.tags)?;

        let known = file
            .collection_id
            .as_deref()
            .and_then(|id| workspace.collection(id))
            .map(|c| c.id.clone());
        let collection_id = match known {
            Some(id) => id,
            None => {
                if let Some(ref requested) = file.collection_id {
                    info!(requested = %requested, "Unknown collection, saving to Default");
                }
                workspace.ensure_collection(DEFAULT_COLLECTION_NAME).await?.id
            }
        };

        if let Some(collection) = workspace.collection(&collection_id) {
            if tree::sibling_names(&collection.directories, None).contains(&file.name.as_str()) {
                return Err(NoteError::Conflict(format!(
                    "{} already exists in {}",
                    file.name, collection.name
                )));
            }
        }

        file.collection_id = Some(collection_id);
        let (record, _) = self.insert(workspace, file, None).await?;
        Ok(record)
    }

    /// Create a file record and insert its node at `target` in the record's
    /// collection, which must already exist.
    ///
    /// Placement follows the tree insert rules. If the tree cannot be
    /// persisted the record is removed again and the tree error returned.
    pub async fn insert<S: DirectoryStore>(
        &self,
        workspace: &mut Workspace<S>,
        file: NewFile,
        target: Option<Location>,
    ) -> Result<(FileRecord, Placement)> {
        tree::validate_name(&file.name)?;
        validate_tags(&file.tags)?;

        let collection_id = file
            .collection_id
            .clone()
            .filter(|id| workspace.collection(id).is_some())
            .ok_or_else(|| NoteError::NotFound("collection".to_string()))?;

        let record = self.repo().create(&file).await?;
        let mutation = Mutation::Insert {
            node: node_for(&record),
            target,
        };

        match workspace.apply(&collection_id, mutation).await {
            Ok(settled) => {
                let placement = match settled.effect {
                    Effect::Inserted { placement, .. } => placement,
                    _ => Placement::Root,
                };
                info!(file_id = %record.id, collection_id = %collection_id, "Saved file");
                Ok((record, placement))
            }
            Err(e) => {
                warn!(
                    file_id = %record.id,
                    error = %e,
                    "Removing file record after failed tree write"
                );
                if let Err(cleanup) = self.repo().delete(&record.id).await {
                    error!(
                        file_id = %record.id,
                        error = %cleanup,
                        "Failed to remove file record"
                    );
                }
                Err(e)
            }
        }
    }

    /// Update a file's name and content (and optionally icon and tags).
    pub async fn update<S: DirectoryStore>(
        &self,
        workspace: &mut Workspace<S>,
        id: &str,
        update: &FileUpdate,
    ) -> Result<FileRecord> {
        let current = self.get(id).await?;

        if let Some(ref name) = update.name {
            tree::validate_name(name)?;
            if *name != current.name {
                check_rename(workspace, &current, name)?;
            }
        }
        if let Some(ref tags) = update.tags {
            validate_tags(tags)?;
        }

        let record = self
            .repo()
            .update(id, update)
            .await?
            .ok_or_else(|| NoteError::NotFound(format!("file {id}")))?;
        self.mirror_or_restore(workspace, &current, record).await
    }

    /// Set a file's icon.
    pub async fn update_icon<S: DirectoryStore>(
        &self,
        workspace: &mut Workspace<S>,
        id: &str,
        icon: &str,
    ) -> Result<FileRecord> {
        let icon = icon.trim();
        if icon.is_empty() {
            return Err(NoteError::Validation("icon must not be empty".to_string()));
        }

        let current = self.get(id).await?;
        let record = self
            .repo()
            .update_icon(id, icon, now_millis())
            .await?
            .ok_or_else(|| NoteError::NotFound(format!("file {id}")))?;
        self.mirror_or_restore(workspace, &current, record).await
    }

    /// Replace a file's tags.
    pub async fn update_tags<S: DirectoryStore>(
        &self,
        workspace: &mut Workspace<S>,
        id: &str,
        tags: &[Tag],
    ) -> Result<FileRecord> {
        validate_tags(tags)?;

        let current = self.get(id).await?;
        let record = self
            .repo()
            .update_tags(id, tags)
            .await?
            .ok_or_else(|| NoteError::NotFound(format!("file {id}")))?;
        self.mirror_or_restore(workspace, &current, record).await
    }

    /// Mirror `record` into the tree; on failure put `previous` back so the
    /// record matches the rolled-back node.
    async fn mirror_or_restore<S: DirectoryStore>(
        &self,
        workspace: &mut Workspace<S>,
        previous: &FileRecord,
        record: FileRecord,
    ) -> Result<FileRecord> {
        if let Err(e) = mirror(workspace, &record).await {
            warn!(
                file_id = %record.id,
                error = %e,
                "Restoring file record after failed tree write"
            );
            if let Err(restore) = self.repo().restore(previous).await {
                error!(
                    file_id = %record.id,
                    error = %restore,
                    "Failed to restore file record"
                );
            }
            return Err(e);
        }
        Ok(record)
    }
}

/// Build the tree node for a freshly stored record.
fn node_for(record: &FileRecord) -> Node {
    let mut node = Node::file(&record.name)
        .with_id(&record.id)
        .with_tags(record.tags.clone());
    node.content = record.content.clone();
    node.icon = record.icon.clone();
    node.created_at = record.created_at;
    node.updated_at = record.updated_at;
    node
}

/// Reject a rename that would duplicate a sibling's name.
fn check_rename<S: DirectoryStore>(
    workspace: &Workspace<S>,
    record: &FileRecord,
    name: &str,
) -> Result<()> {
    let Some(collection) = record
        .collection_id
        .as_deref()
        .and_then(|id| workspace.collection(id))
    else {
        return Ok(());
    };
    let forest = &collection.directories;
    let (Some(node), Some(path)) = (
        tree::find_by_id(forest, &record.id),
        tree::path_of(forest, &record.id),
    ) else {
        return Ok(());
    };

    if tree::sibling_names(forest, Some(Target::new(node, &path))).contains(&name) {
        return Err(NoteError::Conflict(format!("{name} already exists")));
    }
    Ok(())
}

/// Copy a record's fields onto its tree node.
///
/// Records whose collection is gone, or whose node is not in the tree, are
/// left alone.
async fn mirror<S: DirectoryStore>(
    workspace: &mut Workspace<S>,
    record: &FileRecord,
) -> Result<()> {
    let Some(collection_id) = record
        .collection_id
        .as_deref()
        .filter(|id| workspace.collection(id).is_some())
    else {
        return Ok(());
    };

    let patch = NodePatch {
        name: Some(record.name.clone()),
        content: Some(record.content.clone()),
        icon: Some(record.icon.clone()),
        tags: Some(record.tags.clone()),
        updated_at: Some(record.updated_at),
    };
    let mutation = Mutation::Update {
        id: record.id.clone(),
        patch,
    };
    workspace.apply(collection_id, mutation).await?;
    Ok(())
}

fn validate_tags(tags: &[Tag]) -> Result<()> {
    if tags.len() > MAX_TAGS {
        return Err(NoteError::Validation(format!(
            "a file can have at most {MAX_TAGS} tags"
        )));
    }
    if tags.iter().any(|t| t.label.trim().is_empty()) {
        return Err(NoteError::Validation("tag labels must not be empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::CollectionRepository;
    use crate::tree::Collection;
    use crate::Database;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// Database-backed store whose forest writes can be made to fail.
    struct FlakyStore {
        db: Arc<Database>,
        fail_writes: AtomicBool,
    }

    #[async_trait::async_trait]
    impl DirectoryStore for FlakyStore {
        async fn load_collections(&self) -> Result<Vec<Collection>> {
            self.db.load_collections().await
        }

        async fn save_directories(&self, collection_id: &str, directories: &[Node]) -> Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(NoteError::Database("disk full".to_string()));
            }
            self.db.save_directories(collection_id, directories).await
        }

        async fn create_collection(&self, name: &str) -> Result<Collection> {
            self.db.create_collection(name).await
        }
    }

    async fn setup_flaky() -> (Arc<Database>, Workspace<FlakyStore>) {
        let db = Arc::new(Database::open_in_memory().await.unwrap());
        let store = FlakyStore {
            db: Arc::clone(&db),
            fail_writes: AtomicBool::new(false),
        };
        let workspace = Workspace::load(store).await.unwrap();
        (db, workspace)
    }

    fn fail_writes(workspace: &Workspace<FlakyStore>) {
        workspace.store().fail_writes.store(true, Ordering::SeqCst);
    }

    async fn setup() -> (Arc<Database>, Workspace<Arc<Database>>) {
        let db = Arc::new(Database::open_in_memory().await.unwrap());
        let workspace = Workspace::load(Arc::clone(&db)).await.unwrap();
        (db, workspace)
    }

    #[tokio::test]
    async fn test_save_into_known_collection() {
        let (db, mut workspace) = setup().await;
        let work = workspace.create_collection("Work").await.unwrap();
        let service = FileService::new(db.pool());

        let record = service
            .save(
                &mut workspace,
                NewFile::new("plan.md").with_collection(&work.id).with_content("# Plan"),
            )
            .await
            .unwrap();

        assert_eq!(record.collection_id.as_deref(), Some(work.id.as_str()));
        let node = workspace.collection(&work.id).unwrap().resolve("plan.md").unwrap();
        assert_eq!(node.id, record.id);
        assert_eq!(node.content.as_deref(), Some("# Plan"));

        let stored = CollectionRepository::new(db.pool())
            .find_by_id(&work.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.directories[0].id, record.id);
    }

    #[tokio::test]
    async fn test_save_unknown_collection_creates_default() {
        let (db, mut workspace) = setup().await;
        let service = FileService::new(db.pool());

        let first = service
            .save(&mut workspace, NewFile::new("a.md").with_collection("nope"))
            .await
            .unwrap();
        let second = service
            .save(&mut workspace, NewFile::new("b.md"))
            .await
            .unwrap();

        let default = workspace.collection_by_name(DEFAULT_COLLECTION_NAME).unwrap();
        assert_eq!(workspace.collections().len(), 1);
        assert_eq!(first.collection_id.as_deref(), Some(default.id.as_str()));
        assert_eq!(second.collection_id, first.collection_id);
        assert_eq!(default.directories.len(), 2);
    }

    #[tokio::test]
    async fn test_save_duplicate_name_conflicts() {
        let (db, mut workspace) = setup().await;
        let service = FileService::new(db.pool());

        service.save(&mut workspace, NewFile::new("a.md")).await.unwrap();
        let result = service.save(&mut workspace, NewFile::new("a.md")).await;

        assert!(matches!(result, Err(NoteError::Conflict(_))));
        let default = workspace.collection_by_name(DEFAULT_COLLECTION_NAME).unwrap();
        assert_eq!(default.directories.len(), 1);
    }

    #[tokio::test]
    async fn test_save_rejects_invalid_name() {
        let (db, mut workspace) = setup().await;
        let service = FileService::new(db.pool());

        let result = service.save(&mut workspace, NewFile::new("a/b.md")).await;
        assert!(matches!(result, Err(NoteError::Validation(_))));
        assert!(workspace.collections().is_empty());
    }

    #[tokio::test]
    async fn test_update_mirrors_node() {
        let (db, mut workspace) = setup().await;
        let service = FileService::new(db.pool());
        let record = service.save(&mut workspace, NewFile::new("a.md")).await.unwrap();

        let update = FileUpdate::new().name("b.txt").content(Some("body"));
        let updated = service.update(&mut workspace, &record.id, &update).await.unwrap();
        assert_eq!(updated.name, "b.txt");

        let collection = workspace.collection_by_name(DEFAULT_COLLECTION_NAME).unwrap();
        let node = collection.resolve("b.txt").unwrap();
        assert_eq!(node.id, record.id);
        assert_eq!(node.extension.as_deref(), Some("txt"));
        assert_eq!(node.content.as_deref(), Some("body"));
    }

    #[tokio::test]
    async fn test_rename_to_sibling_conflicts() {
        let (db, mut workspace) = setup().await;
        let service = FileService::new(db.pool());
        service.save(&mut workspace, NewFile::new("a.md")).await.unwrap();
        let b = service.save(&mut workspace, NewFile::new("b.md")).await.unwrap();

        let result = service
            .update(&mut workspace, &b.id, &FileUpdate::new().name("a.md"))
            .await;
        assert!(matches!(result, Err(NoteError::Conflict(_))));

        // Renaming to its own name is fine.
        service
            .update(&mut workspace, &b.id, &FileUpdate::new().name("b.md"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_icon_and_tags() {
        let (db, mut workspace) = setup().await;
        let service = FileService::new(db.pool());
        let record = service.save(&mut workspace, NewFile::new("a.md")).await.unwrap();

        let with_icon = service
            .update_icon(&mut workspace, &record.id, "star")
            .await
            .unwrap();
        assert_eq!(with_icon.icon.as_deref(), Some("star"));

        let tags = vec![Tag::new("todo", "#f44336")];
        let with_tags = service
            .update_tags(&mut workspace, &record.id, &tags)
            .await
            .unwrap();
        assert_eq!(with_tags.tags, tags);

        let collection = workspace.collection_by_name(DEFAULT_COLLECTION_NAME).unwrap();
        let node = collection.resolve("a.md").unwrap();
        assert_eq!(node.display_icon(), "star");
        assert_eq!(node.tags, tags);
    }

    #[tokio::test]
    async fn test_update_missing_file() {
        let (db, mut workspace) = setup().await;
        let service = FileService::new(db.pool());

        let result = service.update_icon(&mut workspace, "missing", "star").await;
        assert!(matches!(result, Err(NoteError::NotFound(_))));

        let result = service
            .update(&mut workspace, "missing", &FileUpdate::new().name("x.md"))
            .await;
        assert!(matches!(result, Err(NoteError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_tag_validation() {
        let (db, mut workspace) = setup().await;
        let service = FileService::new(db.pool());
        let record = service.save(&mut workspace, NewFile::new("a.md")).await.unwrap();

        let blank = vec![Tag::new("  ", "#9e9e9e")];
        let result = service.update_tags(&mut workspace, &record.id, &blank).await;
        assert!(matches!(result, Err(NoteError::Validation(_))));

        let many: Vec<Tag> = (0..=MAX_TAGS)
            .map(|i| Tag::new(format!("t{i}"), "#9e9e9e"))
            .collect();
        let result = service.update_tags(&mut workspace, &record.id, &many).await;
        assert!(matches!(result, Err(NoteError::Validation(_))));
    }

    #[tokio::test]
    async fn test_insert_into_folder() {
        let (db, mut workspace) = setup().await;
        let work = workspace.create_collection("Work").await.unwrap();
        let docs = Node::folder("docs");
        workspace
            .apply(
                &work.id,
                Mutation::Insert {
                    node: docs.clone(),
                    target: None,
                },
            )
            .await
            .unwrap();
        let service = FileService::new(db.pool());

        let (record, placement) = service
            .insert(
                &mut workspace,
                NewFile::new("a.md").with_collection(&work.id),
                Some(Location::new(docs.clone(), "docs")),
            )
            .await
            .unwrap();

        assert_eq!(placement, Placement::Folder(docs.id.clone()));
        let node = workspace.collection(&work.id).unwrap().resolve("docs/a.md").unwrap();
        assert_eq!(node.id, record.id);
        assert_eq!(service.get(&record.id).await.unwrap().name, "a.md");
    }

    #[tokio::test]
    async fn test_insert_unknown_collection() {
        let (db, mut workspace) = setup().await;
        let service = FileService::new(db.pool());

        let result = service
            .insert(&mut workspace, NewFile::new("a.md").with_collection("nope"), None)
            .await;
        assert!(matches!(result, Err(NoteError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_save_failed_tree_write_removes_record() {
        let (db, mut workspace) = setup_flaky().await;
        let work = workspace.create_collection("Work").await.unwrap();
        fail_writes(&workspace);
        let service = FileService::new(db.pool());

        let result = service
            .save(&mut workspace, NewFile::new("a.md").with_collection(&work.id))
            .await;

        match result {
            Err(NoteError::Database(msg)) => assert_eq!(msg, "disk full"),
            other => panic!("expected the tree error, got {other:?}"),
        }
        let repo = FileRepository::new(db.pool());
        assert_eq!(repo.count_by_collection(&work.id).await.unwrap(), 0);
        assert!(workspace.collection(&work.id).unwrap().directories.is_empty());
    }

    #[tokio::test]
    async fn test_failed_tree_write_restores_record() {
        let (db, mut workspace) = setup_flaky().await;
        let service = FileService::new(db.pool());
        let record = service
            .save(&mut workspace, NewFile::new("a.md").with_content("v1"))
            .await
            .unwrap();
        fail_writes(&workspace);

        let update = FileUpdate::new().name("b.md").content(Some("v2"));
        let result = service.update(&mut workspace, &record.id, &update).await;
        assert!(result.is_err());

        let result = service.update_icon(&mut workspace, &record.id, "star").await;
        assert!(result.is_err());

        let tags = vec![Tag::new("todo", "#f44336")];
        let result = service.update_tags(&mut workspace, &record.id, &tags).await;
        assert!(result.is_err());

        let stored = service.get(&record.id).await.unwrap();
        assert_eq!(stored, record);

        let collection = workspace.collection_by_name(DEFAULT_COLLECTION_NAME).unwrap();
        let node = collection.resolve("a.md").unwrap();
        assert_eq!(node.id, record.id);
        assert_eq!(node.content.as_deref(), Some("v1"));
        assert!(node.icon.is_none());
        assert!(node.tags.is_empty());
    }
}
