//! Persistence seam for the workspace.

use std::sync::Arc;

use crate::collection::{CollectionRepository, CollectionUpdate, NewCollection};
use crate::tree::{Collection, Node};
use crate::{Database, NoteError, Result};

/// Where collection forests are persisted.
///
/// The workspace only ever writes whole forests, so a store needs no notion
/// of individual nodes.
#[async_trait::async_trait]
pub trait DirectoryStore: Send + Sync {
    /// Fetch every collection with its decoded forest.
    async fn load_collections(&self) -> Result<Vec<Collection>>;

    /// Replace the forest of a collection.
    async fn save_directories(&self, collection_id: &str, directories: &[Node]) -> Result<()>;

    /// Create an empty collection.
    async fn create_collection(&self, name: &str) -> Result<Collection>;
}

#[async_trait::async_trait]
impl DirectoryStore for Database {
    async fn load_collections(&self) -> Result<Vec<Collection>> {
        CollectionRepository::new(self.pool()).find_all().await
    }

    async fn save_directories(&self, collection_id: &str, directories: &[Node]) -> Result<()> {
        let update = CollectionUpdate::new().directories(directories.to_vec());
        CollectionRepository::new(self.pool())
            .update(collection_id, &update)
            .await?
            .map(|_| ())
            .ok_or_else(|| NoteError::NotFound(format!("collection {collection_id}")))
    }

    async fn create_collection(&self, name: &str) -> Result<Collection> {
        CollectionRepository::new(self.pool())
            .create(&NewCollection::new(name))
            .await
    }
}

#[async_trait::async_trait]
impl<S: DirectoryStore + ?Sized> DirectoryStore for Arc<S> {
    async fn load_collections(&self) -> Result<Vec<Collection>> {
        (**self).load_collections().await
    }

    async fn save_directories(&self, collection_id: &str, directories: &[Node]) -> Result<()> {
        (**self).save_directories(collection_id, directories).await
    }

    async fn create_collection(&self, name: &str) -> Result<Collection> {
        (**self).create_collection(name).await
    }
}
