//! API handlers for the HTTP API.

pub mod collection;
pub mod file;
pub mod tag;
pub mod upload;

pub use collection::*;
pub use file::*;
pub use tag::*;
pub use upload::*;

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::file::UploadStorage;
use crate::sync::Workspace;
use crate::{Database, Result};

/// Database handle shared between handlers and the workspace.
pub type SharedDatabase = Arc<Database>;

/// Workspace over the shared database.
pub type SharedWorkspace = Mutex<Workspace<SharedDatabase>>;

/// Application state shared across handlers.
///
/// Tree mutations lock the workspace for their whole duration, persistence
/// included, so writes to a collection never interleave.
pub struct AppState {
    /// Database handle.
    pub db: SharedDatabase,
    /// In-memory collections.
    pub workspace: SharedWorkspace,
    /// Image upload storage; uploads are disabled when absent.
    pub uploads: Option<UploadStorage>,
}

impl AppState {
    /// Create state with a workspace loaded from `db`.
    pub async fn load(db: SharedDatabase) -> Result<Self> {
        let workspace = Workspace::load(Arc::clone(&db)).await?;
        Ok(Self {
            db,
            workspace: Mutex::new(workspace),
            uploads: None,
        })
    }

    /// Enable image uploads.
    pub fn with_uploads(mut self, storage: UploadStorage) -> Self {
        self.uploads = Some(storage);
        self
    }
}
