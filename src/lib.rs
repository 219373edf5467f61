//! marknote - backend for a Markdown note-taking app
//!
//! Notes live in collections. Each collection owns an ordered tree of files
//! and folders that is persisted as a JSON column in SQLite, edited through
//! optimistic mutations with rollback, and served over a JSON HTTP API.

pub mod collection;
pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod sync;
pub mod tree;
pub mod web;

pub use collection::{CollectionRepository, CollectionUpdate, NewCollection};
pub use config::Config;
pub use db::Database;
pub use error::{NoteError, Result};
pub use file::{FileRecord, FileRepository, FileService, UploadStorage};
pub use sync::{DirectoryStore, Mutation, MutationState, Workspace};
pub use tree::{Collection, Node, NodeKind, Tag};
