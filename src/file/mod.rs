//! File management module for Marknote.
//!
//! This module provides:
//! - File records (content, icon, tags) and their repository
//! - The file service keeping records and tree nodes in step
//! - Image upload storage with UUID naming

mod record;
mod service;
mod storage;

pub use record::{FileRecord, FileRepository, FileUpdate, NewFile};
pub use service::{FileService, MAX_TAGS};
pub use storage::{UploadStorage, DEFAULT_MAX_UPLOAD_SIZE};
