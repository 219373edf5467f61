//! Image upload storage.
//!
//! Uploaded images are written flat into one directory under a fresh
//! `<uuid>.<ext>` name and served back from a public URL prefix.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use uuid::Uuid;

use crate::config::UploadsConfig;
use crate::{NoteError, Result};

/// Default size ceiling for a single upload (5MB).
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 5 * 1024 * 1024;

/// Disk-backed sink for uploaded images.
#[derive(Debug, Clone)]
pub struct UploadStorage {
    /// Directory the files are written to.
    base_path: PathBuf,
    /// URL prefix the directory is served under.
    public_prefix: String,
    /// Largest accepted payload in bytes.
    max_size: u64,
}

impl UploadStorage {
    /// Create storage rooted at `base_path`, served under `/uploads`.
    ///
    /// The base directory will be created if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;

        Ok(Self {
            base_path,
            public_prefix: "/uploads".to_string(),
            max_size: DEFAULT_MAX_UPLOAD_SIZE,
        })
    }

    /// Create storage from the `[uploads]` configuration section.
    pub fn from_config(config: &UploadsConfig) -> Result<Self> {
        Ok(Self::new(&config.storage_path)?
            .with_public_prefix(&config.public_prefix)
            .with_max_size(config.max_upload_size_bytes()))
    }

    /// Set the public URL prefix.
    pub fn with_public_prefix(mut self, prefix: impl AsRef<str>) -> Self {
        self.public_prefix = prefix.as_ref().trim_end_matches('/').to_string();
        self
    }

    /// Set the size ceiling.
    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    /// Get the base path of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Get the public URL prefix.
    pub fn public_prefix(&self) -> &str {
        &self.public_prefix
    }

    /// Get the size ceiling in bytes.
    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Save an uploaded image and return its public path.
    ///
    /// Rejects content types outside `image/*` and payloads larger than the
    /// ceiling. The stored name is `<uuid>.<ext>`, with the extension taken
    /// from the content type.
    pub fn save_image(&self, content: &[u8], content_type: &str) -> Result<String> {
        let ext = Self::image_extension(content_type).ok_or_else(|| {
            NoteError::Upload(format!("only image uploads are accepted, got {content_type}"))
        })?;

        if content.len() as u64 > self.max_size {
            return Err(NoteError::TooLarge(self.max_size));
        }

        let stored_name = format!("{}.{ext}", Uuid::new_v4());
        fs::write(self.base_path.join(&stored_name), content)?;
        info!(stored_name = %stored_name, size = content.len(), "Saved upload");

        Ok(self.public_path(&stored_name))
    }

    /// Public path for a stored name.
    pub fn public_path(&self, stored_name: &str) -> String {
        format!("{}/{stored_name}", self.public_prefix)
    }

    /// Delete a stored file.
    ///
    /// Returns `true` if the file was deleted, `false` if it didn't exist.
    pub fn delete(&self, stored_name: &str) -> Result<bool> {
        if stored_name.contains('/') || stored_name.contains("..") {
            return Err(NoteError::Validation(format!(
                "invalid stored name: {stored_name}"
            )));
        }

        match fs::remove_file(self.base_path.join(stored_name)) {
            Ok(()) => {
                debug!(stored_name, "Deleted upload");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// File extension for an `image/*` content type, or `None` if the type
    /// is not an image.
    ///
    /// Parameters such as `; charset=` are ignored, and structured syntax
    /// suffixes are dropped. SVG and other XML images are not images here:
    /// they can carry script and are served from the API's origin.
    fn image_extension(content_type: &str) -> Option<String> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        let subtype = essence.strip_prefix("image/")?;
        if subtype.starts_with("svg") || subtype.ends_with("+xml") {
            return None;
        }
        let subtype = subtype.split('+').next().unwrap_or_default();
        let valid = subtype
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
        if subtype.is_empty() || !valid || subtype.contains("..") {
            return None;
        }

        let ext = match subtype {
            "jpeg" | "pjpeg" => "jpg",
            "x-icon" | "vnd.microsoft.icon" => "ico",
            other => other,
        };
        Some(ext.to_string())
    }
}
