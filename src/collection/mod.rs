//! Collection persistence.
//!
//! Each collection row stores its whole forest in the `directories` column.
//! Rows are decoded through the tree codec, so legacy encodings are accepted
//! on read and every write is a single JSON layer.

mod repository;

pub use repository::{CollectionRepository, CollectionUpdate, NewCollection};

/// Name of the collection that receives files saved without a known collection.
pub const DEFAULT_COLLECTION_NAME: &str = "Default";
