//! Database schema and migrations for Marknote.
//!
//! Migrations are applied in order when the database is opened. The
//! `schema_version` table records which ones have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: collections with their forest stored as a JSON column
    r#"
CREATE TABLE collections (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    directories TEXT NOT NULL DEFAULT '[]',  -- JSON array of root-level nodes
    created_at  INTEGER NOT NULL,            -- epoch milliseconds
    updated_at  INTEGER NOT NULL
);
"#,
    // v2: file records (content, icon and tags of file nodes)
    r#"
CREATE TABLE files (
    id            TEXT PRIMARY KEY,
    collection_id TEXT,                      -- denormalized, not a foreign key
    name          TEXT NOT NULL,
    content       TEXT,
    icon          TEXT,
    tags          TEXT NOT NULL DEFAULT '[]', -- JSON array of tags
    created_at    INTEGER NOT NULL,
    updated_at    INTEGER NOT NULL
);

CREATE INDEX idx_files_collection_id ON files(collection_id);
"#,
    // v3: lookup of the implicit "Default" collection by name
    r#"
CREATE INDEX idx_collections_name ON collections(name);
"#,
];
