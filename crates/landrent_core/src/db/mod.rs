//! SQLite storage bootstrap and schema setup entry points.
//!
//! # Responsibility
//! - Open and configure the single SQLite handle used by the core.
//! - Create the rental-contract schema idempotently on first use.
//!
//! # Invariants
//! - Schema version is mirrored to `PRAGMA user_version`.
//! - Core code must not read/write entries before schema setup succeeds.
//! - Any error returned from this module is fatal for startup.

use std::path::PathBuf;
use thiserror::Error;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Schema manager failures.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("failed to create database directory `{}`: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("schema step `{step}` failed: {source}")]
    SchemaStep {
        step: &'static str,
        #[source]
        source: rusqlite::Error,
    },
    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}
