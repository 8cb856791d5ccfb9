//! Core persistence for land-rental contract records.
//! This crate is the single source of truth for entry, person and
//! coordinate invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod numeric;
pub mod reminder;
pub mod repo;
pub mod service;

pub use config::CoreConfig;
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::entry::{Coordinate, Entry, EntryId, EntryValidationError, DATE_FORMAT};
pub use model::person::{Person, PersonId, PersonRole, PersonSummary};
pub use reminder::ExpiryNotice;
pub use repo::entry_repo::{EntryRepository, SqliteEntryRepository};
pub use repo::{ErrorKind, RecordRef, RepoError, RepoResult};
pub use service::entry_service::{ChangeListener, EntryChange, EntryService, ListResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
