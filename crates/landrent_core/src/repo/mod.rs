//! Repository layer: SQLite persistence of entries and their dependents.
//!
//! # Responsibility
//! - Define the entry repository contract consumed by the service layer.
//! - Keep person, association and coordinate SQL behind that contract.
//!
//! # Invariants
//! - Write paths call `Entry::validate()` before any SQL mutation.
//! - Every write runs in exactly one transaction; a dropped transaction
//!   rolls back.
//! - Failures inside a write transaction come back as `RepoError::Write`,
//!   naming the operation and, when known, the entry.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::entry::{EntryId, EntryValidationError};
use crate::model::person::{PersonId, PersonRole};
use rusqlite::{ErrorCode, Transaction, TransactionBehavior};
use std::fmt::{Display, Formatter};
use thiserror::Error;

pub mod coordinate_repo;
pub mod entry_repo;
pub(crate) mod link_repo;
pub(crate) mod person_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Identity of a record a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordRef {
    Entry(EntryId),
    Person { role: PersonRole, id: PersonId },
}

impl Display for RecordRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Entry(id) => write!(f, "entry {id}"),
            Self::Person { role, id } => write!(f, "{role} {id}"),
        }
    }
}

/// Coarse error classes the presentation layer maps onto dialogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    SchemaInitFailure,
    NotFound,
    InvalidArgument,
    ConstraintViolation,
    TransactionFailure,
    /// Driver failure or corrupt stored data.
    Storage,
}

/// Repository error for entry persistence and query operations.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{0} not found")]
    NotFound(RecordRef),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Validation(#[from] EntryValidationError),
    #[error("constraint violation: {0}")]
    ConstraintViolation(#[source] rusqlite::Error),
    #[error("transaction failed during {operation}: {source}")]
    Transaction {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },
    #[error("repository requires table `{0}`")]
    MissingRequiredTable(&'static str),
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("{operation} of entry{} failed: {source}", entry_suffix(.entry_id))]
    Write {
        operation: &'static str,
        entry_id: Option<EntryId>,
        #[source]
        source: Box<RepoError>,
    },
}

impl RepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidArgument(_) | Self::Validation(_) => ErrorKind::InvalidArgument,
            Self::ConstraintViolation(_) => ErrorKind::ConstraintViolation,
            Self::Transaction { .. } => ErrorKind::TransactionFailure,
            Self::MissingRequiredTable(_) => ErrorKind::SchemaInitFailure,
            Self::Db(DbError::Sqlite(_)) | Self::InvalidData(_) => ErrorKind::Storage,
            Self::Db(_) => ErrorKind::SchemaInitFailure,
            Self::Write { source, .. } => source.kind(),
        }
    }

    /// The failure underneath any write context.
    pub fn root(&self) -> &RepoError {
        match self {
            Self::Write { source, .. } => source.root(),
            other => other,
        }
    }

    pub(crate) fn in_write(self, operation: &'static str, entry_id: Option<EntryId>) -> Self {
        Self::Write {
            operation,
            entry_id,
            source: Box::new(self),
        }
    }
}

fn entry_suffix(entry_id: &Option<EntryId>) -> String {
    entry_id.map(|id| format!(" {id}")).unwrap_or_default()
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if value.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) {
            return Self::ConstraintViolation(value);
        }
        Self::Db(DbError::Sqlite(value))
    }
}

/// Table and column names backing one person role.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RoleTables {
    pub person: &'static str,
    pub junction: &'static str,
    pub person_fk: &'static str,
}

pub(crate) fn role_tables(role: PersonRole) -> RoleTables {
    match role {
        PersonRole::Owner => RoleTables {
            person: "owner_records",
            junction: "entry_owner",
            person_fk: "owner_id",
        },
        PersonRole::Renter => RoleTables {
            person: "renter_records",
            junction: "entry_renter",
            person_fk: "renter_id",
        },
    }
}

pub(crate) fn begin<'conn>(
    conn: &'conn mut rusqlite::Connection,
    operation: &'static str,
) -> RepoResult<Transaction<'conn>> {
    conn.transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|source| RepoError::Transaction { operation, source })
}

pub(crate) fn commit(tx: Transaction<'_>, operation: &'static str) -> RepoResult<()> {
    tx.commit()
        .map_err(|source| RepoError::Transaction { operation, source })
}
