//! Schema step registry and executor.
//!
//! # Responsibility
//! - List the idempotent `CREATE ... IF NOT EXISTS` steps in dependency order.
//! - Apply every step atomically, naming the step that failed.
//!
//! # Invariants
//! - Steps are safe to re-run on an already initialized store.
//! - Referenced tables are created before the tables that point at them.
//! - Applied schema version is mirrored to `PRAGMA user_version`.

use crate::db::{DbError, DbResult};
use log::debug;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_VERSION: u32 = 1;

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        name: "create_entries",
        sql: include_str!("entries.sql"),
    },
    SchemaStep {
        name: "create_coordinates",
        sql: include_str!("coordinates.sql"),
    },
    SchemaStep {
        name: "create_owner_records",
        sql: include_str!("owner_records.sql"),
    },
    SchemaStep {
        name: "create_renter_records",
        sql: include_str!("renter_records.sql"),
    },
    SchemaStep {
        name: "create_entry_owner",
        sql: include_str!("entry_owner.sql"),
    },
    SchemaStep {
        name: "create_entry_renter",
        sql: include_str!("entry_renter.sql"),
    },
];

/// Returns the schema version written by this binary.
pub fn latest_version() -> u32 {
    SCHEMA_VERSION
}

/// Names of the tables the schema creates, in creation order.
pub const REQUIRED_TABLES: [&str; 6] = [
    "entries",
    "coordinates",
    "owner_records",
    "renter_records",
    "entry_owner",
    "entry_renter",
];

/// Applies every schema step on the provided connection.
///
/// Rejects stores stamped with a newer version than [`latest_version`].
pub fn apply_schema(conn: &mut Connection) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    let latest = latest_version();

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    let tx = conn.transaction()?;
    for step in SCHEMA_STEPS {
        debug!("event=schema_step module=db step={}", step.name);
        tx.execute_batch(step.sql)
            .map_err(|source| DbError::SchemaStep {
                step: step.name,
                source,
            })?;
    }
    tx.execute_batch(&format!("PRAGMA user_version = {latest};"))
        .map_err(|source| DbError::SchemaStep {
            step: "stamp_user_version",
            source,
        })?;
    tx.commit()?;

    Ok(())
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
