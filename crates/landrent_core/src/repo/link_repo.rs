//! Entry-person association rows (`entry_owner`, `entry_renter`).
//!
//! # Invariants
//! - One row per (entry, person) pair; linking twice is a no-op.
//! - Replacement deletes every row for the entry and role before relinking,
//!   so the stored set equals the supplied set.

use crate::model::entry::EntryId;
use crate::model::person::{PersonId, PersonRole};
use crate::repo::{role_tables, RepoResult};
use rusqlite::{params, Transaction};

/// Links `person_id` to `entry_id` under `role` unless already linked.
pub(crate) fn link(
    tx: &Transaction<'_>,
    entry_id: EntryId,
    person_id: PersonId,
    role: PersonRole,
) -> RepoResult<()> {
    let tables = role_tables(role);
    tx.execute(
        &format!(
            "INSERT OR IGNORE INTO {} (entry_id, {}) VALUES (?1, ?2);",
            tables.junction, tables.person_fk
        ),
        params![entry_id, person_id],
    )?;
    Ok(())
}

/// Makes `person_ids` the complete set of `role` links of `entry_id`.
pub(crate) fn replace_all(
    tx: &Transaction<'_>,
    entry_id: EntryId,
    role: PersonRole,
    person_ids: &[PersonId],
) -> RepoResult<()> {
    unlink_all(tx, entry_id, role)?;
    for person_id in person_ids {
        link(tx, entry_id, *person_id, role)?;
    }
    Ok(())
}

/// Removes every `role` link of `entry_id`. Person rows are left alone.
pub(crate) fn unlink_all(
    tx: &Transaction<'_>,
    entry_id: EntryId,
    role: PersonRole,
) -> RepoResult<usize> {
    let tables = role_tables(role);
    let removed = tx.execute(
        &format!("DELETE FROM {} WHERE entry_id = ?1;", tables.junction),
        [entry_id],
    )?;
    Ok(removed)
}
