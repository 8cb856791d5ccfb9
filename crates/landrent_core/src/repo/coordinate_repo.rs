//! Coordinate store: the ordered parcel boundary of one entry.
//!
//! # Invariants
//! - Rows are read back in insertion order (`id ASC`), which is input order.
//! - Replacement is delete-then-insert inside the caller's transaction.

use crate::model::entry::{Coordinate, EntryId};
use crate::repo::RepoResult;
use rusqlite::{params, Connection, Transaction};

/// One persisted coordinate row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoredCoordinate {
    pub id: i64,
    pub entry_id: EntryId,
    pub coordinate: Coordinate,
}

pub(crate) fn insert_all(
    tx: &Transaction<'_>,
    entry_id: EntryId,
    coordinates: &[Coordinate],
) -> RepoResult<()> {
    let mut stmt = tx.prepare_cached(
        "INSERT INTO coordinates (entry_id, latitude, longitude) VALUES (?1, ?2, ?3);",
    )?;
    for coordinate in coordinates {
        stmt.execute(params![entry_id, coordinate.latitude, coordinate.longitude])?;
    }
    Ok(())
}

/// Replaces the whole boundary of `entry_id` with `coordinates`.
pub(crate) fn replace_all(
    tx: &Transaction<'_>,
    entry_id: EntryId,
    coordinates: &[Coordinate],
) -> RepoResult<()> {
    delete_for(tx, entry_id)?;
    insert_all(tx, entry_id, coordinates)
}

pub(crate) fn delete_for(tx: &Transaction<'_>, entry_id: EntryId) -> RepoResult<usize> {
    let removed = tx.execute("DELETE FROM coordinates WHERE entry_id = ?1;", [entry_id])?;
    Ok(removed)
}

/// Lists the coordinates of `entry_id` in input order.
pub fn list_for(conn: &Connection, entry_id: EntryId) -> RepoResult<Vec<StoredCoordinate>> {
    let mut stmt = conn.prepare(
        "SELECT id, entry_id, latitude, longitude
         FROM coordinates
         WHERE entry_id = ?1
         ORDER BY id ASC;",
    )?;
    let mut rows = stmt.query([entry_id])?;
    let mut coordinates = Vec::new();
    while let Some(row) = rows.next()? {
        coordinates.push(StoredCoordinate {
            id: row.get(0)?,
            entry_id: row.get(1)?,
            coordinate: Coordinate::new(row.get(2)?, row.get(3)?),
        });
    }
    Ok(coordinates)
}
