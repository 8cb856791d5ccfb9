//! Entry repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Orchestrate entry, person, association and coordinate writes under one
//!   transaction per operation.
//! - Assemble full entry aggregates on read.
//!
//! # Invariants
//! - Dependents are written only after the row they reference exists.
//! - `update` replaces owners, renters and coordinates wholesale.
//! - `delete` removes coordinates and links but never person records.
//! - Each read query drains its cursor before the next dependent query runs.

use crate::db::migrations::REQUIRED_TABLES;
use crate::model::entry::{format_date, parse_date, Entry, EntryId};
use crate::model::person::{PersonId, PersonRole, PersonSummary};
use crate::numeric::round_to;
use crate::repo::{
    begin, commit, coordinate_repo, link_repo, person_repo, RecordRef, RepoError, RepoResult,
};
use chrono::{DateTime, SecondsFormat, Utc};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::time::Instant;

const ENTRY_SELECT_SQL: &str = "SELECT
    id,
    name,
    timestamp,
    code,
    external_ref,
    size,
    type,
    rent,
    start_date,
    end_date,
    document_blob
FROM entries";

const RENT_DECIMAL_PLACES: u32 = 2;

/// Repository interface for entry aggregates.
pub trait EntryRepository {
    /// Persists a new entry with its persons and coordinates; returns its id.
    fn save_entry(&mut self, entry: &Entry) -> RepoResult<EntryId>;
    /// Replaces every field and dependent of an existing entry.
    fn update_entry(&mut self, entry: &Entry) -> RepoResult<()>;
    /// Deletes an entry with its coordinates and links.
    fn delete_entry(&mut self, id: EntryId) -> RepoResult<()>;
    /// Loads one full aggregate.
    fn get_entry(&self, id: EntryId) -> RepoResult<Entry>;
    /// Loads every aggregate, ordered by id.
    fn list_entries(&self) -> RepoResult<Vec<Entry>>;
    /// Lists persons of one role with the entries each is linked to.
    fn list_persons(&self, role: PersonRole) -> RepoResult<Vec<PersonSummary>>;
    /// Loads every aggregate linked to one person.
    fn list_entries_for_person(
        &self,
        role: PersonRole,
        person_id: PersonId,
    ) -> RepoResult<Vec<Entry>>;
}

/// SQLite-backed entry repository over one injected connection.
pub struct SqliteEntryRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteEntryRepository<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    ///
    /// Fails with `MissingRequiredTable` when the schema is not in place.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_entry_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn save_in_tx(&mut self, entry: &Entry) -> RepoResult<EntryId> {
        let tx = begin(self.conn, "save")?;

        tx.execute(
            "INSERT INTO entries (
                name,
                timestamp,
                code,
                external_ref,
                size,
                type,
                rent,
                start_date,
                end_date,
                document_blob
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                entry.name.as_str(),
                format_timestamp(&entry.created_at),
                entry.code,
                entry.external_ref.as_str(),
                entry.size,
                entry.land_type.as_str(),
                round_to(entry.rent, RENT_DECIMAL_PLACES),
                format_date(entry.start),
                format_date(entry.end),
                entry.document.as_deref(),
            ],
        )?;
        let entry_id = tx.last_insert_rowid();

        for role in PersonRole::ALL {
            for person in entry.persons(role) {
                let person_id = person_repo::get_or_create(&tx, role, person)?;
                link_repo::link(&tx, entry_id, person_id, role)?;
            }
        }
        coordinate_repo::insert_all(&tx, entry_id, &entry.coordinates)?;

        commit(tx, "save")?;
        Ok(entry_id)
    }

    fn update_in_tx(&mut self, entry_id: EntryId, entry: &Entry) -> RepoResult<()> {
        let tx = begin(self.conn, "update")?;
        if !entry_exists(&tx, entry_id)? {
            return Err(RepoError::NotFound(RecordRef::Entry(entry_id)));
        }

        tx.execute(
            "UPDATE entries
             SET
                name = ?1,
                timestamp = ?2,
                code = ?3,
                external_ref = ?4,
                size = ?5,
                type = ?6,
                rent = ?7,
                start_date = ?8,
                end_date = ?9,
                document_blob = ?10
             WHERE id = ?11;",
            params![
                entry.name.as_str(),
                format_timestamp(&entry.created_at),
                entry.code,
                entry.external_ref.as_str(),
                entry.size,
                entry.land_type.as_str(),
                round_to(entry.rent, RENT_DECIMAL_PLACES),
                format_date(entry.start),
                format_date(entry.end),
                entry.document.as_deref(),
                entry_id,
            ],
        )?;

        for role in PersonRole::ALL {
            let person_ids = resolve_persons(&tx, entry, role)?;
            link_repo::replace_all(&tx, entry_id, role, &person_ids)?;
        }
        coordinate_repo::replace_all(&tx, entry_id, &entry.coordinates)?;

        commit(tx, "update")
    }

    fn delete_in_tx(&mut self, entry_id: EntryId) -> RepoResult<()> {
        let tx = begin(self.conn, "delete")?;
        if !entry_exists(&tx, entry_id)? {
            return Err(RepoError::NotFound(RecordRef::Entry(entry_id)));
        }

        // Explicit so stores opened without foreign key enforcement stay clean.
        coordinate_repo::delete_for(&tx, entry_id)?;
        for role in PersonRole::ALL {
            link_repo::unlink_all(&tx, entry_id, role)?;
        }
        let removed = tx.execute("DELETE FROM entries WHERE id = ?1;", [entry_id])?;
        if removed == 0 {
            return Err(RepoError::NotFound(RecordRef::Entry(entry_id)));
        }

        commit(tx, "delete")
    }

    fn assemble(&self, mut entry: Entry, entry_id: EntryId) -> RepoResult<Entry> {
        entry.owners = person_repo::linked_persons(self.conn, PersonRole::Owner, entry_id)?;
        entry.renters = person_repo::linked_persons(self.conn, PersonRole::Renter, entry_id)?;
        entry.coordinates = coordinate_repo::list_for(self.conn, entry_id)?
            .into_iter()
            .map(|stored| stored.coordinate)
            .collect();
        Ok(entry)
    }
}

impl EntryRepository for SqliteEntryRepository<'_> {
    fn save_entry(&mut self, entry: &Entry) -> RepoResult<EntryId> {
        entry.validate()?;
        let started_at = Instant::now();
        let result = self
            .save_in_tx(entry)
            .map_err(|err| err.in_write("save", None));
        log_write("entry_save", result.as_ref().ok().copied(), started_at, &result);
        result
    }

    fn update_entry(&mut self, entry: &Entry) -> RepoResult<()> {
        let entry_id = match entry.id {
            Some(id) if id > 0 => id,
            Some(id) => {
                return Err(RepoError::InvalidArgument(format!(
                    "entry id must be positive, got {id}"
                )))
            }
            None => {
                return Err(RepoError::InvalidArgument(
                    "update requires a saved entry id".to_string(),
                ))
            }
        };
        entry.validate()?;

        let started_at = Instant::now();
        let result = self
            .update_in_tx(entry_id, entry)
            .map_err(|err| err.in_write("update", Some(entry_id)));
        log_write("entry_update", Some(entry_id), started_at, &result);
        result
    }

    fn delete_entry(&mut self, id: EntryId) -> RepoResult<()> {
        if id <= 0 {
            return Err(RepoError::InvalidArgument(format!(
                "entry id must be positive, got {id}"
            )));
        }

        let started_at = Instant::now();
        let result = self
            .delete_in_tx(id)
            .map_err(|err| err.in_write("delete", Some(id)));
        log_write("entry_delete", Some(id), started_at, &result);
        result
    }

    fn get_entry(&self, id: EntryId) -> RepoResult<Entry> {
        let row = self
            .conn
            .query_row(
                &format!("{ENTRY_SELECT_SQL} WHERE id = ?1;"),
                [id],
                |row| Ok(parse_entry_row(row)),
            )
            .optional()?;

        match row {
            Some(entry) => self.assemble(entry?, id),
            None => Err(RepoError::NotFound(RecordRef::Entry(id))),
        }
    }

    fn list_entries(&self) -> RepoResult<Vec<Entry>> {
        let rows = {
            let mut stmt = self
                .conn
                .prepare(&format!("{ENTRY_SELECT_SQL} ORDER BY id ASC;"))?;
            let mut rows = stmt.query([])?;
            let mut entries = Vec::new();
            while let Some(row) = rows.next()? {
                entries.push(parse_entry_row(row)?);
            }
            entries
        };

        rows.into_iter()
            .map(|entry| {
                let entry_id = stored_id(&entry)?;
                self.assemble(entry, entry_id)
            })
            .collect()
    }

    fn list_persons(&self, role: PersonRole) -> RepoResult<Vec<PersonSummary>> {
        person_repo::list_summaries(self.conn, role)
    }

    fn list_entries_for_person(
        &self,
        role: PersonRole,
        person_id: PersonId,
    ) -> RepoResult<Vec<Entry>> {
        if person_repo::get_person(self.conn, role, person_id)?.is_none() {
            return Err(RepoError::NotFound(RecordRef::Person {
                role,
                id: person_id,
            }));
        }

        person_repo::entry_ids_for_person(self.conn, role, person_id)?
            .into_iter()
            .map(|entry_id| self.get_entry(entry_id))
            .collect()
    }
}

fn resolve_persons(
    tx: &Transaction<'_>,
    entry: &Entry,
    role: PersonRole,
) -> RepoResult<Vec<PersonId>> {
    entry
        .persons(role)
        .iter()
        .map(|person| person_repo::get_or_create(tx, role, person))
        .collect()
}

fn entry_exists(conn: &Connection, entry_id: EntryId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM entries WHERE id = ?1);",
        [entry_id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<Entry> {
    let timestamp_text: String = row.get("timestamp")?;
    let created_at = DateTime::parse_from_rfc3339(&timestamp_text)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid timestamp `{timestamp_text}` in entries.timestamp"
            ))
        })?;

    let start_text: String = row.get("start_date")?;
    let start = parse_date(&start_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid date `{start_text}` in entries.start_date"))
    })?;
    let end_text: String = row.get("end_date")?;
    let end = parse_date(&end_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid date `{end_text}` in entries.end_date"))
    })?;

    Ok(Entry {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        created_at,
        code: row.get("code")?,
        external_ref: row.get("external_ref")?,
        size: row.get("size")?,
        land_type: row.get("type")?,
        rent: row.get("rent")?,
        start,
        end,
        document: row.get("document_blob")?,
        owners: Vec::new(),
        renters: Vec::new(),
        coordinates: Vec::new(),
    })
}

fn stored_id(entry: &Entry) -> RepoResult<EntryId> {
    entry
        .id
        .ok_or_else(|| RepoError::InvalidData("entry row without id".to_string()))
}

fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn log_write<T>(
    event: &str,
    entry_id: Option<EntryId>,
    started_at: Instant,
    result: &RepoResult<T>,
) {
    let entry_id = entry_id.map_or_else(|| "none".to_string(), |id| id.to_string());
    match result {
        Ok(_) => info!(
            "event={} module=repo status=ok entry_id={} duration_ms={}",
            event,
            entry_id,
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event={} module=repo status=error entry_id={} duration_ms={} error_kind={:?} error={}",
            event,
            entry_id,
            started_at.elapsed().as_millis(),
            err.kind(),
            err
        ),
    }
}

fn ensure_entry_connection_ready(conn: &Connection) -> RepoResult<()> {
    for table in REQUIRED_TABLES {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
