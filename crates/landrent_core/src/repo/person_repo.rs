//! Person registry: de-duplicated owner and renter records.
//!
//! # Responsibility
//! - Resolve a person payload to a stable identity inside the caller's
//!   transaction, creating the record only for an unseen name pair.
//! - Read persons back, per entry or grouped for browse views.
//!
//! # Invariants
//! - (first name, last name) is unique per role table (unique index).
//! - Creation is insert-on-conflict-then-fetch, so two writers racing on the
//!   same pair both end up with the one stored identity.
//! - Existing records are never updated or deleted here.

use crate::model::entry::EntryId;
use crate::model::person::{Person, PersonId, PersonRole, PersonSummary};
use crate::repo::{role_tables, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::collections::BTreeMap;

const PERSON_COLUMNS: &str =
    "id, first_name, last_name, fathers_name, tax_id, doc_id, document_blob, notes";

/// Returns the identity of the stored person matching `person` by name,
/// inserting a new record with every supplied field when none exists.
pub(crate) fn get_or_create(
    tx: &Transaction<'_>,
    role: PersonRole,
    person: &Person,
) -> RepoResult<PersonId> {
    if let Some(id) = find_by_name(tx, role, &person.first_name, &person.last_name)? {
        return Ok(id);
    }
    insert_or_fetch(tx, role, person)
}

fn find_by_name(
    conn: &Connection,
    role: PersonRole,
    first_name: &str,
    last_name: &str,
) -> RepoResult<Option<PersonId>> {
    let tables = role_tables(role);
    let id = conn
        .query_row(
            &format!(
                "SELECT id FROM {} WHERE first_name = ?1 AND last_name = ?2;",
                tables.person
            ),
            params![first_name, last_name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

fn insert_or_fetch(tx: &Transaction<'_>, role: PersonRole, person: &Person) -> RepoResult<PersonId> {
    let tables = role_tables(role);
    let inserted: Option<PersonId> = tx
        .query_row(
            &format!(
                "INSERT INTO {} (
                    first_name,
                    last_name,
                    fathers_name,
                    tax_id,
                    doc_id,
                    document_blob,
                    notes
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(first_name, last_name) DO NOTHING
                RETURNING id;",
                tables.person
            ),
            params![
                person.first_name.as_str(),
                person.last_name.as_str(),
                person.fathers_name.as_deref(),
                person.tax_id,
                person.doc_id.as_deref(),
                person.document.as_deref(),
                person.notes.as_deref(),
            ],
            |row| row.get(0),
        )
        .optional()?;

    match inserted {
        Some(id) => Ok(id),
        None => find_by_name(tx, role, &person.first_name, &person.last_name)?.ok_or_else(|| {
            RepoError::InvalidData(format!(
                "{role} name conflict reported but no matching row in {}",
                tables.person
            ))
        }),
    }
}

/// Loads one person by identity.
pub(crate) fn get_person(
    conn: &Connection,
    role: PersonRole,
    id: PersonId,
) -> RepoResult<Option<Person>> {
    let tables = role_tables(role);
    let person = conn
        .query_row(
            &format!(
                "SELECT {PERSON_COLUMNS} FROM {} WHERE id = ?1;",
                tables.person
            ),
            [id],
            parse_person_row,
        )
        .optional()?;
    Ok(person)
}

/// Persons linked to `entry_id` under `role`, in link order.
pub(crate) fn linked_persons(
    conn: &Connection,
    role: PersonRole,
    entry_id: EntryId,
) -> RepoResult<Vec<Person>> {
    let tables = role_tables(role);
    let mut stmt = conn.prepare(&format!(
        "SELECT p.id, p.first_name, p.last_name, p.fathers_name, p.tax_id, p.doc_id,
                p.document_blob, p.notes
         FROM {person} p
         INNER JOIN {junction} j ON j.{fk} = p.id
         WHERE j.entry_id = ?1
         ORDER BY j.rowid ASC;",
        person = tables.person,
        junction = tables.junction,
        fk = tables.person_fk,
    ))?;
    let mut rows = stmt.query([entry_id])?;
    let mut persons = Vec::new();
    while let Some(row) = rows.next()? {
        persons.push(parse_person_row(row)?);
    }
    Ok(persons)
}

/// Entry identities linked to one person, ascending.
pub(crate) fn entry_ids_for_person(
    conn: &Connection,
    role: PersonRole,
    person_id: PersonId,
) -> RepoResult<Vec<EntryId>> {
    let tables = role_tables(role);
    let mut stmt = conn.prepare(&format!(
        "SELECT entry_id FROM {} WHERE {} = ?1 ORDER BY entry_id ASC;",
        tables.junction, tables.person_fk
    ))?;
    let mut rows = stmt.query([person_id])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        ids.push(row.get(0)?);
    }
    Ok(ids)
}

/// Every person of `role` with the entries it is linked to.
///
/// Sorted by last name, then first name.
pub(crate) fn list_summaries(
    conn: &Connection,
    role: PersonRole,
) -> RepoResult<Vec<PersonSummary>> {
    let tables = role_tables(role);

    let persons = {
        let mut stmt = conn.prepare(&format!(
            "SELECT {PERSON_COLUMNS} FROM {}
             ORDER BY last_name ASC, first_name ASC, id ASC;",
            tables.person
        ))?;
        let mut rows = stmt.query([])?;
        let mut persons = Vec::new();
        while let Some(row) = rows.next()? {
            persons.push(parse_person_row(row)?);
        }
        persons
    };

    let mut links: BTreeMap<PersonId, Vec<EntryId>> = BTreeMap::new();
    {
        let mut stmt = conn.prepare(&format!(
            "SELECT {}, entry_id FROM {} ORDER BY entry_id ASC;",
            tables.person_fk, tables.junction
        ))?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let person_id: PersonId = row.get(0)?;
            let entry_id: EntryId = row.get(1)?;
            links.entry(person_id).or_default().push(entry_id);
        }
    }

    Ok(persons
        .into_iter()
        .map(|person| {
            let entry_ids = person
                .id
                .and_then(|id| links.remove(&id))
                .unwrap_or_default();
            PersonSummary { person, entry_ids }
        })
        .collect())
}

fn parse_person_row(row: &Row<'_>) -> rusqlite::Result<Person> {
    Ok(Person {
        id: Some(row.get(0)?),
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        fathers_name: row.get(3)?,
        tax_id: row.get(4)?,
        doc_id: row.get(5)?,
        document: row.get(6)?,
        notes: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::{get_or_create, insert_or_fetch};
    use crate::db::open_db_in_memory;
    use crate::model::person::{Person, PersonRole};

    fn count(conn: &rusqlite::Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
            row.get(0)
        })
        .unwrap()
    }

    #[test]
    fn get_or_create_reuses_existing_name_pair() {
        let mut conn = open_db_in_memory().unwrap();
        let tx = conn.transaction().unwrap();

        let mut first = Person::new("Maria", "Papadopoulos");
        first.tax_id = Some(123456789);
        let id_a = get_or_create(&tx, PersonRole::Owner, &first).unwrap();

        let second = Person::new("Maria", "Papadopoulos");
        let id_b = get_or_create(&tx, PersonRole::Owner, &second).unwrap();
        tx.commit().unwrap();

        assert_eq!(id_a, id_b);
        assert_eq!(count(&conn, "owner_records"), 1);
        let tax_id: Option<i64> = conn
            .query_row("SELECT tax_id FROM owner_records;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(tax_id, Some(123456789));
    }

    #[test]
    fn roles_are_independent_tables() {
        let mut conn = open_db_in_memory().unwrap();
        let tx = conn.transaction().unwrap();
        let person = Person::new("Nikos", "Ioannidis");
        get_or_create(&tx, PersonRole::Owner, &person).unwrap();
        get_or_create(&tx, PersonRole::Renter, &person).unwrap();
        tx.commit().unwrap();

        assert_eq!(count(&conn, "owner_records"), 1);
        assert_eq!(count(&conn, "renter_records"), 1);
    }

    #[test]
    fn insert_conflict_falls_back_to_existing_identity() {
        let mut conn = open_db_in_memory().unwrap();
        let tx = conn.transaction().unwrap();
        let person = Person::new("Alice", "Brown");

        // A concurrent writer got there between lookup and insert.
        let winner = insert_or_fetch(&tx, PersonRole::Renter, &person).unwrap();
        let loser = insert_or_fetch(&tx, PersonRole::Renter, &person).unwrap();
        tx.commit().unwrap();

        assert_eq!(winner, loser);
        assert_eq!(count(&conn, "renter_records"), 1);
    }
}
