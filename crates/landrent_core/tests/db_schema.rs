use landrent_core::db::migrations::{latest_version, REQUIRED_TABLES};
use landrent_core::db::{open_db, open_db_in_memory, DbError};
use landrent_core::{ErrorKind, RepoError, SqliteEntryRepository};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_creates_every_table() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in REQUIRED_TABLES {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn foreign_keys_are_enforced_on_returned_connections() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);

    let err = conn
        .execute(
            "INSERT INTO coordinates (entry_id, latitude, longitude) VALUES (42, 1.0, 2.0);",
            [],
        )
        .unwrap_err();
    assert_eq!(
        err.sqlite_error_code(),
        Some(rusqlite::ErrorCode::ConstraintViolation)
    );
}

#[test]
fn deleting_entry_row_cascades_to_dependents() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO entries (id, name, timestamp, code, external_ref, size, type, rent,
                              start_date, end_date)
         VALUES (1, 'North Field', '2025-01-01T00:00:00Z', 0, '', 1.0, '', 450.0,
                 '01-01-2025', '31-12-2025');
         INSERT INTO coordinates (entry_id, latitude, longitude) VALUES (1, 37.98, 23.72);
         INSERT INTO owner_records (id, first_name, last_name) VALUES (1, 'Maria', 'Papadopoulos');
         INSERT INTO renter_records (id, first_name, last_name) VALUES (1, 'Nikos', 'Ioannidis');
         INSERT INTO entry_owner (entry_id, owner_id) VALUES (1, 1);
         INSERT INTO entry_renter (entry_id, renter_id) VALUES (1, 1);",
    )
    .unwrap();

    conn.execute("DELETE FROM entries WHERE id = 1;", []).unwrap();

    assert_eq!(count_rows(&conn, "coordinates"), 0);
    assert_eq!(count_rows(&conn, "entry_owner"), 0);
    assert_eq!(count_rows(&conn, "entry_renter"), 0);
    assert_eq!(count_rows(&conn, "owner_records"), 1);
    assert_eq!(count_rows(&conn, "renter_records"), 1);
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("entries.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO owner_records (first_name, last_name) VALUES ('Maria', 'Papadopoulos');",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let owners: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM owner_records;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(owners, 1);
}

#[test]
fn open_db_creates_missing_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("entries.db");

    let conn = open_db(&path).unwrap();
    assert!(path.exists());
    assert_table_exists(&conn, "entries");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn person_name_pair_is_unique_per_role_table() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO renter_records (first_name, last_name) VALUES ('Alice', 'Brown');",
        [],
    )
    .unwrap();

    let err = conn
        .execute(
            "INSERT INTO renter_records (first_name, last_name) VALUES ('Alice', 'Brown');",
            [],
        )
        .unwrap_err();
    assert_eq!(
        err.sqlite_error_code(),
        Some(rusqlite::ErrorCode::ConstraintViolation)
    );

    // Same pair in the other role table is a different person.
    conn.execute(
        "INSERT INTO owner_records (first_name, last_name) VALUES ('Alice', 'Brown');",
        [],
    )
    .unwrap();
}

#[test]
fn repository_refuses_connection_without_schema() {
    let mut conn = Connection::open_in_memory().unwrap();

    let err = match SqliteEntryRepository::try_new(&mut conn) {
        Ok(_) => panic!("bare connection must be rejected"),
        Err(err) => err,
    };
    assert!(matches!(err, RepoError::MissingRequiredTable("entries")));
    assert_eq!(err.kind(), ErrorKind::SchemaInitFailure);
}

fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
