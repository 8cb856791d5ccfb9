use chrono::NaiveDate;
use landrent_core::db::open_db_in_memory;
use landrent_core::{
    Entry, EntryRepository, ErrorKind, Person, PersonRole, RecordRef, RepoError,
    SqliteEntryRepository,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn entry_with(name: &str, owners: Vec<Person>, renters: Vec<Person>) -> Entry {
    let mut entry = Entry::new(name, date(2025, 1, 1), date(2025, 12, 31));
    entry.rent = 300.0;
    entry.owners = owners;
    entry.renters = renters;
    entry
}

fn maria(tax_id: i64) -> Person {
    let mut person = Person::new("Maria", "Papadopoulos");
    person.tax_id = Some(tax_id);
    person
}

#[test]
fn shared_owner_is_stored_once_and_lists_both_entries() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteEntryRepository::try_new(&mut conn).unwrap();

    let north = repo
        .save_entry(&entry_with("North Field", vec![maria(111)], vec![]))
        .unwrap();
    let south = repo
        .save_entry(&entry_with("South Field", vec![maria(222)], vec![]))
        .unwrap();

    let owners = repo.list_persons(PersonRole::Owner).unwrap();
    assert_eq!(owners.len(), 1);
    assert_eq!(owners[0].person.full_name(), "Maria Papadopoulos");
    assert_eq!(owners[0].entry_ids, vec![north, south]);

    // Details are taken from the first payload that introduced the pair.
    assert_eq!(owners[0].person.tax_id, Some(111));

    let first_owner_id = repo.get_entry(north).unwrap().owners[0].id;
    let second_owner_id = repo.get_entry(south).unwrap().owners[0].id;
    assert!(first_owner_id.is_some());
    assert_eq!(first_owner_id, second_owner_id);
}

#[test]
fn name_matching_is_exact() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteEntryRepository::try_new(&mut conn).unwrap();

    repo.save_entry(&entry_with(
        "North Field",
        vec![
            Person::new("Maria", "Papadopoulos"),
            Person::new("maria", "Papadopoulos"),
        ],
        vec![],
    ))
    .unwrap();

    assert_eq!(repo.list_persons(PersonRole::Owner).unwrap().len(), 2);
}

#[test]
fn duplicate_person_in_one_payload_links_once() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteEntryRepository::try_new(&mut conn).unwrap();

    let id = repo
        .save_entry(&entry_with(
            "North Field",
            vec![],
            vec![Person::new("Alice", "Brown"), Person::new("Alice", "Brown")],
        ))
        .unwrap();

    let loaded = repo.get_entry(id).unwrap();
    assert_eq!(loaded.renters.len(), 1);
}

#[test]
fn roles_do_not_share_identities() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteEntryRepository::try_new(&mut conn).unwrap();

    let person = Person::new("Nikos", "Ioannidis");
    let id = repo
        .save_entry(&entry_with(
            "North Field",
            vec![person.clone()],
            vec![person.clone()],
        ))
        .unwrap();

    let owners = repo.list_persons(PersonRole::Owner).unwrap();
    let renters = repo.list_persons(PersonRole::Renter).unwrap();
    assert_eq!(owners.len(), 1);
    assert_eq!(renters.len(), 1);
    assert_eq!(owners[0].entry_ids, vec![id]);
    assert_eq!(renters[0].entry_ids, vec![id]);
}

#[test]
fn deleting_an_entry_unlinks_but_keeps_the_person() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteEntryRepository::try_new(&mut conn).unwrap();

    let north = repo
        .save_entry(&entry_with("North Field", vec![maria(111)], vec![]))
        .unwrap();
    let south = repo
        .save_entry(&entry_with("South Field", vec![maria(111)], vec![]))
        .unwrap();

    repo.delete_entry(north).unwrap();
    let owners = repo.list_persons(PersonRole::Owner).unwrap();
    assert_eq!(owners[0].entry_ids, vec![south]);

    repo.delete_entry(south).unwrap();
    let owners = repo.list_persons(PersonRole::Owner).unwrap();
    assert_eq!(owners.len(), 1);
    assert!(owners[0].entry_ids.is_empty());
}

#[test]
fn persons_are_listed_by_last_then_first_name() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteEntryRepository::try_new(&mut conn).unwrap();

    repo.save_entry(&entry_with(
        "North Field",
        vec![],
        vec![
            Person::new("Zoe", "Brown"),
            Person::new("Nikos", "Ioannidis"),
            Person::new("Alice", "Brown"),
        ],
    ))
    .unwrap();

    let renters: Vec<String> = repo
        .list_persons(PersonRole::Renter)
        .unwrap()
        .into_iter()
        .map(|summary| summary.person.full_name())
        .collect();
    assert_eq!(renters, vec!["Alice Brown", "Zoe Brown", "Nikos Ioannidis"]);
}

#[test]
fn entries_for_person_returns_linked_aggregates() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteEntryRepository::try_new(&mut conn).unwrap();

    let north = repo
        .save_entry(&entry_with("North Field", vec![maria(111)], vec![]))
        .unwrap();
    repo.save_entry(&entry_with(
        "East Field",
        vec![Person::new("Eleni", "Georgiou")],
        vec![],
    ))
    .unwrap();
    let south = repo
        .save_entry(&entry_with("South Field", vec![maria(111)], vec![]))
        .unwrap();

    let owner_id = repo.get_entry(north).unwrap().owners[0].id.unwrap();
    let entries = repo
        .list_entries_for_person(PersonRole::Owner, owner_id)
        .unwrap();
    let ids: Vec<_> = entries.iter().filter_map(|entry| entry.id).collect();
    assert_eq!(ids, vec![north, south]);
    assert!(entries.iter().all(|entry| entry.owners.len() == 1));
}

#[test]
fn entries_for_unknown_person_is_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&mut conn).unwrap();

    let err = repo
        .list_entries_for_person(PersonRole::Renter, 404)
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound(RecordRef::Person {
            role: PersonRole::Renter,
            id: 404
        })
    ));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
