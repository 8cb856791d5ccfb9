//! Entry use-case service.
//!
//! # Responsibility
//! - Provide the save/update/delete/read APIs the presentation layer calls.
//! - Notify subscribers after each committed write so views can refresh.
//! - Apply caller-chosen policies that are not storage invariants.
//!
//! # Invariants
//! - Listeners run only after a write committed, never on failure.
//! - A coordinate arity policy is checked before storage is touched.
//! - `*_or_empty` reads never fail; they return the error message instead.

use crate::model::entry::{Entry, EntryId};
use crate::model::person::{PersonId, PersonRole, PersonSummary};
use crate::reminder::{find_expiring, ExpiryNotice, DEFAULT_WINDOW_DAYS};
use crate::repo::entry_repo::EntryRepository;
use crate::repo::{RepoError, RepoResult};
use chrono::NaiveDate;
use log::warn;

/// Committed write reported to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryChange {
    Saved(EntryId),
    Updated(EntryId),
    Deleted(EntryId),
}

impl EntryChange {
    pub fn entry_id(self) -> EntryId {
        match self {
            Self::Saved(id) | Self::Updated(id) | Self::Deleted(id) => id,
        }
    }
}

/// Callback invoked with every committed [`EntryChange`].
pub type ChangeListener = Box<dyn Fn(&EntryChange)>;

/// List envelope for views that must render even when the read failed.
#[derive(Debug, Clone, PartialEq)]
pub struct ListResult<T> {
    /// Empty when `error` is set.
    pub items: Vec<T>,
    /// Message to surface to the user.
    pub error: Option<String>,
}

impl<T> ListResult<T> {
    fn from_result(result: RepoResult<Vec<T>>, event: &str) -> Self {
        match result {
            Ok(items) => Self { items, error: None },
            Err(err) => {
                warn!(
                    "event={} module=service status=degraded error_kind={:?}",
                    event,
                    err.kind()
                );
                Self {
                    items: Vec::new(),
                    error: Some(err.to_string()),
                }
            }
        }
    }
}

/// Entry service facade over repository implementations.
pub struct EntryService<R: EntryRepository> {
    repo: R,
    required_corners: Option<usize>,
    reminder_window_days: i64,
    listeners: Vec<ChangeListener>,
}

impl<R: EntryRepository> EntryService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            required_corners: None,
            reminder_window_days: DEFAULT_WINDOW_DAYS,
            listeners: Vec::new(),
        }
    }

    /// Requires every saved or updated entry to carry exactly `corners`
    /// coordinates.
    pub fn with_required_corners(mut self, corners: usize) -> Self {
        self.required_corners = Some(corners);
        self
    }

    pub fn with_reminder_window(mut self, days: i64) -> Self {
        self.reminder_window_days = days;
        self
    }

    /// Registers a callback for committed writes.
    pub fn subscribe(&mut self, listener: impl Fn(&EntryChange) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn save_entry(&mut self, entry: &Entry) -> RepoResult<EntryId> {
        self.check_corners(entry)?;
        let id = self.repo.save_entry(entry)?;
        self.notify(EntryChange::Saved(id));
        Ok(id)
    }

    pub fn update_entry(&mut self, entry: &Entry) -> RepoResult<()> {
        self.check_corners(entry)?;
        self.repo.update_entry(entry)?;
        if let Some(id) = entry.id {
            self.notify(EntryChange::Updated(id));
        }
        Ok(())
    }

    pub fn delete_entry(&mut self, id: EntryId) -> RepoResult<()> {
        self.repo.delete_entry(id)?;
        self.notify(EntryChange::Deleted(id));
        Ok(())
    }

    pub fn get_entry(&self, id: EntryId) -> RepoResult<Entry> {
        self.repo.get_entry(id)
    }

    pub fn list_entries(&self) -> RepoResult<Vec<Entry>> {
        self.repo.list_entries()
    }

    /// Like [`Self::list_entries`], degrading to an empty list on failure.
    pub fn list_entries_or_empty(&self) -> ListResult<Entry> {
        ListResult::from_result(self.repo.list_entries(), "entry_list")
    }

    pub fn list_persons(&self, role: PersonRole) -> RepoResult<Vec<PersonSummary>> {
        self.repo.list_persons(role)
    }

    /// Like [`Self::list_persons`], degrading to an empty list on failure.
    pub fn list_persons_or_empty(&self, role: PersonRole) -> ListResult<PersonSummary> {
        ListResult::from_result(self.repo.list_persons(role), "person_list")
    }

    pub fn list_entries_for_person(
        &self,
        role: PersonRole,
        person_id: PersonId,
    ) -> RepoResult<Vec<Entry>> {
        self.repo.list_entries_for_person(role, person_id)
    }

    /// Contracts ending within the configured reminder window after `today`.
    pub fn expiring_contracts(&self, today: NaiveDate) -> RepoResult<Vec<ExpiryNotice>> {
        let entries = self.repo.list_entries()?;
        Ok(find_expiring(&entries, today, self.reminder_window_days))
    }

    fn check_corners(&self, entry: &Entry) -> RepoResult<()> {
        match self.required_corners {
            Some(expected) if entry.coordinates.len() != expected => {
                Err(RepoError::InvalidArgument(format!(
                    "expected exactly {expected} coordinates, got {}",
                    entry.coordinates.len()
                )))
            }
            _ => Ok(()),
        }
    }

    fn notify(&self, change: EntryChange) {
        for listener in &self.listeners {
            listener(&change);
        }
    }
}
