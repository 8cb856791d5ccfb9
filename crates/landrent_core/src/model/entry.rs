//! Entry aggregate: one land-rental contract.
//!
//! # Responsibility
//! - Define the contract record together with its owners, renters and
//!   parcel coordinates.
//! - Validate a payload before the repository writes it.
//!
//! # Invariants
//! - `start` is never after `end` for a valid entry.
//! - Every coordinate is inside the latitude/longitude ranges.
//! - Coordinate count is not fixed here; arity rules belong to callers.

use crate::model::person::{Person, PersonRole};
use crate::numeric::{is_negative, is_valid_latitude, is_valid_longitude};
use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage identity of an entry. Positive once assigned.
pub type EntryId = i64;

/// Text format of contract dates, both in storage and in notifications.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// One (latitude, longitude) pair of the parcel boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        is_valid_latitude(self.latitude) && is_valid_longitude(self.longitude)
    }
}

/// Full contract aggregate as written by `save`/`update` and returned by reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// `None` for unsaved payloads; required by `update`.
    pub id: Option<EntryId>,
    /// User-facing label.
    pub name: String,
    /// Stored at second precision.
    pub created_at: DateTime<Utc>,
    /// Contract-specific numeric code.
    pub code: i64,
    /// Free-text reference into an external land registry.
    pub external_ref: String,
    /// Land size.
    pub size: f64,
    /// Land-use type.
    pub land_type: String,
    /// Monthly rent; rounded to 2 places on write.
    pub rent: f64,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Attached contract scan, if any.
    pub document: Option<Vec<u8>>,
    pub owners: Vec<Person>,
    pub renters: Vec<Person>,
    /// Parcel boundary in input order.
    pub coordinates: Vec<Coordinate>,
}

/// Reasons an entry payload is rejected before persistence.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EntryValidationError {
    #[error("entry name must not be blank")]
    BlankName,
    #[error("`{field}` must be a finite number")]
    NonFinite { field: &'static str },
    #[error("`{field}` must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("contract start {start} is after its end {end}")]
    DateRange { start: NaiveDate, end: NaiveDate },
    #[error("coordinate #{index} ({latitude}, {longitude}) is out of range")]
    CoordinateOutOfRange {
        index: usize,
        latitude: f64,
        longitude: f64,
    },
    #[error("{role} #{index} needs both a first and a last name")]
    BlankPersonName { role: PersonRole, index: usize },
}

impl Entry {
    /// Creates an unsaved entry stamped with the current time.
    ///
    /// Numeric fields start at zero and the person/coordinate lists empty.
    pub fn new(name: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            id: None,
            name: name.into(),
            created_at: Utc::now().trunc_subsecs(0),
            code: 0,
            external_ref: String::new(),
            size: 0.0,
            land_type: String::new(),
            rent: 0.0,
            start,
            end,
            document: None,
            owners: Vec::new(),
            renters: Vec::new(),
            coordinates: Vec::new(),
        }
    }

    /// Persons linked under `role`.
    pub fn persons(&self, role: PersonRole) -> &[Person] {
        match role {
            PersonRole::Owner => &self.owners,
            PersonRole::Renter => &self.renters,
        }
    }

    /// Checks payload rules that do not need storage access.
    pub fn validate(&self) -> Result<(), EntryValidationError> {
        if self.name.trim().is_empty() {
            return Err(EntryValidationError::BlankName);
        }

        for (field, value) in [("size", self.size), ("rent", self.rent)] {
            if !value.is_finite() {
                return Err(EntryValidationError::NonFinite { field });
            }
            if is_negative(value) {
                return Err(EntryValidationError::Negative { field, value });
            }
        }

        if self.start > self.end {
            return Err(EntryValidationError::DateRange {
                start: self.start,
                end: self.end,
            });
        }

        if let Some((index, coord)) = self
            .coordinates
            .iter()
            .enumerate()
            .find(|(_, coord)| !coord.is_valid())
        {
            return Err(EntryValidationError::CoordinateOutOfRange {
                index,
                latitude: coord.latitude,
                longitude: coord.longitude,
            });
        }

        for role in PersonRole::ALL {
            if let Some(index) = self.persons(role).iter().position(|person| {
                person.first_name.trim().is_empty() || person.last_name.trim().is_empty()
            }) {
                return Err(EntryValidationError::BlankPersonName { role, index });
            }
        }

        Ok(())
    }
}

/// Renders a contract date in [`DATE_FORMAT`].
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parses a contract date written in [`DATE_FORMAT`].
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}
