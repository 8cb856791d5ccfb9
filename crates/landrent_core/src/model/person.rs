//! Landlord and renter records.
//!
//! Owners and renters share one shape but live in independent tables; the
//! [`PersonRole`] selects which one an operation touches.

use crate::model::entry::EntryId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Storage identity of one owner or renter record.
pub type PersonId = i64;

/// Which side of the contract a person appears on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonRole {
    /// Landlord.
    Owner,
    Renter,
}

impl PersonRole {
    pub const ALL: [PersonRole; 2] = [PersonRole::Owner, PersonRole::Renter];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Renter => "renter",
        }
    }
}

impl Display for PersonRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One landlord or renter.
///
/// Shared by every entry that references the same name pair; details other
/// than the names are only written the first time the pair is seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// `None` until the record has been persisted.
    pub id: Option<PersonId>,
    pub first_name: String,
    pub last_name: String,
    pub fathers_name: Option<String>,
    /// Numeric tax identifier.
    pub tax_id: Option<i64>,
    /// Identity-document code.
    pub doc_id: Option<String>,
    /// Scanned document bytes, if attached.
    pub document: Option<Vec<u8>>,
    pub notes: Option<String>,
}

impl Person {
    /// Creates an unsaved person with only the de-duplication key set.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Self::default()
        }
    }

    /// `"first last"` label used by list views.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Browse-view row: one person plus every entry it is linked to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonSummary {
    pub person: Person,
    /// Ascending, without duplicates. Empty when no entry links the person.
    pub entry_ids: Vec<EntryId>,
}
