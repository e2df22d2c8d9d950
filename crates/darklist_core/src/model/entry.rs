//! Entry domain model.
//!
//! # Responsibility
//! - Define the `Entry` record and its two-phase identity.
//! - Validate user-supplied fields at the only place entries are built.
//!
//! # Invariants
//! - `name` and `link` are non-empty once an `Entry` exists. Both stay
//!   otherwise untrusted: no trimming, no length limit, no sanitization.
//! - A provisional id and the confirmed id echoing the same value denote the
//!   same logical entry.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Identity of one display-list entry.
///
/// Provisional ids are minted on the client at submit time; confirmed ids are
/// issued (or echoed back) by the backend. The reconciler only ever merges
/// confirmed ids into the authoritative list, so the tag doubles as the
/// merge-path guard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum EntryId {
    /// Client-generated placeholder identity, pre-confirmation.
    Provisional(Uuid),
    /// Server-issued opaque identity.
    Confirmed(String),
}

impl EntryId {
    /// Mints a fresh provisional id for an optimistic entry.
    pub fn fresh_provisional() -> Self {
        Self::Provisional(Uuid::new_v4())
    }

    /// Wraps a server-issued id.
    pub fn confirmed(value: impl Into<String>) -> Self {
        Self::Confirmed(value.into())
    }

    pub fn is_provisional(&self) -> bool {
        matches!(self, Self::Provisional(_))
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed(_))
    }

    /// Canonical wire form of the id.
    ///
    /// Provisional ids canonicalize to the hyphenated UUID string that is
    /// also sent as the `id` variable of the create mutation.
    pub fn canonical(&self) -> String {
        match self {
            Self::Provisional(uuid) => uuid.to_string(),
            Self::Confirmed(value) => value.clone(),
        }
    }

    /// Whether two ids denote the same logical entry.
    ///
    /// A confirmed id that parses to the same UUID as a provisional id is the
    /// server echo of that provisional entry.
    pub fn same_entry(&self, other: &EntryId) -> bool {
        match (self, other) {
            (Self::Provisional(a), Self::Provisional(b)) => a == b,
            (Self::Confirmed(a), Self::Confirmed(b)) => a == b,
            (Self::Provisional(uuid), Self::Confirmed(value))
            | (Self::Confirmed(value), Self::Provisional(uuid)) => Uuid::parse_str(value)
                .map(|parsed| parsed == *uuid)
                .unwrap_or(false),
        }
    }
}

impl Display for EntryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

/// Validation failure for entry fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryValidationError {
    EmptyName,
    EmptyLink,
}

impl Display for EntryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "entry name must not be empty"),
            Self::EmptyLink => write!(f, "entry link must not be empty"),
        }
    }
}

impl Error for EntryValidationError {}

/// One submitted name/link pair.
///
/// Created on successful form submit (local variant: final immediately;
/// networked variant: provisional, then superseded by its confirmed
/// counterpart). Never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Provisional or confirmed identity; unique within the display list.
    pub id: EntryId,
    /// User-supplied display name, non-empty, otherwise untrusted.
    pub name: String,
    /// User-supplied URL string, non-empty, otherwise untrusted.
    pub link: String,
}

impl Entry {
    /// Creates an entry with a caller-provided identity.
    ///
    /// Used by the form (provisional ids) and by wire decoding (confirmed
    /// ids); both paths must reject empty fields so the display list never
    /// shows a field-invalid entry.
    pub fn with_id(
        id: EntryId,
        name: impl Into<String>,
        link: impl Into<String>,
    ) -> Result<Self, EntryValidationError> {
        let name = name.into();
        let link = link.into();
        if name.is_empty() {
            return Err(EntryValidationError::EmptyName);
        }
        if link.is_empty() {
            return Err(EntryValidationError::EmptyLink);
        }
        Ok(Self { id, name, link })
    }

    /// Creates a provisional entry with a freshly minted id.
    pub fn provisional(
        name: impl Into<String>,
        link: impl Into<String>,
    ) -> Result<Self, EntryValidationError> {
        Self::with_id(EntryId::fresh_provisional(), name, link)
    }
}

#[cfg(test)]
mod tests {
    use super::{Entry, EntryId, EntryValidationError};
    use uuid::Uuid;

    #[test]
    fn provisional_entry_gets_unique_ids() {
        let first = Entry::provisional("Lyft", "https://lyft.com").unwrap();
        let second = Entry::provisional("Lyft", "https://lyft.com").unwrap();
        assert!(first.id.is_provisional());
        assert!(!first.id.same_entry(&second.id));
    }

    #[test]
    fn with_id_rejects_empty_fields() {
        let id = EntryId::fresh_provisional();
        assert_eq!(
            Entry::with_id(id.clone(), "", "https://lyft.com").unwrap_err(),
            EntryValidationError::EmptyName
        );
        assert_eq!(
            Entry::with_id(id, "Lyft", "").unwrap_err(),
            EntryValidationError::EmptyLink
        );
    }

    #[test]
    fn confirmed_echo_matches_its_provisional_id() {
        let uuid = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
        let provisional = EntryId::Provisional(uuid);
        let echoed = EntryId::confirmed(uuid.to_string());
        assert!(provisional.same_entry(&echoed));
        assert!(echoed.same_entry(&provisional));
    }

    #[test]
    fn unrelated_confirmed_id_does_not_match_provisional() {
        let provisional = EntryId::fresh_provisional();
        let other = EntryId::confirmed("srv-42");
        assert!(!provisional.same_entry(&other));
    }

    #[test]
    fn canonical_form_round_trips_through_confirmed() {
        let provisional = EntryId::fresh_provisional();
        let echoed = EntryId::confirmed(provisional.canonical());
        assert!(provisional.same_entry(&echoed));
        assert_eq!(provisional.canonical(), echoed.canonical());
    }
}
