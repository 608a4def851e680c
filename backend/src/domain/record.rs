//! Record identity and concurrency tokens shared by every stored kind.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque record identifier assigned by the record store.
///
/// The value is carried verbatim: identifiers taken from request paths are
/// not parsed here, so a malformed key reaches the store and fails there.
///
/// # Examples
/// ```
/// use roster::domain::RecordId;
///
/// let id = RecordId::new("4f1c2a9e-0d55-4c4b-9a53-6f4a2f1b7e10");
/// assert_eq!(id.as_ref(), "4f1c2a9e-0d55-4c4b-9a53-6f4a2f1b7e10");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Wrap an identifier without validating its shape.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh identifier for a new record.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Parse the identifier as a UUID, for stores keyed by UUID columns.
    pub fn to_uuid(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.0).ok()
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Uuid> for RecordId {
    fn from(value: Uuid) -> Self {
        Self(value.to_string())
    }
}

/// Optimistic concurrency token.
///
/// New records start at [`Revision::INITIAL`]; each successful save moves the
/// stored revision to [`Revision::next`]. A save presenting any other revision
/// is rejected by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Revision(u64);

impl Revision {
    /// Revision of a freshly inserted record.
    pub const INITIAL: Self = Self(1);

    /// Wrap a raw revision value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw revision value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Revision a record moves to after a successful save.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A record as held by the store: identity, revision, and payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stored<T> {
    /// Store-assigned identifier.
    pub id: RecordId,
    /// Revision observed when the record was read.
    pub revision: Revision,
    /// Record payload.
    pub record: T,
}

impl<T> Stored<T> {
    /// Bundle a payload with its identity and revision.
    pub fn new(id: RecordId, revision: Revision, record: T) -> Self {
        Self {
            id,
            revision,
            record,
        }
    }

    /// Replace the payload, keeping identity and the observed revision.
    pub fn with_record(self, record: T) -> Self {
        Self {
            id: self.id,
            revision: self.revision,
            record,
        }
    }
}
