//! Driving port for person mutations.

use async_trait::async_trait;

use crate::domain::{Error, Person, RecordId};

/// Domain use-case port for creating, overwriting, and removing persons.
///
/// Updates and deletes fetch the record first; an unknown identifier fails the
/// fetch step.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PersonsCommand: Send + Sync {
    /// Store a new person.
    async fn create_person(&self, person: Person) -> Result<RecordId, Error>;

    /// Replace surname, name, and birthdate of an existing person.
    async fn update_person(&self, id: &RecordId, person: Person) -> Result<(), Error>;

    /// Remove an existing person.
    async fn delete_person(&self, id: &RecordId) -> Result<(), Error>;
}
