//! Driven port for person persistence.
//!
//! Adapters hold person records keyed by [`RecordId`] and enforce optimistic
//! concurrency through [`Revision`] checks on save and delete.

use async_trait::async_trait;

use crate::domain::{Person, RecordId, Revision, Stored};

use super::define_port_error;

define_port_error! {
    /// Errors raised by person repository adapters.
    pub enum PersonRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "person repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "person repository query failed: {message}",
        /// No person is stored under the identifier.
        NotFound { id: String } =>
            "person {id} not found",
        /// Optimistic concurrency check failed.
        RevisionMismatch { expected: u64, actual: u64 } =>
            "revision mismatch: expected {expected}, found {actual}",
    }
}

/// Port for person storage and retrieval.
///
/// # Revision Semantics
///
/// - Inserted persons start at [`Revision::INITIAL`].
/// - [`PersonRepository::save`] succeeds only when the stored revision equals
///   the one carried by the argument, and then advances it by one.
/// - [`PersonRepository::delete`] applies the same check.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PersonRepository: Send + Sync {
    /// All persons ordered by surname, then name, ascending.
    async fn list(&self) -> Result<Vec<Stored<Person>>, PersonRepositoryError>;

    /// Store a new person under a fresh identifier.
    async fn insert(&self, person: &Person) -> Result<Stored<Person>, PersonRepositoryError>;

    /// Fetch a person; `None` when the identifier is unknown.
    async fn find(&self, id: &RecordId) -> Result<Option<Stored<Person>>, PersonRepositoryError>;

    /// Overwrite a person, returning it at its new revision.
    async fn save(&self, person: &Stored<Person>)
    -> Result<Stored<Person>, PersonRepositoryError>;

    /// Remove a person read at `revision`.
    async fn delete(&self, id: &RecordId, revision: Revision) -> Result<(), PersonRepositoryError>;
}
