//! Driven port for user account persistence.

use async_trait::async_trait;

use crate::domain::{RecordId, Revision, Stored, UserAccount};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "user repository query failed: {message}",
        /// No user is stored under the identifier.
        NotFound { id: String } =>
            "user {id} not found",
        /// Optimistic concurrency check failed.
        RevisionMismatch { expected: u64, actual: u64 } =>
            "revision mismatch: expected {expected}, found {actual}",
    }
}

/// Port for user account storage and retrieval.
///
/// Revision semantics match [`super::PersonRepository`]. Usernames are not
/// required to be unique at this layer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All accounts ordered by username ascending.
    async fn list(&self) -> Result<Vec<Stored<UserAccount>>, UserRepositoryError>;

    /// Number of stored accounts.
    async fn count(&self) -> Result<u64, UserRepositoryError>;

    /// Store a new account under a fresh identifier.
    async fn insert(
        &self,
        account: &UserAccount,
    ) -> Result<Stored<UserAccount>, UserRepositoryError>;

    /// Store `account` only while no other account exists.
    ///
    /// The emptiness check and the insert are atomic; `None` means the store
    /// already held an account.
    async fn insert_first(
        &self,
        account: &UserAccount,
    ) -> Result<Option<Stored<UserAccount>>, UserRepositoryError>;

    /// Fetch an account; `None` when the identifier is unknown.
    async fn find(
        &self,
        id: &RecordId,
    ) -> Result<Option<Stored<UserAccount>>, UserRepositoryError>;

    /// Fetch the first account (lowest identifier) holding `username`.
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Stored<UserAccount>>, UserRepositoryError>;

    /// Overwrite an account, returning it at its new revision.
    async fn save(
        &self,
        account: &Stored<UserAccount>,
    ) -> Result<Stored<UserAccount>, UserRepositoryError>;

    /// Remove an account read at `revision`.
    async fn delete(&self, id: &RecordId, revision: Revision) -> Result<(), UserRepositoryError>;
}
