//! Driving port for user account mutations.

use async_trait::async_trait;

use crate::domain::{Credentials, Error, Password, RecordId};

/// Domain use-case port for account management.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersCommand: Send + Sync {
    /// Create the first account.
    ///
    /// The user count is checked before `credentials`: any existing account
    /// rejects the call, and only then are absent credentials reported.
    async fn initialize(&self, credentials: Option<Credentials>) -> Result<RecordId, Error>;

    /// Create an account with a freshly hashed password.
    async fn create_user(&self, credentials: Credentials) -> Result<RecordId, Error>;

    /// Change an account's username.
    async fn rename_user(&self, id: &RecordId, username: &str) -> Result<(), Error>;

    /// Re-hash and store a new password.
    async fn change_password(&self, id: &RecordId, password: Password) -> Result<(), Error>;

    /// Remove an account.
    async fn delete_user(&self, id: &RecordId) -> Result<(), Error>;
}
