//! Driving port for login/authentication use-cases.
//!
//! Inbound adapters call it to check credentials without knowing the backing
//! store, so handler tests can substitute a double instead of wiring
//! persistence.

use async_trait::async_trait;

use crate::domain::{AuthenticatedUser, Credentials, Error, RecordId};

/// Domain use-case port for authentication.
///
/// Failures never reveal whether the username exists: an unknown user and a
/// wrong password both yield the same `unauthorized` error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the matching account.
    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthenticatedUser, Error>;

    /// Current account for a previously authenticated id.
    ///
    /// `None` once the account has been deleted.
    async fn resolve(&self, id: &RecordId) -> Result<Option<AuthenticatedUser>, Error>;
}
