//! Driving port for user account reads.
//!
//! Results carry identifiers and usernames only, so password hashes never
//! reach inbound adapters.

use async_trait::async_trait;

use crate::domain::{Error, RecordId};

/// Public projection of a user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    /// Account identifier.
    pub id: RecordId,
    /// Login name.
    pub username: String,
}

/// Domain use-case port for listing users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Every account ordered by username.
    async fn list_users(&self) -> Result<Vec<UserSummary>, Error>;
}
