//! Client-facing messages for record store failures.
//!
//! Every store failure surfaces as an `internal_error` naming the attempted
//! operation. The underlying cause is logged and never sent to the client.

use std::fmt;

use tracing::error;

use super::Error;

/// Record store operations that can fail on behalf of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    /// Listing persons.
    LoadPersons,
    /// Inserting a person.
    SavePerson,
    /// Fetching a person before update or delete.
    FindPerson,
    /// Saving an overwritten person.
    UpdatePerson,
    /// Deleting a person.
    DeletePerson,
    /// Looking up a user by username or identifier.
    FindUser,
    /// Listing or counting users.
    ListUsers,
    /// Inserting a user.
    SaveUser,
    /// Saving a renamed user.
    UpdateUser,
    /// Saving a re-hashed password.
    ChangePassword,
    /// Deleting a user.
    DeleteUser,
}

impl StoreOperation {
    /// Message returned to clients when the operation fails.
    pub const fn message(self) -> &'static str {
        match self {
            Self::LoadPersons => "Error loading persons (database error). Please try again.",
            Self::SavePerson => "Error saving new person (database error). Please try again.",
            Self::FindPerson => "Error finding existing person (database error). Please try again.",
            Self::UpdatePerson => {
                "Error updating existing person (database error). Please try again."
            }
            Self::DeletePerson => {
                "Error deleting existing person (database error). Please try again."
            }
            Self::FindUser => "Error finding existing user (database error). Please try again.",
            Self::ListUsers => "Error finding users list (database error). Please try again.",
            Self::SaveUser => "Error saving new user (database error). Please try again.",
            Self::UpdateUser => "Error updating existing user (database error). Please try again.",
            Self::ChangePassword => {
                "Error changing existing user password (database error). Please try again."
            }
            Self::DeleteUser => "Error deleting existing user (database error). Please try again.",
        }
    }

    /// Log `cause` and build the client-facing error.
    pub fn failed(self, cause: impl fmt::Display) -> Error {
        error!(operation = ?self, error = %cause, "record store operation failed");
        Error::internal(self.message())
    }
}
