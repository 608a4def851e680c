//! Diesel and pool error mapping shared by the repositories.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::Revision;

use super::pool::PoolError;

/// Map pool errors through a repository-specific connection constructor.
pub(crate) fn map_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map Diesel errors through repository-specific query/connection constructors.
///
/// Details stay in the debug log; the mapped error carries a short summary.
pub(crate) fn map_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: FnOnce(&'static str) -> E,
    C: FnOnce(&'static str) -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        _ => query("database error"),
    }
}

/// Convert a stored revision column into the domain token.
#[expect(
    clippy::cast_sign_loss,
    reason = "revision column carries a CHECK (revision > 0) constraint"
)]
pub(crate) fn revision_from_db(value: i64) -> Revision {
    Revision::new(value as u64)
}

/// Convert a domain revision into the column value.
#[expect(
    clippy::cast_possible_wrap,
    reason = "revisions advance by one per save and never approach i64::MAX"
)]
pub(crate) fn revision_to_db(revision: Revision) -> i64 {
    revision.get() as i64
}
