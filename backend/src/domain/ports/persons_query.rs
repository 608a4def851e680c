//! Driving port for person reads.

use async_trait::async_trait;

use crate::domain::{Error, Person, Stored};

/// Domain use-case port for listing persons.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PersonsQuery: Send + Sync {
    /// Every person, ordered by surname then name.
    async fn list_persons(&self) -> Result<Vec<Stored<Person>>, Error>;
}
