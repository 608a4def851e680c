//! In-process record store and session store.
//!
//! Used when no database URL (or Redis URL, for sessions) is configured and
//! by HTTP tests. Records live in
//! ordered maps behind async locks and follow the same revision rules as the
//! PostgreSQL adapters: inserts start at revision 1, and saves or deletes
//! carrying a stale revision are rejected.

mod sessions;

pub use sessions::MemorySessionStore;

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{
    PersonRepository, PersonRepositoryError, UserRepository, UserRepositoryError,
};
use crate::domain::{Person, RecordId, Revision, Stored, UserAccount};

/// Failures shared by both tables before they are mapped to port errors.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TableError {
    NotFound(RecordId),
    RevisionMismatch { expected: Revision, actual: Revision },
}

/// One kind of record keyed by identifier.
#[derive(Debug)]
struct Table<T> {
    rows: RwLock<BTreeMap<RecordId, Stored<T>>>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<T: Clone> Table<T> {
    async fn all(&self) -> Vec<Stored<T>> {
        self.rows.read().await.values().cloned().collect()
    }

    async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    async fn insert(&self, record: &T) -> Stored<T> {
        let stored = Stored::new(RecordId::generate(), Revision::INITIAL, record.clone());
        self.rows
            .write()
            .await
            .insert(stored.id.clone(), stored.clone());
        stored
    }

    async fn insert_if_empty(&self, record: &T) -> Option<Stored<T>> {
        let mut rows = self.rows.write().await;
        if !rows.is_empty() {
            return None;
        }
        let stored = Stored::new(RecordId::generate(), Revision::INITIAL, record.clone());
        rows.insert(stored.id.clone(), stored.clone());
        Some(stored)
    }

    async fn get(&self, id: &RecordId) -> Option<Stored<T>> {
        self.rows.read().await.get(id).cloned()
    }

    async fn save(&self, record: &Stored<T>) -> Result<Stored<T>, TableError> {
        let mut rows = self.rows.write().await;
        let current = rows
            .get_mut(&record.id)
            .ok_or_else(|| TableError::NotFound(record.id.clone()))?;
        if current.revision != record.revision {
            return Err(TableError::RevisionMismatch {
                expected: record.revision,
                actual: current.revision,
            });
        }
        *current = Stored::new(
            record.id.clone(),
            record.revision.next(),
            record.record.clone(),
        );
        Ok(current.clone())
    }

    async fn remove(&self, id: &RecordId, revision: Revision) -> Result<(), TableError> {
        let mut rows = self.rows.write().await;
        let current = rows
            .get(id)
            .ok_or_else(|| TableError::NotFound(id.clone()))?;
        if current.revision != revision {
            return Err(TableError::RevisionMismatch {
                expected: revision,
                actual: current.revision,
            });
        }
        rows.remove(id);
        Ok(())
    }
}

impl From<TableError> for PersonRepositoryError {
    fn from(value: TableError) -> Self {
        match value {
            TableError::NotFound(id) => Self::not_found(id.to_string()),
            TableError::RevisionMismatch { expected, actual } => {
                Self::revision_mismatch(expected.get(), actual.get())
            }
        }
    }
}

impl From<TableError> for UserRepositoryError {
    fn from(value: TableError) -> Self {
        match value {
            TableError::NotFound(id) => Self::not_found(id.to_string()),
            TableError::RevisionMismatch { expected, actual } => {
                Self::revision_mismatch(expected.get(), actual.get())
            }
        }
    }
}

/// In-memory [`PersonRepository`].
#[derive(Debug, Default)]
pub struct InMemoryPersonRepository {
    table: Table<Person>,
}

impl InMemoryPersonRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersonRepository for InMemoryPersonRepository {
    async fn list(&self) -> Result<Vec<Stored<Person>>, PersonRepositoryError> {
        let mut persons = self.table.all().await;
        persons.sort_by(|a, b| {
            (a.record.surname(), a.record.name(), &a.id)
                .cmp(&(b.record.surname(), b.record.name(), &b.id))
        });
        Ok(persons)
    }

    async fn insert(&self, person: &Person) -> Result<Stored<Person>, PersonRepositoryError> {
        Ok(self.table.insert(person).await)
    }

    async fn find(&self, id: &RecordId) -> Result<Option<Stored<Person>>, PersonRepositoryError> {
        Ok(self.table.get(id).await)
    }

    async fn save(
        &self,
        person: &Stored<Person>,
    ) -> Result<Stored<Person>, PersonRepositoryError> {
        Ok(self.table.save(person).await?)
    }

    async fn delete(&self, id: &RecordId, revision: Revision) -> Result<(), PersonRepositoryError> {
        Ok(self.table.remove(id, revision).await?)
    }
}

/// In-memory [`UserRepository`].
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    table: Table<UserAccount>,
}

impl InMemoryUserRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list(&self) -> Result<Vec<Stored<UserAccount>>, UserRepositoryError> {
        let mut users = self.table.all().await;
        users.sort_by(|a, b| (a.record.username(), &a.id).cmp(&(b.record.username(), &b.id)));
        Ok(users)
    }

    async fn count(&self) -> Result<u64, UserRepositoryError> {
        u64::try_from(self.table.len().await)
            .map_err(|err| UserRepositoryError::query(err.to_string()))
    }

    async fn insert(
        &self,
        account: &UserAccount,
    ) -> Result<Stored<UserAccount>, UserRepositoryError> {
        Ok(self.table.insert(account).await)
    }

    async fn insert_first(
        &self,
        account: &UserAccount,
    ) -> Result<Option<Stored<UserAccount>>, UserRepositoryError> {
        Ok(self.table.insert_if_empty(account).await)
    }

    async fn find(
        &self,
        id: &RecordId,
    ) -> Result<Option<Stored<UserAccount>>, UserRepositoryError> {
        Ok(self.table.get(id).await)
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Stored<UserAccount>>, UserRepositoryError> {
        // Rows iterate in identifier order, so the first match is the lowest id.
        Ok(self
            .table
            .all()
            .await
            .into_iter()
            .find(|stored| stored.record.username() == username))
    }

    async fn save(
        &self,
        account: &Stored<UserAccount>,
    ) -> Result<Stored<UserAccount>, UserRepositoryError> {
        Ok(self.table.save(account).await?)
    }

    async fn delete(&self, id: &RecordId, revision: Revision) -> Result<(), UserRepositoryError> {
        Ok(self.table.remove(id, revision).await?)
    }
}
