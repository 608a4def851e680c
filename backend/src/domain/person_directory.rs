//! Person directory service.
//!
//! Implements the person driving ports on top of a [`PersonRepository`].
//! Update and delete are fetch-then-write pairs guarded by the revision read
//! in the fetch step.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{PersonRepository, PersonsCommand, PersonsQuery};
use crate::domain::{Error, Person, RecordId, Stored, StoreOperation};

/// Person service implementing [`PersonsQuery`] and [`PersonsCommand`].
#[derive(Clone)]
pub struct PersonDirectory<R> {
    repo: Arc<R>,
}

impl<R> PersonDirectory<R> {
    /// Create a new service over the given repository.
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

impl<R> PersonDirectory<R>
where
    R: PersonRepository,
{
    async fn fetch(&self, id: &RecordId) -> Result<Stored<Person>, Error> {
        match self.repo.find(id).await {
            Ok(Some(stored)) => Ok(stored),
            Ok(None) => Err(StoreOperation::FindPerson.failed(format_args!("person {id} not found"))),
            Err(err) => Err(StoreOperation::FindPerson.failed(err)),
        }
    }
}

#[async_trait]
impl<R> PersonsQuery for PersonDirectory<R>
where
    R: PersonRepository,
{
    async fn list_persons(&self) -> Result<Vec<Stored<Person>>, Error> {
        self.repo
            .list()
            .await
            .map_err(|err| StoreOperation::LoadPersons.failed(err))
    }
}

#[async_trait]
impl<R> PersonsCommand for PersonDirectory<R>
where
    R: PersonRepository,
{
    async fn create_person(&self, person: Person) -> Result<RecordId, Error> {
        let stored = self
            .repo
            .insert(&person)
            .await
            .map_err(|err| StoreOperation::SavePerson.failed(err))?;
        Ok(stored.id)
    }

    async fn update_person(&self, id: &RecordId, person: Person) -> Result<(), Error> {
        let current = self.fetch(id).await?;
        self.repo
            .save(&current.with_record(person))
            .await
            .map_err(|err| StoreOperation::UpdatePerson.failed(err))?;
        Ok(())
    }

    async fn delete_person(&self, id: &RecordId) -> Result<(), Error> {
        let current = self.fetch(id).await?;
        self.repo
            .delete(&current.id, current.revision)
            .await
            .map_err(|err| StoreOperation::DeletePerson.failed(err))
    }
}
