//! PostgreSQL-backed `PersonRepository` using Diesel.
//!
//! Identifiers that are not UUIDs cannot exist in the `persons` table, so
//! lookups with them report "not found" without touching the database.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{PersonRepository, PersonRepositoryError};
use crate::domain::{Person, RecordId, Revision, Stored};

use super::diesel_error_mapping::{
    map_diesel_error, map_pool_error, revision_from_db, revision_to_db,
};
use super::models::{NewPersonRow, PersonRow, PersonUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::persons;

/// Diesel-backed implementation of [`PersonRepository`].
#[derive(Clone)]
pub struct DieselPersonRepository {
    pool: DbPool,
}

impl DieselPersonRepository {
    /// Create a repository over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> PersonRepositoryError {
    map_pool_error(error, PersonRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> PersonRepositoryError {
    map_diesel_error(
        error,
        PersonRepositoryError::query,
        PersonRepositoryError::connection,
    )
}

fn parse_id(id: &RecordId) -> Option<Uuid> {
    let parsed = id.to_uuid();
    if parsed.is_none() {
        debug!(%id, "person id is not a UUID");
    }
    parsed
}

fn row_to_stored(row: PersonRow) -> Result<Stored<Person>, PersonRepositoryError> {
    let person = Person::try_new(row.surname, row.name, row.birthdate).map_err(|err| {
        PersonRepositoryError::query(format!("stored person {} is invalid: {err}", row.id))
    })?;
    Ok(Stored::new(
        RecordId::from(row.id),
        revision_from_db(row.revision),
        person,
    ))
}

/// Explain a zero-row conditional write: the record is gone or moved on.
async fn write_failure<C>(conn: &mut C, id: Uuid, expected: Revision) -> PersonRepositoryError
where
    C: diesel_async::AsyncConnection<Backend = diesel::pg::Pg> + Send,
{
    let current = persons::table
        .filter(persons::id.eq(id))
        .select(persons::revision)
        .first::<i64>(conn)
        .await
        .optional();

    match current {
        Ok(Some(actual)) => PersonRepositoryError::revision_mismatch(
            expected.get(),
            revision_from_db(actual).get(),
        ),
        Ok(None) => PersonRepositoryError::not_found(id.to_string()),
        Err(err) => diesel_error(err),
    }
}

#[async_trait]
impl PersonRepository for DieselPersonRepository {
    async fn list(&self) -> Result<Vec<Stored<Person>>, PersonRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<PersonRow> = persons::table
            .order((persons::surname.asc(), persons::name.asc(), persons::id.asc()))
            .select(PersonRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows.into_iter().map(row_to_stored).collect()
    }

    async fn insert(&self, person: &Person) -> Result<Stored<Person>, PersonRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = NewPersonRow {
            id: Uuid::new_v4(),
            surname: person.surname(),
            name: person.name(),
            birthdate: person.birthdate(),
            revision: revision_to_db(Revision::INITIAL),
        };
        let inserted: PersonRow = diesel::insert_into(persons::table)
            .values(&row)
            .returning(PersonRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        row_to_stored(inserted)
    }

    async fn find(&self, id: &RecordId) -> Result<Option<Stored<Person>>, PersonRepositoryError> {
        let Some(uuid) = parse_id(id) else {
            return Ok(None);
        };
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<PersonRow> = persons::table
            .filter(persons::id.eq(uuid))
            .select(PersonRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(row_to_stored).transpose()
    }

    async fn save(
        &self,
        person: &Stored<Person>,
    ) -> Result<Stored<Person>, PersonRepositoryError> {
        let uuid =
            parse_id(&person.id).ok_or_else(|| PersonRepositoryError::not_found(person.id.as_ref()))?;
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let update = PersonUpdate {
            surname: person.record.surname(),
            name: person.record.name(),
            birthdate: person.record.birthdate(),
            revision: revision_to_db(person.revision.next()),
        };
        let updated: Option<PersonRow> = diesel::update(
            persons::table
                .filter(persons::id.eq(uuid))
                .filter(persons::revision.eq(revision_to_db(person.revision))),
        )
        .set(&update)
        .returning(PersonRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(diesel_error)?;

        match updated {
            Some(row) => row_to_stored(row),
            None => Err(write_failure(&mut conn, uuid, person.revision).await),
        }
    }

    async fn delete(&self, id: &RecordId, revision: Revision) -> Result<(), PersonRepositoryError> {
        let uuid = parse_id(id).ok_or_else(|| PersonRepositoryError::not_found(id.as_ref()))?;
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let deleted = diesel::delete(
            persons::table
                .filter(persons::id.eq(uuid))
                .filter(persons::revision.eq(revision_to_db(revision))),
        )
        .execute(&mut conn)
        .await
        .map_err(diesel_error)?;

        if deleted == 0 {
            return Err(write_failure(&mut conn, uuid, revision).await);
        }
        Ok(())
    }
}
