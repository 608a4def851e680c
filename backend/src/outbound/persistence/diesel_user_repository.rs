//! PostgreSQL-backed `UserRepository` using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{PasswordHash, RecordId, Revision, Stored, UserAccount};

use super::diesel_error_mapping::{
    map_diesel_error, map_pool_error, revision_from_db, revision_to_db,
};
use super::models::{NewUserRow, UserRow, UserUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Blocks concurrent writers to `users` until the transaction ends while
/// still allowing reads.
const LOCK_USERS_SQL: &str = "LOCK TABLE users IN SHARE ROW EXCLUSIVE MODE";

/// Diesel-backed implementation of [`UserRepository`].
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a repository over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> UserRepositoryError {
    map_pool_error(error, UserRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    map_diesel_error(
        error,
        UserRepositoryError::query,
        UserRepositoryError::connection,
    )
}

fn parse_id(id: &RecordId) -> Option<Uuid> {
    let parsed = id.to_uuid();
    if parsed.is_none() {
        debug!(%id, "user id is not a UUID");
    }
    parsed
}

fn row_to_stored(row: UserRow) -> Result<Stored<UserAccount>, UserRepositoryError> {
    let account = UserAccount::try_new(row.username, PasswordHash::new(row.password_hash))
        .map_err(|err| {
            UserRepositoryError::query(format!("stored user {} is invalid: {err}", row.id))
        })?;
    Ok(Stored::new(
        RecordId::from(row.id),
        revision_from_db(row.revision),
        account,
    ))
}

/// Explain a zero-row conditional write: the record is gone or moved on.
async fn write_failure<C>(conn: &mut C, id: Uuid, expected: Revision) -> UserRepositoryError
where
    C: diesel_async::AsyncConnection<Backend = diesel::pg::Pg> + Send,
{
    let current = users::table
        .filter(users::id.eq(id))
        .select(users::revision)
        .first::<i64>(conn)
        .await
        .optional();

    match current {
        Ok(Some(actual)) => {
            UserRepositoryError::revision_mismatch(expected.get(), revision_from_db(actual).get())
        }
        Ok(None) => UserRepositoryError::not_found(id.to_string()),
        Err(err) => diesel_error(err),
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn list(&self) -> Result<Vec<Stored<UserAccount>>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<UserRow> = users::table
            .order((users::username.asc(), users::id.asc()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows.into_iter().map(row_to_stored).collect()
    }

    async fn count(&self) -> Result<u64, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let total: i64 = users::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        u64::try_from(total).map_err(|_| UserRepositoryError::query("negative user count"))
    }

    async fn insert(
        &self,
        account: &UserAccount,
    ) -> Result<Stored<UserAccount>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = NewUserRow {
            id: Uuid::new_v4(),
            username: account.username(),
            password_hash: account.password_hash().as_str(),
            revision: revision_to_db(Revision::INITIAL),
        };
        let inserted: UserRow = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        row_to_stored(inserted)
    }

    async fn insert_first(
        &self,
        account: &UserAccount,
    ) -> Result<Option<Stored<UserAccount>>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = NewUserRow {
            id: Uuid::new_v4(),
            username: account.username(),
            password_hash: account.password_hash().as_str(),
            revision: revision_to_db(Revision::INITIAL),
        };
        let inserted: Option<UserRow> = conn
            .transaction(|conn| {
                async move {
                    diesel::sql_query(LOCK_USERS_SQL).execute(conn).await?;
                    let total: i64 = users::table.count().get_result(conn).await?;
                    if total != 0 {
                        return Ok(None);
                    }
                    diesel::insert_into(users::table)
                        .values(&row)
                        .returning(UserRow::as_returning())
                        .get_result(conn)
                        .await
                        .map(Some)
                }
                .scope_boxed()
            })
            .await
            .map_err(diesel_error)?;
        inserted.map(row_to_stored).transpose()
    }

    async fn find(
        &self,
        id: &RecordId,
    ) -> Result<Option<Stored<UserAccount>>, UserRepositoryError> {
        let Some(uuid) = parse_id(id) else {
            return Ok(None);
        };
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::id.eq(uuid))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(row_to_stored).transpose()
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Stored<UserAccount>>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::username.eq(username))
            .order(users::id.asc())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(row_to_stored).transpose()
    }

    async fn save(
        &self,
        account: &Stored<UserAccount>,
    ) -> Result<Stored<UserAccount>, UserRepositoryError> {
        let uuid =
            parse_id(&account.id).ok_or_else(|| UserRepositoryError::not_found(account.id.as_ref()))?;
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let update = UserUpdate {
            username: account.record.username(),
            password_hash: account.record.password_hash().as_str(),
            revision: revision_to_db(account.revision.next()),
        };
        let updated: Option<UserRow> = diesel::update(
            users::table
                .filter(users::id.eq(uuid))
                .filter(users::revision.eq(revision_to_db(account.revision))),
        )
        .set(&update)
        .returning(UserRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(diesel_error)?;

        match updated {
            Some(row) => row_to_stored(row),
            None => Err(write_failure(&mut conn, uuid, account.revision).await),
        }
    }

    async fn delete(&self, id: &RecordId, revision: Revision) -> Result<(), UserRepositoryError> {
        let uuid = parse_id(id).ok_or_else(|| UserRepositoryError::not_found(id.as_ref()))?;
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let deleted = diesel::delete(
            users::table
                .filter(users::id.eq(uuid))
                .filter(users::revision.eq(revision_to_db(revision))),
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
