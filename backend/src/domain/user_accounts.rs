//! User account service.
//!
//! Implements login, listing, and account management on top of a
//! [`UserRepository`] and a [`PasswordHasher`]. Passwords are hashed before
//! any account reaches the repository.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::ports::{
    LoginService, PasswordHasher, UserRepository, UserSummary, UsersCommand, UsersQuery,
};
use crate::domain::validation::{FieldError, validation_error};
use crate::domain::{
    AuthenticatedUser, Credentials, Error, Password, RecordId, StoreOperation, Stored,
    UNAUTHORIZED_MESSAGE, UserAccount,
};

/// Rejection returned when initialisation runs against a populated store.
pub const ALREADY_INITIALIZED_MESSAGE: &str =
    "Initialization available only with no user defined!";
/// Rejection returned when initialisation lacks a username or password.
pub const INITIALIZE_MANDATORY_MESSAGE: &str = "Username and Password are mandatory!";
/// Field message reported when a username is held by another account.
pub const USERNAME_TAKEN_MESSAGE: &str = "Username is already taken";

/// Account service implementing [`LoginService`], [`UsersQuery`], and
/// [`UsersCommand`].
#[derive(Clone)]
pub struct UserAccounts<R, H> {
    users: Arc<R>,
    hasher: Arc<H>,
    unique_usernames: bool,
}

impl<R, H> UserAccounts<R, H> {
    /// Create a new service. Usernames are not checked for uniqueness.
    pub fn new(users: Arc<R>, hasher: Arc<H>) -> Self {
        Self {
            users,
            hasher,
            unique_usernames: false,
        }
    }

    /// Reject usernames already held by another account.
    #[must_use]
    pub fn with_unique_usernames(mut self, enabled: bool) -> Self {
        self.unique_usernames = enabled;
        self
    }
}

impl<R, H> UserAccounts<R, H>
where
    R: UserRepository,
    H: PasswordHasher,
{
    async fn fetch(&self, id: &RecordId) -> Result<Stored<UserAccount>, Error> {
        match self.users.find(id).await {
            Ok(Some(stored)) => Ok(stored),
            Ok(None) => Err(StoreOperation::FindUser.failed(format_args!("user {id} not found"))),
            Err(err) => Err(StoreOperation::FindUser.failed(err)),
        }
    }

    /// Fail when `username` belongs to an account other than `owner`.
    async fn ensure_username_available(
        &self,
        username: &str,
        owner: Option<&RecordId>,
    ) -> Result<(), Error> {
        if !self.unique_usernames {
            return Ok(());
        }
        let holder = self
            .users
            .find_by_username(username)
            .await
            .map_err(|err| StoreOperation::FindUser.failed(err))?;
        match holder {
            Some(existing) if Some(&existing.id) != owner => Err(validation_error(vec![
                FieldError::new("username", USERNAME_TAKEN_MESSAGE),
            ])),
            _ => Ok(()),
        }
    }

    /// Hash the password and build the account to store.
    async fn prepare(&self, credentials: &Credentials) -> Result<UserAccount, Error> {
        let hash = self
            .hasher
            .hash(credentials.password())
            .await
            .map_err(|err| StoreOperation::SaveUser.failed(err))?;
        UserAccount::try_new(credentials.username(), hash)
            .map_err(|err| validation_error(vec![FieldError::new("username", err.to_string())]))
    }

    async fn insert(&self, credentials: &Credentials) -> Result<RecordId, Error> {
        let account = self.prepare(credentials).await?;
        let stored = self
            .users
            .insert(&account)
            .await
            .map_err(|err| StoreOperation::SaveUser.failed(err))?;
        Ok(stored.id)
    }
}

#[async_trait]
impl<R, H> LoginService for UserAccounts<R, H>
where
    R: UserRepository,
    H: PasswordHasher,
{
    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthenticatedUser, Error> {
        let Some(stored) = self
            .users
            .find_by_username(credentials.username())
            .await
            .map_err(|err| StoreOperation::FindUser.failed(err))?
        else {
            // Spend one hash so an unknown username costs as much as a
            // password check.
            if let Err(err) = self.hasher.hash(credentials.password()).await {
                warn!(error = %err, "hashing for unknown username failed");
            }
            debug!("login rejected: unknown username");
            return Err(Error::unauthorized(UNAUTHORIZED_MESSAGE));
        };

        let verified = self
            .hasher
            .verify(credentials.password(), stored.record.password_hash())
            .await
            .unwrap_or_else(|err| {
                warn!(user_id = %stored.id, error = %err, "password verification failed");
                false
            });
        if !verified {
            debug!(user_id = %stored.id, "login rejected: password mismatch");
            return Err(Error::unauthorized(UNAUTHORIZED_MESSAGE));
        }

        Ok(AuthenticatedUser {
            username: stored.record.username().to_owned(),
            id: stored.id,
        })
    }

    async fn resolve(&self, id: &RecordId) -> Result<Option<AuthenticatedUser>, Error> {
        let stored = self
            .users
            .find(id)
            .await
            .map_err(|err| StoreOperation::FindUser.failed(err))?;
        Ok(stored.map(|stored| AuthenticatedUser {
            username: stored.record.username().to_owned(),
            id: stored.id,
        }))
    }
}

#[async_trait]
impl<R, H> UsersQuery for UserAccounts<R, H>
where
    R: UserRepository,
    H: PasswordHasher,
{
    async fn list_users(&self) -> Result<Vec<UserSummary>, Error> {
        let accounts = self
            .users
            .list()
            .await
            .map_err(|err| StoreOperation::ListUsers.failed(err))?;
        Ok(accounts
            .into_iter()
            .map(|stored| UserSummary {
                username: stored.record.username().to_owned(),
                id: stored.id,
            })
            .collect())
    }
}

#[async_trait]
impl<R, H> UsersCommand for UserAccounts<R, H>
where
    R: UserRepository,
    H: PasswordHasher,
{
    async fn initialize(&self, credentials: Option<Credentials>) -> Result<RecordId, Error> {
        let count = self
            .users
            .count()
            .await
            .map_err(|err| StoreOperation::ListUsers.failed(err))?;
        if count != 0 {
            return Err(Error::invalid_request(ALREADY_INITIALIZED_MESSAGE));
        }
        let credentials =
            credentials.ok_or_else(|| Error::invalid_request(INITIALIZE_MANDATORY_MESSAGE))?;
        let account = self.prepare(&credentials).await?;
        // Another initialisation may have won since the count.
        let stored = self
            .users
            .insert_first(&account)
            .await
            .map_err(|err| StoreOperation::SaveUser.failed(err))?
            .ok_or_else(|| Error::invalid_request(ALREADY_INITIALIZED_MESSAGE))?;
        Ok(stored.id)
    }

    async fn create_user(&self, credentials: Credentials) -> Result<RecordId, Error> {
        self.ensure_username_available(credentials.username(), None)
            .await?;
        self.insert(&credentials).await
    }

    async fn rename_user(&self, id: &RecordId, username: &str) -> Result<(), Error> {
        let current = self.fetch(id).await?;
        self.ensure_username_available(username, Some(&current.id))
            .await?;
        let renamed = current.record.clone().renamed(username).map_err(|err| {
            validation_error(vec![FieldError::new("username", err.to_string())])
        })?;
        self.users
            .save(&current.with_record(renamed))
            .await
            .map_err(|err| StoreOperation::UpdateUser.failed(err))?;
        Ok(())
    }

    async fn change_password(&self, id: &RecordId, password: Password) -> Result<(), Error> {
        let current = self.fetch(id).await?;
        let hash = self
            .hasher
            .hash(&password)
            .await
            .map_err(|err| StoreOperation::ChangePassword.failed(err))?;
        let updated = current.record.clone().with_password_hash(hash);
        self.users
            .save(&current.with_record(updated))
            .await
            .map_err(|err| StoreOperation::ChangePassword.failed(err))?;
        Ok(())
    }

    async fn delete_user(&self, id: &RecordId) -> Result<(), Error> {
        let current = self.fetch(id).await?;
        self.users
            .delete(&current.id, current.revision)
            .await
            .map_err(|err| StoreOperation::DeleteUser.failed(err))
    }
}

#[cfg(test)]
#[path = "user_accounts_tests.rs"]
mod tests;
