//! Wiring of repositories and domain services into [`HttpState`].

use std::sync::Arc;

use tracing::warn;

use crate::domain::ports::{PersonRepository, UserRepository};
use crate::domain::{PersonDirectory, UserAccounts};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::crypto::BcryptPasswordHasher;
use crate::outbound::memory::{InMemoryPersonRepository, InMemoryUserRepository};
use crate::outbound::persistence::{DieselPersonRepository, DieselUserRepository};

use super::ServerConfig;

/// Build handler state over the given repositories.
///
/// One `UserAccounts` instance serves as login, query and command port so
/// every path shares the same hashing and uniqueness rules.
pub fn http_state_over<P, U>(persons: Arc<P>, users: Arc<U>, config: &ServerConfig) -> HttpState
where
    P: PersonRepository + 'static,
    U: UserRepository + 'static,
{
    let directory = Arc::new(PersonDirectory::new(persons));
    let accounts = Arc::new(
        UserAccounts::new(users, Arc::new(BcryptPasswordHasher::new(config.bcrypt_cost)))
            .with_unique_usernames(config.unique_usernames),
    );
    HttpState::new(
        HttpStatePorts {
            login: accounts.clone(),
            persons: directory.clone(),
            persons_command: directory,
            users: accounts.clone(),
            users_command: accounts,
        },
        config.auth.clone(),
    )
}

/// Diesel repositories when a pool is configured, in-memory ones otherwise.
pub fn build_http_state(config: &ServerConfig) -> HttpState {
    match &config.db_pool {
        Some(pool) => http_state_over(
            Arc::new(DieselPersonRepository::new(pool.clone())),
            Arc::new(DieselUserRepository::new(pool.clone())),
            config,
        ),
        None => {
            warn!("no database configured; records live in memory and vanish on restart");
            http_state_over(
                Arc::new(InMemoryPersonRepository::new()),
                Arc::new(InMemoryUserRepository::new()),
                config,
            )
        }
    }
}
