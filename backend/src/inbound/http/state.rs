//! Shared HTTP adapter state.
//!
//! Handlers receive this through `actix_web::web::Data` so they depend only
//! on driving ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{LoginService, PersonsCommand, PersonsQuery, UsersCommand, UsersQuery};
use crate::inbound::http::auth::AuthStrategy;

/// Parameter object bundling the port implementations.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub persons: Arc<dyn PersonsQuery>,
    pub persons_command: Arc<dyn PersonsCommand>,
    pub users: Arc<dyn UsersQuery>,
    pub users_command: Arc<dyn UsersCommand>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub persons: Arc<dyn PersonsQuery>,
    pub persons_command: Arc<dyn PersonsCommand>,
    pub users: Arc<dyn UsersQuery>,
    pub users_command: Arc<dyn UsersCommand>,
    pub auth: AuthStrategy,
}

impl HttpState {
    /// Assemble handler state from ports and the configured auth strategy.
    pub fn new(ports: HttpStatePorts, auth: AuthStrategy) -> Self {
        let HttpStatePorts {
            login,
            persons,
            persons_command,
            users,
            users_command,
        } = ports;
        Self {
            login,
            persons,
            persons_command,
            users,
            users_command,
            auth,
        }
    }
}
