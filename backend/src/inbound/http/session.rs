//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Wraps the Actix session so handlers only establish, read, or end a login.

use actix_session::{Session, SessionExt};
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};
use tracing::{error, warn};

use crate::domain::{AuthenticatedUser, Error, RecordId};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const USERNAME_KEY: &str = "username";
/// Message returned when login state cannot be written.
pub const SESSION_WRITE_FAILED_MESSAGE: &str = "Failed to persist session";
/// Message returned when login state cannot be read.
pub const SESSION_READ_FAILED_MESSAGE: &str = "Failed to read session";

/// Newtype wrapper exposing login-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Wrap an Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Session attached to `req` by the session middleware.
    pub fn from_http_request(req: &HttpRequest) -> Self {
        Self(req.get_session())
    }

    /// Start a login: rotate the session key, then record the user.
    ///
    /// Rotation means a session id observed before login is never the one
    /// carrying the authenticated state.
    pub fn establish(&self, user: &AuthenticatedUser) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user.id.as_ref())
            .and_then(|()| self.0.insert(USERNAME_KEY, user.username.as_str()))
            .map_err(|cause| {
                error!(error = %cause, "failed to persist session");
                Error::internal(SESSION_WRITE_FAILED_MESSAGE)
            })
    }

    /// The logged-in user, if the session carries one.
    pub fn user(&self) -> Result<Option<AuthenticatedUser>, Error> {
        let read = |key: &str| {
            self.0.get::<String>(key).map_err(|cause| {
                error!(error = %cause, key, "failed to read session");
                Error::internal(SESSION_READ_FAILED_MESSAGE)
            })
        };
        let (id, username) = (read(USER_ID_KEY)?, read(USERNAME_KEY)?);
        match (id, username) {
            (Some(id), Some(username)) if !id.is_empty() => Ok(Some(AuthenticatedUser {
                id: RecordId::new(id),
                username,
            })),
            (None, None) => Ok(None),
            _ => {
                warn!("incomplete login state in session; treating as anonymous");
                Ok(None)
            }
        }
    }

    /// End the login and drop the session state.
    pub fn end(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Self::from_http_request(req)))
    }
}
