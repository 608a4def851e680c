//! Domain primitives, ports, and services.
//!
//! Purpose: define strongly typed entities used by the HTTP and persistence
//! adapters, and the services composing them. Types are transport agnostic;
//! invariants are documented on each type.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifiers.
//! - Person, UserAccount, Stored: records as held by the store.
//! - Credentials, Password: validated login input.
//! - PersonDirectory, UserAccounts: services implementing the driving ports.

pub mod auth;
pub mod error;
pub mod person;
pub mod person_directory;
pub mod ports;
pub mod record;
pub mod store_operation;
pub mod trace_id;
pub mod user;
pub mod user_accounts;
pub mod validation;

pub use self::auth::{
    AuthenticatedUser, Credentials, CredentialsValidationError, Password, UNAUTHORIZED_MESSAGE,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::person::{Person, PersonValidationError, format_birthdate, parse_birthdate};
pub use self::person_directory::PersonDirectory;
pub use self::record::{RecordId, Revision, Stored};
pub use self::store_operation::StoreOperation;
pub use self::trace_id::TraceId;
pub use self::user::{PasswordHash, UserAccount, UserValidationError};
pub use self::user_accounts::{
    ALREADY_INITIALIZED_MESSAGE, INITIALIZE_MANDATORY_MESSAGE, USERNAME_TAKEN_MESSAGE,
    UserAccounts,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use roster::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::unauthorized("User unauthorized"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
