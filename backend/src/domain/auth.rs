//! Authentication primitives such as login credentials.
//!
//! Inbound adapters build these from raw strings before talking to a port, so
//! services only ever see validated input.

use std::fmt;

use zeroize::Zeroizing;

use super::RecordId;

/// Message carried by every authentication failure.
pub const UNAUTHORIZED_MESSAGE: &str = "User unauthorized";

/// Domain error returned when credential values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was missing or blank once trimmed.
    EmptyPassword,
}

impl CredentialsValidationError {
    /// Name of the offending request field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyUsername => "username",
            Self::EmptyPassword => "password",
        }
    }
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "Username is required"),
            Self::EmptyPassword => write!(f, "Password is required"),
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

/// Plaintext password held only for as long as hashing or verification takes.
///
/// The buffer is wiped on drop and `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Validate and wrap a plaintext password.
    pub fn try_new(raw: &str) -> Result<Self, CredentialsValidationError> {
        if raw.trim().is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Plaintext as submitted.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Username and password pair used for login, account creation, and
/// first-run initialisation.
///
/// ## Invariants
/// - `username` is non-empty once trimmed and is kept exactly as submitted,
///   so lookups match the stored value.
/// - `password` is non-empty once trimmed and retains caller whitespace.
///
/// # Examples
/// ```
/// use roster::domain::Credentials;
///
/// let creds = Credentials::try_from_parts("admin", "secret").unwrap();
/// assert_eq!(creds.username(), "admin");
/// assert_eq!(creds.password().expose(), "secret");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: Password,
}

impl Credentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        if username.trim().is_empty() {
            return Err(CredentialsValidationError::EmptyUsername);
        }
        let password = Password::try_new(password)?;
        Ok(Self {
            username: username.to_owned(),
            password,
        })
    }

    /// Username string suitable for user lookups.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &Password {
        &self.password
    }
}

/// Identity established by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Identifier of the matching account.
    pub id: RecordId,
    /// Username of the matching account.
    pub username: String,
}
