//! User accounts.

use std::fmt;

/// Validation errors returned by [`UserAccount::try_new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "Username is required"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Salted one-way password hash in its encoded (modular crypt) form.
///
/// `Debug` output is redacted so hashes do not leak through logs.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash produced by a [`crate::domain::ports::PasswordHasher`].
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded hash, suitable for storage.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// A stored user account.
///
/// ## Invariants
/// - `username` is non-empty once trimmed and kept exactly as submitted.
/// - The password only exists as a [`PasswordHash`]; plaintext never reaches
///   this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    username: String,
    password_hash: PasswordHash,
}

impl UserAccount {
    /// Validate and construct an account.
    pub fn try_new(
        username: impl Into<String>,
        password_hash: PasswordHash,
    ) -> Result<Self, UserValidationError> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        Ok(Self {
            username,
            password_hash,
        })
    }

    /// Login name.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Stored password hash.
    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    /// Replace the username, keeping the password hash.
    pub fn renamed(self, username: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::try_new(username, self.password_hash)
    }

    /// Replace the password hash, keeping the username.
    #[must_use]
    pub fn with_password_hash(self, password_hash: PasswordHash) -> Self {
        Self {
            username: self.username,
            password_hash,
        }
    }
}
