//! Password hashing adapter backed by `bcrypt`.
//!
//! Bcrypt is deliberately slow, so both hashing and verification run on
//! Tokio's blocking pool instead of an executor thread.

use async_trait::async_trait;
use tokio::task;

use crate::domain::ports::{PasswordHashError, PasswordHasher};
use crate::domain::{Password, PasswordHash};

/// Default work factor for new hashes.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// [`PasswordHasher`] producing `$2b$` bcrypt hashes with a fresh salt each.
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    /// Hasher with an explicit work factor (4 to 31).
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Work factor applied to new hashes.
    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_BCRYPT_COST)
    }
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHashError> {
        let plaintext = password.clone();
        let cost = self.cost;
        let encoded = task::spawn_blocking(move || bcrypt::hash(plaintext.expose(), cost))
            .await
            .map_err(|err| PasswordHashError::hash(err.to_string()))?
            .map_err(|err| PasswordHashError::hash(err.to_string()))?;
        Ok(PasswordHash::new(encoded))
    }

    async fn verify(
        &self,
        password: &Password,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHashError> {
        let plaintext = password.clone();
        let encoded = hash.as_str().to_owned();
        task::spawn_blocking(move || bcrypt::verify(plaintext.expose(), &encoded))
            .await
            .map_err(|err| PasswordHashError::hash(err.to_string()))?
            .map_err(|err| PasswordHashError::malformed_hash(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const TEST_COST: u32 = 4;

    fn password(raw: &str) -> Password {
        Password::try_new(raw).expect("valid password")
    }

    #[rstest]
    #[tokio::test]
    async fn hashes_verify_against_their_password() {
        let hasher = BcryptPasswordHasher::new(TEST_COST);
        let hash = hasher.hash(&password("secret")).await.expect("hash");

        assert!(hash.as_str().starts_with("$2b$04$"));
        assert!(hasher.verify(&password("secret"), &hash).await.expect("verify"));
        assert!(!hasher.verify(&password("wrong"), &hash).await.expect("verify"));
    }

    #[rstest]
    #[tokio::test]
    async fn each_hash_uses_a_fresh_salt() {
        let hasher = BcryptPasswordHasher::new(TEST_COST);
        let first = hasher.hash(&password("secret")).await.expect("hash");
        let second = hasher.hash(&password("secret")).await.expect("hash");
        assert_ne!(first, second);
    }

    #[rstest]
    #[tokio::test]
    async fn malformed_hashes_are_reported() {
        let hasher = BcryptPasswordHasher::new(TEST_COST);
        let err = hasher
            .verify(&password("secret"), &PasswordHash::new("plaintext"))
            .await
            .expect_err("not a bcrypt hash");
        assert!(matches!(err, PasswordHashError::MalformedHash { .. }));
    }

    #[rstest]
    fn default_cost_is_ten() {
        assert_eq!(DEFAULT_BCRYPT_COST, 10);
        assert_eq!(BcryptPasswordHasher::default().cost(), 10);
    }

    #[rstest]
    #[tokio::test]
    async fn default_hasher_writes_cost_ten_hashes() {
        let hash = BcryptPasswordHasher::default()
            .hash(&password("secret"))
            .await
            .expect("hash");
        assert!(hash.as_str().starts_with("$2b$10$"));
    }
}
