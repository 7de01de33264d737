//! Password hashing
//!
//! Services never touch a hashing algorithm directly; they go through
//! [`PasswordHasher`]. The default [`Argon2Hasher`] delegates to the
//! `password-auth` crate (Argon2id, PHC string format) and runs the work on
//! tokio's blocking pool so a slow hash does not stall other requests.

use async_trait::async_trait;

use crate::{Error, error::CryptoError};

#[async_trait]
pub trait PasswordHasher: Send + Sync + 'static {
    /// Produce a self-describing digest for `plain`.
    async fn hash(&self, plain: &str) -> Result<String, Error>;

    /// `Ok(false)` is a definitive mismatch; `Err` means the digest could not
    /// be checked at all.
    async fn verify(&self, plain: &str, digest: &str) -> Result<bool, Error>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

#[async_trait]
impl PasswordHasher for Argon2Hasher {
    async fn hash(&self, plain: &str) -> Result<String, Error> {
        let plain = plain.to_string();
        tokio::task::spawn_blocking(move || password_auth::generate_hash(plain))
            .await
            .map_err(|e| Error::Crypto(CryptoError::PasswordHash(e.to_string())))
    }

    async fn verify(&self, plain: &str, digest: &str) -> Result<bool, Error> {
        let plain = plain.to_string();
        let digest = digest.to_string();

        let outcome =
            tokio::task::spawn_blocking(move || password_auth::verify_password(plain, &digest))
                .await
                .map_err(|e| Error::Crypto(CryptoError::PasswordHash(e.to_string())))?;

        match outcome {
            Ok(()) => Ok(true),
            Err(password_auth::VerifyError::PasswordInvalid) => Ok(false),
            Err(e) => Err(Error::Crypto(CryptoError::PasswordHash(e.to_string()))),
        }
    }
}
