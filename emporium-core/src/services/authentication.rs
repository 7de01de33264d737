//! Email and password login guarded by [`LoginThrottleService`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::{
    Error, User,
    crypto::PasswordHasher,
    error::AuthError,
    repositories::UserRepository,
    services::{Admission, LoginThrottleService},
    token::{TokenConfig, issue_token},
};

/// Checks an email and password pair.
#[async_trait]
pub trait CredentialVerifier: Send + Sync + 'static {
    /// `Some(user)` when the credentials match, `None` on a definitive
    /// mismatch. `Err` means verification itself could not be carried out.
    async fn check(&self, email: &str, password: &str) -> Result<Option<User>, Error>;
}

/// Verifies credentials against the password hash held by the user repository.
pub struct PasswordCredentialVerifier<R: UserRepository> {
    repository: Arc<R>,
    hasher: Arc<dyn PasswordHasher>,
}

impl<R: UserRepository> PasswordCredentialVerifier<R> {
    pub fn new(repository: Arc<R>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { repository, hasher }
    }
}

#[async_trait]
impl<R: UserRepository> CredentialVerifier for PasswordCredentialVerifier<R> {
    async fn check(&self, email: &str, password: &str) -> Result<Option<User>, Error> {
        // An unknown email is a mismatch like any other
        let Some(credentials) = self.repository.find_credentials_by_email(email).await? else {
            return Ok(None);
        };

        if self
            .hasher
            .verify(password, &credentials.password_hash)
            .await?
        {
            Ok(Some(credentials.user))
        } else {
            Ok(None)
        }
    }
}

/// A verified login.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user: User,
    pub token: String,
}

/// Service for the login flow
pub struct AuthenticationService<V: CredentialVerifier> {
    verifier: Arc<V>,
    throttle: Arc<LoginThrottleService>,
    tokens: TokenConfig,
}

impl<V: CredentialVerifier> AuthenticationService<V> {
    pub fn new(
        verifier: Arc<V>,
        throttle: Arc<LoginThrottleService>,
        tokens: TokenConfig,
    ) -> Self {
        Self {
            verifier,
            throttle,
            tokens,
        }
    }

    pub fn token_config(&self) -> &TokenConfig {
        &self.tokens
    }

    /// Log in with an email and password.
    ///
    /// Fails with [`AuthError::AccountLocked`] while the email is locked and
    /// with [`AuthError::InvalidCredentials`] on a mismatch. Errors raised by
    /// the verifier are returned as-is and leave the failure count untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<Authenticated, Error> {
        if self.throttle.admit(email).await? == Admission::Blocked {
            return Err(AuthError::AccountLocked.into());
        }

        let Some(user) = self.verifier.check(email, password).await? else {
            self.throttle.record_failure(email).await?;
            return Err(AuthError::InvalidCredentials.into());
        };

        self.throttle.record_success(email).await?;
        tracing::info!(user_id = %user.id, "User logged in");

        let token = issue_token(&user, &self.tokens, Utc::now())?;
        Ok(Authenticated { user, token })
    }
}
