//! Bearer tokens handed out by a successful login.
//!
//! Tokens are HS256 JWTs carrying the user ID and email. They are stateless:
//! nothing is stored server-side, so a token stays valid until it expires.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::{TryRngCore, rngs::OsRng};
use serde::{Deserialize, Serialize};

use crate::{
    Error, User,
    error::{AuthError, CryptoError, ValidationError},
};

/// Claims embedded in a login token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject - user ID
    pub sub: String,
    pub email: String,
    /// Issued at in seconds (as UTC timestamp)
    pub iat: i64,
    /// Expiration time in seconds (as UTC timestamp)
    pub exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Configuration for login tokens
#[derive(Debug, Clone)]
pub struct TokenConfig {
    secret: Vec<u8>,
    /// Issuer claim, checked on verification when set
    pub issuer: Option<String>,
    /// Token lifetime. Default: 24 hours
    pub expires_in: Duration,
}

impl TokenConfig {
    /// Create a configuration signing with `secret`.
    ///
    /// The secret must be at least 32 bytes.
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, Error> {
        let secret = secret.into();
        if secret.len() < 32 {
            return Err(ValidationError::InvalidField(
                "Token secret must be at least 32 bytes".to_string(),
            )
            .into());
        }

        Ok(Self {
            secret,
            issuer: None,
            expires_in: Duration::hours(24),
        })
    }

    /// Create a configuration with a random secret.
    ///
    /// Tokens signed this way do not survive a restart.
    pub fn new_random() -> Result<Self, Error> {
        let mut secret = vec![0u8; 32];
        OsRng
            .try_fill_bytes(&mut secret)
            .map_err(|e| CryptoError::JwtSigning(format!("Failed to generate secret: {e}")))?;
        Self::new(secret)
    }

    /// Set the issuer claim
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_expires_in(mut self, expires_in: Duration) -> Self {
        self.expires_in = expires_in;
        self
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }
        validation
    }
}

/// Sign a token for `user`, issued at `now`.
pub fn issue_token(user: &User, config: &TokenConfig, now: DateTime<Utc>) -> Result<String, Error> {
    let claims = TokenClaims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        iat: now.timestamp(),
        exp: (now + config.expires_in).timestamp(),
        iss: config.issuer.clone(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(&config.secret),
    )
    .map_err(|e| CryptoError::JwtSigning(format!("Failed to encode JWT: {e}")).into())
}

/// Check a token's signature, expiry and issuer and return its claims.
pub fn verify_token(token: &str, config: &TokenConfig) -> Result<TokenClaims, Error> {
    decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(&config.secret),
        &config.validation(),
    )
    .map(|data| data.claims)
    .map_err(|e| AuthError::InvalidToken(format!("JWT validation failed: {e}")).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::builder()
            .name("Budi".to_string())
            .email("budi@example.com".to_string())
            .build()
            .unwrap()
    }

    #[test]
    fn test_issue_then_verify() {
        let config = TokenConfig::new_random().unwrap().with_issuer("emporium");
        let user = user();

        let token = issue_token(&user, &config, Utc::now()).unwrap();
        let claims = verify_token(&token, &config).unwrap();

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, "budi@example.com");
        assert_eq!(claims.iss.as_deref(), Some("emporium"));
    }

    #[test]
    fn test_short_secret_rejected() {
        assert!(TokenConfig::new("too-short").is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let a = TokenConfig::new_random().unwrap();
        let b = TokenConfig::new_random().unwrap();

        let token = issue_token(&user(), &a, Utc::now()).unwrap();
        assert!(matches!(
            verify_token(&token, &b),
            Err(Error::Auth(AuthError::InvalidToken(_)))
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = TokenConfig::new_random().unwrap();
        let long_ago = Utc::now() - Duration::days(3);

        let token = issue_token(&user(), &config, long_ago).unwrap();
        assert!(verify_token(&token, &config).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        let config = TokenConfig::new_random().unwrap();
        assert!(verify_token("not.a.jwt", &config).is_err());
    }
}
