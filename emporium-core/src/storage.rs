//! Storage-facing records and configuration shared by repositories and services.
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, ProductId, User, UserId, error::utilities::RequiredFieldExt};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    pub fn builder() -> NewUserBuilder {
        NewUserBuilder::default()
    }
}

#[derive(Default)]
pub struct NewUserBuilder {
    id: Option<UserId>,
    name: Option<String>,
    email: Option<String>,
    password_hash: Option<String>,
}

impl NewUserBuilder {
    pub fn id(mut self, id: UserId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    pub fn email(mut self, email: String) -> Self {
        self.email = Some(email);
        self
    }

    pub fn password_hash(mut self, password_hash: String) -> Self {
        self.password_hash = Some(password_hash);
        self
    }

    pub fn build(self) -> Result<NewUser, Error> {
        Ok(NewUser {
            id: self.id.unwrap_or_default(),
            name: self.name.require_field("Name")?,
            email: self.email.require_field("Email")?,
            password_hash: self.password_hash.require_field("Password hash")?,
        })
    }
}

/// A user together with the stored password hash, used only for verification.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub price: f64,
}

impl NewProduct {
    pub fn new(name: String, brand: String, price: f64) -> Self {
        Self {
            id: ProductId::new_random(),
            name,
            brand,
            price,
        }
    }
}

/// Failed-login bookkeeping for a single email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginAttemptRecord {
    /// Failures since the last success or reset.
    pub failure_count: u32,
    /// Most recent failure, or creation time if there has been none.
    pub last_failure_at: DateTime<Utc>,
}

impl LoginAttemptRecord {
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            failure_count: 0,
            last_failure_at: created_at,
        }
    }
}

/// Configuration for login throttling.
#[derive(Debug, Clone)]
pub struct LoginThrottleConfig {
    /// Failures after which the email is locked. Default: 5
    pub max_attempts: u32,
    /// How long a lock lasts, measured from the last failure. Default: 30 minutes
    pub lockout_period: Duration,
    /// Records untouched for this long may be evicted by bounded stores. Default: 24 hours
    pub idle_ttl: Duration,
    /// Upper bound on records held by in-memory stores. Default: 100 000
    pub capacity: usize,
}

impl Default for LoginThrottleConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            lockout_period: Duration::minutes(30),
            idle_ttl: Duration::hours(24),
            capacity: 100_000,
        }
    }
}

impl LoginThrottleConfig {
    /// The TTL actually applied by stores; never shorter than the lockout period,
    /// so a live lock is not evicted.
    pub fn effective_idle_ttl(&self) -> Duration {
        self.idle_ttl.max(self.lockout_period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_throttle_config() {
        let config = LoginThrottleConfig::default();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.lockout_period.num_milliseconds(), 1_800_000);
    }

    #[test]
    fn test_effective_idle_ttl_covers_lockout() {
        let config = LoginThrottleConfig {
            idle_ttl: Duration::minutes(1),
            ..Default::default()
        };
        assert_eq!(config.effective_idle_ttl(), Duration::minutes(30));
    }

    #[test]
    fn test_new_user_builder_requires_hash() {
        let result = NewUser::builder()
            .name("Ani".to_string())
            .email("ani@example.com".to_string())
            .build();
        assert!(result.is_err());
    }
}
