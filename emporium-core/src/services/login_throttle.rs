//! Login throttling for password authentication.
//!
//! Every email gets a failure counter. Once the counter reaches
//! [`LoginThrottleConfig::max_attempts`] the email is locked until
//! [`LoginThrottleConfig::lockout_period`] has passed since the last failure.
//! The lock is evaluated lazily on the next attempt, so no timer is needed to
//! lift it.
//!
//! # Example
//!
//! ```rust,ignore
//! use emporium_core::services::{Admission, LoginThrottleService};
//!
//! if service.admit("user@example.com").await? == Admission::Blocked {
//!     return Err(AuthError::AccountLocked.into());
//! }
//! // ... verify credentials, then record_failure or record_success
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    Error,
    clock::Clock,
    repositories::LoginAttemptRepository,
    storage::{LoginAttemptRecord, LoginThrottleConfig},
};

/// Outcome of [`LoginThrottleService::admit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    Blocked,
}

/// Lock state of a single record at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Below the threshold.
    Open,
    /// At or above the threshold and still inside the lockout window.
    Locked,
    /// At or above the threshold but the window has elapsed; the counter must
    /// be reset before the attempt proceeds.
    Expired,
}

/// Decide the lock state of `record` at `now`.
pub fn evaluate(
    record: &LoginAttemptRecord,
    now: DateTime<Utc>,
    config: &LoginThrottleConfig,
) -> Decision {
    if record.failure_count < config.max_attempts {
        return Decision::Open;
    }

    if now - record.last_failure_at < config.lockout_period {
        Decision::Locked
    } else {
        Decision::Expired
    }
}

/// Service guarding the login flow against password guessing.
///
/// The sequence admit, verify, record is not atomic. Two concurrent attempts
/// for the same email may both be admitted before either failure is recorded.
pub struct LoginThrottleService {
    repository: Arc<dyn LoginAttemptRepository>,
    clock: Arc<dyn Clock>,
    config: LoginThrottleConfig,
}

impl LoginThrottleService {
    pub fn new(
        repository: Arc<dyn LoginAttemptRepository>,
        clock: Arc<dyn Clock>,
        config: LoginThrottleConfig,
    ) -> Self {
        Self {
            repository,
            clock,
            config,
        }
    }

    /// Get the current configuration.
    pub fn config(&self) -> &LoginThrottleConfig {
        &self.config
    }

    /// Decide whether a login attempt for `email` may proceed.
    ///
    /// The first call for an email creates its record. A lock whose window has
    /// elapsed is lifted here by resetting the counter.
    pub async fn admit(&self, email: &str) -> Result<Admission, Error> {
        let now = self.clock.now();
        let record = self.repository.fetch_or_insert(email, now).await?;

        match evaluate(&record, now, &self.config) {
            Decision::Open => Ok(Admission::Allowed),
            Decision::Locked => {
                tracing::warn!(
                    email = %email,
                    failures = record.failure_count,
                    "Login attempt blocked, email is locked"
                );
                Ok(Admission::Blocked)
            }
            Decision::Expired => {
                tracing::debug!(email = %email, "Lockout window elapsed, resetting failures");
                self.repository.reset_failures(email, now).await?;
                Ok(Admission::Allowed)
            }
        }
    }

    /// Record a definitive credential mismatch for `email`.
    pub async fn record_failure(&self, email: &str) -> Result<LoginAttemptRecord, Error> {
        let record = self.repository.record_failure(email, self.clock.now()).await?;

        if record.failure_count == self.config.max_attempts {
            tracing::warn!(
                email = %email,
                failures = record.failure_count,
                "Failure threshold reached, email locked"
            );
        } else {
            tracing::debug!(email = %email, failures = record.failure_count, "Recorded failed login");
        }

        Ok(record)
    }

    /// Clear the failure counter after a successful login.
    pub async fn record_success(&self, email: &str) -> Result<(), Error> {
        self.repository.reset_failures(email, self.clock.now()).await
    }

    /// Start the background cleanup task.
    ///
    /// Periodically drops records idle for longer than the effective idle TTL.
    /// Runs until `shutdown` changes.
    pub fn start_cleanup_task(
        &self,
        mut shutdown: tokio::sync::watch::Receiver<bool>,
    ) -> tokio::task::JoinHandle<()> {
        let repository = Arc::clone(&self.repository);
        let clock = Arc::clone(&self.clock);
        let idle_ttl = self.config.effective_idle_ttl();

        const CLEANUP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(3600);

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(CLEANUP_INTERVAL);

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        let before = clock.now() - idle_ttl;
                        match repository.purge_idle(before).await {
                            Ok(count) if count > 0 => {
                                tracing::info!(count = count, "Purged idle login attempt records");
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "Failed to purge idle login attempt records");
                            }
                            _ => {}
                        }
                    }
                    _ = shutdown.changed() => {
                        tracing::info!("Shutting down login attempt cleanup task");
                        break;
                    }
                }
            }
        })
    }
}
