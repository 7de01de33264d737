//! Repository trait for login throttling.
//!
//! One [`LoginAttemptRecord`] is kept per email address, keyed by the email
//! exactly as the client sent it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{Error, storage::LoginAttemptRecord};

/// Storage for per-email failed login counters.
///
/// Each method must be atomic for its key. The throttle service does not
/// hold any lock across calls.
#[async_trait]
pub trait LoginAttemptRepository: Send + Sync + 'static {
    /// Return the record for `email`, creating a zeroed one stamped with `now`
    /// if none exists.
    async fn fetch_or_insert(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<LoginAttemptRecord, Error>;

    /// Set the failure count back to zero, leaving `last_failure_at` alone.
    async fn reset_failures(&self, email: &str, now: DateTime<Utc>) -> Result<(), Error>;

    /// Increment the failure count and stamp `last_failure_at` with `at`.
    ///
    /// Returns the record as it is after the update.
    async fn record_failure(
        &self,
        email: &str,
        at: DateTime<Utc>,
    ) -> Result<LoginAttemptRecord, Error>;

    /// Drop records that have not been touched since `before`.
    ///
    /// # Returns
    ///
    /// The number of records removed.
    async fn purge_idle(&self, before: DateTime<Utc>) -> Result<u64, Error>;
}
