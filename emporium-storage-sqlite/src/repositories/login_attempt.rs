//! SQLite implementation of the login attempt repository.
//!
//! Each operation is a single upsert, so it is atomic per email without an
//! explicit transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use emporium_core::{
    Error,
    error::{StorageError, utilities::DatabaseResultExt},
    repositories::LoginAttemptRepository,
    storage::LoginAttemptRecord,
};
use sqlx::SqlitePool;

/// SQLite repository for per-email login failure counters.
pub struct SqliteLoginAttemptRepository {
    pool: SqlitePool,
}

impl SqliteLoginAttemptRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Internal struct for query results
#[derive(Debug, sqlx::FromRow)]
struct SqliteLoginAttempt {
    failure_count: i64,
    last_failure_at: i64,
}

impl TryFrom<SqliteLoginAttempt> for LoginAttemptRecord {
    type Error = Error;

    fn try_from(row: SqliteLoginAttempt) -> Result<Self, Self::Error> {
        let last_failure_at = DateTime::from_timestamp_millis(row.last_failure_at).ok_or_else(
            || StorageError::Database(format!("Invalid timestamp {}", row.last_failure_at)),
        )?;

        Ok(LoginAttemptRecord {
            failure_count: u32::try_from(row.failure_count).unwrap_or(u32::MAX),
            last_failure_at,
        })
    }
}

#[async_trait]
impl LoginAttemptRepository for SqliteLoginAttemptRepository {
    async fn fetch_or_insert(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<LoginAttemptRecord, Error> {
        let row = sqlx::query_as::<_, SqliteLoginAttempt>(
            r#"
            INSERT INTO login_attempts (email, failure_count, last_failure_at, touched_at)
            VALUES (?1, 0, ?2, ?2)
            ON CONFLICT(email) DO UPDATE SET touched_at = excluded.touched_at
            RETURNING failure_count, last_failure_at
            "#,
        )
        .bind(email)
        .bind(now.timestamp_millis())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch login attempt record");
            StorageError::Database("Failed to fetch login attempt record".to_string())
        })?;

        row.try_into()
    }

    async fn reset_failures(&self, email: &str, now: DateTime<Utc>) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO login_attempts (email, failure_count, last_failure_at, touched_at)
            VALUES (?1, 0, ?2, ?2)
            ON CONFLICT(email) DO UPDATE
                SET failure_count = 0, touched_at = excluded.touched_at
            "#,
        )
        .bind(email)
        .bind(now.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to reset login failures");
            StorageError::Database("Failed to reset login failures".to_string())
        })?;

        Ok(())
    }

    async fn record_failure(
        &self,
        email: &str,
        at: DateTime<Utc>,
    ) -> Result<LoginAttemptRecord, Error> {
        let row = sqlx::query_as::<_, SqliteLoginAttempt>(
            r#"
            INSERT INTO login_attempts (email, failure_count, last_failure_at, touched_at)
            VALUES (?1, 1, ?2, ?2)
            ON CONFLICT(email) DO UPDATE SET
                failure_count = failure_count + 1,
                last_failure_at = excluded.last_failure_at,
                touched_at = excluded.touched_at
            RETURNING failure_count, last_failure_at
            "#,
        )
        .bind(email)
        .bind(at.timestamp_millis())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to record failed login attempt");
            StorageError::Database("Failed to record failed login attempt".to_string())
        })?;

        row.try_into()
    }

    async fn purge_idle(&self, before: DateTime<Utc>) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM login_attempts WHERE touched_at < ?1")
            .bind(before.timestamp_millis())
            .execute(&self.pool)
            .await
            .map_db_err_with_context("Failed to purge login attempts")?;

        Ok(result.rows_affected())
    }
}
