//! Process-local login attempt storage.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::{
    Error,
    repositories::LoginAttemptRepository,
    services::{Decision, evaluate},
    storage::{LoginAttemptRecord, LoginThrottleConfig},
};

#[derive(Debug, Clone, Copy)]
struct Entry {
    record: LoginAttemptRecord,
    touched_at: DateTime<Utc>,
}

/// [`LoginAttemptRepository`] backed by a concurrent hash map.
///
/// Growth is bounded two ways. Records idle for longer than the configured
/// TTL are dropped, and once `capacity` records are held the least recently
/// touched records are evicted to make room for a new email.
///
/// Records still inside their lockout window are evicted only when nothing
/// else is left, so churning through fresh emails cannot lift a lock.
#[derive(Debug)]
pub struct InMemoryLoginAttemptRepository {
    records: DashMap<String, Entry>,
    config: LoginThrottleConfig,
    idle_ttl: Duration,
    capacity: usize,
}

impl InMemoryLoginAttemptRepository {
    pub fn new(config: &LoginThrottleConfig) -> Self {
        Self {
            records: DashMap::new(),
            config: config.clone(),
            idle_ttl: config.effective_idle_ttl(),
            capacity: config.capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Make room for one more key.
    ///
    /// Frees a tenth of the capacity at once so that a stream of new emails
    /// does not pay for a full scan on every insert.
    fn evict(&self, now: DateTime<Utc>) {
        let cutoff = now - self.idle_ttl;
        self.records.retain(|_, entry| entry.touched_at >= cutoff);

        if self.records.len() < self.capacity {
            return;
        }

        let excess = self.records.len() + 1 - self.capacity + self.capacity / 10;

        // Unlocked records first, then oldest first within each group
        let mut candidates: Vec<(bool, DateTime<Utc>, String)> = self
            .records
            .iter()
            .map(|entry| {
                let locked = evaluate(&entry.record, now, &self.config) == Decision::Locked;
                (locked, entry.touched_at, entry.key().clone())
            })
            .collect();
        candidates.sort_unstable();

        for (locked, _, email) in candidates.into_iter().take(excess) {
            if locked {
                tracing::warn!(email = %email, "Evicting a locked login attempt record, store is full");
            } else {
                tracing::debug!(email = %email, "Evicting least recently used login attempt record");
            }
            self.records.remove(&email);
        }
    }

    fn ensure_room_for(&self, email: &str, now: DateTime<Utc>) {
        if !self.records.contains_key(email) && self.records.len() >= self.capacity {
            self.evict(now);
        }
    }
}

impl Default for InMemoryLoginAttemptRepository {
    fn default() -> Self {
        Self::new(&LoginThrottleConfig::default())
    }
}

#[async_trait]
impl LoginAttemptRepository for InMemoryLoginAttemptRepository {
    async fn fetch_or_insert(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<LoginAttemptRecord, Error> {
        self.ensure_room_for(email, now);

        let mut entry = self.records.entry(email.to_string()).or_insert_with(|| Entry {
            record: LoginAttemptRecord::new(now),
            touched_at: now,
        });
        entry.touched_at = now;
        Ok(entry.record)
    }

    async fn reset_failures(&self, email: &str, now: DateTime<Utc>) -> Result<(), Error> {
        self.ensure_room_for(email, now);

        let mut entry = self.records.entry(email.to_string()).or_insert_with(|| Entry {
            record: LoginAttemptRecord::new(now),
            touched_at: now,
        });
        entry.record.failure_count = 0;
        entry.touched_at = now;
        Ok(())
    }

    async fn record_failure(
        &self,
        email: &str,
        at: DateTime<Utc>,
    ) -> Result<LoginAttemptRecord, Error> {
        self.ensure_room_for(email, at);

        let mut entry = self.records.entry(email.to_string()).or_insert_with(|| Entry {
            record: LoginAttemptRecord::new(at),
            touched_at: at,
        });
        entry.record.failure_count = entry.record.failure_count.saturating_add(1);
        entry.record.last_failure_at = at;
        entry.touched_at = at;
        Ok(entry.record)
    }

    async fn purge_idle(&self, before: DateTime<Utc>) -> Result<u64, Error> {
        let before_len = self.records.len();
        self.records.retain(|_, entry| entry.touched_at >= before);
        Ok(before_len.saturating_sub(self.records.len()) as u64)
    }
}
