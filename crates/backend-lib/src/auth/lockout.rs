// ============================
// crates/backend-lib/src/auth/lockout.rs
// ============================
//! Failed-login tracking and temporary account lockout.
//!
//! State lives in process memory only and is lost on restart. Each
//! identifier moves through `CLEAR -> FAILING(n) -> LOCKED(until)`; expired
//! locks are cleared lazily by the next check, there is no background timer.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default number of failed attempts before lockout
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default lockout duration (15 minutes)
pub const DEFAULT_LOCKOUT_DURATION: Duration = Duration::from_secs(15 * 60);

/// Failure entries without a lock are forgotten after a day
const STALE_ENTRY_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Longest lock a tracker will apply (10 years)
pub const MAX_LOCKOUT_DURATION: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 10);

/// How often the background sweep runs
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Entry in the lockout map
#[derive(Debug, Clone)]
struct LockoutEntry {
    /// Number of failed attempts
    failed_attempts: u32,
    /// Time of the last failed attempt
    last_failure: Instant,
    /// When the lock expires, if locked
    locked_until: Option<Instant>,
}

impl LockoutEntry {
    fn new(now: Instant) -> Self {
        Self {
            failed_attempts: 0,
            last_failure: now,
            locked_until: None,
        }
    }

    fn is_locked_at(&self, now: Instant) -> bool {
        self.locked_until.is_some_and(|until| now < until)
    }

    fn lock_expired_at(&self, now: Instant) -> bool {
        self.locked_until.is_some_and(|until| now >= until)
    }
}

/// Result of recording a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    /// Credentials rejected, identifier not locked yet
    Counted {
        failed_attempts: u32,
        remaining: u32,
    },
    /// This failure reached the threshold and locked the identifier
    LockedOut { until: Instant },
    /// The identifier was already locked; the original expiry is kept
    StillLocked { until: Instant },
}

impl FailureOutcome {
    /// Whether the caller should answer with a lockout response
    pub fn is_locked(&self) -> bool {
        !matches!(self, FailureOutcome::Counted { .. })
    }
}

/// Per-identifier lockout tracker.
///
/// Cloning shares the underlying map.
#[derive(Debug, Clone)]
pub struct LockoutTracker {
    /// Map of identifiers to lockout entries
    entries: Arc<DashMap<String, LockoutEntry>>,
    /// Maximum number of failed attempts before lockout
    max_attempts: u32,
    /// Duration of lockout period
    lockout_duration: Duration,
}

impl Default for LockoutTracker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_LOCKOUT_DURATION)
    }
}

impl LockoutTracker {
    /// Create a new lockout tracker
    pub fn new(max_attempts: u32, lockout_duration: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            max_attempts: max_attempts.max(1),
            lockout_duration: lockout_duration.min(MAX_LOCKOUT_DURATION),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn lockout_duration(&self) -> Duration {
        self.lockout_duration
    }

    /// Check whether an identifier is currently locked
    pub fn is_locked(&self, identifier: &str) -> bool {
        self.is_locked_at(identifier, Instant::now())
    }

    /// Check whether an identifier is locked at `now`, removing an expired
    /// lock. Failure counts of unlocked entries are left untouched.
    pub fn is_locked_at(&self, identifier: &str, now: Instant) -> bool {
        let locked_until = match self.entries.get(identifier) {
            Some(entry) => entry.locked_until,
            None => return false,
        };

        match locked_until {
            Some(until) if now < until => true,
            Some(_) => {
                // Re-check under the shard lock; a concurrent failure may
                // have restarted the entry since the read above.
                self.entries
                    .remove_if(identifier, |_, entry| entry.lock_expired_at(now));
                false
            },
            None => false,
        }
    }

    /// Record a failed authentication attempt
    pub fn record_failure(&self, identifier: &str) -> FailureOutcome {
        self.record_failure_at(identifier, Instant::now())
    }

    /// Record a failed authentication attempt at `now`.
    ///
    /// The whole read-check-write runs while holding the entry's shard lock,
    /// so concurrent failures can't both slip under the threshold.
    pub fn record_failure_at(&self, identifier: &str, now: Instant) -> FailureOutcome {
        let mut entry = self
            .entries
            .entry(identifier.to_string())
            .or_insert_with(|| LockoutEntry::new(now));

        if let Some(until) = entry.locked_until {
            if entry.is_locked_at(now) {
                return FailureOutcome::StillLocked { until };
            }
            // Lock has expired; start counting again
            *entry = LockoutEntry::new(now);
        }

        entry.failed_attempts += 1;
        entry.last_failure = now;

        if entry.failed_attempts >= self.max_attempts {
            let until = now + self.lockout_duration;
            entry.locked_until = Some(until);
            tracing::warn!(
                identifier,
                failed_attempts = entry.failed_attempts,
                lock_secs = self.lockout_duration.as_secs(),
                "identifier locked after repeated login failures"
            );
            return FailureOutcome::LockedOut { until };
        }

        FailureOutcome::Counted {
            failed_attempts: entry.failed_attempts,
            remaining: self.max_attempts - entry.failed_attempts,
        }
    }

    /// Record a successful authentication
    pub fn record_success(&self, identifier: &str) {
        // On successful auth, remove the entry
        self.entries.remove(identifier);
    }

    /// Current failure count for an identifier (0 when clear)
    pub fn failed_attempts(&self, identifier: &str) -> u32 {
        self.entries
            .get(identifier)
            .map_or(0, |entry| entry.failed_attempts)
    }

    /// Number of tracked identifiers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop expired locks and stale failure entries
    pub fn cleanup(&self) {
        self.cleanup_at(Instant::now());
    }

    pub fn cleanup_at(&self, now: Instant) {
        self.entries.retain(|_, entry| match entry.locked_until {
            Some(until) => now < until,
            None => now.saturating_duration_since(entry.last_failure) < STALE_ENTRY_AGE,
        });
    }

    /// Sweep the map every `period` for as long as the runtime lives
    pub fn spawn_cleanup(&self, period: Duration) -> tokio::task::JoinHandle<()> {
        let tracker = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let before = tracker.len();
                tracker.cleanup();
                let removed = before.saturating_sub(tracker.len());
                if removed > 0 {
                    tracing::debug!(removed, tracked = tracker.len(), "lockout entries swept");
                }
            }
        })
    }
}
