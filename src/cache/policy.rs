//! Staleness policy: decides whether an access should trigger a fetch.
//!
//! The check is cheap and idempotent, so callers may run it on every view
//! refresh. Age-based expiry is applied lazily at check time; there is no
//! background timer.
//!
//! Known limitations, kept as-is:
//! - A fetch that never completes leaves `is_fetching` set and the key is never
//!   refetched again (no timeout or cancellation).
//! - A failing resource is retried on every access (no backoff).

use chrono::{DateTime, Duration, Utc};

use super::entry::{CacheEntry, CacheEvent};

/// Time-to-live of a settled entry: one hour.
pub const TTL_MILLIS: i64 = 60 * 60 * 1000;

pub fn default_ttl() -> Duration {
  Duration::milliseconds(TTL_MILLIS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessPolicy {
  ttl: Duration,
}

impl Default for StalenessPolicy {
  fn default() -> Self {
    Self { ttl: default_ttl() }
  }
}

impl StalenessPolicy {
  pub fn new(ttl: Duration) -> Self {
    Self { ttl }
  }

  /// A settled, not-yet-invalidated entry older than the TTL.
  pub fn is_expired<T>(&self, entry: &CacheEntry<T>, now: DateTime<Utc>) -> bool {
    !entry.did_invalidate && entry.last_updated.is_some_and(|t| now - t > self.ttl)
  }

  /// Whether a fetch should be issued for `entry` at `now`.
  ///
  /// Treats an expired entry as invalidated without modifying it.
  pub fn should_fetch<T>(&self, entry: &CacheEntry<T>, now: DateTime<Utc>) -> bool {
    if entry.is_fetching {
      return false;
    }
    let invalidated = entry.did_invalidate || self.is_expired(entry, now);
    let never_loaded = entry.last_updated.is_none() && entry.error.is_none();
    invalidated || never_loaded
  }

  /// Record expiry on the entry, then decide.
  pub fn check<T>(&self, entry: &mut CacheEntry<T>, now: DateTime<Utc>) -> bool {
    if self.is_expired(entry, now) {
      entry.apply(CacheEvent::Invalidate);
    }
    self.should_fetch(entry, now)
  }
}

/// Free-standing form of [`StalenessPolicy::should_fetch`].
pub fn should_fetch<T>(entry: &CacheEntry<T>, now: DateTime<Utc>, ttl: Duration) -> bool {
  StalenessPolicy::new(ttl).should_fetch(entry, now)
}
