//! Timestamp proof cache.
//!
//! Anchored-timestamp verification goes out to calendar servers, so completed
//! outcomes are cached per proof with two freshness tiers:
//! - entries younger than [`FRESH_WINDOW`] surface to the caller as an
//!   explicit `cached` state
//! - entries younger than [`ENTRY_TTL`] are reused silently instead of
//!   re-invoking the external verifier
//!
//! Expiry is lazy: stale entries are treated as absent and overwritten by the
//! next completed verification, never swept in the background. Growth is
//! unbounded; the key space is bounded by the distinct proofs seen in one
//! process lifetime, an accepted resource trade-off.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

/// Entries younger than this are reported as an explicit `cached` result.
pub const FRESH_WINDOW: Duration = Duration::from_secs(30);

/// Entries younger than this are reused without an external call.
pub const ENTRY_TTL: Duration = Duration::from_secs(300);

/// A cached verification outcome.
#[derive(Debug, Clone, Copy)]
pub struct CacheEntry {
    /// When the outcome was computed.
    pub timestamp: SystemTime,
    /// The outcome itself, success or failure.
    pub result: bool,
}

impl CacheEntry {
    fn age(&self, now: SystemTime) -> Duration {
        // A clock that moved backwards reads as age zero.
        now.duration_since(self.timestamp).unwrap_or(Duration::ZERO)
    }

    /// Young enough to surface as an explicit `cached` state.
    pub fn is_fresh(&self, now: SystemTime) -> bool {
        self.age(now) < FRESH_WINDOW
    }

    /// Young enough to reuse without re-verifying.
    pub fn is_valid(&self, now: SystemTime) -> bool {
        self.age(now) < ENTRY_TTL
    }
}

/// Process-lifetime cache of timestamp verification outcomes, keyed by the
/// string form of the proof's anchored address.
///
/// The only concurrency discipline is last-writer-wins on `put`: concurrent
/// verifications of the same proof may each perform the external check and
/// overwrite each other, which is harmless because the check is idempotent.
#[derive(Debug, Default)]
pub struct TimestampProofCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl TimestampProofCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entry. Validity is the caller's concern.
    pub fn get(&self, id: &str) -> Option<CacheEntry> {
        self.entries.lock().expect("cache lock poisoned").get(id).copied()
    }

    /// Record an outcome, unconditionally overwriting any prior entry.
    pub fn put(&self, id: &str, result: bool, now: SystemTime) {
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .insert(id.to_string(), CacheEntry {
                timestamp: now,
                result,
            });
    }
}
