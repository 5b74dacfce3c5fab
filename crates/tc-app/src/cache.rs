//! Read-through cache for filtered record sets.
//!
//! Entries are keyed by formula plus a fingerprint of the filter policy, so
//! changing any policy flag never serves a stale set. Invalidation is
//! explicit: callers drop one formula or clear everything.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use tc_data::{FilterPolicy, FilteredRecords};

/// SHA-256 of the JSON-serialized policy, hex encoded.
pub fn policy_fingerprint(policy: &FilterPolicy) -> String {
    let mut hasher = Sha256::new();
    let policy_json = serde_json::to_string(policy).unwrap_or_default();
    hasher.update(policy_json.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CacheKey {
    pub formula: String,
    pub policy_fingerprint: String,
}

impl CacheKey {
    pub fn new(formula: &str, policy: &FilterPolicy) -> Self {
        Self {
            formula: formula.to_string(),
            policy_fingerprint: policy_fingerprint(policy),
        }
    }
}

/// Memoizes filtered record sets across queries.
pub trait FilteredRecordCache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<FilteredRecords>;
    fn put(&self, key: CacheKey, records: FilteredRecords);
    /// Drop every entry for `formula`, whatever the policy.
    fn invalidate(&self, formula: &str);
    fn clear(&self);
}

/// Cache that never stores anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl FilteredRecordCache for NoCache {
    fn get(&self, _key: &CacheKey) -> Option<FilteredRecords> {
        None
    }

    fn put(&self, _key: CacheKey, _records: FilteredRecords) {}

    fn invalidate(&self, _formula: &str) {}

    fn clear(&self) {}
}

/// In-process cache.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<BTreeMap<CacheKey, FilteredRecords>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<CacheKey, FilteredRecords>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FilteredRecordCache for MemoryCache {
    fn get(&self, key: &CacheKey) -> Option<FilteredRecords> {
        self.lock().get(key).cloned()
    }

    fn put(&self, key: CacheKey, records: FilteredRecords) {
        self.lock().insert(key, records);
    }

    fn invalidate(&self, formula: &str) {
        self.lock().retain(|key, _| key.formula != formula);
    }

    fn clear(&self) {
        self.lock().clear();
    }
}
