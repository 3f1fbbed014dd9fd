// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Record cache with TTL and bounded size.
//!
//! An explicit, constructed component: eviction is deterministic (oldest
//! insertion first when over capacity, TTL on read) and the clock is
//! injected so tests control expiry without sleeping. Writers publish to
//! the cache only after a successful store commit; the maintenance sweep
//! is the only caller that invalidates entries proactively.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::metadata::record::FeedRecord;

/// Time source for TTL checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for tests.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

#[derive(Clone)]
struct CacheEntry {
    record: FeedRecord,
    inserted_at: DateTime<Utc>,
}

/// Process-wide record cache keyed by record id.
pub struct RecordCache {
    entries: DashMap<String, CacheEntry>,
    /// Insertion order for eviction (oldest first).
    order: Mutex<VecDeque<String>>,
    max_entries: usize,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
    expired: AtomicU64,
}

#[derive(Debug, Clone)]
pub struct RecordCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub expired: u64,
    pub entry_count: usize,
}

impl RecordCache {
    pub fn new(max_entries: usize, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            order: Mutex::new(VecDeque::new()),
            max_entries,
            ttl,
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            expired: AtomicU64::new(0),
        }
    }

    /// Cached record for an id, dropping it first if its TTL has elapsed.
    pub fn get(&self, id: &str) -> Option<FeedRecord> {
        if let Some(entry) = self.entries.get(id) {
            if self.clock.now() - entry.inserted_at <= self.ttl {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.record.clone());
            }
            self.expired.fetch_add(1, Ordering::Relaxed);
            drop(entry); // Release read lock before removing
            self.entries.remove(id);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Insert or refresh a record, evicting the oldest entries when over
    /// capacity.
    pub fn insert(&self, record: FeedRecord) {
        let id = record.id().to_string();

        if !self.entries.contains_key(&id) && self.entries.len() >= self.max_entries {
            let mut order = self.order.lock();
            while self.entries.len() >= self.max_entries {
                if let Some(oldest) = order.pop_front() {
                    self.entries.remove(&oldest);
                } else {
                    break;
                }
            }
        }

        let is_new = !self.entries.contains_key(&id);
        self.entries.insert(
            id.clone(),
            CacheEntry {
                record,
                inserted_at: self.clock.now(),
            },
        );

        if is_new {
            self.order.lock().push_back(id);
        }
    }

    pub fn invalidate(&self, id: &str) {
        self.entries.remove(id);
    }

    pub fn clear(&self) {
        self.entries.clear();
        self.order.lock().clear();
    }

    pub fn stats(&self) -> RecordCacheStats {
        RecordCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            entry_count: self.entries.len(),
        }
    }
}
