//! cache.rs
//!
//! Bounded, append-only history of recent results.
//!
//! A FIFO ring buffer with a hard capacity: appending past the cap drops
//! the oldest entry. Appends are serialized behind a mutex so the capacity
//! invariant holds under concurrent callers. There is no mutation API
//! beyond append-and-truncate.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub const CACHE_CAPACITY: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct CacheEntry<T> {
    pub timestamp: DateTime<Utc>,
    pub payload: T,
}

pub struct BoundedHistory<T> {
    entries: Mutex<VecDeque<CacheEntry<T>>>,
}

impl<T: Clone> BoundedHistory<T> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(CACHE_CAPACITY)),
        }
    }

    pub fn push(&self, payload: T) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if entries.len() >= CACHE_CAPACITY {
            entries.pop_front();
        }
        entries.push_back(CacheEntry {
            timestamp: Utc::now(),
            payload,
        });
    }

    /// Oldest-first copy of the current contents.
    pub fn snapshot(&self) -> Vec<CacheEntry<T>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> Default for BoundedHistory<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_is_enforced_fifo() {
        let history = BoundedHistory::new();
        for i in 0..25 {
            history.push(i);
        }

        let snapshot = history.snapshot();
        assert_eq!(snapshot.len(), CACHE_CAPACITY);
        assert_eq!(snapshot.first().unwrap().payload, 15);
        assert_eq!(snapshot.last().unwrap().payload, 24);
    }

    #[test]
    fn newest_entry_is_always_last() {
        let history = BoundedHistory::new();
        for i in 0..5 {
            history.push(i);
            assert_eq!(history.snapshot().last().unwrap().payload, i);
        }
    }

    #[test]
    fn concurrent_appends_preserve_the_cap() {
        use std::sync::Arc;
        use std::thread;

        let history = Arc::new(BoundedHistory::new());
        let mut handles = Vec::new();

        for t in 0..8 {
            let history = Arc::clone(&history);
            handles.push(thread::spawn(move || {
                for i in 0..50 {
                    history.push(t * 100 + i);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(history.len(), CACHE_CAPACITY);
    }
}
