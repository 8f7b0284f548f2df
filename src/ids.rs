//! Monotonic id issuance.
//!
//! Ids start at 1, strictly increase, and are never reused even after the
//! owning entity is deleted. The counter is atomic so concurrent callers
//! always receive distinct values.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug)]
pub struct IdGen {
    next: AtomicU64,
}

impl IdGen {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Issue the next id
    pub fn issue(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Raise the counter so every future id is greater than `seen`.
    ///
    /// Used when reloading persisted state: the generator must never
    /// re-issue an id already present in the file.
    pub fn bump_past(&self, seen: u64) {
        let mut current = self.next.load(Ordering::Relaxed);
        while current <= seen {
            match self.next.compare_exchange(
                current,
                seen + 1,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }
    }

    /// The id the next call to `issue` would return
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

impl Default for IdGen {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_start_at_one_and_increase() {
        let ids = IdGen::new();
        assert_eq!(ids.issue(), 1);
        assert_eq!(ids.issue(), 2);
        assert_eq!(ids.issue(), 3);
    }

    #[test]
    fn bump_past_skips_seen_ids() {
        let ids = IdGen::new();
        ids.bump_past(41);
        assert_eq!(ids.issue(), 42);

        // Bumping below the current counter is a no-op.
        ids.bump_past(5);
        assert_eq!(ids.issue(), 43);
    }

    #[test]
    fn concurrent_issuers_get_distinct_ids() {
        use std::collections::HashSet;
        use std::sync::Arc;

        let ids = Arc::new(IdGen::new());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let ids = Arc::clone(&ids);
            handles.push(std::thread::spawn(move || {
                (0..100).map(|_| ids.issue()).collect::<Vec<_>>()
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "id {id} issued twice");
            }
        }
        assert_eq!(seen.len(), 400);
    }
}
