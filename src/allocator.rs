//! Identifier allocation - per-type monotonic counters
//!
//! Each file-backed store owns one allocator. Counters are seeded lazily
//! from the stored maximum, live only as long as the store instance, and are
//! dropped when their table is deleted so a recreated table restarts its
//! sequence.

use std::collections::HashMap;
use std::sync::Mutex;

/// Per-entity-type identifier counter with a single locked mutation path.
#[derive(Debug, Default)]
pub struct IdAllocator {
    counters: Mutex<HashMap<String, i64>>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next identifier for `type_name`, seeding from `seed` on first use.
    ///
    /// `seed` returns the highest identifier already in storage, or -1 for
    /// an empty table, so the first id handed out is `seed() + 1`.
    pub fn next_id(&self, type_name: &str, seed: impl FnOnce() -> i64) -> i64 {
        let mut counters = self
            .counters
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let counter = counters.entry(type_name.to_string()).or_insert_with(seed);
        *counter += 1;
        *counter
    }

    /// Drop the counter for `type_name`; the next table with that name
    /// starts its sequence over.
    pub fn reset(&self, type_name: &str) {
        let mut counters = self
            .counters
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        counters.remove(type_name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_ids_start_at_zero_and_increase() {
        let allocator = IdAllocator::new();
        assert_eq!(allocator.next_id("Student", || -1), 0);
        assert_eq!(allocator.next_id("Student", || panic!("seed reused")), 1);
        assert_eq!(allocator.next_id("Student", || panic!("seed reused")), 2);
    }

    #[test]
    fn test_seeds_from_stored_maximum() {
        let allocator = IdAllocator::new();
        assert_eq!(allocator.next_id("Student", || 41), 42);
    }

    #[test]
    fn test_types_count_independently() {
        let allocator = IdAllocator::new();
        assert_eq!(allocator.next_id("Student", || -1), 0);
        assert_eq!(allocator.next_id("Lease", || -1), 0);
        assert_eq!(allocator.next_id("Student", || -1), 1);
    }

    #[test]
    fn test_reset_restarts_sequence() {
        let allocator = IdAllocator::new();
        allocator.next_id("Student", || -1);
        allocator.next_id("Student", || -1);
        allocator.reset("Student");
        assert_eq!(allocator.next_id("Student", || -1), 0);
    }

    #[test]
    fn test_concurrent_callers_get_unique_ids() {
        let allocator = Arc::new(IdAllocator::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let allocator = Arc::clone(&allocator);
            handles.push(std::thread::spawn(move || {
                (0..100).map(|_| allocator.next_id("Student", || -1)).collect::<Vec<_>>()
            }));
        }

        let mut all: Vec<i64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 800);
        assert_eq!(*all.first().unwrap(), 0);
        assert_eq!(*all.last().unwrap(), 799);
    }
}
