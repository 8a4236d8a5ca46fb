//! Shared counter handles passed into the harness and every worker.
//!
//! Both counters are explicit values owned by the harness, never process-wide
//! statics, so tests can run several harnesses side by side.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic tally of recoverable workload failures.
///
/// Lives for the whole harness run; never reset between passes.
#[derive(Debug, Default)]
pub struct ErrorCounter(AtomicU64);

impl ErrorCounter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Add one failure and return the new total.
    pub fn increment(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Deterministic cyclic selector backed by an atomic counter.
///
/// Used for base-URL rotation, mixed-workload dispatch, and pool draws.
/// Concurrent callers each get a distinct slot; over `k` calls every index in
/// `0..len` is produced either `⌊k/len⌋` or `⌈k/len⌉` times.
#[derive(Debug, Default)]
pub struct RoundRobin(AtomicU64);

impl RoundRobin {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Next index in `0..len`.
    pub fn next(&self, len: usize) -> usize {
        debug_assert!(len > 0, "round-robin over an empty set");
        (self.0.fetch_add(1, Ordering::Relaxed) % len as u64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_error_counter_monotonic() {
        let counter = ErrorCounter::new();
        assert_eq!(counter.get(), 0);
        assert_eq!(counter.increment(), 1);
        assert_eq!(counter.increment(), 2);
        assert_eq!(counter.get(), 2);
    }

    #[test]
    fn test_error_counter_concurrent_increments() {
        let counter = Arc::new(ErrorCounter::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counter = counter.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        counter.increment();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(counter.get(), 800);
    }

    #[test]
    fn test_round_robin_cycles_in_order() {
        let rr = RoundRobin::new();
        let drawn: Vec<usize> = (0..7).map(|_| rr.next(3)).collect();
        assert_eq!(drawn, vec![0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn test_round_robin_near_uniform_coverage() {
        let rr = RoundRobin::new();
        let n = 5;
        let k = 23;
        let mut counts = vec![0u64; n];
        for _ in 0..k {
            counts[rr.next(n)] += 1;
        }
        let floor = (k / n) as u64;
        for (index, count) in counts.iter().enumerate() {
            assert!(
                *count == floor || *count == floor + 1,
                "index {index} drawn {count} times, expected {floor} or {}",
                floor + 1
            );
        }
    }
}
