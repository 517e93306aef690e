//! Optimizer counters
//!
//! - Counters only
//! - Monotonic increase
//! - Thread-safe but lock-minimal

use std::sync::atomic::{AtomicU64, Ordering};

/// Registry of optimizer counters.
///
/// Shared between concurrent compilations; Relaxed ordering is enough
/// for counters.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Completed refine passes
    refinements: AtomicU64,
    /// Predicates folded into index ranges
    predicates_pushed: AtomicU64,
    /// Predicates written back to filters
    predicates_retained: AtomicU64,
    /// Index scans whose ranges were rebuilt
    ranges_built: AtomicU64,
    /// Sorts marked as bypassed
    sorts_bypassed: AtomicU64,
    /// Index scans that received a limit hint
    limits_propagated: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_refinements(&self) {
        self.refinements.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_predicates_pushed(&self, count: u64) {
        self.predicates_pushed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_predicates_retained(&self, count: u64) {
        self.predicates_retained.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_ranges_built(&self) {
        self.ranges_built.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_sorts_bypassed(&self) {
        self.sorts_bypassed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_limits_propagated(&self, count: u64) {
        self.limits_propagated.fetch_add(count, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            refinements: self.refinements.load(Ordering::Relaxed),
            predicates_pushed: self.predicates_pushed.load(Ordering::Relaxed),
            predicates_retained: self.predicates_retained.load(Ordering::Relaxed),
            ranges_built: self.ranges_built.load(Ordering::Relaxed),
            sorts_bypassed: self.sorts_bypassed.load(Ordering::Relaxed),
            limits_propagated: self.limits_propagated.load(Ordering::Relaxed),
        }
    }

    /// Current values as a JSON object
    pub fn to_json(&self) -> String {
        let s = self.snapshot();
        serde_json::json!({
            "refinements": s.refinements,
            "predicates_pushed": s.predicates_pushed,
            "predicates_retained": s.predicates_retained,
            "ranges_built": s.ranges_built,
            "sorts_bypassed": s.sorts_bypassed,
            "limits_propagated": s.limits_propagated,
        })
        .to_string()
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub refinements: u64,
    pub predicates_pushed: u64,
    pub predicates_retained: u64,
    pub ranges_built: u64,
    pub sorts_bypassed: u64,
    pub limits_propagated: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new_registry_has_zero_values() {
        let registry = MetricsRegistry::new();
        assert_eq!(registry.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_increment_counters() {
        let registry = MetricsRegistry::new();

        registry.increment_refinements();
        registry.add_predicates_pushed(3);
        registry.add_predicates_retained(1);
        registry.increment_ranges_built();
        registry.increment_sorts_bypassed();
        registry.add_limits_propagated(2);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.refinements, 1);
        assert_eq!(snapshot.predicates_pushed, 3);
        assert_eq!(snapshot.predicates_retained, 1);
        assert_eq!(snapshot.ranges_built, 1);
        assert_eq!(snapshot.sorts_bypassed, 1);
        assert_eq!(snapshot.limits_propagated, 2);
    }

    #[test]
    fn test_concurrent_increments() {
        let registry = Arc::new(MetricsRegistry::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..100 {
                        registry.increment_refinements();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.snapshot().refinements, 400);
    }

    #[test]
    fn test_to_json() {
        let registry = MetricsRegistry::new();
        registry.add_predicates_pushed(2);

        let parsed: serde_json::Value = serde_json::from_str(&registry.to_json()).unwrap();
        assert_eq!(parsed["predicates_pushed"], 2);
        assert_eq!(parsed["sorts_bypassed"], 0);
    }
}
