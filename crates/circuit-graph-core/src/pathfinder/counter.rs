//! Per-filter bookkeeping.
//!
//! Every filter in the pipeline is wrapped by a [`Counter`] recording how
//! many paths went in and out, how many were weak on entry, and how often
//! the filter weakened or strengthened a path. Wall time per filter is only
//! tracked when individual measurement is enabled; the pipeline total is
//! always tracked.

use std::time::Duration;

/// Counts and timing for one filter (or for a whole pipeline when
/// `total_counter` is set).
#[derive(Debug, Clone, Default)]
pub struct Counter {
    /// Display name; empty for hidden counters.
    pub name: &'static str,
    /// Paths offered to the filter.
    pub in_cnt: u64,
    /// Paths offered with confidence below 1.0.
    pub weak_in_cnt: u64,
    /// Accepted paths whose confidence dropped inside the filter.
    pub out_weaker: u64,
    /// Accepted paths whose confidence rose inside the filter.
    pub out_stronger: u64,
    /// Paths accepted by the filter.
    pub out_cnt: u64,
    /// Accumulated wall time.
    pub time_spent: Duration,
    /// Hidden counters are omitted from `find_paths` results.
    pub hide: bool,
    /// Set on the counter wrapping the whole pipeline.
    pub total_counter: bool,
}

impl Counter {
    #[must_use]
    pub fn named(name: &'static str) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn hidden() -> Self {
        Self {
            hide: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn total(name: &'static str) -> Self {
        Self {
            name,
            total_counter: true,
            ..Self::default()
        }
    }

    /// Record a path entering the filter.
    pub fn record_in(&mut self, confidence: f64) {
        self.in_cnt += 1;
        if confidence < 1.0 {
            self.weak_in_cnt += 1;
        }
    }

    /// Record an accepted path, comparing confidence before and after.
    pub fn record_out(&mut self, confidence_in: f64, confidence_out: f64) {
        self.out_cnt += 1;
        if confidence_out < confidence_in {
            self.out_weaker += 1;
        } else if confidence_out > confidence_in {
            self.out_stronger += 1;
        }
    }
}
