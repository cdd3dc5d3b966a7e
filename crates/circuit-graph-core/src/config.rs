//! Path finder configuration.
//!
//! The original engine exposed process-scope knobs for these; here they are
//! explicit values handed to the path finder per call, so concurrent hosts
//! cannot trample each other's settings.

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};

/// Bounds on path exploration.
///
/// `absolute` stops the whole search; the two weak budgets are heuristics
/// that first stop creating new weak (split-entering) paths and then stop
/// extending weak paths at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathLimits {
    /// Hard ceiling on visited paths; the search stops past it.
    pub absolute: u64,
    /// Past this many visited paths, no new weak paths are created.
    pub no_new_weak: u64,
    /// Past this many visited paths, weak paths are not extended at all.
    pub no_weak: u64,
}

impl Default for PathLimits {
    fn default() -> Self {
        Self {
            absolute: 10_000_000,
            no_new_weak: 1_000_000,
            no_weak: 5_000_000,
        }
    }
}

impl PathLimits {
    /// Builder: set the absolute path ceiling.
    #[must_use]
    pub fn absolute(mut self, absolute: u64) -> Self {
        self.absolute = absolute;
        self
    }

    /// Builder: set the new-weak-path budget.
    #[must_use]
    pub fn no_new_weak(mut self, no_new_weak: u64) -> Self {
        self.no_new_weak = no_new_weak;
        self
    }

    /// Builder: set the weak-path-extension budget.
    #[must_use]
    pub fn no_weak(mut self, no_weak: u64) -> Self {
        self.no_weak = no_weak;
        self
    }

    /// Budgets must be ordered: new-weak stops first, weak extension
    /// second, everything third.
    pub fn validate(&self) -> GraphResult<()> {
        if self.no_new_weak > self.no_weak {
            return Err(GraphError::InvalidConfig(format!(
                "no_new_weak ({}) exceeds no_weak ({})",
                self.no_new_weak, self.no_weak
            )));
        }
        if self.no_weak > self.absolute {
            return Err(GraphError::InvalidConfig(format!(
                "no_weak ({}) exceeds absolute ({})",
                self.no_weak, self.absolute
            )));
        }
        Ok(())
    }
}

/// Per-call path finder configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PathFinderConfig {
    /// Exploration bounds.
    pub limits: PathLimits,
    /// Measure wall time per filter (the total is always measured).
    pub individual_measurement: bool,
}

impl PathFinderConfig {
    /// Builder: set the exploration bounds.
    #[must_use]
    pub fn limits(mut self, limits: PathLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Builder: toggle per-filter timing.
    #[must_use]
    pub fn individual_measurement(mut self, enabled: bool) -> Self {
        self.individual_measurement = enabled;
        self
    }

    pub fn validate(&self) -> GraphResult<()> {
        self.limits.validate()
    }
}
