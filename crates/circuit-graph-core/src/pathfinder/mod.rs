//! Constrained path discovery between module interfaces.
//!
//! [`bfs`] produces candidate paths; [`PathFinder`] runs them through the
//! filter pipeline, maintains split state, and emits the complete paths
//! together with per-filter counters.

mod bfs;
mod counter;
mod engine;
mod split;

#[cfg(test)]
mod tests;

pub use bfs::{bfs_visit, BfsPath, PathData};
pub use counter::Counter;
pub use engine::{find_paths, PathFinder};
pub use split::{PathStackElement, SplitState, UnresolvedStackElement};
