//! Split bookkeeping for hierarchical path validation.
//!
//! A downward step into a parent with more than one module-interface child
//! opens a split: the path becomes weak until every sibling child owns a
//! branch reaching the same merge interface. [`SplitState`] tracks the
//! branches and the hibernated paths waiting on them, keyed by the path
//! prefix up to and including the split's parent interface.

use std::collections::HashMap;

use crate::graph::{InterfaceId, Path};
use crate::types::TypeTag;

use super::bfs::BfsPath;

/// One hierarchical step of a path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathStackElement {
    pub parent_type: TypeTag,
    pub child_type: TypeTag,
    /// The parent node's children-side interface.
    pub parent_interface: InterfaceId,
    /// The child node's parent-side interface.
    pub child_interface: InterfaceId,
    /// The child's segment name in the parent.
    pub name: String,
    /// Direction: up is child side to parent side.
    pub up: bool,
}

impl PathStackElement {
    /// True when `other` undoes this step: same types and name, opposite
    /// direction.
    #[must_use]
    pub fn matches_inverse(&self, other: &PathStackElement) -> bool {
        self.parent_type == other.parent_type
            && self.child_type == other.child_type
            && self.name == other.name
            && self.up != other.up
    }
}

/// A stack element that has not been folded away yet.
#[derive(Debug, Clone, PartialEq)]
pub struct UnresolvedStackElement {
    pub elem: PathStackElement,
    /// Whether the step opened a split.
    pub split: bool,
}

/// State of one split point for one path prefix.
#[derive(Debug, Default)]
pub struct SplitState {
    /// Path up to and including the split's parent interface.
    pub split_prefix: Path,
    /// Every sibling child owns a branch reaching the merge interface.
    pub complete: bool,
    /// A branch arrived while an uncovered child had no hibernated path
    /// yet; late arrivals for that child check in on their own.
    pub waiting: bool,
    /// Per child: paths that reached a merge candidate through it.
    pub suffix_complete_paths: HashMap<InterfaceId, Vec<BfsPath>>,
    /// Per child: hibernated paths parked at the split.
    pub wait_paths: HashMap<InterfaceId, Vec<BfsPath>>,
}

impl SplitState {
    /// Fresh split state over the given sibling children (their parent-side
    /// interfaces).
    #[must_use]
    pub fn new(split_prefix: Path, children: &[InterfaceId]) -> Self {
        let mut state = Self {
            split_prefix,
            ..Self::default()
        };
        for &child in children {
            state.suffix_complete_paths.insert(child, Vec::new());
            state.wait_paths.insert(child, Vec::new());
        }
        state
    }

    /// The split's parent interface.
    #[must_use]
    pub fn split_point(&self) -> Option<InterfaceId> {
        self.split_prefix.last()
    }
}
