//! Typed hierarchical graph and constrained connection path discovery.
//!
//! This crate embeds the core engine an electronics design framework uses
//! to discover valid connection paths between module interfaces:
//!
//! - **types**: node type registry with a pre-computed subtype relation
//! - **graph**: interfaces, links, nodes, paths, and the arena owning them
//! - **pathfinder**: BFS with a filter pipeline, weak paths, hibernation,
//!   and split/join validation
//! - **config**: explicit per-call exploration budgets
//! - **error**: typed errors for every fallible operation
//!
//! # Example
//!
//! ```
//! use circuit_graph_core::{find_paths, GraphStore, InterfaceKind};
//!
//! fn example() -> circuit_graph_core::GraphResult<()> {
//!     let mut store = GraphStore::new();
//!     let mi = store.types().module_interface_tag();
//!
//!     let a = store.add_node();
//!     store.assign_type(a, mi)?;
//!     let b = store.add_node();
//!     store.assign_type(b, mi)?;
//!
//!     let a_mc = store.add_interface(InterfaceKind::ModuleConnection);
//!     let b_mc = store.add_interface(InterfaceKind::ModuleConnection);
//!     store.attach_interface(a, a_mc, "mc")?;
//!     store.attach_interface(b, b_mc, "mc")?;
//!     store.connect(a_mc, b_mc)?;
//!
//!     let (paths, _counters) = find_paths(&store, a, &[b])?;
//!     assert_eq!(paths.len(), 1);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod pathfinder;
pub mod types;

// Re-exports for convenience
pub use config::{PathFinderConfig, PathLimits};
pub use error::{GraphError, GraphResult};
pub use graph::{
    ConditionalFilter, Edge, FilterResult, GraphId, GraphStore, Interface, InterfaceId,
    InterfaceKind, Link, LinkFilterFn, LinkKind, Node, NodeId, Path,
};
pub use pathfinder::{bfs_visit, find_paths, BfsPath, Counter, PathData, PathFinder};
pub use types::{TypeInfo, TypeRegistry, TypeTag};
