//! The typed hierarchical graph: interfaces, links, nodes, paths, and the
//! arena that owns them.

mod interface;
mod link;
mod node;
mod path;
mod store;

#[cfg(test)]
mod tests;

pub use interface::{Interface, InterfaceId, InterfaceKind};
pub use link::{ConditionalFilter, FilterResult, Link, LinkFilterFn, LinkKind};
pub use node::{Node, NodeId};
pub use path::{Edge, Path};
pub use store::{GraphId, GraphStore};
