//! Typed interface endpoints and their connection operations.
//!
//! All edges in the graph run between interfaces. A node owns a fixed triad
//! of them (self/children/parent); hosts add further endpoints such as
//! module connections. Each interface lives in exactly one graph at a time.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::error::{GraphError, GraphResult};
use crate::types::TypeTag;

use super::link::{Link, LinkKind};
use super::node::NodeId;
use super::store::{GraphId, GraphStore};

/// Dense id of an interface in the store's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InterfaceId(pub(crate) u32);

impl InterfaceId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gi#{}", self.0)
    }
}

/// Interface variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceKind {
    /// The distinguished interface identifying a node; exactly one per node.
    NodeSelf,
    /// Hierarchy endpoint; a node has one parent side (`is_parent: false`)
    /// and one children side (`is_parent: true`).
    Hierarchical { is_parent: bool },
    /// Points at some other node's self interface via a pointer link.
    Reference,
    /// Endpoint for user-defined module-to-module links.
    ModuleConnection,
    /// User-domain kinds the engine treats opaquely.
    Custom(u32),
}

/// A typed endpoint attached to at most one node.
#[derive(Debug)]
pub struct Interface {
    pub(crate) kind: InterfaceKind,
    pub(crate) node: Option<NodeId>,
    pub(crate) name: String,
    pub(crate) graph: GraphId,
    /// Dense index in the owning graph's interface vector.
    pub(crate) v_index: usize,
}

impl GraphStore {
    /// Kind of an interface.
    #[must_use]
    pub fn interface_kind(&self, interface: InterfaceId) -> InterfaceKind {
        self.interfaces[interface.index()].kind
    }

    /// Owning node, if the interface belongs to one.
    #[must_use]
    pub fn interface_node(&self, interface: InterfaceId) -> Option<NodeId> {
        self.interfaces[interface.index()].node
    }

    /// Local name of the interface within its node.
    #[must_use]
    pub fn interface_name(&self, interface: InterfaceId) -> &str {
        &self.interfaces[interface.index()].name
    }

    /// Set the local name; must be unique within the owning node.
    pub fn set_interface_name(&mut self, interface: InterfaceId, name: impl Into<String>) {
        self.interfaces[interface.index()].name = name.into();
    }

    /// Owning node's full name plus the interface's local name.
    #[must_use]
    pub fn interface_full_name(&self, interface: InterfaceId, types: bool) -> String {
        let name = self.interface_name(interface);
        match self.interface_node(interface) {
            Some(node) => format!("{}.{}", self.full_name(node, types), name),
            None => format!("<detached>.{name}"),
        }
    }

    /// Attach a host-created interface to a node under a local name and
    /// wire it to the node's self interface.
    ///
    /// The sibling wiring is what places the endpoint in the node's graph;
    /// without it the engine cannot route through the interface.
    pub fn attach_interface(
        &mut self,
        node: NodeId,
        interface: InterfaceId,
        name: impl Into<String>,
    ) -> GraphResult<Arc<Link>> {
        let entry = &mut self.interfaces[interface.index()];
        entry.node = Some(node);
        entry.name = name.into();
        let self_interface = self.self_interface(node);
        self.connect_with(interface, self_interface, Link::sibling())
    }

    /// Install a fresh direct link between `a` and `b`.
    ///
    /// Connecting interfaces that live in different graphs merges the
    /// smaller graph into the larger one. Connecting an already-connected
    /// pair fails with [`GraphError::LinkExists`].
    pub fn connect(&mut self, a: InterfaceId, b: InterfaceId) -> GraphResult<Arc<Link>> {
        self.connect_with(a, b, Link::direct())
    }

    /// Install a caller-supplied link between `a` and `b`.
    ///
    /// The link must not already be set up. Conditional links run their
    /// filter here and fail with [`GraphError::LinkFiltered`] on rejection.
    pub fn connect_with(
        &mut self,
        a: InterfaceId,
        b: InterfaceId,
        mut link: Link,
    ) -> GraphResult<Arc<Link>> {
        link.set_connections(&*self, a, b)?;
        self.add_edge(link)
    }

    /// Install a clone of `link` from `a` to each interface in `others`.
    ///
    /// Fails with [`GraphError::NotCloneable`] before touching the graph if
    /// the link does not support cloning.
    pub fn connect_many(
        &mut self,
        a: InterfaceId,
        others: &[InterfaceId],
        link: &Link,
    ) -> GraphResult<Vec<Arc<Link>>> {
        let mut installed = Vec::with_capacity(others.len());
        for &other in others {
            let clone = link.clone_if_allowed()?;
            installed.push(self.connect_with(a, other, clone)?);
        }
        Ok(installed)
    }

    /// Adjacent interfaces via the simple adjacency cache.
    #[must_use]
    pub fn neighbors(&self, interface: InterfaceId) -> HashSet<InterfaceId> {
        let g = &self.graphs[self.interfaces[interface.index()].graph.index()];
        g.simple
            .get(&interface)
            .cloned()
            .unwrap_or_default()
    }

    /// Map of adjacent interface to the installed link.
    #[must_use]
    pub fn edges_of(&self, interface: InterfaceId) -> HashMap<InterfaceId, Arc<Link>> {
        self.edge_map(interface)
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    /// The installed link between `a` and `b`, if any.
    #[must_use]
    pub fn is_connected_to(&self, a: InterfaceId, b: InterfaceId) -> Option<Arc<Link>> {
        self.edge_map(a).and_then(|m| m.get(&b).cloned())
    }

    /// Owning nodes of neighbors linked by a plain direct link whose node
    /// type is a subtype of any requested type.
    #[must_use]
    pub fn connected_nodes(&self, interface: InterfaceId, of_types: &[TypeTag]) -> HashSet<NodeId> {
        let mut out = HashSet::new();
        if let Some(edges) = self.edge_map(interface) {
            for (&neighbor, link) in edges {
                if !matches!(link.kind(), LinkKind::Direct) {
                    continue;
                }
                let Some(node) = self.interface_node(neighbor) else {
                    continue;
                };
                let Ok(tag) = self.node_type(node) else {
                    continue;
                };
                if self.types().is_subtype_of_any(tag, of_types) {
                    out.insert(node);
                }
            }
        }
        out
    }

    /// Bind a reference interface to a target self interface.
    pub fn bind_reference(
        &mut self,
        reference: InterfaceId,
        target_self: InterfaceId,
    ) -> GraphResult<Arc<Link>> {
        self.connect_with(reference, target_self, Link::pointer())
    }

    /// The self interface a reference points at.
    ///
    /// Fails with [`GraphError::ReferenceUnbound`] until bound.
    pub fn referenced_interface(&self, reference: InterfaceId) -> GraphResult<InterfaceId> {
        if let Some(edges) = self.edge_map(reference) {
            for (&neighbor, link) in edges {
                if matches!(link.kind(), LinkKind::Pointer)
                    && matches!(self.interface_kind(neighbor), InterfaceKind::NodeSelf)
                {
                    return Ok(neighbor);
                }
            }
        }
        Err(GraphError::ReferenceUnbound {
            interface: reference,
        })
    }

    /// The node a reference points at.
    pub fn referenced_node(&self, reference: InterfaceId) -> GraphResult<NodeId> {
        let target = self.referenced_interface(reference)?;
        self.interface_node(target)
            .ok_or(GraphError::NoOwningNode { interface: target })
    }
}
