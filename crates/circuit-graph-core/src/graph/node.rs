//! Nodes and the parent/child hierarchy.
//!
//! A node owns a fixed triad of interfaces: `self`, `children`, `parent`.
//! The triad is wired together with sibling links at creation; hierarchy
//! between nodes is expressed as parent links between the `children` side of
//! the parent node and the `parent` side of the child node.

use std::collections::HashSet;

use uuid::Uuid;

use crate::error::{GraphError, GraphResult};
use crate::types::TypeTag;

use super::interface::{InterfaceId, InterfaceKind};
use super::path::Path;
use super::store::{GraphId, GraphStore};

/// Dense id of a node in the store's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// A node: its triad, stable identity, and optional assigned type.
#[derive(Debug)]
pub struct Node {
    pub(crate) uid: Uuid,
    pub(crate) self_interface: InterfaceId,
    pub(crate) children_interface: InterfaceId,
    pub(crate) parent_interface: InterfaceId,
    pub(crate) type_tag: Option<TypeTag>,
    pub(crate) omit_parents_in_full_name: bool,
}

impl GraphStore {
    /// Create a node with its triad wired together.
    ///
    /// The three interfaces start in singleton graphs and end up in one
    /// shared graph through the sibling wiring.
    pub fn add_node(&mut self) -> NodeId {
        let self_interface = self.add_interface(InterfaceKind::NodeSelf);
        let children_interface =
            self.add_interface(InterfaceKind::Hierarchical { is_parent: true });
        let parent_interface =
            self.add_interface(InterfaceKind::Hierarchical { is_parent: false });
        self.set_interface_name(self_interface, "self");
        self.set_interface_name(children_interface, "children");
        self.set_interface_name(parent_interface, "parent");

        let node = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            uid: Uuid::new_v4(),
            self_interface,
            children_interface,
            parent_interface,
            type_tag: None,
            omit_parents_in_full_name: false,
        });
        for interface in [self_interface, children_interface, parent_interface] {
            self.interfaces[interface.index()].node = Some(node);
        }

        // Triad wiring holds by construction, no fallible validation needed.
        self.wire_sibling(children_interface, self_interface);
        self.wire_sibling(parent_interface, self_interface);
        node
    }

    /// Assign the node's type; one-shot.
    pub fn assign_type(&mut self, node: NodeId, tag: TypeTag) -> GraphResult<()> {
        let slot = &mut self.nodes[node.index()].type_tag;
        if slot.is_some() {
            return Err(GraphError::TypeAlreadyAssigned { node });
        }
        *slot = Some(tag);
        Ok(())
    }

    /// The node's assigned type.
    pub fn node_type(&self, node: NodeId) -> GraphResult<TypeTag> {
        self.nodes[node.index()]
            .type_tag
            .ok_or(GraphError::TypeNotAssigned { node })
    }

    /// Stable external identity assigned at creation.
    #[must_use]
    pub fn node_uid(&self, node: NodeId) -> Uuid {
        self.nodes[node.index()].uid
    }

    #[must_use]
    pub fn self_interface(&self, node: NodeId) -> InterfaceId {
        self.nodes[node.index()].self_interface
    }

    #[must_use]
    pub fn children_interface(&self, node: NodeId) -> InterfaceId {
        self.nodes[node.index()].children_interface
    }

    #[must_use]
    pub fn parent_interface(&self, node: NodeId) -> InterfaceId {
        self.nodes[node.index()].parent_interface
    }

    /// The graph the node currently lives in.
    #[must_use]
    pub fn node_graph(&self, node: NodeId) -> GraphId {
        let self_interface = self.nodes[node.index()].self_interface;
        self.interfaces[self_interface.index()].graph
    }

    /// Omit the parent chain when rendering this node's full name.
    pub fn set_omit_parents_in_full_name(&mut self, node: NodeId, omit: bool) {
        self.nodes[node.index()].omit_parents_in_full_name = omit;
    }

    #[must_use]
    pub fn omit_parents_in_full_name(&self, node: NodeId) -> bool {
        self.nodes[node.index()].omit_parents_in_full_name
    }

    // ========== Hierarchical interface operations ==========

    /// The `(parent_node, segment_name)` pair a hierarchical interface is
    /// parent-linked to, if any. Meaningful on a node's `parent` side.
    #[must_use]
    pub fn hierarchy_parent(&self, interface: InterfaceId) -> Option<(NodeId, String)> {
        let edges = self.edge_map(interface)?;
        for (&neighbor, link) in edges {
            if !link.is_parent_kind() {
                continue;
            }
            if !matches!(
                self.interface_kind(neighbor),
                InterfaceKind::Hierarchical { is_parent: true }
            ) {
                continue;
            }
            if let Some(node) = self.interface_node(neighbor) {
                let name = link.parent_name().unwrap_or_default().to_string();
                return Some((node, name));
            }
        }
        None
    }

    /// Owning nodes of every parent-linked neighbor. Meaningful on a node's
    /// `children` side.
    #[must_use]
    pub fn hierarchy_children(&self, interface: InterfaceId) -> Vec<NodeId> {
        self.hierarchy_children_with_names(interface)
            .into_iter()
            .map(|(node, _)| node)
            .collect()
    }

    /// Parent-linked children together with their segment names.
    #[must_use]
    pub fn hierarchy_children_with_names(&self, interface: InterfaceId) -> Vec<(NodeId, String)> {
        let mut out = Vec::new();
        if let Some(edges) = self.edge_map(interface) {
            for (&neighbor, link) in edges {
                if !link.is_parent_kind() {
                    continue;
                }
                if !matches!(
                    self.interface_kind(neighbor),
                    InterfaceKind::Hierarchical { is_parent: false }
                ) {
                    continue;
                }
                if let Some(node) = self.interface_node(neighbor) {
                    let name = link.parent_name().unwrap_or_default().to_string();
                    out.push((node, name));
                }
            }
        }
        out
    }

    /// Remove the parent edge of a hierarchical interface; no-op when no
    /// parent is linked.
    pub fn disconnect_parent(&mut self, interface: InterfaceId) -> GraphResult<()> {
        let mut target = None;
        if let Some(edges) = self.edge_map(interface) {
            for (&neighbor, link) in edges {
                if link.is_parent_kind()
                    && matches!(
                        self.interface_kind(neighbor),
                        InterfaceKind::Hierarchical { is_parent: true }
                    )
                {
                    target = Some(link.duplicate());
                    break;
                }
            }
        }
        match target {
            Some(link) => self.remove_edge(&link),
            None => Ok(()),
        }
    }

    /// True if `(from, to)` steps up the hierarchy (child side to parent
    /// side).
    #[must_use]
    pub fn is_uplink(&self, from: InterfaceId, to: InterfaceId) -> bool {
        matches!(
            self.interface_kind(from),
            InterfaceKind::Hierarchical { is_parent: false }
        ) && matches!(
            self.interface_kind(to),
            InterfaceKind::Hierarchical { is_parent: true }
        )
    }

    /// True if `(from, to)` steps down the hierarchy (parent side to child
    /// side).
    #[must_use]
    pub fn is_downlink(&self, from: InterfaceId, to: InterfaceId) -> bool {
        self.is_uplink(to, from)
    }

    // ========== Node hierarchy queries ==========

    /// The node's parent and the segment name, if a parent is linked.
    #[must_use]
    pub fn node_parent(&self, node: NodeId) -> Option<(NodeId, String)> {
        self.hierarchy_parent(self.nodes[node.index()].parent_interface)
    }

    /// The node's parent, failing with [`GraphError::NodeNoParent`] when
    /// detached.
    pub fn node_parent_required(&self, node: NodeId) -> GraphResult<(NodeId, String)> {
        self.node_parent(node)
            .ok_or(GraphError::NodeNoParent { node })
    }

    /// Segment name in the parent; fails when the node has no parent.
    pub fn node_name(&self, node: NodeId) -> GraphResult<String> {
        self.node_parent_required(node).map(|(_, name)| name)
    }

    /// Segment name in the parent, or the root id for detached nodes.
    #[must_use]
    pub fn node_name_or_root(&self, node: NodeId) -> String {
        match self.node_parent(node) {
            Some((_, name)) => name,
            None => self.root_id(node),
        }
    }

    /// Stable short identifier for a parentless node, derived from its uid.
    #[must_use]
    pub fn root_id(&self, node: NodeId) -> String {
        let uid = self.nodes[node.index()].uid;
        let simple = uid.simple().to_string();
        format!("*{}", &simple[..8])
    }

    /// Chain from the root to this node as `(node, segment_name)` pairs.
    #[must_use]
    pub fn hierarchy(&self, node: NodeId) -> Vec<(NodeId, String)> {
        match self.node_parent(node) {
            None => vec![(node, self.root_id(node))],
            Some((parent, name)) => {
                let mut chain = self.hierarchy(parent);
                chain.push((node, name));
                chain
            }
        }
    }

    /// Dot-joined segment names from the root, each segment annotated with
    /// `|TypeName` when `types` is set. Nodes flagged with
    /// [`GraphStore::set_omit_parents_in_full_name`] cut the chain.
    #[must_use]
    pub fn full_name(&self, node: NodeId, types: bool) -> String {
        let mut out = String::new();
        match self.node_parent(node) {
            Some((parent, name)) => {
                if !self.nodes[parent.index()].omit_parents_in_full_name {
                    out.push_str(&self.full_name(parent, types));
                    out.push('.');
                }
                out.push_str(&name);
            }
            None => {
                if !self.nodes[node.index()].omit_parents_in_full_name {
                    out.push_str(&self.root_id(node));
                }
            }
        }
        if types {
            out.push('|');
            out.push_str(self.type_name_or_default(node));
        }
        out
    }

    /// Registered type name, or the lattice root's name while unassigned.
    #[must_use]
    pub fn type_name_or_default(&self, node: NodeId) -> &str {
        match self.nodes[node.index()].type_tag {
            Some(tag) => self.types().name(tag),
            None => self.types().name(self.types().node_tag()),
        }
    }

    // ========== Children enumeration ==========

    fn children_direct(&self, node: NodeId) -> HashSet<NodeId> {
        self.hierarchy_children(self.nodes[node.index()].children_interface)
            .into_iter()
            .collect()
    }

    fn children_all(&self, node: NodeId, include_root: bool) -> HashSet<NodeId> {
        let mut out = HashSet::new();
        if include_root {
            out.insert(node);
        }
        let direct = self.children_direct(node);
        for &child in &direct {
            out.extend(self.children_all(child, false));
        }
        out.extend(direct);
        out
    }

    /// Enumerate children through hierarchical parent-edges.
    ///
    /// `of_types` containing the lattice root short-circuits to "no type
    /// filter"; untyped nodes never match a type filter. `sort` orders by
    /// segment name (root id for detached nodes).
    #[must_use]
    pub fn children(
        &self,
        node: NodeId,
        direct_only: bool,
        of_types: Option<&[TypeTag]>,
        include_root: bool,
        f_filter: Option<&dyn Fn(&GraphStore, NodeId) -> bool>,
        sort: bool,
    ) -> Vec<NodeId> {
        let candidates = if direct_only {
            let mut set = self.children_direct(node);
            if include_root {
                set.insert(node);
            }
            set
        } else {
            self.children_all(node, include_root)
        };

        let of_types = match of_types {
            Some(types) if types.contains(&self.types().node_tag()) => None,
            other => other,
        };

        let mut filtered: Vec<NodeId> = candidates
            .into_iter()
            .filter(|&candidate| {
                if let Some(types) = of_types {
                    match self.node_type(candidate) {
                        Ok(tag) => {
                            if !self.types().is_subtype_of_any(tag, types) {
                                return false;
                            }
                        }
                        Err(_) => return false,
                    }
                }
                if let Some(f) = f_filter {
                    if !f(self, candidate) {
                        return false;
                    }
                }
                true
            })
            .collect();

        if sort {
            filtered.sort_by_key(|&n| self.node_name_or_root(n));
        }
        filtered
    }

    /// Graph BFS from the node's self interface; the predicate sees every
    /// visited path and decides whether the path's last node is emitted.
    pub fn bfs_node<F>(&self, node: NodeId, mut predicate: F) -> HashSet<NodeId>
    where
        F: FnMut(&Path) -> bool,
    {
        let mut out = HashSet::new();
        let start = self.nodes[node.index()].self_interface;
        self.bfs_visit(
            |path, _link| {
                let ok = predicate(&Path::new(path.to_vec()));
                if ok {
                    if let Some(&last) = path.last() {
                        if let Some(owner) = self.interface_node(last) {
                            out.insert(owner);
                        }
                    }
                }
                ok
            },
            &[start],
        );
        out
    }
}
