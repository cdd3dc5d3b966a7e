//! The graph arena: interfaces, nodes, type registry, per-graph state.
//!
//! Every interface starts in its own singleton graph; connecting interfaces
//! across graphs merges the smaller graph into the larger one. The per-graph
//! caches (forward adjacency and simple neighbor sets) are kept symmetric
//! with the edge list at all times.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use crate::error::{GraphError, GraphResult};
use crate::types::{TypeRegistry, TypeTag};

use super::interface::{Interface, InterfaceId, InterfaceKind};
use super::link::Link;
use super::node::{Node, NodeId};

/// Dense id of a graph in the store's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphId(pub(crate) u32);

impl GraphId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "graph#{}", self.0)
    }
}

/// State of one graph: held interfaces, edge list, adjacency caches.
#[derive(Debug, Default)]
pub(crate) struct GraphState {
    /// Held interfaces; an interface's `v_index` is its position here.
    pub(crate) interfaces: Vec<InterfaceId>,
    /// Edge list as installed, one entry per undirected edge.
    pub(crate) edges: Vec<(InterfaceId, InterfaceId, Arc<Link>)>,
    /// Forward adjacency: from -> (to -> link). Symmetric.
    pub(crate) adjacency: HashMap<InterfaceId, HashMap<InterfaceId, Arc<Link>>>,
    /// Simple neighbor sets: from -> {to}. Symmetric.
    pub(crate) simple: HashMap<InterfaceId, HashSet<InterfaceId>>,
    /// Set when this graph was merged into another; a drained graph must
    /// not be reused.
    pub(crate) invalidated: bool,
}

/// Arena owning all interfaces, nodes, and graphs of one engine instance.
#[derive(Debug, Default)]
pub struct GraphStore {
    pub(crate) types: TypeRegistry,
    pub(crate) interfaces: Vec<Interface>,
    pub(crate) nodes: Vec<Node>,
    pub(crate) graphs: Vec<GraphState>,
}

impl GraphStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            types: TypeRegistry::new(),
            interfaces: Vec::new(),
            nodes: Vec::new(),
            graphs: Vec::new(),
        }
    }

    /// The node type registry.
    #[must_use]
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Register a node type; see [`TypeRegistry::register`].
    pub fn register_type(&mut self, name: &str, supertypes: &[TypeTag]) -> GraphResult<TypeTag> {
        self.types.register(name, supertypes)
    }

    /// Create an interface of the given kind in its own singleton graph.
    pub fn add_interface(&mut self, kind: InterfaceKind) -> InterfaceId {
        let graph = GraphId(self.graphs.len() as u32);
        let interface = InterfaceId(self.interfaces.len() as u32);
        self.graphs.push(GraphState {
            interfaces: vec![interface],
            ..GraphState::default()
        });
        self.interfaces.push(Interface {
            kind,
            node: None,
            name: String::new(),
            graph,
            v_index: 0,
        });
        interface
    }

    /// The graph an interface currently lives in.
    #[must_use]
    pub fn graph_of(&self, interface: InterfaceId) -> GraphId {
        self.interfaces[interface.index()].graph
    }

    /// Dense index of an interface within its graph.
    #[must_use]
    pub fn v_index(&self, interface: InterfaceId) -> usize {
        self.interfaces[interface.index()].v_index
    }

    pub(crate) fn live_graph(&self, graph: GraphId) -> GraphResult<&GraphState> {
        let state = &self.graphs[graph.index()];
        if state.invalidated {
            return Err(GraphError::GraphInvalidated);
        }
        Ok(state)
    }

    /// Number of interfaces held by a graph.
    pub fn node_count(&self, graph: GraphId) -> GraphResult<usize> {
        Ok(self.live_graph(graph)?.interfaces.len())
    }

    /// Number of edges held by a graph.
    pub fn edge_count(&self, graph: GraphId) -> GraphResult<usize> {
        Ok(self.live_graph(graph)?.edges.len())
    }

    /// All edges of a graph as `(from, to, link)` entries.
    pub fn all_edges(
        &self,
        graph: GraphId,
    ) -> GraphResult<Vec<(InterfaceId, InterfaceId, Arc<Link>)>> {
        Ok(self.live_graph(graph)?.edges.clone())
    }

    /// Interfaces held by a graph, in `v_index` order.
    pub fn graph_interfaces(&self, graph: GraphId) -> GraphResult<&[InterfaceId]> {
        Ok(&self.live_graph(graph)?.interfaces)
    }

    pub(crate) fn edge_map(
        &self,
        interface: InterfaceId,
    ) -> Option<&HashMap<InterfaceId, Arc<Link>>> {
        let graph = self.interfaces[interface.index()].graph;
        self.graphs[graph.index()].adjacency.get(&interface)
    }

    pub(crate) fn simple_neighbors(
        &self,
        interface: InterfaceId,
    ) -> impl Iterator<Item = InterfaceId> + '_ {
        let graph = self.interfaces[interface.index()].graph;
        self.graphs[graph.index()]
            .simple
            .get(&interface)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    // ========== Edge installation / removal ==========

    /// Install a set-up link as an edge, merging graphs when the endpoints
    /// live apart.
    ///
    /// Fails with [`GraphError::LinkExists`] when an edge between the same
    /// endpoints is already present.
    pub fn add_edge(&mut self, link: Link) -> GraphResult<Arc<Link>> {
        let Some((from, to)) = link.endpoints() else {
            return Err(GraphError::LinkNotSetUp {
                link: Box::new(link.duplicate()),
            });
        };
        let graph_from = self.interfaces[from.index()].graph;
        let graph_to = self.interfaces[to.index()].graph;
        let graph = if graph_from != graph_to {
            self.merge_internal(graph_from, graph_to)
        } else {
            graph_from
        };
        if let Some(existing) = self.graphs[graph.index()]
            .adjacency
            .get(&from)
            .and_then(|m| m.get(&to))
        {
            return Err(GraphError::LinkExists {
                existing: existing.clone(),
                new: Box::new(link),
            });
        }
        let link = Arc::new(link);
        self.insert_edge(graph, from, to, link.clone());
        Ok(link)
    }

    /// Remove the edge a set-up link describes; no-op when absent.
    ///
    /// Fails with [`GraphError::LinkMismatch`] when the cached link differs
    /// from the supplied one.
    pub fn remove_edge(&mut self, link: &Link) -> GraphResult<()> {
        let Some((from, to)) = link.endpoints() else {
            return Err(GraphError::LinkNotSetUp {
                link: Box::new(link.duplicate()),
            });
        };
        let graph = self.interfaces[from.index()].graph;
        let state = &mut self.graphs[graph.index()];
        let Some(cached) = state.adjacency.get(&from).and_then(|m| m.get(&to)).cloned() else {
            return Ok(());
        };
        if *cached != *link {
            return Err(GraphError::LinkMismatch {
                cached,
                supplied: Box::new(link.duplicate()),
            });
        }
        if let Some(m) = state.adjacency.get_mut(&from) {
            m.remove(&to);
        }
        if let Some(m) = state.adjacency.get_mut(&to) {
            m.remove(&from);
        }
        if let Some(s) = state.simple.get_mut(&from) {
            s.remove(&to);
        }
        if let Some(s) = state.simple.get_mut(&to) {
            s.remove(&from);
        }
        state
            .edges
            .retain(|(a, b, _)| !((*a, *b) == (from, to) || (*a, *b) == (to, from)));
        Ok(())
    }

    /// Merge two live graphs; the larger one is the sink and is returned.
    ///
    /// Every interface of the drained graph gets the sink's graph id and its
    /// `v_index` shifted by the sink's previous size; the drained graph is
    /// invalidated.
    pub fn merge_graphs(&mut self, a: GraphId, b: GraphId) -> GraphResult<GraphId> {
        self.live_graph(a)?;
        self.live_graph(b)?;
        if a == b {
            return Ok(a);
        }
        Ok(self.merge_internal(a, b))
    }

    fn merge_internal(&mut self, a: GraphId, b: GraphId) -> GraphId {
        let (sink, source) =
            if self.graphs[a.index()].interfaces.len() >= self.graphs[b.index()].interfaces.len() {
                (a, b)
            } else {
                (b, a)
            };
        let offset = self.graphs[sink.index()].interfaces.len();

        let moved = std::mem::take(&mut self.graphs[source.index()].interfaces);
        for &interface in &moved {
            let entry = &mut self.interfaces[interface.index()];
            entry.graph = sink;
            entry.v_index += offset;
        }
        let edges = std::mem::take(&mut self.graphs[source.index()].edges);
        let adjacency = std::mem::take(&mut self.graphs[source.index()].adjacency);
        let simple = std::mem::take(&mut self.graphs[source.index()].simple);
        self.graphs[source.index()].invalidated = true;

        log::debug!(
            "merging {source} ({} interfaces) into {sink} ({offset} interfaces)",
            moved.len()
        );

        let state = &mut self.graphs[sink.index()];
        state.interfaces.extend(moved);
        state.edges.extend(edges);
        state.adjacency.extend(adjacency);
        state.simple.extend(simple);
        sink
    }

    /// Insert symmetric cache entries for an installed edge. Callers have
    /// already merged the endpoint graphs and ruled out duplicates.
    fn insert_edge(&mut self, graph: GraphId, from: InterfaceId, to: InterfaceId, link: Arc<Link>) {
        let state = &mut self.graphs[graph.index()];
        state.edges.push((from, to, link.clone()));
        state
            .adjacency
            .entry(from)
            .or_default()
            .insert(to, link.clone());
        state.adjacency.entry(to).or_default().insert(from, link);
        state.simple.entry(from).or_default().insert(to);
        state.simple.entry(to).or_default().insert(from);
    }

    /// Triad wiring at node creation; invariants hold by construction.
    pub(crate) fn wire_sibling(&mut self, from: InterfaceId, to_self: InterfaceId) {
        let graph_from = self.interfaces[from.index()].graph;
        let graph_to = self.interfaces[to_self.index()].graph;
        let graph = if graph_from != graph_to {
            self.merge_internal(graph_from, graph_to)
        } else {
            graph_from
        };
        let link = Arc::new(Link::sibling_wired(from, to_self));
        self.insert_edge(graph, from, to_self, link);
    }

    // ========== Graph-level queries ==========

    /// Owning nodes of the graph's self interfaces.
    pub fn node_projection(&self, graph: GraphId) -> GraphResult<HashSet<NodeId>> {
        let state = self.live_graph(graph)?;
        let mut out = HashSet::new();
        for &interface in &state.interfaces {
            if matches!(self.interface_kind(interface), InterfaceKind::NodeSelf) {
                if let Some(node) = self.interface_node(interface) {
                    out.insert(node);
                }
            }
        }
        Ok(out)
    }

    /// Projected nodes whose full name is in `names`, with the name.
    pub fn nodes_by_names(
        &self,
        graph: GraphId,
        names: &HashSet<String>,
    ) -> GraphResult<Vec<(NodeId, String)>> {
        let mut out = Vec::new();
        for node in self.node_projection(graph)? {
            let full_name = self.full_name(node, false);
            if names.contains(&full_name) {
                out.push((node, full_name));
            }
        }
        Ok(out)
    }

    /// Predicate-driven BFS over interfaces.
    ///
    /// Each step offers `(candidate_path, link)` to the predicate; a `true`
    /// return marks the stepped-to interface visited and keeps extending
    /// from it. Returns the set of visited interfaces, starts included.
    pub fn bfs_visit<F>(&self, mut filter: F, starts: &[InterfaceId]) -> HashSet<InterfaceId>
    where
        F: FnMut(&[InterfaceId], &Arc<Link>) -> bool,
    {
        let mut visited: HashSet<InterfaceId> = starts.iter().copied().collect();
        let mut open: VecDeque<Vec<InterfaceId>> =
            starts.iter().map(|&s| vec![s]).collect();

        while let Some(path) = open.pop_front() {
            let Some(&last) = path.last() else {
                continue;
            };
            let Some(edges) = self.edge_map(last) else {
                continue;
            };
            for (&neighbor, link) in edges {
                if visited.contains(&neighbor) {
                    continue;
                }
                let mut next = path.clone();
                next.push(neighbor);
                if filter(&next, link) {
                    visited.insert(neighbor);
                    open.push_back(next);
                }
            }
        }
        visited
    }
}
