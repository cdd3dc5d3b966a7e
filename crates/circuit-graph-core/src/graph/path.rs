//! Immutable interface paths.
//!
//! A [`Path`] is an ordered sequence of interfaces; edges are the adjacent
//! pairs. Paths hold non-owning ids into the store, so cloning and hashing
//! stay cheap even on deep hierarchies.

use std::fmt;
use std::sync::Arc;

use super::interface::InterfaceId;
use super::link::Link;
use super::store::GraphStore;

/// An edge of a path: an adjacent interface pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub from: InterfaceId,
    pub to: InterfaceId,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Immutable ordered sequence of interfaces.
///
/// Equality and hashing are element-wise by interface identity, which makes
/// paths usable as split-state keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    interfaces: Vec<InterfaceId>,
}

impl Path {
    /// Path holding a single head interface.
    #[must_use]
    pub fn single(head: InterfaceId) -> Self {
        Self {
            interfaces: vec![head],
        }
    }

    /// Path over the given interface sequence.
    #[must_use]
    pub fn new(interfaces: Vec<InterfaceId>) -> Self {
        Self { interfaces }
    }

    /// New path extending this one by `next`.
    #[must_use]
    pub fn extended(&self, next: InterfaceId) -> Self {
        let mut interfaces = Vec::with_capacity(self.interfaces.len() + 1);
        interfaces.extend_from_slice(&self.interfaces);
        interfaces.push(next);
        Self { interfaces }
    }

    /// Prefix of the first `len` interfaces.
    #[must_use]
    pub fn prefix(&self, len: usize) -> Self {
        Self {
            interfaces: self.interfaces[..len].to_vec(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }

    #[must_use]
    pub fn first(&self) -> Option<InterfaceId> {
        self.interfaces.first().copied()
    }

    #[must_use]
    pub fn last(&self) -> Option<InterfaceId> {
        self.interfaces.last().copied()
    }

    #[must_use]
    pub fn get(&self, idx: usize) -> Option<InterfaceId> {
        self.interfaces.get(idx).copied()
    }

    #[must_use]
    pub fn contains(&self, interface: InterfaceId) -> bool {
        self.interfaces.contains(&interface)
    }

    /// Index of the first occurrence of `interface`.
    #[must_use]
    pub fn index_of(&self, interface: InterfaceId) -> Option<usize> {
        self.interfaces.iter().position(|&i| i == interface)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[InterfaceId] {
        &self.interfaces
    }

    /// Iterate the adjacent pairs of the path.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.interfaces.windows(2).map(|w| Edge {
            from: w[0],
            to: w[1],
        })
    }

    /// The final adjacent pair, if the path has at least two interfaces.
    #[must_use]
    pub fn last_edge(&self) -> Option<Edge> {
        let n = self.interfaces.len();
        if n < 2 {
            return None;
        }
        Some(Edge {
            from: self.interfaces[n - 2],
            to: self.interfaces[n - 1],
        })
    }

    /// The final three interfaces, if present.
    #[must_use]
    pub fn last_tri_edge(&self) -> Option<(InterfaceId, InterfaceId, InterfaceId)> {
        let n = self.interfaces.len();
        if n < 3 {
            return None;
        }
        Some((
            self.interfaces[n - 3],
            self.interfaces[n - 2],
            self.interfaces[n - 1],
        ))
    }

    /// True if `other` is a (non-strict) prefix of this path.
    #[must_use]
    pub fn starts_with(&self, other: &Path) -> bool {
        self.interfaces.len() >= other.interfaces.len()
            && self.interfaces[..other.interfaces.len()] == other.interfaces[..]
    }

    /// The link installed for `edge`, looked up through the store's
    /// adjacency cache.
    #[must_use]
    pub fn get_link(&self, store: &GraphStore, edge: Edge) -> Option<Arc<Link>> {
        store.is_connected_to(edge.from, edge.to)
    }

    /// Render the path with full interface names for logs and errors.
    #[must_use]
    pub fn display(&self, store: &GraphStore) -> String {
        let names: Vec<String> = self
            .interfaces
            .iter()
            .map(|&i| store.interface_full_name(i, false))
            .collect();
        names.join(" -> ")
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for i in &self.interfaces {
            if !first {
                write!(f, " -> ")?;
            }
            write!(f, "{i}")?;
            first = false;
        }
        Ok(())
    }
}
