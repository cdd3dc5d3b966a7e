//! Typed edge payloads between interfaces.
//!
//! Every edge in the graph carries a [`Link`]: a kind tag plus the ordered
//! endpoint pair installed by `set_connections`. Conditional kinds carry a
//! path predicate that is consulted both at install time and by the path
//! finder while walking candidate paths.

use std::fmt;
use std::sync::Arc;

use crate::error::{GraphError, GraphResult};

use super::interface::{InterfaceId, InterfaceKind};
use super::path::Path;
use super::store::GraphStore;

/// Outcome of a conditional link filter.
///
/// Inside the BFS a non-pass result is an ordinary rejection, never an
/// error; only installation turns it into [`GraphError::LinkFiltered`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterResult {
    Pass,
    FailRecoverable,
    FailUnrecoverable,
}

/// Path predicate attached to conditional links.
pub type LinkFilterFn = Arc<dyn Fn(&GraphStore, &Path) -> FilterResult + Send + Sync>;

/// Filter plus its evaluation scope.
#[derive(Clone)]
pub struct ConditionalFilter {
    func: LinkFilterFn,
    /// When set the filter is evaluated only on the edge that ends the
    /// candidate path, not on every extension of it.
    only_first_in_path: bool,
}

impl ConditionalFilter {
    #[must_use]
    pub fn new(func: LinkFilterFn, only_first_in_path: bool) -> Self {
        Self {
            func,
            only_first_in_path,
        }
    }

    #[must_use]
    pub fn only_first_in_path(&self) -> bool {
        self.only_first_in_path
    }

    /// Run the predicate on a candidate path.
    #[must_use]
    pub fn run(&self, store: &GraphStore, path: &Path) -> FilterResult {
        (self.func)(store, path)
    }
}

impl fmt::Debug for ConditionalFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionalFilter")
            .field("only_first_in_path", &self.only_first_in_path)
            .finish_non_exhaustive()
    }
}

impl PartialEq for ConditionalFilter {
    fn eq(&self, other: &Self) -> bool {
        // Filter functions compare by identity.
        Arc::ptr_eq(&self.func, &other.func)
            && self.only_first_in_path == other.only_first_in_path
    }
}

/// Link variants.
#[derive(Debug, Clone)]
pub enum LinkKind {
    /// Symmetric direct connection.
    Direct,
    /// Hierarchical parent/child edge.
    Parent,
    /// `Parent` plus the child's local name in the parent.
    NamedParent(String),
    /// Connects any interface to a self interface.
    Pointer,
    /// `Pointer` used to wire a node's triad to its own self interface.
    Sibling,
    /// `Direct` gated by a path predicate.
    DirectConditional(ConditionalFilter),
    /// `DirectConditional` derived from the conditional links found along a
    /// witness path; its filter is their conjunction.
    DirectDerived {
        witness: Path,
        filter: ConditionalFilter,
    },
}

impl PartialEq for LinkKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (LinkKind::Direct, LinkKind::Direct) => true,
            (LinkKind::Parent, LinkKind::Parent) => true,
            (LinkKind::NamedParent(a), LinkKind::NamedParent(b)) => a == b,
            (LinkKind::Pointer, LinkKind::Pointer) => true,
            (LinkKind::Sibling, LinkKind::Sibling) => true,
            (LinkKind::DirectConditional(a), LinkKind::DirectConditional(b)) => a == b,
            // Derived links compare by the captured witness path alone; the
            // composed filter is a function of it and every construction
            // allocates a fresh closure.
            (
                LinkKind::DirectDerived { witness: a, .. },
                LinkKind::DirectDerived { witness: b, .. },
            ) => a == b,
            _ => false,
        }
    }
}

impl LinkKind {
    /// Stable debug name of the variant.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            LinkKind::Direct => "Direct",
            LinkKind::Parent => "Parent",
            LinkKind::NamedParent(_) => "NamedParent",
            LinkKind::Pointer => "Pointer",
            LinkKind::Sibling => "Sibling",
            LinkKind::DirectConditional(_) => "DirectConditional",
            LinkKind::DirectDerived { .. } => "DirectDerived",
        }
    }
}

/// A typed value representing an edge between two interfaces.
///
/// Created detached; `set_connections` installs the ordered endpoint pair
/// and validates the kind's contract. Equality is kind equality plus, when
/// both links are set up, endpoint equality.
#[derive(Debug)]
pub struct Link {
    kind: LinkKind,
    endpoints: Option<(InterfaceId, InterfaceId)>,
}

impl Link {
    #[must_use]
    pub fn direct() -> Self {
        Self::detached(LinkKind::Direct)
    }

    #[must_use]
    pub fn parent() -> Self {
        Self::detached(LinkKind::Parent)
    }

    #[must_use]
    pub fn named_parent(name: impl Into<String>) -> Self {
        Self::detached(LinkKind::NamedParent(name.into()))
    }

    #[must_use]
    pub fn pointer() -> Self {
        Self::detached(LinkKind::Pointer)
    }

    #[must_use]
    pub fn sibling() -> Self {
        Self::detached(LinkKind::Sibling)
    }

    #[must_use]
    pub fn direct_conditional(func: LinkFilterFn, only_first_in_path: bool) -> Self {
        Self::detached(LinkKind::DirectConditional(ConditionalFilter::new(
            func,
            only_first_in_path,
        )))
    }

    /// Derive a conditional link from the conditional links found along a
    /// witness path.
    ///
    /// The derived filter runs every captured filter on the candidate path
    /// and reports the worst failure; it evaluates only on the first edge
    /// iff every captured filter does.
    #[must_use]
    pub fn direct_derived(store: &GraphStore, witness: &Path) -> Self {
        let mut captured: Vec<ConditionalFilter> = Vec::new();
        for edge in witness.edges() {
            if let Some(link) = witness.get_link(store, edge) {
                if let Some(filter) = link.conditional_filter() {
                    captured.push(filter.clone());
                }
            }
        }
        let only_first = !captured.is_empty() && captured.iter().all(|f| f.only_first_in_path);
        let func: LinkFilterFn = Arc::new(move |store, path| {
            let mut worst = FilterResult::Pass;
            for filter in &captured {
                match filter.run(store, path) {
                    FilterResult::FailUnrecoverable => return FilterResult::FailUnrecoverable,
                    FilterResult::FailRecoverable => worst = FilterResult::FailRecoverable,
                    FilterResult::Pass => {}
                }
            }
            worst
        });
        Self::detached(LinkKind::DirectDerived {
            witness: witness.clone(),
            filter: ConditionalFilter::new(func, only_first),
        })
    }

    fn detached(kind: LinkKind) -> Self {
        Self {
            kind,
            endpoints: None,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &LinkKind {
        &self.kind
    }

    #[must_use]
    pub fn is_set_up(&self) -> bool {
        self.endpoints.is_some()
    }

    /// The installed `(from, to)` pair, if set up.
    #[must_use]
    pub fn endpoints(&self) -> Option<(InterfaceId, InterfaceId)> {
        self.endpoints
    }

    /// True for `Parent` and `NamedParent`.
    #[must_use]
    pub fn is_parent_kind(&self) -> bool {
        matches!(self.kind, LinkKind::Parent | LinkKind::NamedParent(_))
    }

    /// The child's local name for `NamedParent` links.
    #[must_use]
    pub fn parent_name(&self) -> Option<&str> {
        match &self.kind {
            LinkKind::NamedParent(name) => Some(name),
            _ => None,
        }
    }

    /// The attached filter for conditional kinds (`DirectConditional` and
    /// `DirectDerived`).
    #[must_use]
    pub fn conditional_filter(&self) -> Option<&ConditionalFilter> {
        match &self.kind {
            LinkKind::DirectConditional(filter) => Some(filter),
            LinkKind::DirectDerived { filter, .. } => Some(filter),
            _ => None,
        }
    }

    /// Whether `connect_many` may install per-target clones of this link.
    #[must_use]
    pub fn is_cloneable(&self) -> bool {
        !matches!(self.kind, LinkKind::Pointer | LinkKind::Sibling)
    }

    /// Detached clone for per-target installation.
    pub fn clone_if_allowed(&self) -> GraphResult<Link> {
        if !self.is_cloneable() {
            return Err(GraphError::NotCloneable {
                kind: self.kind.name(),
            });
        }
        Ok(Self::detached(self.kind.clone()))
    }

    /// Pre-wired sibling link for node triad construction, where the
    /// endpoint contract holds by construction.
    pub(crate) fn sibling_wired(from: InterfaceId, to_self: InterfaceId) -> Link {
        Link {
            kind: LinkKind::Sibling,
            endpoints: Some((from, to_self)),
        }
    }

    /// Internal duplicate including setup state, for error payloads.
    pub(crate) fn duplicate(&self) -> Link {
        Link {
            kind: self.kind.clone(),
            endpoints: self.endpoints,
        }
    }

    /// Install the ordered endpoint pair, validating the kind's contract.
    pub(crate) fn set_connections(
        &mut self,
        store: &GraphStore,
        from: InterfaceId,
        to: InterfaceId,
    ) -> GraphResult<()> {
        if self.is_set_up() {
            return Err(GraphError::LinkAlreadySetUp {
                link: Box::new(self.duplicate()),
            });
        }
        match &self.kind {
            LinkKind::Parent | LinkKind::NamedParent(_) => {
                let from_parent = match store.interface_kind(from) {
                    InterfaceKind::Hierarchical { is_parent } => Some(is_parent),
                    _ => None,
                };
                let to_parent = match store.interface_kind(to) {
                    InterfaceKind::Hierarchical { is_parent } => Some(is_parent),
                    _ => None,
                };
                match (from_parent, to_parent) {
                    (Some(a), Some(b)) if a != b => {}
                    _ => return Err(GraphError::InvalidParentChild { from, to }),
                }
            }
            LinkKind::Pointer | LinkKind::Sibling => {
                let from_self = matches!(store.interface_kind(from), InterfaceKind::NodeSelf);
                let to_self = matches!(store.interface_kind(to), InterfaceKind::NodeSelf);
                if !from_self && !to_self {
                    return Err(GraphError::PointerToNonSelf { from, to });
                }
            }
            LinkKind::DirectConditional(filter) | LinkKind::DirectDerived { filter, .. } => {
                let candidate = Path::new(vec![from, to]);
                if filter.run(store, &candidate) != FilterResult::Pass {
                    return Err(GraphError::LinkFiltered {
                        link: Box::new(self.duplicate()),
                    });
                }
            }
            LinkKind::Direct => {}
        }
        self.endpoints = Some((from, to));
        Ok(())
    }
}

impl PartialEq for Link {
    fn eq(&self, other: &Self) -> bool {
        if self.kind != other.kind {
            return false;
        }
        match (self.endpoints, other.endpoints) {
            (Some(a), Some(b)) => a == b,
            // Equality of the endpoint sets is only required once both links
            // are installed.
            _ => true,
        }
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LinkKind::NamedParent(name) => write!(f, "NamedParent(\"{name}\")")?,
            kind => write!(f, "{}", kind.name())?,
        }
        match self.endpoints {
            Some((from, to)) => write!(f, "[{from} -> {to}]"),
            None => write!(f, "[unset]"),
        }
    }
}
