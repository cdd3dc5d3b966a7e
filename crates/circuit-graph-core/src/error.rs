//! Error types for graph and path-finding operations.
//!
//! One crate-level error enum; every fallible operation returns
//! [`GraphResult`] and propagates with `?`. Path-finding filters never use
//! errors for ordinary rejections, those are conveyed through path flags.

use std::sync::Arc;

use thiserror::Error;

use crate::graph::{InterfaceId, Link, NodeId};

/// Result type alias for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Error type for all graph and path-finding operations.
///
/// Each variant names the originating operation's failure and carries the
/// context needed to recover or report.
#[derive(Error, Debug)]
pub enum GraphError {
    // ========== Link installation ==========
    /// An edge already exists between the two endpoints.
    ///
    /// Carries both the cached link and the rejected one; recoverable by the
    /// caller (e.g. by keeping the existing link).
    #[error("edge already exists: kept {existing}, rejected {new}")]
    LinkExists {
        existing: Arc<Link>,
        new: Box<Link>,
    },

    /// A conditional link's filter rejected its endpoints at install time.
    #[error("conditional link rejected its endpoints on setup: {link}")]
    LinkFiltered { link: Box<Link> },

    /// A parent link's endpoints do not have complementary parent/child sides.
    #[error("parent link endpoints are not a (parent, child) pair: {from} -> {to}")]
    InvalidParentChild { from: InterfaceId, to: InterfaceId },

    /// A pointer link must have a self interface on one end.
    #[error("pointer link has no self interface endpoint: {from} -> {to}")]
    PointerToNonSelf { from: InterfaceId, to: InterfaceId },

    /// A link's endpoints were queried before installation.
    #[error("link is not set up: {link}")]
    LinkNotSetUp { link: Box<Link> },

    /// A caller-supplied link was already installed elsewhere.
    #[error("link is already set up: {link}")]
    LinkAlreadySetUp { link: Box<Link> },

    /// `remove_edge` found a cached link that differs from the supplied one.
    #[error("cached link differs from supplied link: cached {cached}, supplied {supplied}")]
    LinkMismatch {
        cached: Arc<Link>,
        supplied: Box<Link>,
    },

    /// `connect_many` was given a link that does not support cloning.
    #[error("link kind {kind} is not cloneable")]
    NotCloneable { kind: &'static str },

    // ========== Node structure ==========
    /// A required parent does not exist.
    #[error("node {node} has no parent")]
    NodeNoParent { node: NodeId },

    /// A reference interface was used before it points at a self interface.
    #[error("reference interface {interface} is not bound")]
    ReferenceUnbound { interface: InterfaceId },

    /// An interface has no owning node where one is required.
    #[error("interface {interface} has no owning node")]
    NoOwningNode { interface: InterfaceId },

    // ========== Type registry ==========
    /// A supertype tag was not registered.
    #[error("unknown type tag: {tag}")]
    UnknownType { tag: u32 },

    /// A node's type was assigned twice.
    #[error("node {node} already has an assigned type")]
    TypeAlreadyAssigned { node: NodeId },

    /// A node's type was queried before assignment.
    #[error("node {node} has no assigned type")]
    TypeNotAssigned { node: NodeId },

    // ========== Path finding ==========
    /// `find_paths` source is not a module interface.
    #[error("path source {node} is not a module interface")]
    InvalidSource { node: NodeId },

    /// `find_paths` destination is not a module interface.
    #[error("path destination {node} is not a module interface")]
    InvalidDestination { node: NodeId },

    // ========== Graph lifecycle ==========
    /// A graph was used after being merged into another.
    #[error("graph was invalidated by a merge and must not be reused")]
    GraphInvalidated,

    // ========== Configuration ==========
    /// Invalid configuration parameter.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

// Compile-time verification that GraphError is thread-safe
static_assertions::assert_impl_all!(GraphError: Send, Sync, std::error::Error);
