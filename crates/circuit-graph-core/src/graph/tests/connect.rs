//! Connection, link installation, and adjacency invariants.

use std::sync::Arc;

use crate::error::GraphError;
use crate::graph::{FilterResult, GraphStore, InterfaceKind, Link, LinkFilterFn, LinkKind, Path};

use super::{module_node, typed_store};

#[test]
fn test_connect_is_symmetric() {
    let mut store = GraphStore::new();
    let a = store.add_interface(InterfaceKind::ModuleConnection);
    let b = store.add_interface(InterfaceKind::ModuleConnection);
    let link = store.connect(a, b).expect("connect");

    let ab = store.is_connected_to(a, b).expect("a sees b");
    let ba = store.is_connected_to(b, a).expect("b sees a");
    assert!(Arc::ptr_eq(&ab, &ba), "both directions share one link");
    assert!(Arc::ptr_eq(&ab, &link));
    assert!(store.neighbors(a).contains(&b));
    assert!(store.neighbors(b).contains(&a));
}

#[test]
fn test_connect_twice_fails_with_both_links() {
    let mut store = GraphStore::new();
    let a = store.add_interface(InterfaceKind::ModuleConnection);
    let b = store.add_interface(InterfaceKind::ModuleConnection);
    let first = store.connect(a, b).expect("first connect");

    let err = store.connect(a, b).expect_err("duplicate must fail");
    match err {
        GraphError::LinkExists { existing, new } => {
            assert!(Arc::ptr_eq(&existing, &first));
            assert_eq!(*new.kind(), LinkKind::Direct);
        }
        other => panic!("expected LinkExists, got {other:?}"),
    }
}

#[test]
fn test_connect_with_rejects_set_up_link() {
    let mut store = GraphStore::new();
    let a = store.add_interface(InterfaceKind::ModuleConnection);
    let b = store.add_interface(InterfaceKind::ModuleConnection);
    let c = store.add_interface(InterfaceKind::ModuleConnection);

    let mut link = Link::direct();
    link.set_connections(&store, a, b).expect("set up");
    let err = store.connect_with(b, c, link).expect_err("reuse must fail");
    assert!(matches!(err, GraphError::LinkAlreadySetUp { .. }));
}

#[test]
fn test_connect_many_clones_per_target() {
    let mut store = GraphStore::new();
    let hub = store.add_interface(InterfaceKind::ModuleConnection);
    let spokes = [
        store.add_interface(InterfaceKind::ModuleConnection),
        store.add_interface(InterfaceKind::ModuleConnection),
        store.add_interface(InterfaceKind::ModuleConnection),
    ];
    let installed = store
        .connect_many(hub, &spokes, &Link::direct())
        .expect("connect many");
    assert_eq!(installed.len(), 3);
    for spoke in spokes {
        assert!(store.is_connected_to(hub, spoke).is_some());
    }
}

#[test]
fn test_connect_many_rejects_non_cloneable() {
    let mut store = GraphStore::new();
    let node = store.add_node();
    let hub = store.self_interface(node);
    let other = store.add_interface(InterfaceKind::ModuleConnection);

    let err = store
        .connect_many(hub, &[other], &Link::pointer())
        .expect_err("pointer is not cloneable");
    assert!(matches!(err, GraphError::NotCloneable { kind: "Pointer" }));
}

#[test]
fn test_remove_edge_is_symmetric_and_idempotent() {
    let mut store = GraphStore::new();
    let a = store.add_interface(InterfaceKind::ModuleConnection);
    let b = store.add_interface(InterfaceKind::ModuleConnection);
    let link = store.connect(a, b).expect("connect");
    let graph = store.graph_of(a);
    assert_eq!(store.edge_count(graph).expect("count"), 1);

    store.remove_edge(&link).expect("remove");
    assert!(store.is_connected_to(a, b).is_none());
    assert!(store.is_connected_to(b, a).is_none());
    assert!(!store.neighbors(a).contains(&b));
    assert_eq!(store.edge_count(graph).expect("count"), 0);

    // Removing an absent edge is a no-op.
    store.remove_edge(&link).expect("second remove is a no-op");
}

#[test]
fn test_remove_edge_rejects_mismatched_link() {
    let mut store = GraphStore::new();
    let a = store.add_interface(InterfaceKind::ModuleConnection);
    let b = store.add_interface(InterfaceKind::ModuleConnection);
    store.connect(a, b).expect("connect");

    // Same endpoints, different kind: the cached link is a plain direct.
    let accept: LinkFilterFn = Arc::new(|_, _| FilterResult::Pass);
    let mut imposter = Link::direct_conditional(accept, false);
    imposter.set_connections(&store, a, b).expect("set up");

    let err = store.remove_edge(&imposter).expect_err("mismatch");
    assert!(matches!(err, GraphError::LinkMismatch { .. }));
    assert!(store.is_connected_to(a, b).is_some(), "edge survives");
}

#[test]
fn test_conditional_link_runs_filter_at_install() {
    let mut store = GraphStore::new();
    let a = store.add_interface(InterfaceKind::ModuleConnection);
    let b = store.add_interface(InterfaceKind::ModuleConnection);

    let reject: LinkFilterFn = Arc::new(|_, _| FilterResult::FailRecoverable);
    let err = store
        .connect_with(a, b, Link::direct_conditional(reject, false))
        .expect_err("filter rejects install");
    assert!(matches!(err, GraphError::LinkFiltered { .. }));
    assert!(store.is_connected_to(a, b).is_none(), "nothing installed");

    let accept: LinkFilterFn = Arc::new(|_, _| FilterResult::Pass);
    store
        .connect_with(a, b, Link::direct_conditional(accept, false))
        .expect("passing filter installs");
}

#[test]
fn test_conditional_install_filter_sees_endpoint_pair() {
    let mut store = GraphStore::new();
    let a = store.add_interface(InterfaceKind::ModuleConnection);
    let b = store.add_interface(InterfaceKind::ModuleConnection);

    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let seen_in_filter = seen.clone();
    let filter: LinkFilterFn = Arc::new(move |_, path: &Path| {
        if let Ok(mut guard) = seen_in_filter.lock() {
            guard.push(path.len());
        }
        FilterResult::Pass
    });
    store
        .connect_with(a, b, Link::direct_conditional(filter, false))
        .expect("install");
    let lens = seen.lock().expect("lock");
    assert_eq!(&*lens, &[2], "install-time candidate is the endpoint pair");
}

#[test]
fn test_connected_nodes_filters_by_link_and_type() {
    let (mut store, electrical) = typed_store();
    let (_a, a_mc) = module_node(&mut store, electrical);
    let (b, b_mc) = module_node(&mut store, electrical);
    let (c, c_mc) = module_node(&mut store, electrical);

    store.connect(a_mc, b_mc).expect("connect b");
    // A conditional link is not a plain direct link.
    let accept: LinkFilterFn = Arc::new(|_, _| FilterResult::Pass);
    store
        .connect_with(a_mc, c_mc, Link::direct_conditional(accept, false))
        .expect("connect c");

    let nodes = store.connected_nodes(a_mc, &[electrical]);
    assert!(nodes.contains(&b));
    assert!(!nodes.contains(&c), "conditional link is excluded");

    let unrelated = store.register_type("Unrelated", &[]).expect("register");
    assert!(store.connected_nodes(a_mc, &[unrelated]).is_empty());
}

#[test]
fn test_path_get_link_matches_graph_cache() {
    let mut store = GraphStore::new();
    let a = store.add_interface(InterfaceKind::ModuleConnection);
    let b = store.add_interface(InterfaceKind::ModuleConnection);
    let c = store.add_interface(InterfaceKind::ModuleConnection);
    let ab = store.connect(a, b).expect("connect");
    let bc = store.connect(b, c).expect("connect");

    let path = Path::new(vec![a, b, c]);
    let edges: Vec<_> = path.edges().collect();
    assert_eq!(edges.len(), path.len() - 1);
    let first = path.get_link(&store, edges[0]).expect("link present");
    let second = path.get_link(&store, edges[1]).expect("link present");
    assert!(Arc::ptr_eq(&first, &ab));
    assert!(Arc::ptr_eq(&second, &bc));
}

#[test]
fn test_bfs_visit_predicate_gates_extension() {
    let mut store = GraphStore::new();
    let a = store.add_interface(InterfaceKind::ModuleConnection);
    let b = store.add_interface(InterfaceKind::ModuleConnection);
    let c = store.add_interface(InterfaceKind::ModuleConnection);
    store.connect(a, b).expect("connect");
    store.connect(b, c).expect("connect");

    // Unrestricted: everything reachable is visited.
    let all = store.bfs_visit(|_, _| true, &[a]);
    assert_eq!(all.len(), 3);

    // Refuse to step onto b: only the start remains.
    let gated = store.bfs_visit(
        |path, _| path.last() != Some(&b),
        &[a],
    );
    assert_eq!(gated.len(), 1);
    assert!(gated.contains(&a));
}

#[test]
fn test_reference_binding() {
    let mut store = GraphStore::new();
    let target = store.add_node();
    let reference = store.add_interface(InterfaceKind::Reference);

    let err = store
        .referenced_interface(reference)
        .expect_err("unbound reference");
    assert!(matches!(err, GraphError::ReferenceUnbound { .. }));

    let target_self = store.self_interface(target);
    store
        .bind_reference(reference, target_self)
        .expect("bind");
    assert_eq!(
        store.referenced_interface(reference).expect("bound"),
        target_self
    );
    assert_eq!(store.referenced_node(reference).expect("bound"), target);
}

#[test]
fn test_pointer_link_requires_self_endpoint() {
    let mut store = GraphStore::new();
    let a = store.add_interface(InterfaceKind::ModuleConnection);
    let b = store.add_interface(InterfaceKind::ModuleConnection);
    let err = store
        .connect_with(a, b, Link::pointer())
        .expect_err("no self endpoint");
    assert!(matches!(err, GraphError::PointerToNonSelf { .. }));
}

#[test]
fn test_derived_link_conjoins_captured_filters() {
    let mut store = GraphStore::new();
    let a = store.add_interface(InterfaceKind::ModuleConnection);
    let b = store.add_interface(InterfaceKind::ModuleConnection);
    let c = store.add_interface(InterfaceKind::ModuleConnection);

    let recoverable: LinkFilterFn = Arc::new(|_, path: &Path| {
        // Reject once the candidate grows past the witness pair.
        if path.len() > 2 {
            FilterResult::FailRecoverable
        } else {
            FilterResult::Pass
        }
    });
    store
        .connect_with(a, b, Link::direct_conditional(recoverable, false))
        .expect("conditional install");
    store.connect(b, c).expect("direct install");

    let witness = Path::new(vec![a, b, c]);
    let derived = Link::direct_derived(&store, &witness);
    let filter = derived.conditional_filter().expect("has filter");
    assert_eq!(filter.run(&store, &Path::new(vec![a, b])), FilterResult::Pass);
    assert_eq!(
        filter.run(&store, &Path::new(vec![a, b, c])),
        FilterResult::FailRecoverable
    );
}
