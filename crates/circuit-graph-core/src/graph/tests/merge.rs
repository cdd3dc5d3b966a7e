//! Graph merge semantics and lifecycle.

use crate::error::GraphError;
use crate::graph::{GraphStore, InterfaceKind};

use super::{module_node, typed_store};

#[test]
fn test_every_interface_starts_in_a_singleton_graph() {
    let mut store = GraphStore::new();
    let a = store.add_interface(InterfaceKind::ModuleConnection);
    let b = store.add_interface(InterfaceKind::ModuleConnection);
    assert_ne!(store.graph_of(a), store.graph_of(b));
    assert_eq!(store.node_count(store.graph_of(a)).expect("count"), 1);
    assert_eq!(store.v_index(a), 0);
    assert_eq!(store.v_index(b), 0);
}

#[test]
fn test_connect_merges_and_preserves_counts() {
    let (mut store, tag) = typed_store();
    let (a, a_mc) = module_node(&mut store, tag);
    let (b, b_mc) = module_node(&mut store, tag);

    let graph_a = store.node_graph(a);
    let graph_b = store.node_graph(b);
    assert_ne!(graph_a, graph_b);
    let nodes_a = store.node_count(graph_a).expect("count");
    let nodes_b = store.node_count(graph_b).expect("count");
    let edges_a = store.edge_count(graph_a).expect("count");
    let edges_b = store.edge_count(graph_b).expect("count");

    store.connect(a_mc, b_mc).expect("connect");

    let merged = store.graph_of(a_mc);
    assert_eq!(store.graph_of(b_mc), merged);
    assert_eq!(
        store.node_count(merged).expect("count"),
        nodes_a + nodes_b,
        "interface count is preserved"
    );
    assert_eq!(
        store.edge_count(merged).expect("count"),
        edges_a + edges_b + 1,
        "edges preserved plus the new one"
    );
}

#[test]
fn test_merge_shifts_v_indices_densely() {
    let (mut store, tag) = typed_store();
    let (a, a_mc) = module_node(&mut store, tag);
    let (b, b_mc) = module_node(&mut store, tag);
    store.connect(a_mc, b_mc).expect("connect");

    let merged = store.graph_of(a_mc);
    let interfaces = store.graph_interfaces(merged).expect("interfaces").to_vec();
    for (position, interface) in interfaces.iter().enumerate() {
        assert_eq!(
            store.v_index(*interface),
            position,
            "v_index matches vector position after merge"
        );
    }
    let _ = (a, b);
}

#[test]
fn test_drained_graph_is_invalidated() {
    let mut store = GraphStore::new();
    let a = store.add_interface(InterfaceKind::ModuleConnection);
    let b = store.add_interface(InterfaceKind::ModuleConnection);
    let graph_a = store.graph_of(a);
    let graph_b = store.graph_of(b);

    store.connect(a, b).expect("connect");

    let survivor = store.graph_of(a);
    let drained = if survivor == graph_a { graph_b } else { graph_a };
    let err = store.node_count(drained).expect_err("drained graph unusable");
    assert!(matches!(err, GraphError::GraphInvalidated));
    let err = store.merge_graphs(drained, survivor).expect_err("no remerge");
    assert!(matches!(err, GraphError::GraphInvalidated));
}

#[test]
fn test_larger_graph_wins_the_merge() {
    let (mut store, tag) = typed_store();
    // A node's graph holds three interfaces plus an attached connection;
    // the lone interface's singleton graph is drained into it.
    let (_a, a_mc) = module_node(&mut store, tag);
    let lone = store.add_interface(InterfaceKind::ModuleConnection);
    let node_graph = store.graph_of(a_mc);

    store.connect(a_mc, lone).expect("connect");
    assert_eq!(store.graph_of(lone), node_graph, "sink is the larger graph");
    assert_eq!(store.v_index(lone), 4, "appended after the node's interfaces");
}

#[test]
fn test_adjacency_stays_consistent_across_merges() {
    let (mut store, tag) = typed_store();
    let (_a, a_mc) = module_node(&mut store, tag);
    let (_b, b_mc) = module_node(&mut store, tag);
    let (_c, c_mc) = module_node(&mut store, tag);
    store.connect(a_mc, b_mc).expect("connect");
    store.connect(b_mc, c_mc).expect("connect");

    let graph = store.graph_of(a_mc);
    for (from, to, link) in store.all_edges(graph).expect("edges") {
        let forward = store.is_connected_to(from, to).expect("forward cached");
        let backward = store.is_connected_to(to, from).expect("backward cached");
        assert!(std::sync::Arc::ptr_eq(&forward, &backward));
        assert!(std::sync::Arc::ptr_eq(&forward, &link));
        assert!(store.neighbors(from).contains(&to));
        assert!(store.neighbors(to).contains(&from));
    }
}
