//! End-to-end path discovery scenarios on minimal topologies.

use std::sync::Arc;

use crate::config::{PathFinderConfig, PathLimits};
use crate::error::GraphError;
use crate::graph::{FilterResult, Link, LinkFilterFn, Path};
use crate::pathfinder::{find_paths, Counter, PathFinder};

use super::{composite_node, module_node, test_store};

fn counter<'a>(counters: &'a [Counter], name: &str) -> &'a Counter {
    counters
        .iter()
        .find(|c| c.name == name)
        .unwrap_or_else(|| panic!("counter {name} missing"))
}

#[test]
fn test_single_direct_link() {
    let (mut store, electrical, _) = test_store();
    let (a, a_mc) = module_node(&mut store, electrical);
    let (b, b_mc) = module_node(&mut store, electrical);
    store.connect(a_mc, b_mc).expect("connect");

    let (paths, counters) = find_paths(&store, a, &[b]).expect("find");
    assert_eq!(paths.len(), 1, "exactly one path");
    let expected = Path::new(vec![
        store.self_interface(a),
        a_mc,
        b_mc,
        store.self_interface(b),
    ]);
    assert_eq!(paths[0], expected);

    assert!(counter(&counters, "total").in_cnt > 0);
    assert_eq!(counter(&counters, "incomplete").out_cnt, 1);
    assert!(
        counters.iter().all(|c| !c.hide),
        "hidden counters are omitted"
    );
}

#[test]
fn test_returned_paths_connect_source_to_destination() {
    let (mut store, electrical, _) = test_store();
    let (a, a_mc) = module_node(&mut store, electrical);
    let (b, b_mc) = module_node(&mut store, electrical);
    let (c, c_mc) = module_node(&mut store, electrical);
    store.connect(a_mc, b_mc).expect("connect");
    store.connect(b_mc, c_mc).expect("connect");

    let (paths, _) = find_paths(&store, a, &[b, c]).expect("find");
    assert_eq!(paths.len(), 2, "one path per destination");
    for path in &paths {
        assert_eq!(path.first(), Some(store.self_interface(a)));
        let last = path.last().expect("non-empty");
        assert!(
            last == store.self_interface(b) || last == store.self_interface(c),
            "paths end at destination self interfaces"
        );
    }
}

#[test]
fn test_hierarchy_down_up() {
    let (mut store, electrical, pair) = test_store();
    // Parent with two named children; the children are wired directly.
    let (_parent, children) = composite_node(
        &mut store,
        pair,
        electrical,
        &["c1", "c2"],
    );
    let (c1, c1_mc) = children[0];
    let (c2, c2_mc) = children[1];
    store.connect(c1_mc, c2_mc).expect("connect");

    let (paths, counters) = find_paths(&store, c1, &[c2]).expect("find");
    assert_eq!(paths.len(), 1, "only the direct connection survives");
    assert_eq!(
        paths[0],
        Path::new(vec![
            store.self_interface(c1),
            c1_mc,
            c2_mc,
            store.self_interface(c2),
        ])
    );
    // The child -> parent -> child escape was cut by the dead-end filter.
    let dead_end = counter(&counters, "dead end split");
    assert!(dead_end.in_cnt > dead_end.out_cnt, "the filter rejected paths");
}

#[test]
fn test_split_join_of_two() {
    let (mut store, electrical, pair) = test_store();
    let (x, x_children) = composite_node(&mut store, pair, electrical, &["p", "n"]);
    let (z, z_children) = composite_node(&mut store, pair, electrical, &["p", "n"]);
    store
        .connect(x_children[0].1, z_children[0].1)
        .expect("wire p");
    store
        .connect(x_children[1].1, z_children[1].1)
        .expect("wire n");

    let (paths, counters) = find_paths(&store, x, &[z]).expect("find");
    assert_eq!(paths.len(), 2, "one path per split branch");
    for path in &paths {
        assert_eq!(path.first(), Some(store.self_interface(x)));
        assert_eq!(path.last(), Some(store.self_interface(z)));
    }

    // Completion promoted weak branches back to full confidence.
    let split_branch = counter(&counters, "valid split branch");
    assert!(
        split_branch.out_stronger >= 1,
        "at least one path was strengthened in the split handler"
    );
}

#[test]
fn test_split_not_joined() {
    let (mut store, electrical, pair) = test_store();
    let (x, x_children) = composite_node(&mut store, pair, electrical, &["p", "n"]);
    let (z, z_children) = composite_node(&mut store, pair, electrical, &["p", "n"]);
    // Only the p branch is wired.
    store
        .connect(x_children[0].1, z_children[0].1)
        .expect("wire p");

    let (paths, counters) = find_paths(&store, x, &[z]).expect("find");
    assert!(paths.is_empty(), "incomplete splits yield no paths");
    let incomplete = counter(&counters, "incomplete");
    assert!(incomplete.in_cnt > incomplete.out_cnt, "paths were dropped");
}

#[test]
fn test_conditional_link_blocks_discovery() {
    let (mut store, electrical, _) = test_store();
    let (m, m_mc) = module_node(&mut store, electrical);
    let (n, n_mc) = module_node(&mut store, electrical);

    // Passes the install-time pair check, rejects every longer path.
    let filter: LinkFilterFn = Arc::new(|_, path: &Path| {
        if path.len() <= 2 {
            FilterResult::Pass
        } else {
            FilterResult::FailRecoverable
        }
    });
    store
        .connect_with(m_mc, n_mc, Link::direct_conditional(filter, false))
        .expect("install");

    let (paths, counters) = find_paths(&store, m, &[n]).expect("find");
    assert!(paths.is_empty(), "the conditional link cut the only route");
    let conditional = counter(&counters, "conditional link");
    assert!(conditional.in_cnt > conditional.out_cnt);
}

#[test]
fn test_conditional_only_first_in_path_limits_evaluation() {
    let (mut store, electrical, _) = test_store();
    let (m, m_mc) = module_node(&mut store, electrical);
    let (n, n_mc) = module_node(&mut store, electrical);

    // Rejects any candidate longer than the step it guards. Evaluated on
    // every extension this kills the route; evaluated only while its edge
    // is the path head it lets the full path through.
    let filter = |_: &_, path: &Path| {
        if path.len() <= 3 {
            FilterResult::Pass
        } else {
            FilterResult::FailRecoverable
        }
    };

    let strict: LinkFilterFn = Arc::new(filter);
    store
        .connect_with(m_mc, n_mc, Link::direct_conditional(strict, false))
        .expect("install");
    let (paths, _) = find_paths(&store, m, &[n]).expect("find");
    assert!(paths.is_empty(), "whole-path evaluation rejects");

    // Same topology, scoped evaluation.
    let (mut store, electrical, _) = test_store();
    let (m, m_mc) = module_node(&mut store, electrical);
    let (n, n_mc) = module_node(&mut store, electrical);
    let scoped: LinkFilterFn = Arc::new(filter);
    store
        .connect_with(m_mc, n_mc, Link::direct_conditional(scoped, true))
        .expect("install");
    let (paths, _) = find_paths(&store, m, &[n]).expect("find");
    assert_eq!(paths.len(), 1, "scoped evaluation lets the path finish");
}

#[test]
fn test_find_paths_rejects_non_module_interface_endpoints() {
    let (mut store, electrical, _) = test_store();
    let plain = store.register_type("Resistor", &[]).expect("register");
    let (good, _) = module_node(&mut store, electrical);
    let (bad, _) = module_node(&mut store, plain);
    let untyped = store.add_node();

    let err = find_paths(&store, bad, &[good]).expect_err("bad source");
    assert!(matches!(err, GraphError::InvalidSource { node } if node == bad));

    let err = find_paths(&store, good, &[bad]).expect_err("bad destination");
    assert!(matches!(err, GraphError::InvalidDestination { node } if node == bad));

    let err = find_paths(&store, untyped, &[good]).expect_err("untyped source");
    assert!(matches!(err, GraphError::InvalidSource { .. }));
}

#[test]
fn test_absolute_limit_stops_the_search() {
    let (mut store, electrical, _) = test_store();
    let (a, a_mc) = module_node(&mut store, electrical);
    let (b, b_mc) = module_node(&mut store, electrical);
    store.connect(a_mc, b_mc).expect("connect");

    let config = PathFinderConfig::default().limits(
        PathLimits::default().absolute(1).no_new_weak(1).no_weak(1),
    );
    let (paths, _) = PathFinder::with_config(&store, config)
        .find_paths(a, &[b])
        .expect("find");
    assert!(paths.is_empty(), "search stopped before reaching b");
}

#[test]
fn test_misordered_limits_are_rejected() {
    let (mut store, electrical, _) = test_store();
    let (a, _) = module_node(&mut store, electrical);

    let config = PathFinderConfig::default()
        .limits(PathLimits::default().no_new_weak(100).no_weak(10));
    let err = PathFinder::with_config(&store, config)
        .find_paths(a, &[a])
        .expect_err("invalid config");
    assert!(matches!(err, GraphError::InvalidConfig(_)));
}

#[test]
fn test_individual_measurement_times_filters() {
    let (mut store, electrical, _) = test_store();
    let (a, a_mc) = module_node(&mut store, electrical);
    let (b, b_mc) = module_node(&mut store, electrical);
    store.connect(a_mc, b_mc).expect("connect");

    let config = PathFinderConfig::default().individual_measurement(true);
    let (_, counters) = PathFinder::with_config(&store, config)
        .find_paths(a, &[b])
        .expect("find");
    let node_type = counter(&counters, "node type");
    assert!(node_type.in_cnt > 0);
    // Total is measured regardless of the switch.
    assert!(counter(&counters, "total").in_cnt >= node_type.in_cnt);
}

#[test]
fn test_counters_report_pipeline_order() {
    let (mut store, electrical, _) = test_store();
    let (a, a_mc) = module_node(&mut store, electrical);
    let (b, b_mc) = module_node(&mut store, electrical);
    store.connect(a_mc, b_mc).expect("connect");

    let (_, counters) = find_paths(&store, a, &[b]).expect("find");
    let names: Vec<&str> = counters.iter().map(|c| c.name).collect();
    assert_eq!(
        names,
        vec![
            "node type",
            "interface type",
            "dead end split",
            "conditional link",
            "build stack",
            "end at self",
            "same end type",
            "stack",
            "valid split branch",
            "total",
            "incomplete",
        ]
    );

    // Earlier filters see at least as many paths as later ones.
    let node_type = counter(&counters, "node type");
    let stack = counter(&counters, "stack");
    assert!(node_type.in_cnt >= stack.in_cnt);
}
