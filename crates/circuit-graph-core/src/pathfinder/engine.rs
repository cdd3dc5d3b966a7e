//! The path finder: an ordered filter pipeline over the BFS.
//!
//! Discovery filters gate path extension (failing one marks the path
//! filtered); validity filters only gate output. Split handling lives in
//! the pipeline: a downward step into a multi-child parent weakens the
//! path and parks it until sibling branches complete, at which point the
//! covered paths are promoted back to full confidence.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use crate::config::PathFinderConfig;
use crate::error::{GraphError, GraphResult};
use crate::graph::{Edge, FilterResult, GraphStore, InterfaceId, InterfaceKind, NodeId, Path};

use super::bfs::{self, BfsPath};
use super::counter::Counter;
use super::split::{PathStackElement, SplitState, UnresolvedStackElement};

type FilterFn<'a> = fn(&mut PathFinder<'a>, &BfsPath) -> bool;

struct Filter<'a> {
    func: FilterFn<'a>,
    /// Discovery filters halt extension on failure; validity filters only
    /// reject the path for output.
    discovery: bool,
    counter: Counter,
}

/// Discovers valid connection paths between module interfaces.
///
/// One instance drives one `find_paths` call; the split map and counters
/// are exclusive to the call.
pub struct PathFinder<'a> {
    store: &'a GraphStore,
    config: PathFinderConfig,
    path_cnt: u64,
    /// Split states per split point, keyed by the path prefix up to and
    /// including the split's parent interface.
    split: HashMap<InterfaceId, HashMap<Path, SplitState>>,
    filters: Vec<Filter<'a>>,
}

/// Discover paths from `src` to the destinations; see
/// [`PathFinder::find_paths`].
pub fn find_paths(
    store: &GraphStore,
    src: NodeId,
    dsts: &[NodeId],
) -> GraphResult<(Vec<Path>, Vec<Counter>)> {
    PathFinder::new(store).find_paths(src, dsts)
}

impl<'a> PathFinder<'a> {
    #[must_use]
    pub fn new(store: &'a GraphStore) -> Self {
        Self::with_config(store, PathFinderConfig::default())
    }

    #[must_use]
    pub fn with_config(store: &'a GraphStore, config: PathFinderConfig) -> Self {
        Self {
            store,
            config,
            path_cnt: 0,
            split: HashMap::new(),
            filters: vec![
                Filter {
                    func: Self::filter_count,
                    discovery: true,
                    counter: Counter::hidden(),
                },
                Filter {
                    func: Self::filter_node_type,
                    discovery: true,
                    counter: Counter::named("node type"),
                },
                Filter {
                    func: Self::filter_interface_type,
                    discovery: true,
                    counter: Counter::named("interface type"),
                },
                Filter {
                    func: Self::filter_dead_end_split,
                    discovery: true,
                    counter: Counter::named("dead end split"),
                },
                Filter {
                    func: Self::filter_conditional_link,
                    discovery: true,
                    counter: Counter::named("conditional link"),
                },
                Filter {
                    func: Self::filter_build_stack,
                    discovery: true,
                    counter: Counter::named("build stack"),
                },
                Filter {
                    func: Self::filter_end_at_self,
                    discovery: false,
                    counter: Counter::named("end at self"),
                },
                Filter {
                    func: Self::filter_same_end_type,
                    discovery: false,
                    counter: Counter::named("same end type"),
                },
                Filter {
                    func: Self::filter_stack,
                    discovery: false,
                    counter: Counter::named("stack"),
                },
                Filter {
                    func: Self::filter_valid_split_branch,
                    discovery: false,
                    counter: Counter::named("valid split branch"),
                },
            ],
        }
    }

    /// Discover all complete paths from `src` to the destinations.
    ///
    /// Both `src` and every destination must be module interfaces; the
    /// search runs from `src`'s self interface and stops early once every
    /// destination was reached by a complete path. Returns the complete
    /// paths and the per-filter counters.
    pub fn find_paths(
        &mut self,
        src: NodeId,
        dsts: &[NodeId],
    ) -> GraphResult<(Vec<Path>, Vec<Counter>)> {
        self.config.validate()?;
        let store = self.store;

        if !Self::is_module_interface(store, src) {
            return Err(GraphError::InvalidSource { node: src });
        }
        let mut remaining: HashSet<NodeId> = HashSet::new();
        for &dst in dsts {
            if !Self::is_module_interface(store, dst) {
                return Err(GraphError::InvalidDestination { node: dst });
            }
            remaining.insert(dst);
        }

        let start = store.self_interface(src);
        let search_started = Instant::now();
        let mut valid_paths: Vec<BfsPath> = Vec::new();
        let mut total = Counter::total("total");

        {
            let this = &mut *self;
            let valid_paths = &mut valid_paths;
            let total = &mut total;
            let remaining = &mut remaining;
            bfs::bfs_visit(store, start, move |p| {
                let confidence_in = p.confidence();
                total.record_in(confidence_in);
                let t0 = Instant::now();
                let res = this.run_filters(p);
                total.time_spent += t0.elapsed();
                if !res {
                    return;
                }
                total.record_out(confidence_in, p.confidence());

                // The seed path is not a connection.
                if p.path().len() < 2 {
                    return;
                }
                valid_paths.push(p.clone());

                if p.data().not_complete {
                    return;
                }
                // Destination shortcut: a complete path reached a requested
                // destination.
                if let Some(node) = store.interface_node(p.last()) {
                    if remaining.remove(&node) && remaining.is_empty() {
                        log::debug!("all destinations reached, stopping search");
                        p.set_stop(true);
                    }
                }
            })?;
        }
        log::debug!(
            "path search visited {} paths in {:?}, {} valid",
            self.path_cnt,
            search_started.elapsed(),
            valid_paths.len()
        );

        // Final pass: drop paths still waiting on sibling branches.
        let mut incomplete = Counter::named("incomplete");
        let mut complete_paths = Vec::new();
        for p in &valid_paths {
            let confidence = p.confidence();
            incomplete.record_in(confidence);
            if p.data().not_complete {
                continue;
            }
            incomplete.record_out(confidence, confidence);
            complete_paths.push(p.path().clone());
        }

        let mut counters: Vec<Counter> = self
            .filters
            .iter()
            .map(|f| f.counter.clone())
            .filter(|c| !c.hide)
            .collect();
        counters.push(total);
        counters.push(incomplete);

        Ok((complete_paths, counters))
    }

    fn is_module_interface(store: &GraphStore, node: NodeId) -> bool {
        store
            .node_type(node)
            .map(|tag| store.types().is_moduleinterface(tag))
            .unwrap_or(false)
    }

    /// Run the pipeline on one path; short-circuits on the first failure.
    fn run_filters(&mut self, p: &BfsPath) -> bool {
        for idx in 0..self.filters.len() {
            let func = self.filters[idx].func;
            let discovery = self.filters[idx].discovery;
            let confidence_in = p.confidence();
            self.filters[idx].counter.record_in(confidence_in);
            let timer = self.config.individual_measurement.then(Instant::now);
            let res = func(self, p);
            if let Some(t0) = timer {
                self.filters[idx].counter.time_spent += t0.elapsed();
            }
            if !res {
                if discovery {
                    p.set_filtered(true);
                }
                return false;
            }
            self.filters[idx].counter.record_out(confidence_in, p.confidence());
        }
        true
    }

    /// Parent-side interfaces of the split point's module-interface
    /// children.
    fn split_children(&self, split_point: InterfaceId) -> Vec<InterfaceId> {
        let Some(node) = self.store.interface_node(split_point) else {
            return Vec::new();
        };
        let module_interface = self.store.types().module_interface_tag();
        self.store
            .children(node, true, Some(&[module_interface]), false, None, false)
            .into_iter()
            .map(|child| self.store.parent_interface(child))
            .collect()
    }

    // ========== Discovery filters ==========

    fn filter_count(&mut self, p: &BfsPath) -> bool {
        self.path_cnt += 1;
        if self.path_cnt % 50_000 == 0 {
            log::debug!("visited {} paths", self.path_cnt);
        }
        if self.path_cnt > self.config.limits.absolute {
            p.set_stop(true);
        }
        true
    }

    fn filter_node_type(&mut self, p: &BfsPath) -> bool {
        Self::is_module_interface_interface(self.store, p.last())
    }

    fn is_module_interface_interface(store: &GraphStore, interface: InterfaceId) -> bool {
        store
            .interface_node(interface)
            .map(|node| Self::is_module_interface(store, node))
            .unwrap_or(false)
    }

    fn filter_interface_type(&mut self, p: &BfsPath) -> bool {
        matches!(
            self.store.interface_kind(p.last()),
            InterfaceKind::NodeSelf
                | InterfaceKind::Hierarchical { .. }
                | InterfaceKind::ModuleConnection
        )
    }

    /// A `child -> parent -> child` hierarchy hop is a dead end: the path
    /// cannot exit a parent this way.
    fn filter_dead_end_split(&mut self, p: &BfsPath) -> bool {
        let Some((one, two, three)) = p.path().last_tri_edge() else {
            return true;
        };
        let kinds = (
            self.store.interface_kind(one),
            self.store.interface_kind(two),
            self.store.interface_kind(three),
        );
        !matches!(
            kinds,
            (
                InterfaceKind::Hierarchical { is_parent: false },
                InterfaceKind::Hierarchical { is_parent: true },
                InterfaceKind::Hierarchical { is_parent: false },
            )
        )
    }

    fn filter_conditional_link(&mut self, p: &BfsPath) -> bool {
        if p.path().last_edge().is_none() {
            return true;
        }
        let last = p.last();
        for edge in p.path().edges() {
            let Some(link) = p.path().get_link(self.store, edge) else {
                continue;
            };
            let Some(filter) = link.conditional_filter() else {
                continue;
            };
            let is_last_edge = edge.to == last;
            if filter.only_first_in_path() && !is_last_edge {
                continue;
            }
            if filter.run(self.store, p.path()) != FilterResult::Pass {
                return false;
            }
        }
        true
    }

    /// Fold the hierarchy stack for the last edge and open/park on splits.
    fn filter_build_stack(&mut self, p: &BfsPath) -> bool {
        let Some(edge) = p.path().last_edge() else {
            return true;
        };
        let Some(elem) = extend_path_hierarchy_stack(self.store, edge) else {
            return true;
        };

        let split_cnt = p.data().split_stack.len();

        // Heuristic: past the budget, weak paths are not extended at all.
        if split_cnt > 0 && self.path_cnt > self.config.limits.no_weak {
            return false;
        }

        let this: &PathFinder<'a> = self;
        let split_cnt_new = p.with_data_mut(|data| {
            this.extend_fold_stack(elem.clone(), data);
            data.split_stack.len()
        });

        let growth = split_cnt_new as i64 - split_cnt as i64;
        if growth != 0 {
            p.scale_confidence(0.5_f64.powi(growth as i32));
        }

        // Heuristic: past the budget, no new weak paths are created.
        if growth > 0 && self.path_cnt > self.config.limits.no_new_weak {
            return false;
        }
        if growth == 0 {
            return true;
        }
        debug_assert!(!elem.up, "splits only open on downward steps");

        p.with_data_mut(|data| data.not_complete = true);

        let split_point = elem.parent_interface;
        let split_prefix = p.path().prefix(p.path().len() - 1);
        let children = self.split_children(split_point);
        log::trace!("split step: {}", p.path().display(self.store));

        let splits = self.split.entry(split_point).or_default();
        if let Some(state) = splits.get_mut(&split_prefix) {
            // A completed split cannot be re-entered under the same prefix:
            // the entering path is visited exactly once per child.
            debug_assert!(!state.complete, "re-entered a completed split");
            if state.complete {
                return false;
            }
            if state.waiting {
                log::trace!("skip hibernate, split is being awaited");
            } else {
                log::trace!("hibernate until a sibling branch completes");
                p.set_hibernated(true);
                state
                    .wait_paths
                    .entry(elem.child_interface)
                    .or_default()
                    .push(p.clone());
            }
            return true;
        }

        log::trace!("new split at {split_point}");
        splits.insert(
            split_prefix.clone(),
            SplitState::new(split_prefix, &children),
        );
        true
    }

    fn extend_fold_stack(&self, elem: PathStackElement, data: &mut super::bfs::PathData) {
        if let Some(top) = data.unresolved_stack.last() {
            if top.elem.matches_inverse(&elem) {
                data.unresolved_stack.pop();
                return;
            }
        }
        let multi_child = self.split_children(elem.parent_interface).len() > 1;
        // A step into a split the path already entered (same parent type
        // and name) does not open a second one.
        let in_same_split = data
            .split_stack
            .iter()
            .any(|e| e.parent_type == elem.parent_type && e.name == elem.name);
        let split = !elem.up && multi_child && !in_same_split;
        data.unresolved_stack.push(UnresolvedStackElement {
            elem: elem.clone(),
            split,
        });
        if split {
            data.split_stack.push(elem);
        }
    }

    // ========== Validity filters ==========

    fn filter_end_at_self(&mut self, p: &BfsPath) -> bool {
        matches!(self.store.interface_kind(p.last()), InterfaceKind::NodeSelf)
    }

    fn filter_same_end_type(&mut self, p: &BfsPath) -> bool {
        let first = p
            .path()
            .first()
            .and_then(|i| self.store.interface_node(i))
            .and_then(|n| self.store.node_type(n).ok());
        let last = self
            .store
            .interface_node(p.last())
            .and_then(|n| self.store.node_type(n).ok());
        match (first, last) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    fn filter_stack(&mut self, p: &BfsPath) -> bool {
        p.data().unresolved_stack.is_empty()
    }

    /// Commit the path into the splits it belongs to; on full coverage mark
    /// the covered paths strong, otherwise wake or wait on the missing
    /// branch.
    fn filter_valid_split_branch(&mut self, p: &BfsPath) -> bool {
        let store = self.store;
        let data = p.data();
        if data.split_stack.is_empty() {
            // Not a multi-branch path.
            return true;
        }
        let p_last = p.last();
        log::trace!("valid split branch: {}", p.path().display(store));

        for split_elem in data.split_stack.iter().rev() {
            let splits_at_point = self.split.entry(split_elem.parent_interface).or_default();
            for split_state in splits_at_point.values_mut() {
                if !p.path().starts_with(&split_state.split_prefix) {
                    continue;
                }
                split_state
                    .suffix_complete_paths
                    .entry(split_elem.child_interface)
                    .or_default()
                    .push(p.clone());
                if split_state.complete {
                    continue;
                }

                // First child branch with no path reaching this merge
                // interface.
                let missing = split_state
                    .suffix_complete_paths
                    .iter()
                    .find(|(_, paths)| !paths.iter().any(|q| q.last() == p_last))
                    .map(|(&child, _)| child);

                if let Some(child) = missing {
                    let wait = split_state.wait_paths.entry(child).or_default();
                    match wait.pop() {
                        Some(sleeper) => {
                            log::trace!("waking parked branch under child {child}");
                            sleeper.set_hibernated(false);
                            p.set_wake_signal(true);
                        }
                        None => {
                            log::trace!("no parked branch under child {child}, waiting");
                            split_state.waiting = true;
                        }
                    }
                    return true;
                }

                // All children covered: the split is complete, parked paths
                // are obsolete.
                split_state.complete = true;
                for wait in split_state.wait_paths.values_mut() {
                    for sleeper in wait.drain(..) {
                        sleeper.set_filtered(true);
                    }
                }
                break;
            }
        }

        // Every split on the stack has a complete branch: promote all
        // suffix-complete paths under the outermost split.
        let Some(front) = data.split_stack.first() else {
            return true;
        };
        if let Some(root_split) = self.split.get_mut(&front.parent_interface) {
            for split_state in root_split.values_mut() {
                if !p.path().starts_with(&split_state.split_prefix) {
                    continue;
                }
                for paths in split_state.suffix_complete_paths.values() {
                    for q in paths {
                        q.with_data_mut(|d| {
                            d.not_complete = false;
                            d.split_stack.clear();
                        });
                        q.set_hibernated(false);
                        q.set_confidence(1.0);
                        q.set_strong_signal(true);
                        p.set_wake_signal(true);
                        log::trace!("marked strong: {}", q.path().display(store));
                    }
                }
            }
        }
        true
    }
}

/// Classify the edge as a hierarchical step, if it is one.
fn extend_path_hierarchy_stack(store: &GraphStore, edge: Edge) -> Option<PathStackElement> {
    let up = store.is_uplink(edge.from, edge.to);
    if !up && !store.is_downlink(edge.from, edge.to) {
        return None;
    }
    let (child_interface, parent_interface) = if up {
        (edge.from, edge.to)
    } else {
        (edge.to, edge.from)
    };
    let (_, name) = store.hierarchy_parent(child_interface)?;
    let parent_type = store
        .node_type(store.interface_node(parent_interface)?)
        .ok()?;
    let child_type = store.node_type(store.interface_node(child_interface)?).ok()?;
    Some(PathStackElement {
        parent_type,
        child_type,
        parent_interface,
        child_interface,
        name,
        up,
    })
}
