//! Path-producing BFS with hibernation and weak-path tracking.
//!
//! The engine explores interface paths outward from a root, handing every
//! candidate to a visitor. The visitor communicates back through flags on
//! the path: `filtered` drops it, `hibernated` parks it off the active
//! queue, `stop` cancels the search, `wake_signal` sweeps the hibernated
//! list, and `strong_signal` marks the whole path chain visited.
//!
//! Paths that extend a common prefix share their [`PathData`] until one of
//! them mutates it; sharing is a memory optimization and never observable.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use bitvec::bitvec;
use bitvec::vec::BitVec;

use crate::error::GraphResult;
use crate::graph::{GraphStore, InterfaceId, Path};

use super::split::{PathStackElement, UnresolvedStackElement};

/// Per-path state shared copy-on-write across a BFS frontier.
#[derive(Debug, Clone, Default)]
pub struct PathData {
    /// Hierarchical steps not yet matched by their inverse.
    pub unresolved_stack: Vec<UnresolvedStackElement>,
    /// Split-entering steps of this path.
    pub split_stack: Vec<PathStackElement>,
    /// Set while the path waits on sibling branches of its splits.
    pub not_complete: bool,
}

#[derive(Debug)]
struct BfsPathState {
    path: Path,
    confidence: Cell<f64>,
    filtered: Cell<bool>,
    hibernated: Cell<bool>,
    stop: Cell<bool>,
    wake_signal: Cell<bool>,
    strong_signal: Cell<bool>,
    data: RefCell<Rc<PathData>>,
}

/// A path under exploration: the immutable interface sequence plus the
/// exploration state. Clones are cheap handles to the same path.
#[derive(Debug, Clone)]
pub struct BfsPath {
    state: Rc<BfsPathState>,
}

impl BfsPath {
    /// Fresh single-interface path with full confidence.
    #[must_use]
    pub fn new(root: InterfaceId) -> Self {
        Self::with_parts(Path::single(root), 1.0, Rc::new(PathData::default()))
    }

    /// Extend by one interface: the path copies, the data shares.
    #[must_use]
    pub fn extended(&self, next: InterfaceId) -> Self {
        Self::with_parts(
            self.state.path.extended(next),
            self.state.confidence.get(),
            self.state.data.borrow().clone(),
        )
    }

    fn with_parts(path: Path, confidence: f64, data: Rc<PathData>) -> Self {
        Self {
            state: Rc::new(BfsPathState {
                path,
                confidence: Cell::new(confidence),
                filtered: Cell::new(false),
                hibernated: Cell::new(false),
                stop: Cell::new(false),
                wake_signal: Cell::new(false),
                strong_signal: Cell::new(false),
                data: RefCell::new(data),
            }),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.state.path
    }

    /// Last interface; paths are never empty.
    #[must_use]
    pub fn last(&self) -> InterfaceId {
        self.state.path.last().unwrap_or_else(|| {
            unreachable!("BFS paths always hold at least their root")
        })
    }

    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.state.confidence.get()
    }

    pub fn set_confidence(&self, confidence: f64) {
        self.state.confidence.set(confidence);
    }

    /// Multiply confidence, e.g. by `0.5^split_growth`.
    pub fn scale_confidence(&self, factor: f64) {
        self.state
            .confidence
            .set(self.state.confidence.get() * factor);
    }

    /// Strong paths carry full confidence.
    #[must_use]
    pub fn is_strong(&self) -> bool {
        self.state.confidence.get() >= 1.0
    }

    #[must_use]
    pub fn filtered(&self) -> bool {
        self.state.filtered.get()
    }

    pub fn set_filtered(&self, filtered: bool) {
        self.state.filtered.set(filtered);
    }

    #[must_use]
    pub fn hibernated(&self) -> bool {
        self.state.hibernated.get()
    }

    pub fn set_hibernated(&self, hibernated: bool) {
        self.state.hibernated.set(hibernated);
    }

    #[must_use]
    pub fn stop(&self) -> bool {
        self.state.stop.get()
    }

    pub fn set_stop(&self, stop: bool) {
        self.state.stop.set(stop);
    }

    #[must_use]
    pub fn wake_signal(&self) -> bool {
        self.state.wake_signal.get()
    }

    pub fn set_wake_signal(&self, wake: bool) {
        self.state.wake_signal.set(wake);
    }

    #[must_use]
    pub fn strong_signal(&self) -> bool {
        self.state.strong_signal.get()
    }

    pub fn set_strong_signal(&self, strong: bool) {
        self.state.strong_signal.set(strong);
    }

    /// Read handle on the shared path data.
    #[must_use]
    pub fn data(&self) -> Rc<PathData> {
        self.state.data.borrow().clone()
    }

    /// Mutate the path data, cloning it first when shared with sibling
    /// paths.
    pub fn with_data_mut<R>(&self, f: impl FnOnce(&mut PathData) -> R) -> R {
        let mut slot = self.state.data.borrow_mut();
        f(Rc::make_mut(&mut slot))
    }

    /// Identity comparison: do two handles refer to the same exploration
    /// path?
    #[must_use]
    pub fn same_path(&self, other: &BfsPath) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

struct BfsRun<'a, F> {
    store: &'a GraphStore,
    visitor: F,
    visited: BitVec,
    weak_visited: BitVec,
    open: VecDeque<BfsPath>,
    hibernated: Vec<BfsPath>,
    stopped: bool,
}

impl<F: FnMut(&BfsPath)> BfsRun<'_, F> {
    fn handle_path(&mut self, path: BfsPath) {
        (self.visitor)(&path);

        if path.stop() {
            log::debug!("BFS stop requested, clearing {} open paths", self.open.len());
            self.open.clear();
            self.stopped = true;
            return;
        }

        if path.wake_signal() {
            self.sweep_hibernated();
            path.set_wake_signal(false);
        }

        if path.filtered() {
            return;
        }

        let last_index = self.store.v_index(path.last());
        self.weak_visited.set(last_index, true);
        if path.strong_signal() {
            for &interface in path.path().as_slice() {
                self.visited.set(self.store.v_index(interface), true);
            }
        } else if path.is_strong() {
            self.visited.set(last_index, true);
        }

        if path.hibernated() {
            self.hibernated.push(path);
        } else {
            self.open.push_back(path);
        }
    }

    /// Drop filtered hibernated paths and requeue woken ones.
    fn sweep_hibernated(&mut self) {
        let mut still_hibernated = Vec::with_capacity(self.hibernated.len());
        for path in self.hibernated.drain(..) {
            if path.filtered() {
                continue;
            }
            if path.hibernated() {
                still_hibernated.push(path);
            } else {
                self.open.push_back(path);
            }
        }
        self.hibernated = still_hibernated;
    }

    fn expand(&mut self, path: &BfsPath) {
        let last = path.last();
        // Iteration order of the neighbor set is the enqueue order; no
        // stronger ordering is guaranteed.
        let neighbors: Vec<InterfaceId> = self.store.simple_neighbors(last).collect();
        for neighbor in neighbors {
            let index = self.store.v_index(neighbor);
            if self.visited[index] {
                continue;
            }
            if self.weak_visited[index] && path.path().contains(neighbor) {
                continue;
            }
            self.handle_path(path.extended(neighbor));
            if self.stopped {
                return;
            }
        }
    }
}

/// Visit paths outward from `root`, FIFO over the active queue.
///
/// The visitor is invoked once per candidate path, including the root
/// path, and steers the search through the path's flags.
pub fn bfs_visit<F>(store: &GraphStore, root: InterfaceId, visitor: F) -> GraphResult<()>
where
    F: FnMut(&BfsPath),
{
    let size = store.node_count(store.graph_of(root))?;
    let mut run = BfsRun {
        store,
        visitor,
        visited: bitvec![0; size],
        weak_visited: bitvec![0; size],
        open: VecDeque::new(),
        hibernated: Vec::new(),
        stopped: false,
    };

    run.handle_path(BfsPath::new(root));
    while !run.stopped {
        let Some(path) = run.open.pop_front() else {
            break;
        };
        run.expand(&path);
    }
    Ok(())
}
