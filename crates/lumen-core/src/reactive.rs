use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use slotmap::{SecondaryMap, SlotMap, new_key_type};

new_key_type! {
    /// Identity of a reactive source (a [`crate::Value`]'s slot in the graph).
    pub struct SourceId;
    /// Identity of a registered observer closure.
    pub struct ObserverId;
}

thread_local! {
    static CURRENT_OBSERVER: RefCell<Option<ObserverId>> = const { RefCell::new(None) };
    static GRAPH: RefCell<DepGraph> = RefCell::new(DepGraph::default());
}

#[derive(Default)]
struct DepGraph {
    sources: SlotMap<SourceId, ()>,
    observers: SlotMap<ObserverId, Rc<dyn Fn()>>,
    // source -> observers that read it during their last run
    edges: SecondaryMap<SourceId, HashSet<ObserverId>>,
    // observer -> sources it read during its last run
    back: SecondaryMap<ObserverId, HashSet<SourceId>>,
    running: HashSet<ObserverId>,
}

impl DepGraph {
    fn clear_edges_for(&mut self, obs: ObserverId) {
        if let Some(sources) = self.back.remove(obs) {
            for s in sources {
                if let Some(set) = self.edges.get_mut(s) {
                    set.remove(&obs);
                }
            }
        }
    }

    fn remove_observer(&mut self, obs: ObserverId) {
        self.observers.remove(obs);
        self.clear_edges_for(obs);
        // scrub forward maps just in case
        for (_sig, set) in self.edges.iter_mut() {
            set.remove(&obs);
        }
        self.running.remove(&obs);
    }
}

/// Allocate a graph slot for a new reactive source.
pub fn new_source() -> SourceId {
    GRAPH.with(|g| g.borrow_mut().sources.insert(()))
}

/// Drop a source and every edge pointing at it. Called when the last
/// handle to a value goes away.
pub fn release_source(src: SourceId) {
    GRAPH.with(|g| {
        let mut g = g.borrow_mut();
        if let Some(observers) = g.edges.remove(src) {
            for obs in observers {
                if let Some(set) = g.back.get_mut(obs) {
                    set.remove(&src);
                }
            }
        }
        g.sources.remove(src);
    });
}

/// Record a read of `src` by the current observer, if one is active.
pub fn register_read(src: SourceId) {
    CURRENT_OBSERVER.with(|co| {
        if let Some(obs) = *co.borrow() {
            GRAPH.with(|g| {
                let mut g = g.borrow_mut();
                if !g.edges.contains_key(src) {
                    g.edges.insert(src, HashSet::new());
                }
                g.edges[src].insert(obs);
                if !g.back.contains_key(obs) {
                    g.back.insert(obs, HashSet::new());
                }
                g.back[obs].insert(src);
            });
        }
    });
}

/// Re-run every observer that read `src` during its last run.
///
/// Each observer runs at most once per call, under tracking, with its
/// previous edges cleared first. Observers currently running (including a
/// pass entered via [`with_observer`]) are skipped; that is the cycle
/// guard for writes issued from inside an observer.
pub fn source_changed(src: SourceId) {
    GRAPH.with(|gcell| {
        let mut g = gcell.borrow_mut();
        let mut queue: VecDeque<ObserverId> = g
            .edges
            .get(src)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .collect();
        while let Some(obs) = queue.pop_front() {
            if g.running.contains(&obs) {
                log::trace!("reactive: skipping running observer {obs:?}");
                continue;
            }
            g.running.insert(obs);
            // clear previous deps before recompute
            g.clear_edges_for(obs);
            drop(g);
            // run under tracking
            CURRENT_OBSERVER.with(|co| {
                let prev = *co.borrow();
                *co.borrow_mut() = Some(obs);
                let f = GRAPH.with(|g2| g2.borrow().observers.get(obs).cloned());
                if let Some(f) = f {
                    f();
                }
                *co.borrow_mut() = prev;
            });
            g = gcell.borrow_mut();
            g.running.remove(&obs);
        }
    });
}

/// Register an observer closure. It will re-run via [`source_changed`]
/// whenever a source it read changes.
pub fn new_observer(f: impl Fn() + 'static) -> ObserverId {
    GRAPH.with(|g| g.borrow_mut().observers.insert(Rc::new(f)))
}

/// Remove an observer and all of its dependency edges.
pub fn drop_observer(obs: ObserverId) {
    GRAPH.with(|g| g.borrow_mut().remove_observer(obs));
}

/// Run `f` with `obs` as the current observer, so that reads re-register
/// against it. The observer's previous edges are cleared first and it is
/// marked running for the duration, which keeps writes issued inside `f`
/// from re-entering it. Nesting safe; the previous observer is restored.
pub fn with_observer<R>(obs: ObserverId, f: impl FnOnce() -> R) -> R {
    GRAPH.with(|g| {
        let mut g = g.borrow_mut();
        g.clear_edges_for(obs);
        g.running.insert(obs);
    });
    let result = CURRENT_OBSERVER.with(|co| {
        let prev = *co.borrow();
        *co.borrow_mut() = Some(obs);
        let r = f();
        *co.borrow_mut() = prev;
        r
    });
    GRAPH.with(|g| {
        g.borrow_mut().running.remove(&obs);
    });
    result
}
