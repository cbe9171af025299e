use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::container::{DepEntry, DepKey};

thread_local! {
    static CURRENT_SCOPE: RefCell<Option<Weak<ScopeInner>>> = const { RefCell::new(None) };
}

/// A node in the tree of lifetimes.
///
/// Scopes own teardown work and dependency instances. Disposing a scope
/// runs every descendant's cleanup first, then its own disposers, then
/// drops the dependencies it provided. Cloning is cheap; all clones refer
/// to the same node.
pub struct Scope {
    pub(crate) inner: Rc<ScopeInner>,
}

pub(crate) struct ScopeInner {
    parent: RefCell<Option<Weak<ScopeInner>>>,
    disposers: RefCell<Vec<Box<dyn FnOnce()>>>,
    children: RefCell<Vec<Scope>>,
    pub(crate) deps: RefCell<HashMap<DepKey, DepEntry>>,
    disposed: Cell<bool>,
}

impl ScopeInner {
    fn new(parent: Option<Weak<ScopeInner>>) -> Rc<Self> {
        Rc::new(ScopeInner {
            parent: RefCell::new(parent),
            disposers: RefCell::new(Vec::new()),
            children: RefCell::new(Vec::new()),
            deps: RefCell::new(HashMap::new()),
            disposed: Cell::new(false),
        })
    }

    fn teardown(&self) {
        if self.disposed.replace(true) {
            return;
        }

        // Dispose children first
        let children = std::mem::take(&mut *self.children.borrow_mut());
        for child in children {
            child.dispose();
        }

        // Run disposers
        let disposers = std::mem::take(&mut *self.disposers.borrow_mut());
        for disposer in disposers {
            disposer();
        }

        // Tear down owned dependency instances last
        let deps = std::mem::take(&mut *self.deps.borrow_mut());
        for (key, entry) in deps {
            log::trace!("scope: dropping dependency {key:?}");
            entry.teardown();
        }
    }
}

impl Scope {
    pub fn new() -> Self {
        Self {
            inner: ScopeInner::new(None),
        }
    }

    /// Create a child scope attached to this one. It is disposed together
    /// with its parent, or earlier via its own [`dispose`](Scope::dispose).
    pub fn child(&self) -> Scope {
        let child = Scope {
            inner: ScopeInner::new(Some(Rc::downgrade(&self.inner))),
        };
        self.inner.children.borrow_mut().push(child.clone());
        child
    }

    /// Make this scope the current one for the duration of `f`.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        CURRENT_SCOPE.with(|current| {
            let prev = current.borrow().clone();
            *current.borrow_mut() = Some(Rc::downgrade(&self.inner));
            let result = f();
            *current.borrow_mut() = prev;
            result
        })
    }

    pub fn add_disposer(&self, disposer: impl FnOnce() + 'static) {
        if self.inner.disposed.get() {
            log::warn!("add_disposer on a disposed scope; running cleanup immediately");
            disposer();
            return;
        }
        self.inner.disposers.borrow_mut().push(Box::new(disposer));
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    /// Run teardown: children depth-first, then disposers, then owned
    /// dependencies. Idempotent. Detaches this scope from its parent.
    pub fn dispose(&self) {
        if !self.inner.disposed.get()
            && let Some(parent) = self.inner.parent.borrow_mut().take().and_then(|w| w.upgrade())
        {
            parent
                .children
                .borrow_mut()
                .retain(|c| !Rc::ptr_eq(&c.inner, &self.inner));
        }
        self.inner.teardown();
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Scope {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl Drop for ScopeInner {
    fn drop(&mut self) {
        if self.disposed.get() {
            return;
        }
        let children = std::mem::take(&mut *self.children.borrow_mut());
        for child in children {
            child.dispose();
        }
        let disposers = std::mem::take(&mut *self.disposers.borrow_mut());
        for disposer in disposers {
            disposer();
        }
        let deps = std::mem::take(&mut *self.deps.borrow_mut());
        for (_key, entry) in deps {
            entry.teardown();
        }
    }
}

/// The innermost scope entered via [`Scope::run`], if any.
pub fn current_scope() -> Option<Scope> {
    CURRENT_SCOPE.with(|current| {
        current
            .borrow()
            .as_ref()
            .and_then(|weak| weak.upgrade().map(|inner| Scope { inner }))
    })
}

pub(crate) fn parent_of(inner: &Rc<ScopeInner>) -> Option<Rc<ScopeInner>> {
    inner.parent.borrow().as_ref().and_then(Weak::upgrade)
}

/// Scoped effect that auto-cleans up
pub fn scoped_effect<F>(f: F)
where
    F: FnOnce() -> Box<dyn FnOnce()> + 'static,
{
    if let Some(scope) = current_scope() {
        let cleanup = f();
        scope.add_disposer(cleanup);
    } else {
        log::warn!("scoped_effect without a current scope; cleanup will never run");
        let _ = f();
    }
}
