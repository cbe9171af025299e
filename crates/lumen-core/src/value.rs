use std::cell::{Cell, RefCell};
use std::rc::Rc;

use smallvec::SmallVec;

use crate::reactive::{self, SourceId};
use crate::scope::current_scope;

/// Handle for detaching a listener registered with [`Value::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubId(u64);

type Listener<T> = Rc<dyn Fn(&T)>;

/// Observable, reactive value.
///
/// A `Value<T>` is a cloneable handle to a piece of state. Listeners
/// registered with [`subscribe`](Value::subscribe) are notified on every
/// mutation, and reads via [`get`](Value::get) participate in the
/// dependency graph so a mounted [`Tree`](crate::Tree) recomposes when a
/// value it read changes.
pub struct Value<T: 'static>(Rc<Inner<T>>);

struct Inner<T> {
    source: SourceId,
    value: RefCell<T>,
    subs: RefCell<SmallVec<[(SubId, Listener<T>); 2]>>,
    next_sub: Cell<u64>,
}

impl<T: 'static> Value<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(Inner {
            source: reactive::new_source(),
            value: RefCell::new(value),
            subs: RefCell::new(SmallVec::new()),
            next_sub: Cell::new(0),
        }))
    }

    /// Current value, as a tracked read.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        reactive::register_read(self.0.source);
        self.0.value.borrow().clone()
    }

    /// Current value without joining the dependency graph.
    pub fn peek(&self) -> T
    where
        T: Clone,
    {
        self.0.value.borrow().clone()
    }

    pub fn set(&self, v: T) {
        *self.0.value.borrow_mut() = v;
        self.notify();
    }

    /// Like [`set`](Value::set), but skips notification when the value is
    /// unchanged. Returns whether a notification happened.
    pub fn set_if_changed(&self, v: T) -> bool
    where
        T: PartialEq,
    {
        {
            let current = self.0.value.borrow();
            if *current == v {
                return false;
            }
        }
        self.set(v);
        true
    }

    pub fn update<F: FnOnce(&mut T)>(&self, f: F) {
        f(&mut self.0.value.borrow_mut());
        self.notify();
    }

    /// Register a change listener. It is called with the new value after
    /// every mutation, in registration order, until detached.
    pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> SubId {
        let id = SubId(self.0.next_sub.get());
        self.0.next_sub.set(id.0 + 1);
        self.0.subs.borrow_mut().push((id, Rc::new(f)));
        id
    }

    /// Detach a listener. Returns whether it was still registered.
    pub fn unsubscribe(&self, id: SubId) -> bool {
        let mut subs = self.0.subs.borrow_mut();
        let before = subs.len();
        subs.retain(|(sid, _)| *sid != id);
        subs.len() != before
    }

    /// Register a change listener owned by the current scope: the listener
    /// detaches automatically when that scope is disposed.
    pub fn subscribe_scoped(&self, f: impl Fn(&T) + 'static) -> SubId {
        let id = self.subscribe(f);
        if let Some(scope) = current_scope() {
            let this = self.clone();
            scope.add_disposer(move || {
                this.unsubscribe(id);
            });
        } else {
            log::warn!("subscribe_scoped without a current scope; listener will not auto-detach");
        }
        id
    }

    pub fn subscriber_count(&self) -> usize {
        self.0.subs.borrow().len()
    }

    fn notify(&self) {
        // Snapshot so listeners may subscribe/unsubscribe reentrantly.
        let listeners: SmallVec<[Listener<T>; 2]> = self
            .0
            .subs
            .borrow()
            .iter()
            .map(|(_, f)| f.clone())
            .collect();
        {
            let value = self.0.value.borrow();
            for f in &listeners {
                f(&value);
            }
        }
        reactive::source_changed(self.0.source);
    }
}

impl<T: 'static> Clone for Value<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Drop for Inner<T> {
    fn drop(&mut self) {
        reactive::release_source(self.source);
    }
}

impl<T: std::fmt::Debug + 'static> std::fmt::Debug for Value<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Value").field(&*self.0.value.borrow()).finish()
    }
}

/// Shorthand constructor.
pub fn value<T>(t: T) -> Value<T> {
    Value::new(t)
}
