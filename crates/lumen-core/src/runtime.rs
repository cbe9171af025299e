use std::any::Any;
use std::cell::{Cell, Ref, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::ComposeError;
use crate::reactive::{self, ObserverId};
use crate::scope::Scope;

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct TreeFlags: u8 {
        /// A value read by the last pass has changed; the next pump will
        /// recompose.
        const DIRTY = 1 << 0;
        /// A pass is currently running.
        const BUILDING = 1 << 1;
        /// The tree was unmounted.
        const UNMOUNTED = 1 << 2;
    }
}

/// Slot storage for one tree's composition.
#[derive(Default)]
pub struct Composer {
    slots: Vec<Box<dyn Any>>,
    cursor: usize,
    keyed_slots: HashMap<String, Box<dyn Any>>,
}

thread_local! {
    // Innermost entry is the composer of the pass currently running.
    static COMPOSERS: RefCell<Vec<Composer>> = const { RefCell::new(Vec::new()) };
}

/// Install `home`'s composer for the duration of `f` (cursor reset), then
/// put it back. Unwind safe.
fn with_composer<R>(home: &RefCell<Composer>, f: impl FnOnce() -> R) -> R {
    struct Restore<'a> {
        home: &'a RefCell<Composer>,
    }
    impl Drop for Restore<'_> {
        fn drop(&mut self) {
            if let Some(c) = COMPOSERS.with(|s| s.borrow_mut().pop()) {
                *self.home.borrow_mut() = c;
            }
        }
    }

    let mut composer = std::mem::take(&mut *home.borrow_mut());
    composer.cursor = 0;
    COMPOSERS.with(|s| s.borrow_mut().push(composer));
    let _restore = Restore { home };
    f()
}

/// Slot-based remember (sequential composition only)
pub fn remember<T: 'static>(init: impl FnOnce() -> T) -> Rc<T> {
    COMPOSERS.with(|s| {
        let mut stack = s.borrow_mut();
        let Some(c) = stack.last_mut() else {
            log::warn!("remember outside composition; the value will not persist");
            drop(stack);
            return Rc::new(init());
        };

        let cursor = c.cursor;
        c.cursor += 1;

        if cursor >= c.slots.len() {
            let rc: Rc<T> = Rc::new(init());
            c.slots.push(Box::new(rc.clone()));
            return rc;
        }

        if let Some(rc) = c.slots[cursor].downcast_ref::<Rc<T>>() {
            rc.clone()
        } else {
            log::warn!(
                "remember: slot {} type changed; replacing. \
                 If this is due to conditional composition, prefer remember_with_key.",
                cursor
            );
            let rc: Rc<T> = Rc::new(init());
            c.slots[cursor] = Box::new(rc.clone());
            rc
        }
    })
}

/// Key-based remember
pub fn remember_with_key<T: 'static>(key: impl Into<String>, init: impl FnOnce() -> T) -> Rc<T> {
    COMPOSERS.with(|s| {
        let mut stack = s.borrow_mut();
        let Some(c) = stack.last_mut() else {
            log::warn!("remember_with_key outside composition; the value will not persist");
            drop(stack);
            return Rc::new(init());
        };

        let key = key.into();
        if let Some(existing) = c.keyed_slots.get(&key) {
            if let Some(rc) = existing.downcast_ref::<Rc<T>>() {
                return rc.clone();
            } else {
                log::warn!(
                    "remember_with_key: key '{}' reused with a different type; replacing.",
                    key
                );
            }
        }

        let rc: Rc<T> = Rc::new(init());
        c.keyed_slots.insert(key, Box::new(rc.clone()));
        rc
    })
}

pub fn remember_state<T: 'static>(init: impl FnOnce() -> T) -> Rc<RefCell<T>> {
    remember(|| RefCell::new(init()))
}

pub fn remember_state_with_key<T: 'static>(
    key: impl Into<String>,
    init: impl FnOnce() -> T,
) -> Rc<RefCell<T>> {
    remember_with_key(key, || RefCell::new(init()))
}

/// A mounted composition.
///
/// `Tree` owns a root [`Scope`], the remember slots, and an observer that
/// joins every value read during a pass. Writes to any of those values
/// mark the tree dirty (coalesced); [`pump`](Tree::pump) then recomposes
/// exactly once. One pump never triggers a second pass.
///
/// The build closure's output is whatever the host renders (typically a
/// view tree); `Tree` is generic over it.
pub struct Tree<V: 'static> {
    scope: Scope,
    composer: RefCell<Composer>,
    build: RefCell<Rc<dyn Fn() -> V>>,
    root: RefCell<V>,
    flags: Rc<Cell<TreeFlags>>,
    observer: ObserverId,
}

impl<V: 'static> Tree<V> {
    /// Compose `build` once under a fresh root scope and retain the result.
    pub fn mount(build: impl Fn() -> V + 'static) -> Self {
        let scope = Scope::new();
        let composer = RefCell::new(Composer::default());
        let flags = Rc::new(Cell::new(TreeFlags::empty()));
        let observer = reactive::new_observer({
            let flags = flags.clone();
            move || flags.set(flags.get() | TreeFlags::DIRTY)
        });
        let build: Rc<dyn Fn() -> V> = Rc::new(build);

        let root = compose_pass(&scope, &composer, observer, &flags, &build);
        log::debug!("tree: mounted");
        Tree {
            scope,
            composer,
            build: RefCell::new(build),
            root: RefCell::new(root),
            flags,
            observer,
        }
    }

    /// Recompose if dirty. Returns whether a pass ran.
    pub fn pump(&self) -> Result<bool, ComposeError> {
        if self.flags.get().contains(TreeFlags::UNMOUNTED) {
            return Err(ComposeError::Unmounted);
        }
        if !self.flags.get().contains(TreeFlags::DIRTY) {
            return Ok(false);
        }
        self.flags.set(self.flags.get() - TreeFlags::DIRTY);

        let build = self.build.borrow().clone();
        let root = compose_pass(&self.scope, &self.composer, self.observer, &self.flags, &build);
        *self.root.borrow_mut() = root;
        Ok(true)
    }

    /// Swap the build closure and mark the tree dirty. The next pump
    /// composes with the new closure; remember slots are kept.
    pub fn set_root(&self, build: impl Fn() -> V + 'static) -> Result<(), ComposeError> {
        if self.flags.get().contains(TreeFlags::UNMOUNTED) {
            return Err(ComposeError::Unmounted);
        }
        *self.build.borrow_mut() = Rc::new(build);
        self.invalidate();
        Ok(())
    }

    /// Force a recomposition on the next pump.
    pub fn invalidate(&self) {
        self.flags.set(self.flags.get() | TreeFlags::DIRTY);
    }

    pub fn is_dirty(&self) -> bool {
        self.flags.get().contains(TreeFlags::DIRTY)
    }

    /// The most recently composed output.
    pub fn root(&self) -> Ref<'_, V> {
        self.root.borrow()
    }

    /// The tree's root scope. Dependencies provided here are visible to
    /// the whole composition.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Tear the composition down: dispose the root scope (children first,
    /// then disposers, then owned dependencies) and leave the graph.
    /// Idempotent; pumping afterwards reports [`ComposeError::Unmounted`].
    pub fn unmount(&self) {
        if self.flags.get().contains(TreeFlags::UNMOUNTED) {
            return;
        }
        self.flags.set(TreeFlags::UNMOUNTED);
        self.scope.dispose();
        reactive::drop_observer(self.observer);
        log::debug!("tree: unmounted");
    }
}

impl<V: 'static> Drop for Tree<V> {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn compose_pass<V>(
    scope: &Scope,
    composer: &RefCell<Composer>,
    observer: ObserverId,
    flags: &Rc<Cell<TreeFlags>>,
    build: &Rc<dyn Fn() -> V>,
) -> V {
    flags.set(flags.get() | TreeFlags::BUILDING);
    let root = with_composer(composer, || {
        scope.run(|| reactive::with_observer(observer, || build()))
    });
    flags.set(flags.get() - TreeFlags::BUILDING);
    log::trace!("tree: pass complete");
    root
}
