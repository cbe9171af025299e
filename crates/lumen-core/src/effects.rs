use std::cell::RefCell;
use std::rc::Rc;

use crate::runtime::remember;
use crate::scope::{current_scope, scoped_effect};

#[derive(Clone)]
pub struct Dispose(Rc<RefCell<Option<Box<dyn FnOnce()>>>>);

impl Dispose {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self(Rc::new(RefCell::new(Some(Box::new(f)))))
    }

    /// A dispose with nothing to do.
    pub fn noop() -> Self {
        Self(Rc::new(RefCell::new(None)))
    }

    /// Runs at most once (safe to call multiple times).
    pub fn run(&self) {
        if let Some(f) = self.0.borrow_mut().take() {
            f()
        }
    }
}

/// Runs `f()` immediately and returns its `Dispose`, auto-registered with
/// the current scope so the cleanup runs on unmount.
pub fn effect<F>(f: F) -> Dispose
where
    F: FnOnce() -> Dispose + 'static,
{
    let d = f();

    if let Some(scope) = current_scope() {
        let d2 = d.clone();
        scope.add_disposer(move || d2.run());
    }

    d
}

/// Helper to register cleanup inside effect.
pub fn on_unmount(f: impl FnOnce() + 'static) -> Dispose {
    Dispose::new(f)
}

/// cleanup on key change or unmount
pub fn disposable_effect<K: PartialEq + Clone + 'static>(
    key: K,
    effect: impl FnOnce() -> Dispose + 'static,
) {
    // Slot-based; one slot triple per callsite.
    let last_key = remember(|| RefCell::new(None::<K>));
    let cleanup_slot = remember(|| RefCell::new(None::<Dispose>));
    let installed = remember(|| RefCell::new(false));

    // Install a single unmount disposer for this callsite.
    if !*installed.borrow() {
        *installed.borrow_mut() = true;
        let cleanup_slot = cleanup_slot.clone();
        scoped_effect(move || {
            Box::new(move || {
                if let Some(d) = cleanup_slot.borrow_mut().take() {
                    d.run();
                }
            })
        });
    }

    // Key change: cleanup previous + run new effect
    let changed = last_key.borrow().as_ref() != Some(&key);
    if changed {
        *last_key.borrow_mut() = Some(key);

        if let Some(d) = cleanup_slot.borrow_mut().take() {
            d.run();
        }

        let d = effect();
        *cleanup_slot.borrow_mut() = Some(d);
    }
}

/// runs on every recomposition
pub fn side_effect(effect: impl Fn()) {
    effect();
}
