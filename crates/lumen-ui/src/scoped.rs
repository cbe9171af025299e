use std::cell::RefCell;

use lumen_core::{Scope, current_scope, remember};

use crate::view::View;

struct ScopedSlot {
    tag: Option<String>,
    scope: Scope,
}

/// Associate a dependency factory with a position in the view tree.
///
/// On the first pass at a callsite, a child scope of the current scope is
/// created and `factory()` is provided into it under `(T, tag)`; `content`
/// then runs inside that scope and can [`resolve`](lumen_core::resolve)
/// the instance. Later passes with the same tag reuse the scope and
/// instance. A different tag disposes the old scope (teardowns run, the
/// instance drops) and provides a fresh instance before `content` runs
/// again. Unmounting the tree, or disposing any ancestor scope, disposes
/// the child scope the same way.
pub fn Scoped<T: 'static>(
    tag: Option<&str>,
    factory: impl FnOnce() -> T,
    content: impl FnOnce() -> View,
) -> View {
    let slot = remember(|| RefCell::new(None::<ScopedSlot>));

    let reconfigure = match slot.borrow().as_ref() {
        None => true,
        Some(s) => s.tag.as_deref() != tag,
    };

    if reconfigure {
        if let Some(old) = slot.borrow_mut().take() {
            log::debug!(
                "scoped: tag changed {:?} -> {tag:?}; disposing previous scope",
                old.tag
            );
            old.scope.dispose();
        }
        let scope = match current_scope() {
            Some(parent) => parent.child(),
            None => {
                log::warn!("Scoped outside a composition; dependencies will not auto-release");
                Scope::new()
            }
        };
        scope.provide(tag, factory);
        *slot.borrow_mut() = Some(ScopedSlot {
            tag: tag.map(str::to_owned),
            scope,
        });
    }

    let scope = slot.borrow().as_ref().map(|s| s.scope.clone());
    match scope {
        Some(scope) => scope.run(content),
        None => content(),
    }
}
