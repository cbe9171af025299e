use std::any::{Any, TypeId, type_name};
use std::rc::Rc;

use crate::error::ResolveError;
use crate::scope::{Scope, current_scope, parent_of};

/// Key for a provided dependency: the concrete type, plus an optional tag
/// so several instances of one type can coexist in a scope.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct DepKey {
    type_id: TypeId,
    tag: Option<String>,
}

impl DepKey {
    fn of<T: 'static>(tag: Option<&str>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            tag: tag.map(str::to_owned),
        }
    }
}

pub(crate) struct DepEntry {
    instance: Rc<dyn Any>,
    teardown: Option<Box<dyn FnOnce(Rc<dyn Any>)>>,
}

impl DepEntry {
    pub(crate) fn teardown(self) {
        if let Some(td) = self.teardown {
            td(self.instance);
        }
    }
}

impl Scope {
    /// Build an instance with `factory` and store it in this scope under
    /// `(T, tag)`. The instance lives until the scope is disposed or the
    /// key is provided again (the previous entry's teardown runs first).
    pub fn provide<T: 'static>(&self, tag: Option<&str>, factory: impl FnOnce() -> T) -> Rc<T> {
        self.provide_entry(tag, factory, None)
    }

    /// Like [`provide`](Scope::provide), with a teardown closure that runs
    /// with the instance when the scope is disposed or the entry replaced.
    pub fn provide_with_teardown<T: 'static>(
        &self,
        tag: Option<&str>,
        factory: impl FnOnce() -> T,
        teardown: impl FnOnce(&T) + 'static,
    ) -> Rc<T> {
        self.provide_entry(
            tag,
            factory,
            Some(Box::new(move |any: Rc<dyn Any>| {
                if let Ok(t) = any.downcast::<T>() {
                    teardown(&t);
                }
            })),
        )
    }

    fn provide_entry<T: 'static>(
        &self,
        tag: Option<&str>,
        factory: impl FnOnce() -> T,
        teardown: Option<Box<dyn FnOnce(Rc<dyn Any>)>>,
    ) -> Rc<T> {
        let key = DepKey::of::<T>(tag);
        let instance = Rc::new(factory());
        let entry = DepEntry {
            instance: instance.clone(),
            teardown,
        };
        let previous = self.inner.deps.borrow_mut().insert(key, entry);
        if let Some(previous) = previous {
            log::warn!(
                "provide: `{}` (tag {tag:?}) provided twice in one scope; replacing",
                type_name::<T>(),
            );
            previous.teardown();
        }
        instance
    }

    /// Look up `(T, tag)` in this scope, then each ancestor outward. The
    /// nearest provision wins.
    pub fn try_resolve<T: 'static>(&self, tag: Option<&str>) -> Result<Rc<T>, ResolveError> {
        let key = DepKey::of::<T>(tag);
        let mut node = Some(self.inner.clone());
        while let Some(inner) = node {
            let found = inner
                .deps
                .borrow()
                .get(&key)
                .map(|entry| entry.instance.clone());
            if let Some(instance) = found {
                return instance
                    .downcast::<T>()
                    .map_err(|_| ResolveError::not_provided::<T>(tag));
            }
            node = parent_of(&inner);
        }
        Err(ResolveError::not_provided::<T>(tag))
    }

    /// Whether `(T, tag)` is provided by this scope or an ancestor.
    pub fn provides<T: 'static>(&self, tag: Option<&str>) -> bool {
        self.try_resolve::<T>(tag).is_ok()
    }
}

/// Resolve `(T, tag)` from the current scope outward.
pub fn resolve<T: 'static>(tag: Option<&str>) -> Result<Rc<T>, ResolveError> {
    match current_scope() {
        Some(scope) => scope.try_resolve::<T>(tag),
        None => Err(ResolveError::NoCurrentScope),
    }
}
