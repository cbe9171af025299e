use lumen_core::{Status, StatusValue};

use crate::view::View;

/// Per-variant render closures for [`StatusView`].
pub struct StatusBuilders<T, E> {
    on_idle: Option<Box<dyn Fn() -> View>>,
    on_loading: Box<dyn Fn() -> View>,
    on_success: Box<dyn Fn(&T) -> View>,
    on_error: Box<dyn Fn(&E) -> View>,
}

impl<T, E> StatusBuilders<T, E> {
    pub fn new(
        on_loading: impl Fn() -> View + 'static,
        on_success: impl Fn(&T) -> View + 'static,
        on_error: impl Fn(&E) -> View + 'static,
    ) -> Self {
        Self {
            on_idle: None,
            on_loading: Box::new(on_loading),
            on_success: Box::new(on_success),
            on_error: Box::new(on_error),
        }
    }

    /// Idle branch; without one, idle renders the loading branch.
    pub fn idle(mut self, f: impl Fn() -> View + 'static) -> Self {
        self.on_idle = Some(Box::new(f));
        self
    }
}

/// Render one branch per status variant.
///
/// Reading the status is a tracked read, so transitions mark the owning
/// tree dirty and the next pump re-renders the matching branch.
pub fn StatusView<T: Clone + 'static, E: Clone + 'static>(
    status: &StatusValue<T, E>,
    builders: &StatusBuilders<T, E>,
) -> View {
    match status.status() {
        Status::Idle => match &builders.on_idle {
            Some(f) => f(),
            None => (builders.on_loading)(),
        },
        Status::Loading => (builders.on_loading)(),
        Status::Success(v) => (builders.on_success)(&v),
        Status::Error(e) => (builders.on_error)(&e),
    }
}
