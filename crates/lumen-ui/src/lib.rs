#![allow(non_snake_case)]
//! Widget layer: view nodes, scope provision, and status-aware rendering.
//!
//! Widgets are plain functions returning [`View`]. State lives in
//! `lumen_core` values and scopes; a [`Tree`](lumen_core::Tree) mounted
//! over a build function recomposes when anything it read changes.
//!
//! ```rust
//! use lumen_core::*;
//! use lumen_ui::*;
//!
//! let count = value(0);
//! let tree = Tree::mount({
//!     let count = count.clone();
//!     move || {
//!         let count = count.clone();
//!         Column()
//!             .child(Text(format!("count = {}", count.get())))
//!             .child(Button("+1", move || count.update(|c| *c += 1)))
//!     }
//! });
//! ```

pub mod scoped;
pub mod status_view;
pub mod tests;
pub mod view;

use std::rc::Rc;

use lumen_core::Value;

pub use scoped::Scoped;
pub use status_view::{StatusBuilders, StatusView};
pub use view::{Callback, View, ViewId, ViewKind};

pub fn Group() -> View {
    View::new(ViewKind::Group)
}

pub fn Row() -> View {
    View::new(ViewKind::Row)
}

pub fn Column() -> View {
    View::new(ViewKind::Column)
}

pub fn Text(text: impl Into<String>) -> View {
    View::new(ViewKind::Text { text: text.into() })
}

pub fn Button(label: impl Into<String>, on_click: impl Fn() + 'static) -> View {
    View::new(ViewKind::Button {
        label: label.into(),
        on_click: Some(Rc::new(on_click)),
    })
}

/// Build from the current value of `value`, as a tracked read, so the
/// owning tree re-renders on change.
pub fn Observing<T: Clone + 'static>(value: &Value<T>, build: impl FnOnce(T) -> View) -> View {
    build(value.get())
}
