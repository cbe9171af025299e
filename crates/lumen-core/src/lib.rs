//! # Values, Scopes, and Scoped Dependencies
//!
//! Lumen's engine is a small reactive core plus a tree of lifetimes.
//! There are four main pieces:
//!
//! - `Value<T>` — observable, reactive value.
//! - `Scope` — owns cleanup work and dependency instances; disposes
//!   deterministically.
//! - `remember*` — storage bound to a mounted composition.
//! - `StatusValue<T, E>` — async lifecycle with deterministic transitions.
//!
//! ## Values
//!
//! `Value<T>` is a cloneable handle to a piece of state:
//!
//! ```rust
//! use lumen_core::*;
//!
//! let count = value(0);
//! count.set(1);
//! count.update(|v| *v += 1);
//! assert_eq!(count.get(), 2);
//! ```
//!
//! Listeners see every mutation:
//!
//! ```rust
//! use lumen_core::*;
//!
//! let name = value("Ada".to_string());
//! let sub = name.subscribe(|n| log::info!("name is now {n}"));
//! name.set("Grace".to_string());
//! name.unsubscribe(sub);
//! ```
//!
//! Reads via `get()` also participate in a dependency graph: inside a
//! mounted [`Tree`], future writes mark the tree dirty and the next
//! [`Tree::pump`] recomposes exactly once, however many writes happened.
//!
//! ## Scoped dependencies
//!
//! A `Scope` owns the instances provided into it, keyed by type and an
//! optional tag. Resolution walks outward, nearest provision first:
//!
//! ```rust
//! use lumen_core::*;
//!
//! struct Settings { retries: u32 }
//!
//! let root = Scope::new();
//! root.provide(None, || Settings { retries: 3 });
//!
//! let inner = root.child();
//! let settings = inner.try_resolve::<Settings>(None)?;
//! assert_eq!(settings.retries, 3);
//!
//! inner.dispose(); // inner's own instances are dropped; root's remain
//! # Ok::<(), lumen_core::ResolveError>(())
//! ```
//!
//! Disposal is deterministic: children first, then disposers, then owned
//! instances, on unmount or whenever the owning scope is reconfigured.
//!
//! ## Remembered state
//!
//! Composition state lives in `remember_*` slots rather than globals:
//!
//! - `remember` and `remember_state` are order-based: the Nth call in a
//!   pass always refers to the Nth stored value.
//! - `remember_with_key` and `remember_state_with_key` are key-based and
//!   more stable across conditional branches.
//!
//! ## Async status
//!
//! `StatusValue<T, E>` drives loading/success/error rendering with a
//! fixed transition table, so refresh and retry behave the same every
//! time:
//!
//! ```rust
//! use lumen_core::*;
//!
//! let weather: StatusValue<String, String> = StatusValue::new();
//! weather.start()?;
//! weather.resolve("sunny".to_string())?;
//! weather.refresh()?; // back to loading, last success retained
//! assert_eq!(weather.last_success().as_deref(), Some("sunny"));
//! # Ok::<(), lumen_core::TransitionError>(())
//! ```

pub mod container;
pub mod effects;
pub mod error;
pub mod prelude;
pub mod reactive;
pub mod runtime;
pub mod scope;
pub mod status;
pub mod value;

pub use container::*;
pub use effects::*;
pub use error::*;
pub use prelude::*;
pub use reactive::*;
pub use runtime::*;
pub use scope::*;
pub use status::*;
pub use value::*;
