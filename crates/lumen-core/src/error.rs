use thiserror::Error;

/// Failure to resolve a scoped dependency.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no `{type_name}` provided for tag {tag:?} in this scope or its ancestors")]
    NotProvided {
        type_name: &'static str,
        tag: Option<String>,
    },
    #[error("no scope is current; resolve requires an active composition or `Scope::run`")]
    NoCurrentScope,
}

impl ResolveError {
    pub(crate) fn not_provided<T>(tag: Option<&str>) -> Self {
        ResolveError::NotProvided {
            type_name: std::any::type_name::<T>(),
            tag: tag.map(str::to_owned),
        }
    }
}

/// A status operation that is not legal from the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot {op} while {from}")]
pub struct TransitionError {
    /// Name of the state the value was in.
    pub from: &'static str,
    /// The attempted operation.
    pub op: &'static str,
}

/// Failure to compose on a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ComposeError {
    #[error("tree is unmounted; no further composition is possible")]
    Unmounted,
}
