use std::cell::RefCell;
use std::rc::Rc;

use crate::error::TransitionError;
use crate::value::Value;

/// Tagged representation of an asynchronous operation's lifecycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status<T, E> {
    Idle,
    Loading,
    Success(T),
    Error(E),
}

impl<T, E> Status<T, E> {
    pub fn is_idle(&self) -> bool {
        matches!(self, Status::Idle)
    }
    pub fn is_loading(&self) -> bool {
        matches!(self, Status::Loading)
    }
    pub fn is_success(&self) -> bool {
        matches!(self, Status::Success(_))
    }
    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error(_))
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            Status::Success(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            Status::Error(e) => Some(e),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Status::Idle => "idle",
            Status::Loading => "loading",
            Status::Success(_) => "success",
            Status::Error(_) => "error",
        }
    }
}

/// A [`Value`] of [`Status`] with a deterministic transition table.
///
/// ```text
/// start:   idle            -> loading
/// resolve: loading         -> success   (payload recorded)
/// reject:  loading         -> error     (last success kept)
/// refresh: success         -> loading   (last success kept)
/// retry:   error           -> loading
/// reset:   any             -> idle      (last success cleared)
/// ```
///
/// Disallowed transitions return [`TransitionError`] and leave the value
/// untouched. Every accepted transition notifies exactly once, like any
/// other value write.
pub struct StatusValue<T: Clone + 'static, E: Clone + 'static> {
    state: Value<Status<T, E>>,
    last: Rc<RefCell<Option<T>>>,
}

impl<T: Clone + 'static, E: Clone + 'static> StatusValue<T, E> {
    pub fn new() -> Self {
        Self {
            state: Value::new(Status::Idle),
            last: Rc::new(RefCell::new(None)),
        }
    }

    /// Current status, as a tracked read.
    pub fn status(&self) -> Status<T, E> {
        self.state.get()
    }

    /// Current status without joining the dependency graph.
    pub fn peek_status(&self) -> Status<T, E> {
        self.state.peek()
    }

    /// The payload of the most recent `resolve`, surviving `refresh` and
    /// `reject` until `reset`.
    pub fn last_success(&self) -> Option<T> {
        self.last.borrow().clone()
    }

    /// The underlying value, for subscriptions.
    pub fn state(&self) -> &Value<Status<T, E>> {
        &self.state
    }

    pub fn start(&self) -> Result<(), TransitionError> {
        self.to_loading("start", |s| s.is_idle())
    }

    pub fn resolve(&self, v: T) -> Result<(), TransitionError> {
        let current = self.state.peek();
        if !current.is_loading() {
            return Err(self.rejected(&current, "resolve"));
        }
        *self.last.borrow_mut() = Some(v.clone());
        self.state.set(Status::Success(v));
        Ok(())
    }

    pub fn reject(&self, e: E) -> Result<(), TransitionError> {
        let current = self.state.peek();
        if !current.is_loading() {
            return Err(self.rejected(&current, "reject"));
        }
        self.state.set(Status::Error(e));
        Ok(())
    }

    pub fn refresh(&self) -> Result<(), TransitionError> {
        self.to_loading("refresh", |s| s.is_success())
    }

    pub fn retry(&self) -> Result<(), TransitionError> {
        self.to_loading("retry", |s| s.is_error())
    }

    /// Return to idle from any state, clearing the retained payload.
    pub fn reset(&self) {
        *self.last.borrow_mut() = None;
        self.state.set(Status::Idle);
    }

    fn to_loading(
        &self,
        op: &'static str,
        allowed: impl Fn(&Status<T, E>) -> bool,
    ) -> Result<(), TransitionError> {
        let current = self.state.peek();
        if !allowed(&current) {
            return Err(self.rejected(&current, op));
        }
        self.state.set(Status::Loading);
        Ok(())
    }

    fn rejected(&self, current: &Status<T, E>, op: &'static str) -> TransitionError {
        log::debug!("status: rejected `{op}` while {}", current.name());
        TransitionError {
            from: current.name(),
            op,
        }
    }
}

impl<T: Clone + 'static, E: Clone + 'static> Default for StatusValue<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static, E: Clone + 'static> Clone for StatusValue<T, E> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            last: self.last.clone(),
        }
    }
}
