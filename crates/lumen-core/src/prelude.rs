pub use crate::container::resolve;
pub use crate::effects::{Dispose, disposable_effect, effect, on_unmount, side_effect};
pub use crate::error::{ComposeError, ResolveError, TransitionError};
pub use crate::runtime::{
    Composer, Tree, TreeFlags, remember, remember_state, remember_state_with_key,
    remember_with_key,
};
pub use crate::scope::{Scope, current_scope, scoped_effect};
pub use crate::status::{Status, StatusValue};
pub use crate::value::{SubId, Value, value};
