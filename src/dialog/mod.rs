mod confirm;
pub mod error;
pub mod event;
pub mod machine;
pub mod model;
mod surface;
mod tracker;

pub use confirm::ConfirmationMatcher;
pub use error::{StateError, StateResult};
pub use event::{DialogEvent, StateTransition};
pub use machine::DialogLifecycle;
pub use model::DialogState;
pub use surface::{
    ControlId, ControlRole, DialogControl, DialogHandle, DialogKind, DialogSnapshot, SessionId,
};
pub use tracker::{Decision, InsertionDialogTracker, Verdict};
