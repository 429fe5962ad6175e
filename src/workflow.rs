//! Per-session conversation workflow
//!
//! Pure state transitions in the Elm style: `transition(state, event)` returns
//! the next state plus the effects the runtime must carry out. No I/O happens
//! here; image downloads and backend submissions come back as events.

mod effect;
mod event;
mod state;
mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Effect, Notice};
pub use event::{Event, RegistrationOutcome, UpdateOutcome};
pub use state::{EditTarget, WorkflowState};
pub use transition::transition;

pub use crate::backend::RegistrationDraft;
