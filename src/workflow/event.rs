//! Events that drive the workflow

use super::EditTarget;
use crate::backend::{Account, FieldErrors};

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    // User input
    ContactShared {
        first_name: String,
        last_name: String,
        phone: String,
    },
    Text {
        text: String,
    },
    Location {
        latitude: f64,
        longitude: f64,
    },
    Image {
        file_id: String,
    },

    // Controls
    SearchRequested,
    EditRequested {
        target: EditTarget,
    },
    EditRetry,
    EditCancelled,

    // Results of effects
    ImageFetched {
        data: Vec<u8>,
    },
    ImageFetchFailed {
        reason: String,
    },
    RegistrationSubmitted {
        outcome: RegistrationOutcome,
    },
    AccountUpdated {
        outcome: UpdateOutcome,
    },
}

impl Event {
    pub fn text(text: impl Into<String>) -> Self {
        Event::Text { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationOutcome {
    Registered { first_name: String },
    /// 422 with per-field messages
    Rejected(FieldErrors),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Updated(Account),
    Rejected(FieldErrors),
    Failed(String),
}
