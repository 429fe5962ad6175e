//! Effects produced by workflow transitions

use super::EditTarget;
use crate::backend::{Account, AccountUpdate, FieldErrors, RegistrationDraft};

/// Effects to be executed after a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Tell the user something
    Notify(Notice),

    /// Download a user-sent image from the chat transport
    FetchImage { file_id: String },

    /// Submit the collected registration
    SubmitRegistration { draft: RegistrationDraft },

    /// Apply one account change
    UpdateAccount { update: AccountUpdate },

    /// Show a page of products
    ListProducts { page: u32, search: Option<String> },

    /// Show the main menu keyboard
    ShowMenu,

    /// Show the account view
    ShowAccount { account: Account },

    /// Show the welcome text with the share-contact keyboard
    ShowWelcome,
}

/// User-facing messages the workflow asks for. Wording and controls are the
/// renderer's business.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    AskAddress,
    AskEmail,
    AskImage,
    InvalidImageInput,
    ImageDownloadFailed { reason: String },
    RegistrationSucceeded { first_name: String },
    RegistrationRejected { errors: FieldErrors },
    RegistrationFailed { reason: String },
    AskSearchQuery,
    AskFieldValue { target: EditTarget },
    EmptyValue,
    /// Offers retry and cancel controls
    UpdateFailed { reason: String, errors: FieldErrors },
    NoUpdateInProgress,
    UpdateCancelled,
    NotUnderstood,
}

impl Effect {
    pub fn notify(notice: Notice) -> Self {
        Effect::Notify(notice)
    }

    pub fn update_failed(reason: impl Into<String>) -> Self {
        Effect::Notify(Notice::UpdateFailed {
            reason: reason.into(),
            errors: FieldErrors::new(),
        })
    }
}
