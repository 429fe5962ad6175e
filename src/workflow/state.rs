//! Workflow state types

use crate::backend::{ProfileField, RegistrationDraft};

/// What an account edit will change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Text(ProfileField),
    Image,
}

impl EditTarget {
    /// Lower-case name used in prompts
    pub fn prompt_name(self) -> &'static str {
        match self {
            Self::Text(field) => field.api_name(),
            Self::Image => "image",
        }
    }
}

/// Position of one session in its workflow. The registration draft travels
/// inside the states that collect it, so leaving those states drops it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum WorkflowState {
    #[default]
    Idle,
    AwaitingAddress {
        draft: RegistrationDraft,
    },
    AwaitingEmail {
        draft: RegistrationDraft,
    },
    AwaitingImage {
        draft: RegistrationDraft,
    },
    AwaitingSearchQuery,
    EditingField {
        target: EditTarget,
    },
}

impl WorkflowState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingAddress { .. } => "awaiting_address",
            Self::AwaitingEmail { .. } => "awaiting_email",
            Self::AwaitingImage { .. } => "awaiting_image",
            Self::AwaitingSearchQuery => "awaiting_search_query",
            Self::EditingField { .. } => "editing_field",
        }
    }

    pub fn draft(&self) -> Option<&RegistrationDraft> {
        match self {
            Self::AwaitingAddress { draft } | Self::AwaitingEmail { draft } | Self::AwaitingImage { draft } => {
                Some(draft)
            }
            _ => None,
        }
    }
}
