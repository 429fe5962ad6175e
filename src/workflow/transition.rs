//! Pure state transition function

use super::{EditTarget, Effect, Event, Notice, RegistrationOutcome, UpdateOutcome, WorkflowState};
use crate::backend::{AccountUpdate, RegistrationDraft};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: WorkflowState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: WorkflowState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    #[must_use]
    pub fn notify(self, notice: Notice) -> Self {
        self.with_effect(Effect::Notify(notice))
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("Unexpected {event} in state {state}")]
    Unexpected { state: &'static str, event: &'static str },
}

/// Pure transition function
#[allow(clippy::too_many_lines)] // One arm per (state, event) pair
pub fn transition(state: &WorkflowState, event: Event) -> Result<TransitionResult, TransitionError> {
    use WorkflowState as S;

    match (state, event) {
        // ============================================================
        // Registration
        // ============================================================

        // Sharing a contact (re)starts registration from anywhere
        (
            _,
            Event::ContactShared {
                first_name,
                last_name,
                phone,
            },
        ) => {
            let draft = RegistrationDraft {
                first_name,
                last_name,
                phone,
                ..RegistrationDraft::default()
            };
            Ok(TransitionResult::new(S::AwaitingAddress { draft }).notify(Notice::AskAddress))
        }

        (S::AwaitingAddress { draft }, Event::Text { text }) => Ok(address_received(draft, text)),
        (S::AwaitingAddress { draft }, Event::Location { latitude, longitude }) => {
            Ok(address_received(draft, format_location(latitude, longitude)))
        }
        (S::AwaitingAddress { .. }, Event::Image { .. }) => {
            Ok(TransitionResult::new(state.clone()).notify(Notice::AskAddress))
        }

        (S::AwaitingEmail { draft }, Event::Text { text }) => {
            let draft = RegistrationDraft {
                email: text,
                ..draft.clone()
            };
            Ok(TransitionResult::new(S::AwaitingImage { draft }).notify(Notice::AskImage))
        }
        (S::AwaitingEmail { .. }, Event::Location { .. } | Event::Image { .. }) => {
            Ok(TransitionResult::new(state.clone()).notify(Notice::AskEmail))
        }

        (S::AwaitingImage { .. }, Event::Image { file_id }) => {
            Ok(TransitionResult::new(state.clone()).with_effect(Effect::FetchImage { file_id }))
        }
        (S::AwaitingImage { draft }, Event::Text { text }) if is_skip(&text) => {
            let draft = RegistrationDraft {
                image: None,
                ..draft.clone()
            };
            Ok(TransitionResult::new(S::Idle).with_effect(Effect::SubmitRegistration { draft }))
        }
        (S::AwaitingImage { .. }, Event::Text { .. } | Event::Location { .. }) => {
            Ok(TransitionResult::new(state.clone()).notify(Notice::InvalidImageInput))
        }
        (S::AwaitingImage { draft }, Event::ImageFetched { data }) => {
            let draft = RegistrationDraft {
                image: Some(data),
                ..draft.clone()
            };
            Ok(TransitionResult::new(S::Idle).with_effect(Effect::SubmitRegistration { draft }))
        }
        (S::AwaitingImage { .. }, Event::ImageFetchFailed { reason }) => {
            Ok(TransitionResult::new(state.clone()).notify(Notice::ImageDownloadFailed { reason }))
        }

        // Submission ends the workflow whatever the outcome
        (_, Event::RegistrationSubmitted { outcome }) => {
            let result = TransitionResult::new(S::Idle);
            Ok(match outcome {
                RegistrationOutcome::Registered { first_name } => result
                    .notify(Notice::RegistrationSucceeded { first_name })
                    .with_effect(Effect::ShowMenu),
                RegistrationOutcome::Rejected(errors) => result
                    .notify(Notice::RegistrationRejected { errors })
                    .with_effect(Effect::ShowWelcome),
                RegistrationOutcome::Failed(reason) => result.notify(Notice::RegistrationFailed { reason }),
            })
        }

        // ============================================================
        // Search
        // ============================================================
        (_, Event::SearchRequested) => {
            Ok(TransitionResult::new(S::AwaitingSearchQuery).notify(Notice::AskSearchQuery))
        }
        (S::AwaitingSearchQuery, Event::Text { text }) => {
            let query = text.trim();
            if query.is_empty() {
                return Ok(TransitionResult::new(S::AwaitingSearchQuery).notify(Notice::AskSearchQuery));
            }
            Ok(TransitionResult::new(S::Idle).with_effect(Effect::ListProducts {
                page: 1,
                search: Some(query.to_string()),
            }))
        }
        (S::AwaitingSearchQuery, Event::Location { .. } | Event::Image { .. }) => {
            Ok(TransitionResult::new(S::AwaitingSearchQuery).notify(Notice::AskSearchQuery))
        }

        // ============================================================
        // Account editing
        // ============================================================
        (_, Event::EditRequested { target }) => {
            Ok(TransitionResult::new(S::EditingField { target }).notify(Notice::AskFieldValue { target }))
        }

        (
            S::EditingField {
                target: EditTarget::Text(field),
            },
            Event::Text { text },
        ) => {
            let value = text.trim();
            if value.is_empty() {
                return Ok(TransitionResult::new(state.clone()).notify(Notice::EmptyValue));
            }
            Ok(TransitionResult::new(state.clone()).with_effect(Effect::UpdateAccount {
                update: AccountUpdate::Text {
                    field: *field,
                    value: value.to_string(),
                },
            }))
        }
        (
            S::EditingField {
                target: EditTarget::Text(_),
            },
            Event::Location { .. } | Event::Image { .. },
        ) => Ok(TransitionResult::new(state.clone()).notify(Notice::EmptyValue)),

        (
            S::EditingField {
                target: EditTarget::Image,
            },
            Event::Image { file_id },
        ) => Ok(TransitionResult::new(state.clone()).with_effect(Effect::FetchImage { file_id })),
        (
            S::EditingField {
                target: EditTarget::Image,
            },
            Event::Text { .. } | Event::Location { .. },
        ) => Ok(TransitionResult::new(state.clone())
            .with_effect(Effect::update_failed("Invalid input. Please upload a valid profile image."))),
        (
            S::EditingField {
                target: EditTarget::Image,
            },
            Event::ImageFetched { data },
        ) => Ok(TransitionResult::new(state.clone()).with_effect(Effect::UpdateAccount {
            update: AccountUpdate::Image(data),
        })),
        (
            S::EditingField {
                target: EditTarget::Image,
            },
            Event::ImageFetchFailed { reason },
        ) => Ok(TransitionResult::new(state.clone())
            .with_effect(Effect::update_failed(format!("Failed to download the image: {reason}")))),

        (S::EditingField { .. }, Event::AccountUpdated { outcome }) => Ok(match outcome {
            UpdateOutcome::Updated(account) => {
                TransitionResult::new(S::Idle).with_effect(Effect::ShowAccount { account })
            }
            UpdateOutcome::Rejected(errors) => TransitionResult::new(state.clone()).notify(Notice::UpdateFailed {
                reason: String::new(),
                errors,
            }),
            UpdateOutcome::Failed(reason) => {
                TransitionResult::new(state.clone()).with_effect(Effect::update_failed(reason))
            }
        }),

        (S::EditingField { target }, Event::EditRetry) => {
            Ok(TransitionResult::new(state.clone()).notify(Notice::AskFieldValue { target: *target }))
        }
        (_, Event::EditRetry) => Ok(TransitionResult::new(state.clone()).notify(Notice::NoUpdateInProgress)),

        (S::EditingField { .. }, Event::EditCancelled) => {
            Ok(TransitionResult::new(S::Idle).notify(Notice::UpdateCancelled))
        }
        (_, Event::EditCancelled) => Ok(TransitionResult::new(state.clone()).notify(Notice::UpdateCancelled)),

        // ============================================================
        // Idle input nobody asked for
        // ============================================================
        (S::Idle, Event::Text { .. } | Event::Location { .. } | Event::Image { .. }) => Ok(TransitionResult::new(
            S::Idle,
        )
        .notify(Notice::NotUnderstood)
        .with_effect(Effect::ShowMenu)),

        // Effect results that arrive after the state moved on
        (state, event) => Err(TransitionError::Unexpected {
            state: state.name(),
            event: event_name(&event),
        }),
    }
}

fn address_received(draft: &RegistrationDraft, address: String) -> TransitionResult {
    let draft = RegistrationDraft {
        address,
        ..draft.clone()
    };
    TransitionResult::new(WorkflowState::AwaitingEmail { draft }).notify(Notice::AskEmail)
}

/// Textual address for a shared location
pub fn format_location(latitude: f64, longitude: f64) -> String {
    format!("Lat: {latitude:.6}, Long: {longitude:.6}")
}

fn is_skip(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case("skip")
}

fn event_name(event: &Event) -> &'static str {
    match event {
        Event::ContactShared { .. } => "contact",
        Event::Text { .. } => "text",
        Event::Location { .. } => "location",
        Event::Image { .. } => "image",
        Event::SearchRequested => "search_requested",
        Event::EditRequested { .. } => "edit_requested",
        Event::EditRetry => "edit_retry",
        Event::EditCancelled => "edit_cancelled",
        Event::ImageFetched { .. } => "image_fetched",
        Event::ImageFetchFailed { .. } => "image_fetch_failed",
        Event::RegistrationSubmitted { .. } => "registration_submitted",
        Event::AccountUpdated { .. } => "account_updated",
    }
}
