//! Property-based tests for the workflow
//!
//! These tests verify key invariants hold across all possible inputs.

use super::*;
use crate::backend::{FieldErrors, ProfileField};
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_draft() -> impl Strategy<Value = RegistrationDraft> {
    (
        "[A-Za-z]{0,8}",
        "[A-Za-z]{0,8}",
        "\\+[0-9]{6,10}",
        "[A-Za-z0-9 ]{0,20}",
        "[a-z@.]{0,12}",
        proptest::option::of(proptest::collection::vec(any::<u8>(), 0..8)),
    )
        .prop_map(|(first_name, last_name, phone, address, email, image)| RegistrationDraft {
            first_name,
            last_name,
            phone,
            address,
            email,
            image,
        })
}

fn arb_target() -> impl Strategy<Value = EditTarget> {
    prop_oneof![
        Just(EditTarget::Image),
        proptest::sample::select(ProfileField::ALL.to_vec()).prop_map(EditTarget::Text),
    ]
}

fn arb_state() -> impl Strategy<Value = WorkflowState> {
    prop_oneof![
        Just(WorkflowState::Idle),
        Just(WorkflowState::AwaitingSearchQuery),
        arb_draft().prop_map(|draft| WorkflowState::AwaitingAddress { draft }),
        arb_draft().prop_map(|draft| WorkflowState::AwaitingEmail { draft }),
        arb_draft().prop_map(|draft| WorkflowState::AwaitingImage { draft }),
        arb_target().prop_map(|target| WorkflowState::EditingField { target }),
    ]
}

fn arb_user_input() -> impl Strategy<Value = Event> {
    prop_oneof![
        "[A-Za-z0-9@. ]{0,20}".prop_map(|text| Event::Text { text }),
        (-90.0f64..90.0, -180.0f64..180.0).prop_map(|(latitude, longitude)| Event::Location { latitude, longitude }),
        "[a-zA-Z0-9]{4,12}".prop_map(|file_id| Event::Image { file_id }),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        4 => arb_user_input(),
        1 => ("[A-Za-z]{0,8}", "\\+[0-9]{6,10}").prop_map(|(first_name, phone)| Event::ContactShared {
            first_name,
            last_name: String::new(),
            phone,
        }),
        1 => Just(Event::SearchRequested),
        1 => arb_target().prop_map(|target| Event::EditRequested { target }),
        1 => Just(Event::EditRetry),
        1 => Just(Event::EditCancelled),
        1 => proptest::collection::vec(any::<u8>(), 0..8).prop_map(|data| Event::ImageFetched { data }),
        1 => "[a-z ]{0,12}".prop_map(|reason| Event::ImageFetchFailed { reason }),
    ]
}

fn skip_spelling() -> impl Strategy<Value = String> {
    proptest::collection::vec(any::<bool>(), 4).prop_map(|upper| {
        "skip"
            .chars()
            .zip(upper)
            .map(|(c, up)| if up { c.to_ascii_uppercase() } else { c })
            .collect()
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // User input is never rejected; every input gets at least one effect
    #[test]
    fn prop_user_input_always_answered(state in arb_state(), event in arb_user_input()) {
        let result = transition(&state, event);
        prop_assert!(result.is_ok(), "User input rejected: {result:?}");
        prop_assert!(!result.unwrap().effects.is_empty());
    }

    // The phone from the latest shared contact survives every registration step
    #[test]
    fn prop_registration_keeps_contact_phone(events in proptest::collection::vec(arb_event(), 0..30)) {
        let mut state = WorkflowState::Idle;
        let mut phone: Option<String> = None;
        for event in events {
            if let Event::ContactShared { phone: p, .. } = &event {
                phone = Some(p.clone());
            }
            if let Ok(result) = transition(&state, event) {
                state = result.new_state;
            }
            if let Some(draft) = state.draft() {
                prop_assert_eq!(Some(&draft.phone), phone.as_ref());
            }
        }
    }

    // Text in AwaitingAddress is always taken as the address, never skipped past
    #[test]
    fn prop_address_text_advances_to_email(draft in arb_draft(), text in "[A-Za-z0-9@. ]{0,30}") {
        let state = WorkflowState::AwaitingAddress { draft: draft.clone() };
        let result = transition(&state, Event::Text { text: text.clone() }).unwrap();
        let expected = RegistrationDraft { address: text, ..draft };
        prop_assert_eq!(result.new_state, WorkflowState::AwaitingEmail { draft: expected });
    }

    // Any capitalisation of "skip" submits without an image and without a download
    #[test]
    fn prop_skip_never_fetches(draft in arb_draft(), skip in skip_spelling()) {
        let state = WorkflowState::AwaitingImage { draft };
        let result = transition(&state, Event::Text { text: skip }).unwrap();
        prop_assert_eq!(&result.new_state, &WorkflowState::Idle);
        let fetched = result.effects.iter().any(|e| matches!(e, Effect::FetchImage { .. }));
        prop_assert!(!fetched);
        let submitted_without_image = result.effects.iter().any(|e| matches!(
            e,
            Effect::SubmitRegistration { draft } if draft.image.is_none()
        ));
        prop_assert!(submitted_without_image);
    }

    // Registration outcomes always land in Idle
    #[test]
    fn prop_registration_outcome_resets(state in arb_state(), field in "[a-z]{1,8}", msg in "[a-z ]{1,16}") {
        let mut errors = FieldErrors::new();
        errors.insert(field, vec![msg.clone()]);
        for outcome in [
            RegistrationOutcome::Rejected(errors.clone()),
            RegistrationOutcome::Failed(msg.clone()),
            RegistrationOutcome::Registered { first_name: msg.clone() },
        ] {
            let result = transition(&state, Event::RegistrationSubmitted { outcome }).unwrap();
            prop_assert_eq!(result.new_state, WorkflowState::Idle);
        }
    }

    // A failed account update never leaves the editing state
    #[test]
    fn prop_failed_update_holds_position(target in arb_target(), reason in "[a-z ]{0,16}") {
        let state = WorkflowState::EditingField { target };
        let result = transition(&state, Event::AccountUpdated { outcome: UpdateOutcome::Failed(reason) }).unwrap();
        prop_assert_eq!(result.new_state, state);
    }
}
