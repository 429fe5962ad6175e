//! Backend error types

use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Field name to validation messages, as returned in a 422 body.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Backend error with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
    /// HTTP status, when the error came from a response
    pub status: Option<u16>,
    /// Populated for `Validation` errors only
    pub field_errors: FieldErrors,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            field_errors: FieldErrors::new(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Transport, message)
    }

    pub fn auth_expired(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::AuthExpired, message)
    }

    pub fn validation(message: impl Into<String>, field_errors: FieldErrors) -> Self {
        Self {
            field_errors,
            ..Self::new(ApiErrorKind::Validation, message)
        }
    }

    pub fn api(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Api, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Decode, message)
    }

    pub fn is_validation(&self) -> bool {
        self.kind == ApiErrorKind::Validation
    }

    pub fn is_terminal_auth(&self) -> bool {
        self.kind == ApiErrorKind::AuthExpired
    }

    /// Classify a non-success response.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();

        match status {
            401 => Self::auth_expired(
                parsed
                    .and_then(|b| b.message)
                    .unwrap_or_else(|| "Unauthenticated.".to_string()),
            )
            .with_status(status),
            422 => {
                let (message, errors) = match parsed {
                    Some(ErrorBody { message, errors }) => {
                        let errors = errors.unwrap_or_default();
                        // Cart endpoints report their failure under the "cart" key
                        let message = errors
                            .get("cart")
                            .and_then(|msgs| msgs.first())
                            .cloned()
                            .or(message)
                            .unwrap_or_else(|| "Validation error".to_string());
                        (message, errors)
                    }
                    None => ("Validation error".to_string(), FieldErrors::new()),
                };
                Self::validation(message, errors).with_status(status)
            }
            _ => {
                let message = parsed
                    .and_then(|b| b.message)
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| {
                        if body.trim().is_empty() {
                            format!("HTTP {status}")
                        } else {
                            body.trim().to_string()
                        }
                    });
                Self::api(message).with_status(status)
            }
        }
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Connection failure, timeout, unreadable body
    Transport,
    /// Token expired and the single refresh-and-retry did not help
    AuthExpired,
    /// 422 with a field to messages map
    Validation,
    /// Any other non-success status
    Api,
    /// Success status but the body did not match the expected shape
    Decode,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<FieldErrors>,
}

/// Whether a response means the bearer token is no longer accepted.
pub fn is_auth_failure(status: u16, body: &str) -> bool {
    if status == 401 {
        return true;
    }
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .is_some_and(|m| {
            let m = m.trim().to_ascii_lowercase();
            m == "token has expired" || m == "unauthenticated."
        })
}
