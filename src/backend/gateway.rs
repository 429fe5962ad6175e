//! Authenticated request execution with a single refresh-and-retry

use super::{is_auth_failure, ApiError, ApiRequest, ApiResponse, HttpBackend};
use crate::session::{SessionKey, SessionStore};
use serde_json::Value;
use std::sync::Arc;

/// Position in the refresh-and-retry sequence of one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    /// First send with the stored token
    Fresh,
    /// Re-send after one refresh
    Retried,
}

/// What to do with a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Deliver,
    RefreshAndRetry,
    GiveUp,
}

impl Attempt {
    pub fn step(self, auth_failed: bool) -> Step {
        match (self, auth_failed) {
            (_, false) => Step::Deliver,
            (Attempt::Fresh, true) => Step::RefreshAndRetry,
            (Attempt::Retried, true) => Step::GiveUp,
        }
    }
}

pub struct ApiGateway {
    backend: Arc<dyn HttpBackend>,
    sessions: Arc<SessionStore>,
}

impl ApiGateway {
    pub fn new(backend: Arc<dyn HttpBackend>, sessions: Arc<SessionStore>) -> Self {
        Self { backend, sessions }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Send an authenticated request on behalf of `session`.
    ///
    /// Returns the response for any 2xx status; everything else is classified
    /// into an [`ApiError`]. An auth failure triggers exactly one refresh and
    /// one retry; a second auth failure is terminal.
    pub async fn execute(&self, session: SessionKey, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut attempt = Attempt::Fresh;
        loop {
            let token = self.sessions.token(session).await;
            let response = self.backend.send(request, token.as_deref()).await?;
            let auth_failed = is_auth_failure(response.status, &response.body);

            match attempt.step(auth_failed) {
                Step::Deliver => return classify(response),
                Step::RefreshAndRetry => {
                    let Some(expired) = token else {
                        tracing::info!(%session, path = %request.path, "No token for authenticated call");
                        return Err(ApiError::auth_expired("Not authenticated").with_status(response.status));
                    };
                    tracing::info!(%session, path = %request.path, "Token expired, refreshing");
                    self.refresh(session, &expired).await?;
                    attempt = Attempt::Retried;
                }
                Step::GiveUp => {
                    tracing::warn!(%session, path = %request.path, "Still unauthenticated after refresh");
                    return Err(ApiError::auth_expired("Token has expired").with_status(response.status));
                }
            }
        }
    }

    /// Send a request without credentials (registration, login).
    pub async fn execute_public(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        classify(self.backend.send(request, None).await?)
    }

    async fn refresh(&self, session: SessionKey, expired: &str) -> Result<(), ApiError> {
        let response = self
            .backend
            .send(&ApiRequest::post("/refresh"), Some(expired))
            .await
            .map_err(|e| {
                tracing::warn!(%session, error = %e, "Token refresh did not complete");
                ApiError::auth_expired(format!("Token refresh failed: {}", e.message))
            })?;
        if response.status != 200 {
            tracing::warn!(%session, status = response.status, "Token refresh rejected");
            return Err(
                ApiError::auth_expired(format!("Token refresh failed (HTTP {})", response.status))
                    .with_status(response.status),
            );
        }

        let token = refreshed_token(&response)
            .ok_or_else(|| ApiError::auth_expired("Token refresh returned no token").with_status(200))?;
        self.sessions.set_token(session, token).await;
        tracing::debug!(%session, "Token refreshed");
        Ok(())
    }
}

fn classify(response: ApiResponse) -> Result<ApiResponse, ApiError> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(ApiError::from_response(response.status, &response.body))
    }
}

/// New token from the `Authorization: Bearer` header, else from the body.
fn refreshed_token(response: &ApiResponse) -> Option<String> {
    let from_header = response
        .authorization
        .as_deref()
        .and_then(|h| h.strip_prefix("Bearer ").or_else(|| h.strip_prefix("bearer ")))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = from_header {
        return Some(token.to_string());
    }

    let body: Value = serde_json::from_str(&response.body).ok()?;
    let token = [
        body.pointer("/data/token"),
        body.get("data"),
        body.get("token"),
        body.get("access_token"),
    ]
    .into_iter()
    .flatten()
    .find_map(|v| v.as_str().filter(|t| !t.is_empty()))
    .map(str::to_string);
    token
}
