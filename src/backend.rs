//! Commerce backend access
//!
//! Every authenticated call goes through [`ApiGateway`], which attaches the
//! session's bearer token and performs at most one refresh-and-retry when the
//! backend reports an expired token.

mod client;
mod error;
mod gateway;
mod http;
mod types;

pub use client::ShopApi;
pub use error::{is_auth_failure, ApiError, ApiErrorKind, FieldErrors};
pub use gateway::ApiGateway;
pub use http::{ApiRequest, ApiResponse, FormPart, RequestBody, ReqwestBackend};
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Raw HTTP access to the backend.
///
/// Implementations return every HTTP status as an [`ApiResponse`]; only
/// failures to complete the exchange (connect, timeout, body read) are errors.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    async fn send(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<ApiResponse, ApiError>;
}

/// Logging wrapper for backends
pub struct LoggingBackend {
    inner: Arc<dyn HttpBackend>,
}

impl LoggingBackend {
    pub fn new(inner: Arc<dyn HttpBackend>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl HttpBackend for LoggingBackend {
    async fn send(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<ApiResponse, ApiError> {
        let start = std::time::Instant::now();
        let result = self.inner.send(request, bearer).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    method = %request.method,
                    path = %request.path,
                    status = response.status,
                    authenticated = bearer.is_some(),
                    duration_ms = %duration.as_millis(),
                    "Backend request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    method = %request.method,
                    path = %request.path,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    "Backend request failed"
                );
            }
        }

        result
    }
}
