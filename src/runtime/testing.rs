//! Mock implementations for testing
//!
//! These mocks enable integration testing without real I/O.

use crate::backend::{ApiError, ApiRequest, ApiResponse, HttpBackend, RequestBody};
use crate::session::{ArtifactId, SessionKey};
use crate::transport::{InlineKeyboard, OutgoingMessage, Transport, TransportError};
use async_trait::async_trait;
use reqwest::Method;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

// ============================================================================
// Mock Backend
// ============================================================================

/// Request as seen by the mock backend
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub bearer: Option<String>,
    pub body: RequestBody,
}

#[derive(Default)]
struct BackendState {
    routes: HashMap<String, ApiResponse>,
    queue: VecDeque<ApiResponse>,
    fallback: Option<ApiResponse>,
    requests: Vec<RecordedRequest>,
}

/// Mock shop backend.
///
/// A request is answered by its path route if one is set, otherwise by the
/// next queued response, otherwise by the fallback. With none of these the
/// request fails as a transport error.
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<BackendState>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a one-shot response
    #[must_use]
    pub fn push(self, response: ApiResponse) -> Self {
        self.state.lock().unwrap().queue.push_back(response);
        self
    }

    /// Answer every request for `path` with `response`
    #[must_use]
    pub fn on(self, path: &str, response: ApiResponse) -> Self {
        self.state.lock().unwrap().routes.insert(path.to_string(), response);
        self
    }

    #[must_use]
    pub fn with_fallback(self, response: ApiResponse) -> Self {
        self.state.lock().unwrap().fallback = Some(response);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn count_path(&self, path: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|r| r.path == path)
            .count()
    }
}

#[async_trait]
impl HttpBackend for MockBackend {
    async fn send(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<ApiResponse, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(RecordedRequest {
            method: request.method.clone(),
            path: request.path.clone(),
            query: request.query.clone(),
            bearer: bearer.map(str::to_string),
            body: request.body.clone(),
        });
        if let Some(response) = state.routes.get(&request.path) {
            return Ok(response.clone());
        }
        if let Some(response) = state.queue.pop_front() {
            return Ok(response);
        }
        state
            .fallback
            .clone()
            .ok_or_else(|| ApiError::transport(format!("No mock response for {}", request.path)))
    }
}

// ============================================================================
// Mock Transport
// ============================================================================

#[derive(Debug, Clone)]
pub struct SentMessage {
    pub session: SessionKey,
    pub artifact: ArtifactId,
    pub message: OutgoingMessage,
}

#[derive(Debug, Clone)]
pub struct ControlEdit {
    pub session: SessionKey,
    pub artifact: ArtifactId,
    pub keyboard: InlineKeyboard,
}

struct TransportState {
    next_artifact: i64,
    sent: Vec<SentMessage>,
    edits: Vec<ControlEdit>,
    photos: Vec<(SessionKey, PathBuf)>,
    fetches: Vec<String>,
    acks: Vec<String>,
    files: HashMap<String, Vec<u8>>,
}

/// Mock chat transport that records everything and hands out artifact ids
/// starting at 100.
#[derive(Clone)]
pub struct MockTransport {
    state: Arc<Mutex<TransportState>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(TransportState {
                next_artifact: 100,
                sent: Vec::new(),
                edits: Vec::new(),
                photos: Vec::new(),
                fetches: Vec::new(),
                acks: Vec::new(),
                files: HashMap::new(),
            })),
        }
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `file_id` downloadable
    #[must_use]
    pub fn with_file(self, file_id: &str, bytes: &[u8]) -> Self {
        self.state
            .lock()
            .unwrap()
            .files
            .insert(file_id.to_string(), bytes.to_vec());
        self
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|s| s.message.text).collect()
    }

    pub fn edits(&self) -> Vec<ControlEdit> {
        self.state.lock().unwrap().edits.clone()
    }

    pub fn photos(&self) -> Vec<(SessionKey, PathBuf)> {
        self.state.lock().unwrap().photos.clone()
    }

    pub fn fetches(&self) -> Vec<String> {
        self.state.lock().unwrap().fetches.clone()
    }

    pub fn acks(&self) -> Vec<String> {
        self.state.lock().unwrap().acks.clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, session: SessionKey, message: OutgoingMessage) -> Result<ArtifactId, TransportError> {
        let mut state = self.state.lock().unwrap();
        let artifact = ArtifactId(state.next_artifact);
        state.next_artifact += 1;
        state.sent.push(SentMessage {
            session,
            artifact,
            message,
        });
        Ok(artifact)
    }

    async fn edit_controls(
        &self,
        session: SessionKey,
        artifact: ArtifactId,
        keyboard: InlineKeyboard,
    ) -> Result<(), TransportError> {
        self.state.lock().unwrap().edits.push(ControlEdit {
            session,
            artifact,
            keyboard,
        });
        Ok(())
    }

    async fn send_photo(&self, session: SessionKey, path: &Path) -> Result<(), TransportError> {
        self.state.lock().unwrap().photos.push((session, path.to_path_buf()));
        Ok(())
    }

    async fn fetch_file(&self, file_id: &str) -> Result<Vec<u8>, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.fetches.push(file_id.to_string());
        state.files.get(file_id).cloned().ok_or_else(|| TransportError::Api {
            code: 400,
            description: "Bad Request: invalid file_id".to_string(),
        })
    }

    async fn acknowledge(&self, callback_id: &str) -> Result<(), TransportError> {
        self.state.lock().unwrap().acks.push(callback_id.to_string());
        Ok(())
    }
}
