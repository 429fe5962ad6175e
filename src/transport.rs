//! Chat transport boundary
//!
//! The bot core sees the chat platform through [`Transport`]: send a message
//! with optional controls, replace the controls on an earlier message, upload
//! a photo, download a user file and acknowledge a control press. Inbound
//! traffic arrives already normalized into [`Inbound`] events.

mod telegram;
mod types;

pub use telegram::{TelegramTransport, Update};
pub use types::*;

use crate::session::{ArtifactId, SessionKey};
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Chat API error {code}: {description}")]
    Api { code: i64, description: String },
    #[error("Unexpected response: {0}")]
    Decode(String),
    #[error("File error: {0}")]
    File(#[from] std::io::Error),
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a message; returns the artifact id of the sent message.
    async fn send(&self, session: SessionKey, message: OutgoingMessage) -> Result<ArtifactId, TransportError>;

    /// Replace the inline controls of a previously sent message.
    async fn edit_controls(
        &self,
        session: SessionKey,
        artifact: ArtifactId,
        keyboard: InlineKeyboard,
    ) -> Result<(), TransportError>;

    /// Upload a local image file.
    async fn send_photo(&self, session: SessionKey, path: &Path) -> Result<(), TransportError>;

    /// Download a file the user sent.
    async fn fetch_file(&self, file_id: &str) -> Result<Vec<u8>, TransportError>;

    /// Acknowledge a control press so the client stops its spinner.
    async fn acknowledge(&self, callback_id: &str) -> Result<(), TransportError>;
}
