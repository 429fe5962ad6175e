//! Webhook HTTP API
//!
//! Telegram pushes updates to `POST /telegram/webhook`; they are normalized
//! and queued for the bot worker exactly like long-polled updates.

mod handlers;

pub use handlers::create_router;

use crate::transport::Inbound;
use tokio::sync::mpsc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub queue: mpsc::Sender<Inbound>,
}

impl AppState {
    pub fn new(queue: mpsc::Sender<Inbound>) -> Self {
        Self { queue }
    }
}
