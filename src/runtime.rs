//! Bot runtime
//!
//! Inbound events from either the webhook or the long-poll loop land on one
//! bounded queue. A single worker drains it, so events are handled one at a
//! time in arrival order and no session ever sees two handlers at once.

mod actions;
mod executor;
mod render;

#[cfg(test)]
pub mod testing;

pub use executor::Bot;

use crate::transport::{Inbound, TelegramTransport, Transport};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Capacity of the inbound queue
pub const QUEUE_CAPACITY: usize = 256;

const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Handle queued events until cancelled or every sender is gone. An event
/// already being handled is always finished.
pub async fn run_worker<T: Transport>(bot: Bot<T>, mut inbound: mpsc::Receiver<Inbound>, cancel: CancellationToken) {
    tracing::info!("Bot worker started");
    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            next = inbound.recv() => match next {
                Some(event) => bot.handle(event).await,
                None => break,
            },
        }
    }
    tracing::info!("Bot worker stopped");
}

/// Long-poll the chat API and feed updates into the queue.
pub async fn poll_updates(
    transport: Arc<TelegramTransport>,
    queue: mpsc::Sender<Inbound>,
    timeout_secs: u64,
    cancel: CancellationToken,
) {
    let mut offset = 0;
    tracing::info!(timeout_secs, "Long polling started");
    loop {
        let updates = tokio::select! {
            () = cancel.cancelled() => break,
            result = transport.get_updates(offset, timeout_secs) => result,
        };

        match updates {
            Ok(updates) => {
                for update in updates {
                    let update_id = update.update_id;
                    offset = offset.max(update_id + 1);
                    let Some(event) = update.into_inbound() else {
                        tracing::debug!(update_id, "Ignoring unsupported update");
                        continue;
                    };
                    if queue.send(event).await.is_err() {
                        tracing::warn!("Worker queue closed, stopping poller");
                        return;
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Polling failed, retrying");
                tokio::select! {
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(POLL_RETRY_DELAY) => {}
                }
            }
        }
    }
    tracing::info!("Long polling stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ApiGateway, ShopApi};
    use crate::media::ImageCache;
    use crate::runtime::testing::{MockBackend, MockTransport};
    use crate::session::{SessionKey, SessionStore};
    use crate::transport::MessageContent;

    fn bot(transport: &MockTransport) -> Bot<MockTransport> {
        let sessions = Arc::new(SessionStore::new());
        let gateway = Arc::new(ApiGateway::new(Arc::new(MockBackend::new()), sessions.clone()));
        let images = ImageCache::new(std::env::temp_dir().join("shopbot-worker-test"), Duration::from_secs(1)).unwrap();
        Bot::new(sessions, ShopApi::new(gateway), Arc::new(transport.clone()), images, 5)
    }

    fn command(session: i64, name: &str) -> Inbound {
        Inbound::Message {
            session: SessionKey(session),
            content: MessageContent::Command {
                name: name.to_string(),
                args: vec![],
            },
        }
    }

    #[tokio::test]
    async fn test_worker_handles_events_in_order_then_stops() {
        let transport = MockTransport::new();
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        tx.send(command(1, "start")).await.unwrap();
        tx.send(command(2, "menu")).await.unwrap();
        drop(tx);

        run_worker(bot(&transport), rx, CancellationToken::new()).await;

        let sent = transport.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].session, SessionKey(1));
        assert!(sent[0].message.text.starts_with("Welcome"));
        assert_eq!(sent[1].session, SessionKey(2));
        assert_eq!(sent[1].message.text, "Please choose an option:");
    }

    #[tokio::test]
    async fn test_worker_stops_on_cancel() {
        let transport = MockTransport::new();
        let (_tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        let cancel = CancellationToken::new();
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(1), run_worker(bot(&transport), rx, cancel))
            .await
            .unwrap();
        assert!(transport.sent().is_empty());
    }
}
