//! shopbot - Telegram storefront for a commerce backend
//!
//! Users register or log in through the chat, browse and search products,
//! keep a cart and place orders. All commerce state lives in the backend; the
//! bot keeps only per-chat session state in memory.

mod api;
mod backend;
mod cart;
mod config;
mod media;
mod runtime;
mod session;
mod transport;
mod workflow;

use api::{create_router, AppState};
use backend::{ApiGateway, HttpBackend, LoggingBackend, ReqwestBackend, ShopApi};
use config::BotConfig;
use media::ImageCache;
use runtime::Bot;
use session::SessionStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use transport::TelegramTransport;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shopbot=info,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = BotConfig::from_env()?;
    tracing::info!(
        api_url = %config.api_url,
        page_size = config.page_size,
        image_dir = %config.image_dir.display(),
        webhook = ?config.webhook_addr,
        "Configuration loaded"
    );

    // Backend access
    let sessions = Arc::new(SessionStore::new());
    let http: Arc<dyn HttpBackend> = Arc::new(LoggingBackend::new(Arc::new(ReqwestBackend::new(
        config.api_url.clone(),
        config.http_timeout,
    )?)));
    let gateway = Arc::new(ApiGateway::new(http, sessions.clone()));
    let api = ShopApi::new(gateway);

    // Chat transport; long polls hold the connection for the poll timeout
    let transport = Arc::new(TelegramTransport::new(
        config.telegram_token.clone(),
        Duration::from_secs(config.poll_timeout_secs) + config.http_timeout,
    )?);
    let images = ImageCache::new(config.image_dir.clone(), config.http_timeout)?;

    let bot = Bot::new(sessions, api, transport.clone(), images, config.page_size);

    let cancel = CancellationToken::new();
    let (queue, inbound) = mpsc::channel(runtime::QUEUE_CAPACITY);
    let worker = tokio::spawn(runtime::run_worker(bot, inbound, cancel.clone()));

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                return;
            }
            tracing::info!("Shutdown requested");
            cancel.cancel();
        });
    }

    if let Some(addr) = config.webhook_addr {
        let app = create_router(AppState::new(queue));
        tracing::info!(%addr, "Webhook server listening");
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let shutdown = cancel.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;
    } else {
        runtime::poll_updates(transport, queue, config.poll_timeout_secs, cancel.clone()).await;
    }

    // Let the worker finish the event it is handling
    cancel.cancel();
    worker.await?;
    tracing::info!("shopbot stopped");
    Ok(())
}
