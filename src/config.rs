//! Bot configuration from environment variables

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    pub telegram_token: String,
    pub api_url: String,
    /// Deadline for every backend call
    pub http_timeout: Duration,
    pub page_size: u32,
    pub image_dir: PathBuf,
    pub poll_timeout_secs: u64,
    /// Serve the webhook here instead of long polling
    pub webhook_addr: Option<SocketAddr>,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let telegram_token = var("TELEGRAM_BOT_TOKEN").ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;
        let api_url = var("SHOPBOT_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let http_timeout = Duration::from_secs(parse_or(&var, "SHOPBOT_HTTP_TIMEOUT_SECS", 10)?);
        let page_size = parse_or(&var, "SHOPBOT_PAGE_SIZE", 5)?;
        if page_size == 0 {
            return Err(ConfigError::Invalid {
                name: "SHOPBOT_PAGE_SIZE",
                value: "0".to_string(),
            });
        }
        let image_dir = var("SHOPBOT_IMAGE_DIR").map_or_else(|| PathBuf::from("images"), PathBuf::from);
        let poll_timeout_secs = parse_or(&var, "SHOPBOT_POLL_TIMEOUT_SECS", 60)?;
        let webhook_addr = var("SHOPBOT_WEBHOOK_ADDR")
            .map(|v| parse("SHOPBOT_WEBHOOK_ADDR", v))
            .transpose()?;

        Ok(Self {
            telegram_token,
            api_url,
            http_timeout,
            page_size,
            image_dir,
            poll_timeout_secs,
            webhook_addr,
        })
    }
}

fn parse<T: FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid { name, value })
}

fn parse_or<T: FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    var(name).map_or(Ok(default), |v| parse(name, v))
}
