use anyhow::{Context, Result};
use log::info;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use url::Url;

const DEFAULT_WS_ADDR: &str = "0.0.0.0:9002";
const DEFAULT_HEALTH_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_TRIVIA_API_BASE_URL: &str = "https://opentdb.com/";
const DEFAULT_TRIVIA_API_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub ws_addr: SocketAddr,
    pub health_addr: SocketAddr,
    pub trivia_base_url: Url,
    pub trivia_timeout: Duration,
}

impl AppConfig {
    /// Read settings from the environment, falling back to defaults for
    /// anything unset or empty.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let ws_addr = get("QUIZ_WS_ADDR", DEFAULT_WS_ADDR)
            .parse()
            .context("QUIZ_WS_ADDR must be a socket address")?;
        let health_addr = get("QUIZ_HEALTH_ADDR", DEFAULT_HEALTH_ADDR)
            .parse()
            .context("QUIZ_HEALTH_ADDR must be a socket address")?;

        let mut base = get("TRIVIA_API_BASE_URL", DEFAULT_TRIVIA_API_BASE_URL);
        // Url::join drops the last path segment unless it ends with a slash
        if !base.ends_with('/') {
            base.push('/');
        }
        let trivia_base_url = Url::parse(&base).context("TRIVIA_API_BASE_URL must be a URL")?;

        let timeout_secs: u64 = get(
            "TRIVIA_API_TIMEOUT_SECS",
            &DEFAULT_TRIVIA_API_TIMEOUT_SECS.to_string(),
        )
        .parse()
        .context("TRIVIA_API_TIMEOUT_SECS must be a whole number of seconds")?;

        let config = AppConfig {
            ws_addr,
            health_addr,
            trivia_base_url,
            trivia_timeout: Duration::from_secs(timeout_secs),
        };
        info!("Loaded config: {config:?}");
        Ok(config)
    }
}
