use std::net::SocketAddr;
use std::time::Duration;

use crate::external::{finnhub, yahoo_chart};

/// Environment variables checked, in order, for the Finnhub key
const FINNHUB_KEY_VARS: [&str; 3] = ["FINNHUB_API_KEY", "Finnhub_API_key", "FINNHUB_KEY"];

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub finnhub_api_key: Option<String>,
    pub finnhub_base_url: String,
    pub yahoo_chart_base_url: String,
    pub bind_addr: SocketAddr,
    pub upstream_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let finnhub_api_key = FINNHUB_KEY_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .map(|key| key.trim().to_string())
            .find(|key| !key.is_empty());

        Self {
            finnhub_api_key,
            finnhub_base_url: lookup("FINNHUB_BASE_URL")
                .unwrap_or_else(|| finnhub::DEFAULT_BASE_URL.to_string()),
            yahoo_chart_base_url: lookup("YAHOO_CHART_BASE_URL")
                .unwrap_or_else(|| yahoo_chart::DEFAULT_BASE_URL.to_string()),
            bind_addr: lookup("BIND_ADDR")
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8000))),
            upstream_timeout: Duration::from_secs(
                lookup("UPSTREAM_TIMEOUT_SECS")
                    .and_then(|s| s.parse::<u64>().ok())
                    .filter(|secs| *secs > 0)
                    .unwrap_or(30),
            ),
        }
    }
}
