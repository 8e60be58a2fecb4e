use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{NewsItem, PricePoint, Quote};

/// Raw daily candle payload as returned by the primary provider.
///
/// Nothing here has been validated yet: the arrays may be empty, of different
/// lengths, or contain nulls. See `market_data_service::is_usable_candle_series`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandleSeries {
    pub timestamps: Vec<i64>,
    pub closes: Vec<Option<f64>>,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("rate limited")]
    RateLimited,

    #[error("unexpected HTTP status {0}")]
    BadStatus(u16),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("no data returned")]
    NoData,
}

impl ProviderError {
    /// Maps a reqwest transport failure onto the provider taxonomy.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_decode() {
            ProviderError::MalformedPayload(err.to_string())
        } else {
            ProviderError::Network(err.to_string())
        }
    }

    /// Structurally invalid response, as opposed to the upstream being unreachable.
    pub fn is_malformed(&self) -> bool {
        matches!(self, ProviderError::MalformedPayload(_) | ProviderError::NoData)
    }
}

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    fn is_configured(&self) -> bool {
        true
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, ProviderError>;
}

#[async_trait]
pub trait CandleProvider: Send + Sync {
    fn is_configured(&self) -> bool {
        true
    }

    async fn fetch_daily_candles(
        &self,
        symbol: &str,
        from_unix: i64,
        to_unix: i64,
    ) -> Result<CandleSeries, ProviderError>;
}

/// One tier of the price-history fallback chain.
///
/// Every tier answers the same question (daily closes over a trailing window)
/// so the chain can treat them uniformly: an error or an empty series means
/// "unusable, try the next one".
#[async_trait]
pub trait PriceHistorySource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_daily_closes(
        &self,
        symbol: &str,
        window_days: u32,
    ) -> Result<Vec<PricePoint>, ProviderError>;
}

#[async_trait]
pub trait NewsProvider: Send + Sync {
    fn is_configured(&self) -> bool {
        true
    }

    async fn fetch_company_news(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NewsItem>, ProviderError>;
}

/// Compound polarity estimate over free text, in [-1, 1].
pub trait TextScorer: Send + Sync {
    fn score(&self, text: &str) -> f64;
}
