use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{info, warn};

use crate::external::provider::{CandleProvider, CandleSeries, PriceHistorySource, ProviderError, QuoteProvider};
use crate::models::{normalize_series, PricePoint, Quote};
use crate::utils::utc_date;

/// Per-tier limit for fallback sources unless overridden with `with_timeout`
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Market Data Gateway.
///
/// Strategy for daily closes:
/// 1. Primary candle endpoint for the trailing window, accepted only if the
///    payload passes `is_usable_candle_series`
/// 2. Otherwise each fallback source in order; the first non-empty series wins
/// 3. Otherwise an empty series
///
/// Nothing here ever returns an error to the caller. Every provider failure is
/// logged and degrades to absent or empty data. A fallback tier that does not
/// answer within `fetch_timeout` counts as a failure.
pub struct MarketDataService {
    quotes: Arc<dyn QuoteProvider>,
    candles: Arc<dyn CandleProvider>,
    fallbacks: Vec<Arc<dyn PriceHistorySource>>,
    fetch_timeout: Duration,
}

impl MarketDataService {
    pub fn new(
        quotes: Arc<dyn QuoteProvider>,
        candles: Arc<dyn CandleProvider>,
        fallbacks: Vec<Arc<dyn PriceHistorySource>>,
    ) -> Self {
        Self {
            quotes,
            candles,
            fallbacks,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.quotes.is_configured() && self.candles.is_configured()
    }

    /// Best-effort live quote; absent price on any provider error.
    pub async fn get_quote(&self, symbol: &str) -> Quote {
        match self.quotes.fetch_quote(symbol).await {
            Ok(quote) => quote,
            Err(e) => {
                warn!("Quote fetch failed for {}: {}", symbol, e);
                Quote::absent()
            }
        }
    }

    /// Raw candle call, unvalidated. Paired with `resolve_price_history`.
    pub async fn fetch_candles(
        &self,
        symbol: &str,
        from_unix: i64,
        to_unix: i64,
    ) -> Result<CandleSeries, ProviderError> {
        self.candles.fetch_daily_candles(symbol, from_unix, to_unix).await
    }

    /// Full gateway operation: candles for the window, then the fallback chain.
    pub async fn get_daily_closes(
        &self,
        symbol: &str,
        from_unix: i64,
        to_unix: i64,
        window_days: u32,
    ) -> Vec<PricePoint> {
        let candles = self.fetch_candles(symbol, from_unix, to_unix).await;
        self.resolve_price_history(symbol, candles, window_days).await
    }

    /// Trusts the candle payload when it is well formed, otherwise walks the fallback chain.
    pub async fn resolve_price_history(
        &self,
        symbol: &str,
        candles: Result<CandleSeries, ProviderError>,
        window_days: u32,
    ) -> Vec<PricePoint> {
        match candles {
            Ok(series) if is_usable_candle_series(&series) => {
                let points = candle_series_to_points(&series);
                info!("✓ Using {} primary candle points for {}", points.len(), symbol);
                return points;
            }
            Ok(_) => {
                warn!("Candle payload for {} is unusable, switching to fallback sources", symbol);
            }
            Err(e) => {
                warn!("Candle fetch failed for {}: {}", symbol, e);
            }
        }

        self.fallback_history(symbol, window_days).await
    }

    /// Walks the fallback sources in order. Errors, timeouts and empty series all mean "try the next one".
    pub async fn fallback_history(&self, symbol: &str, window_days: u32) -> Vec<PricePoint> {
        for source in &self.fallbacks {
            let fetched = timeout(self.fetch_timeout, source.fetch_daily_closes(symbol, window_days))
                .await
                .unwrap_or(Err(ProviderError::Timeout));

            match fetched {
                Ok(points) if !points.is_empty() => {
                    info!("✓ Fetched {} price points for {} from {}", points.len(), symbol, source.name());
                    return normalize_series(points);
                }
                Ok(_) => {
                    info!("No price data for {} from {}, trying next source", symbol, source.name());
                }
                Err(e) => {
                    warn!("{} failed for {}: {}", source.name(), symbol, e);
                }
            }
        }

        warn!("All price history sources exhausted for {}", symbol);
        Vec::new()
    }
}

/// Well-formedness check for a raw candle payload: non-empty, equal-length
/// timestamp and close arrays with at least one finite close.
pub fn is_usable_candle_series(series: &CandleSeries) -> bool {
    if series.timestamps.is_empty() || series.closes.is_empty() {
        return false;
    }
    if series.timestamps.len() != series.closes.len() {
        return false;
    }
    series
        .closes
        .iter()
        .any(|c| c.map(f64::is_finite).unwrap_or(false))
}

/// Converts a validated candle payload, dropping null or non-finite closes.
pub fn candle_series_to_points(series: &CandleSeries) -> Vec<PricePoint> {
    let points = series
        .timestamps
        .iter()
        .zip(series.closes.iter())
        .filter_map(|(ts, close)| PricePoint::from_close(utc_date(*ts)?, (*close)?))
        .collect();
    normalize_series(points)
}
