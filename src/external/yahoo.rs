use async_trait::async_trait;
use chrono::{Duration, Utc};
use time::OffsetDateTime;
use tracing::warn;
use yahoo_finance_api as yahoo;

use crate::external::provider::{PriceHistorySource, ProviderError};
use crate::models::{normalize_series, PricePoint};
use crate::utils::utc_date;

/// Structured historical query against Yahoo Finance through `yahoo_finance_api`.
///
/// First secondary tier; the raw chart endpoint follows it in the chain.
pub struct YahooHistoryProvider {
    connector: yahoo::YahooConnector,
}

impl YahooHistoryProvider {
    pub fn new(timeout: std::time::Duration) -> Result<Self, ProviderError> {
        let connector = yahoo::YahooConnector::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Network(format!("Failed to initialize Yahoo connector: {}", e)))?;
        Ok(Self { connector })
    }
}

#[async_trait]
impl PriceHistorySource for YahooHistoryProvider {
    fn name(&self) -> &'static str {
        "yahoo-history"
    }

    async fn fetch_daily_closes(
        &self,
        symbol: &str,
        window_days: u32,
    ) -> Result<Vec<PricePoint>, ProviderError> {
        let end = Utc::now();
        let start = end - Duration::days(i64::from(window_days));

        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| ProviderError::MalformedPayload(format!("Invalid start timestamp: {}", e)))?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| ProviderError::MalformedPayload(format!("Invalid end timestamp: {}", e)))?;

        let response = self
            .connector
            .get_quote_history(symbol, start_odt, end_odt)
            .await
            .map_err(|e| match e {
                yahoo::YahooError::NoQuotes
                | yahoo::YahooError::NoResult => ProviderError::NoData,
                other => ProviderError::Network(other.to_string()),
            })?;

        let quotes = match response.quotes() {
            Ok(quotes) => quotes,
            Err(yahoo::YahooError::NoQuotes) => return Ok(Vec::new()),
            Err(e) => return Err(ProviderError::MalformedPayload(e.to_string())),
        };

        let points = quotes
            .iter()
            .filter_map(|q| {
                let point = utc_date(q.timestamp as i64)
                    .and_then(|date| PricePoint::from_close(date, q.close));
                if point.is_none() {
                    warn!("Skipping unusable Yahoo quote for {} at {}", symbol, q.timestamp);
                }
                point
            })
            .collect();

        Ok(normalize_series(points))
    }
}
