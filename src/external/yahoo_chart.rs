use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::external::provider::{PriceHistorySource, ProviderError};
use crate::models::{normalize_series, PricePoint};
use crate::utils::utc_date;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Last-resort price history: the raw Yahoo v8 chart endpoint, parsed by hand.
///
/// No API key required. Yahoo rejects requests without a browser-like
/// User-Agent, so the client always sends one.
pub struct YahooChartProvider {
    client: reqwest::Client,
    base_url: String,
}

impl YahooChartProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64)")
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Network(format!("Failed to build Yahoo chart client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Option<YahooIndicators>,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    #[serde(default)]
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Pairs timestamps with closes index by index, skipping null closes.
///
/// A missing result, missing indicators or an empty quote list all yield an
/// empty series rather than an error: the chain treats both the same way.
pub(crate) fn parse_chart(body: &str) -> Result<Vec<PricePoint>, ProviderError> {
    let resp: YahooChartResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::MalformedPayload(format!("chart: {}", e)))?;

    let Some(result) = resp.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };

    let closes = result
        .indicators
        .and_then(|i| i.quote.into_iter().next())
        .map(|q| q.close)
        .unwrap_or_default();

    let points = result
        .timestamp
        .iter()
        .zip(closes.iter())
        .filter_map(|(ts, close)| {
            let close = (*close)?;
            PricePoint::from_close(utc_date(*ts)?, close)
        })
        .collect();

    Ok(normalize_series(points))
}

#[async_trait]
impl PriceHistorySource for YahooChartProvider {
    fn name(&self) -> &'static str {
        "yahoo-chart"
    }

    async fn fetch_daily_closes(
        &self,
        symbol: &str,
        window_days: u32,
    ) -> Result<Vec<PricePoint>, ProviderError> {
        let url = format!("{}/{}", self.base_url, symbol);
        let range = format!("{}d", window_days);

        let resp = self
            .client
            .get(&url)
            .query(&[("range", range.as_str()), ("interval", "1d")])
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !resp.status().is_success() {
            return Err(ProviderError::BadStatus(resp.status().as_u16()));
        }

        let body = resp.text().await.map_err(ProviderError::from_reqwest)?;
        let points = parse_chart(&body)?;
        debug!("Yahoo chart returned {} points for {}", points.len(), symbol);
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_chart_skips_null_closes() {
        let body = r#"{"chart":{"result":[{
            "meta":{"symbol":"AAPL"},
            "timestamp":[1714570200,1714656600,1714743000],
            "indicators":{"quote":[{"close":[169.3012,null,183.38]}]}
        }],"error":null}}"#;

        let points = parse_chart(body).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(points[0].close, 169.3);
        assert_eq!(points[1].date, NaiveDate::from_ymd_opt(2024, 5, 3).unwrap());
    }

    #[test]
    fn test_parse_chart_without_result_is_empty() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        assert!(parse_chart(body).unwrap().is_empty());
    }

    #[test]
    fn test_parse_chart_without_quote_is_empty() {
        let body = r#"{"chart":{"result":[{"timestamp":[1714570200],"indicators":{"quote":[]}}]}}"#;
        assert!(parse_chart(body).unwrap().is_empty());
    }

    #[test]
    fn test_new_builds_with_timeout() {
        let provider = YahooChartProvider::new("http://localhost:9000/chart/", Duration::from_millis(250)).unwrap();
        assert_eq!(provider.base_url, "http://localhost:9000/chart");
        assert_eq!(provider.name(), "yahoo-chart");
    }

    #[test]
    fn test_parse_chart_rejects_garbage() {
        assert!(parse_chart("<html>").unwrap_err().is_malformed());
    }
}
