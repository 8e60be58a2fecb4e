//! Finnhub primary provider: live quote, daily candles and company news.
//!
//! API documentation: https://finnhub.io/docs/api

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::external::provider::{
    CandleProvider, CandleSeries, NewsProvider, ProviderError, QuoteProvider,
};
use crate::models::{NewsItem, Quote};

pub const DEFAULT_BASE_URL: &str = "https://finnhub.io/api/v1";

pub struct FinnhubProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl FinnhubProvider {
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Network(format!("Failed to build Finnhub client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    async fn fetch(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::Network("Finnhub API key is missing".into()))?;

        let url = format!("{}{}", self.base_url, endpoint);
        debug!("Finnhub request: {} with {} params", endpoint, params.len());

        let resp = self
            .client
            .get(&url)
            .header("X-Finnhub-Token", api_key)
            .query(params)
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            return Err(ProviderError::BadStatus(status.as_u16()));
        }

        resp.text().await.map_err(ProviderError::from_reqwest)
    }
}

/// Response from /quote
#[derive(Debug, Deserialize)]
struct QuoteResponse {
    /// Current price
    c: Option<f64>,
    /// Open price of the day
    o: Option<f64>,
}

/// Response from /stock/candle
#[derive(Debug, Deserialize)]
struct CandleResponse {
    /// "ok" or "no_data"
    s: String,
    #[serde(default)]
    c: Vec<Option<f64>>,
    #[serde(default)]
    t: Vec<i64>,
}

/// Item of the /company-news array
#[derive(Debug, Deserialize)]
struct CompanyNewsItem {
    headline: Option<String>,
    summary: Option<String>,
    source: Option<String>,
    url: Option<String>,
    datetime: Option<i64>,
}

pub(crate) fn parse_quote(body: &str) -> Result<Quote, ProviderError> {
    let resp: QuoteResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::MalformedPayload(format!("quote: {}", e)))?;

    // Finnhub answers unknown symbols with an all-zero quote instead of an error.
    let unknown = resp.c.unwrap_or(0.0) == 0.0 && resp.o.unwrap_or(0.0) == 0.0;
    let current_price = resp.c.filter(|c| c.is_finite() && !unknown);

    Ok(Quote { current_price })
}

pub(crate) fn parse_candles(body: &str) -> Result<CandleSeries, ProviderError> {
    let resp: CandleResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::MalformedPayload(format!("candles: {}", e)))?;

    match resp.s.as_str() {
        "ok" => Ok(CandleSeries {
            timestamps: resp.t,
            closes: resp.c,
        }),
        "no_data" => Err(ProviderError::NoData),
        other => Err(ProviderError::MalformedPayload(format!(
            "unexpected candle status: {}",
            other
        ))),
    }
}

pub(crate) fn parse_company_news(body: &str) -> Result<Vec<NewsItem>, ProviderError> {
    let items: Vec<CompanyNewsItem> = serde_json::from_str(body)
        .map_err(|e| ProviderError::MalformedPayload(format!("company news: {}", e)))?;

    Ok(items
        .into_iter()
        .map(|item| NewsItem {
            headline: item.headline.unwrap_or_default(),
            summary: item.summary.unwrap_or_default(),
            source: item.source.unwrap_or_default(),
            url: item.url.unwrap_or_default(),
            published_at: item.datetime.unwrap_or(0),
        })
        .collect())
}

#[async_trait]
impl QuoteProvider for FinnhubProvider {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, ProviderError> {
        let body = self.fetch("/quote", &[("symbol", symbol)]).await?;
        parse_quote(&body)
    }
}

#[async_trait]
impl CandleProvider for FinnhubProvider {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch_daily_candles(
        &self,
        symbol: &str,
        from_unix: i64,
        to_unix: i64,
    ) -> Result<CandleSeries, ProviderError> {
        let from = from_unix.to_string();
        let to = to_unix.to_string();
        let body = self
            .fetch(
                "/stock/candle",
                &[
                    ("symbol", symbol),
                    ("resolution", "D"),
                    ("from", &from),
                    ("to", &to),
                ],
            )
            .await?;
        parse_candles(&body)
    }
}

#[async_trait]
impl NewsProvider for FinnhubProvider {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch_company_news(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NewsItem>, ProviderError> {
        let from = from.format("%Y-%m-%d").to_string();
        let to = to.format("%Y-%m-%d").to_string();
        let body = self
            .fetch(
                "/company-news",
                &[("symbol", symbol), ("from", &from), ("to", &to)],
            )
            .await?;
        parse_company_news(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quote_live_price() {
        let quote = parse_quote(r#"{"c":189.84,"d":1.2,"dp":0.6,"h":190.1,"l":187.2,"o":188.0,"pc":188.6,"t":1714665600}"#).unwrap();
        assert_eq!(quote.current_price, Some(189.84));
    }

    #[test]
    fn test_parse_quote_unknown_symbol_is_absent() {
        let quote = parse_quote(r#"{"c":0,"d":null,"dp":null,"h":0,"l":0,"o":0,"pc":0,"t":0}"#).unwrap();
        assert_eq!(quote.current_price, None);
    }

    #[test]
    fn test_parse_quote_rejects_non_object() {
        let err = parse_quote("[]").unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_parse_candles_keeps_nulls_for_validation() {
        let series = parse_candles(r#"{"s":"ok","t":[1714521600,1714608000],"c":[170.1,null]}"#).unwrap();
        assert_eq!(series.timestamps.len(), 2);
        assert_eq!(series.closes, vec![Some(170.1), None]);
    }

    #[test]
    fn test_parse_candles_no_data() {
        let err = parse_candles(r#"{"s":"no_data"}"#).unwrap_err();
        assert!(matches!(err, ProviderError::NoData));
    }

    #[test]
    fn test_parse_company_news_defaults_missing_fields() {
        let body = r#"[
            {"category":"company","datetime":1714660000,"headline":"Apple beats","id":1,"source":"Reuters","summary":"Strong quarter","url":"https://x"},
            {"headline":null,"summary":"only summary"}
        ]"#;
        let items = parse_company_news(body).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].published_at, 1_714_660_000);
        assert_eq!(items[1].headline, "");
        assert_eq!(items[1].source, "");
        assert_eq!(items[1].published_at, 0);
    }

    #[test]
    fn test_parse_company_news_rejects_error_object() {
        let err = parse_company_news(r#"{"error":"You don't have access to this resource."}"#).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_provider_without_key_is_not_configured() {
        let provider = FinnhubProvider::new(Some("  ".to_string()), DEFAULT_BASE_URL, Duration::from_secs(30)).unwrap();
        assert!(!QuoteProvider::is_configured(&provider));

        let provider = FinnhubProvider::new(Some("abc".to_string()), DEFAULT_BASE_URL, Duration::from_secs(30)).unwrap();
        assert!(NewsProvider::is_configured(&provider));
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let provider = FinnhubProvider::new(None, "http://localhost:9000/api/v1/", Duration::from_millis(250)).unwrap();
        assert_eq!(provider.base_url, "http://localhost:9000/api/v1");
        assert!(!CandleProvider::is_configured(&provider));
    }
}
