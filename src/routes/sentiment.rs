use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;

use crate::errors::AppError;
use crate::models::{AnalyzeQueryParams, SentimentAnalysis};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/analyze", get(analyze))
}

/// GET /sentiment/analyze
/// Query params: ticker (required), limit (default: 12, range 6..=60)
pub async fn analyze(
    Query(params): Query<AnalyzeQueryParams>,
    State(state): State<AppState>,
) -> Result<Json<SentimentAnalysis>, AppError> {
    info!("GET /sentiment/analyze - ticker={} limit={}", params.ticker, params.limit);

    let analysis = state
        .sentiment_service
        .analyze(&params.ticker, params.limit)
        .await?;

    Ok(Json(analysis))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::NaiveDate;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::app::create_app;
    use crate::external::provider::{
        CandleProvider, CandleSeries, NewsProvider, ProviderError, QuoteProvider,
    };
    use crate::models::{NewsItem, Quote};
    use crate::services::lexicon::LexiconScorer;
    use crate::services::market_data_service::MarketDataService;
    use crate::services::news_service::NewsService;
    use crate::services::sentiment_service::SentimentService;
    use crate::state::AppState;

    struct Upstream {
        configured: bool,
    }

    #[async_trait]
    impl QuoteProvider for Upstream {
        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn fetch_quote(&self, _: &str) -> Result<Quote, ProviderError> {
            Ok(Quote { current_price: Some(101.5) })
        }
    }

    #[async_trait]
    impl CandleProvider for Upstream {
        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn fetch_daily_candles(&self, _: &str, _: i64, _: i64) -> Result<CandleSeries, ProviderError> {
            Err(ProviderError::NoData)
        }
    }

    #[async_trait]
    impl NewsProvider for Upstream {
        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn fetch_company_news(&self, _: &str, _: NaiveDate, _: NaiveDate) -> Result<Vec<NewsItem>, ProviderError> {
            Ok(vec![NewsItem {
                headline: "Record profit and strong growth".into(),
                ..Default::default()
            }])
        }
    }

    fn app(configured: bool) -> axum::Router {
        let upstream = Arc::new(Upstream { configured });
        let market = MarketDataService::new(upstream.clone(), upstream.clone(), vec![]);
        let news = NewsService::new(upstream);
        let service = SentimentService::new(
            market,
            news,
            Arc::new(LexiconScorer::new()),
            Duration::from_secs(5),
        );
        create_app(AppState { sentiment_service: Arc::new(service) })
    }

    async fn get(app: axum::Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get(app(true), "/health").await;
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_analyze_returns_snake_case_payload() {
        let (status, body) = get(app(true), "/sentiment/analyze?ticker=msft").await;
        assert_eq!(status, StatusCode::OK);

        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["ticker"], "MSFT");
        assert_eq!(json["current_price"], 101.5);
        assert_eq!(json["sources_analyzed"], 1);
        assert_eq!(json["sentiment_label"], "Positive");
        assert_eq!(json["sentiment_history"].as_array().unwrap().len(), 12);
        assert_eq!(json["price_history"].as_array().unwrap().len(), 0);
        assert!(json["news"][0]["datetime"].is_i64());
    }

    #[tokio::test]
    async fn test_analyze_rejects_out_of_range_limit() {
        let (status, _) = get(app(true), "/sentiment/analyze?ticker=AAPL&limit=61").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_analyze_requires_ticker() {
        let (status, _) = get(app(true), "/sentiment/analyze").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_key_is_server_error() {
        let (status, body) = get(app(false), "/sentiment/analyze?ticker=AAPL").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(String::from_utf8(body).unwrap().contains("Finnhub API key is missing."));
    }
}
