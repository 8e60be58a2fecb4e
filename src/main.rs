use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use net_social_backend::app::create_app;
use net_social_backend::config::AppConfig;
use net_social_backend::external::finnhub::FinnhubProvider;
use net_social_backend::external::provider::PriceHistorySource;
use net_social_backend::external::yahoo::YahooHistoryProvider;
use net_social_backend::external::yahoo_chart::YahooChartProvider;
use net_social_backend::logging::{init_logging, LoggingConfig};
use net_social_backend::services::lexicon::LexiconScorer;
use net_social_backend::services::market_data_service::MarketDataService;
use net_social_backend::services::news_service::NewsService;
use net_social_backend::services::sentiment_service::SentimentService;
use net_social_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    init_logging(LoggingConfig::from_env())
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    let config = AppConfig::from_env();
    if config.finnhub_api_key.is_none() {
        warn!("⚠️ FINNHUB_API_KEY is not set; /sentiment/analyze will fail until it is configured");
    }

    let finnhub = Arc::new(FinnhubProvider::new(
        config.finnhub_api_key.clone(),
        config.finnhub_base_url.clone(),
        config.upstream_timeout,
    )?);

    let mut fallbacks: Vec<Arc<dyn PriceHistorySource>> = Vec::new();
    match YahooHistoryProvider::new(config.upstream_timeout) {
        Ok(history) => fallbacks.push(Arc::new(history)),
        Err(e) => warn!("Yahoo history source unavailable, skipping it: {}", e),
    }
    fallbacks.push(Arc::new(YahooChartProvider::new(
        config.yahoo_chart_base_url.clone(),
        config.upstream_timeout,
    )?));
    info!(
        "📊 Price sources: Finnhub candles, then {}",
        fallbacks.iter().map(|s| s.name()).collect::<Vec<_>>().join(", ")
    );

    let market = MarketDataService::new(finnhub.clone(), finnhub.clone(), fallbacks);
    let news = NewsService::new(finnhub);
    let sentiment_service = SentimentService::new(
        market,
        news,
        Arc::new(LexiconScorer::new()),
        config.upstream_timeout,
    );

    let state = AppState {
        sentiment_service: Arc::new(sentiment_service),
    };
    let app = create_app(state);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!("🚀 Sentiment backend running at http://{}/", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
