use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, NaiveDate, Utc};
use tokio::time::timeout;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::external::provider::{CandleSeries, ProviderError, TextScorer};
use crate::models::{
    NewsItem, Quote, ScoredNewsItem, SentimentAnalysis, SentimentDistribution,
    SentimentHistoryPoint, SentimentLabel,
};
use crate::services::market_data_service::MarketDataService;
use crate::services::news_service::NewsService;
use crate::utils::{end_of_day_unix, round_to, start_of_day_unix, utc_date};

/// Market and news lookback, independent of the requested history length
pub const LOOKBACK_DAYS: u32 = 30;
pub const MIN_HISTORY_DAYS: i64 = 6;
pub const MAX_HISTORY_DAYS: i64 = 60;

// Per-item display label thresholds. Both are 0.1, so the Neutral branch of
// `label_for_score` is unreachable: anything below 0.1 is Negative.
pub const LABEL_POSITIVE_MIN: f64 = 0.1;
pub const LABEL_NEGATIVE_MAX: f64 = 0.1;

// Distribution buckets use a wider band than the display label.
pub const DISTRIBUTION_POSITIVE_MIN: f64 = 0.4;
pub const DISTRIBUTION_NEGATIVE_MAX: f64 = -0.4;

/// Aggregator: drives both gateways and the scorer and assembles the response.
pub struct SentimentService {
    market: MarketDataService,
    news: NewsService,
    scorer: Arc<dyn TextScorer>,
    upstream_timeout: StdDuration,
}

impl SentimentService {
    pub fn new(
        market: MarketDataService,
        news: NewsService,
        scorer: Arc<dyn TextScorer>,
        upstream_timeout: StdDuration,
    ) -> Self {
        Self {
            market: market.with_timeout(upstream_timeout),
            news,
            scorer,
            upstream_timeout,
        }
    }

    pub async fn analyze(&self, ticker: &str, limit: i64) -> Result<SentimentAnalysis, AppError> {
        self.analyze_at(ticker, limit, Utc::now().date_naive()).await
    }

    /// Runs the pipeline with `today` as the UTC end of every window.
    pub async fn analyze_at(
        &self,
        ticker: &str,
        limit: i64,
        today: NaiveDate,
    ) -> Result<SentimentAnalysis, AppError> {
        let symbol = normalize_ticker(ticker)?;
        let limit = validate_limit(limit)?;

        if !self.market.is_configured() || !self.news.is_configured() {
            return Err(AppError::Configuration("Finnhub API key is missing.".to_string()));
        }

        let start_date = today - Duration::days(i64::from(LOOKBACK_DAYS));
        let from_unix = start_of_day_unix(start_date);
        let to_unix = end_of_day_unix(today);

        info!("Analyzing sentiment for {} ({} to {}, limit={})", symbol, start_date, today, limit);

        let (quote, candles, news_items) = tokio::join!(
            self.fetch_quote(&symbol),
            self.fetch_candles(&symbol, from_unix, to_unix),
            self.fetch_news(&symbol, start_date, today),
        );

        let mut price_history = self
            .market
            .resolve_price_history(&symbol, candles, LOOKBACK_DAYS)
            .await;

        let (scores, scored_news) = score_news(self.scorer.as_ref(), news_items);

        let overall_score = mean(&scores).unwrap_or(0.0);
        let sentiment_label = if scores.is_empty() {
            SentimentLabel::Neutral
        } else {
            label_for_score(overall_score)
        };

        let current_price = match quote.current_price {
            Some(price) => Some(price),
            None => match price_history.last() {
                Some(last) => Some(last.close),
                None => {
                    info!("No quote or history for {}, forcing a fallback price fetch", symbol);
                    price_history = self.market.fallback_history(&symbol, LOOKBACK_DAYS).await;
                    price_history.last().map(|p| p.close)
                }
            },
        };

        let analysis = SentimentAnalysis {
            ticker: symbol,
            overall_score: round_to(overall_score, 3),
            sentiment_label,
            distribution: distribution_for(&scores),
            confidence: confidence_for(&scores),
            sources_analyzed: scores.len(),
            current_price,
            price_history,
            sentiment_history: daily_history(&scored_news, today, limit),
            news: scored_news,
        };

        info!(
            "Sentiment for {}: score={:.3}, label={}, sources={}, confidence={:.2}",
            analysis.ticker,
            analysis.overall_score,
            analysis.sentiment_label,
            analysis.sources_analyzed,
            analysis.confidence
        );

        Ok(analysis)
    }

    async fn fetch_quote(&self, symbol: &str) -> Quote {
        match timeout(self.upstream_timeout, self.market.get_quote(symbol)).await {
            Ok(quote) => quote,
            Err(_) => {
                warn!("Quote fetch timed out for {}", symbol);
                Quote::absent()
            }
        }
    }

    async fn fetch_candles(
        &self,
        symbol: &str,
        from_unix: i64,
        to_unix: i64,
    ) -> Result<CandleSeries, ProviderError> {
        timeout(self.upstream_timeout, self.market.fetch_candles(symbol, from_unix, to_unix))
            .await
            .unwrap_or(Err(ProviderError::Timeout))
    }

    async fn fetch_news(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<NewsItem> {
        match timeout(self.upstream_timeout, self.news.fetch_company_news(symbol, start, end)).await {
            Ok(Ok(items)) => items,
            Ok(Err(e)) => {
                warn!("Continuing without news for {}: {}", symbol, e);
                Vec::new()
            }
            Err(_) => {
                warn!("News fetch timed out for {}, continuing without news", symbol);
                Vec::new()
            }
        }
    }
}

/// Trims and upper-cases a ticker; blank input is rejected.
pub fn normalize_ticker(ticker: &str) -> Result<String, AppError> {
    let symbol = ticker.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(AppError::Validation("ticker must not be empty".to_string()));
    }
    Ok(symbol)
}

pub fn validate_limit(limit: i64) -> Result<usize, AppError> {
    if !(MIN_HISTORY_DAYS..=MAX_HISTORY_DAYS).contains(&limit) {
        return Err(AppError::Validation(format!(
            "limit must be between {} and {}, got {}",
            MIN_HISTORY_DAYS, MAX_HISTORY_DAYS, limit
        )));
    }
    Ok(limit as usize)
}

/// Per-item display label. Positive is checked first.
pub fn label_for_score(score: f64) -> SentimentLabel {
    if score >= LABEL_POSITIVE_MIN {
        SentimentLabel::Positive
    } else if score <= LABEL_NEGATIVE_MAX {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

/// Scores items in input order. Returns the raw scores alongside the scored items,
/// whose `sentiment_score` is rounded to 3 decimals for display.
pub fn score_news(scorer: &dyn TextScorer, items: Vec<NewsItem>) -> (Vec<f64>, Vec<ScoredNewsItem>) {
    let mut scores = Vec::with_capacity(items.len());
    let mut scored = Vec::with_capacity(items.len());

    for item in items {
        let raw = scorer.score(&item.scoring_text());
        // The scorer contract is [-1, 1]; NaN counts as neutral.
        let score = if raw.is_finite() { raw.clamp(-1.0, 1.0) } else { 0.0 };

        scores.push(score);
        scored.push(ScoredNewsItem {
            item,
            sentiment_score: round_to(score, 3),
            sentiment_label: label_for_score(score),
        });
    }

    (scores, scored)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn distribution_for(scores: &[f64]) -> SentimentDistribution {
    let positive = scores.iter().filter(|s| **s >= DISTRIBUTION_POSITIVE_MIN).count();
    let negative = scores.iter().filter(|s| **s <= DISTRIBUTION_NEGATIVE_MAX).count();
    SentimentDistribution {
        positive,
        neutral: scores.len() - positive - negative,
        negative,
    }
}

/// 1 minus the (capped) population standard deviation of the scores, rounded to 2 decimals.
pub fn confidence_for(scores: &[f64]) -> f64 {
    let Some(avg) = mean(scores) else {
        return 0.0;
    };
    let variance = scores.iter().map(|s| (s - avg).powi(2)).sum::<f64>() / scores.len() as f64;
    let confidence = (1.0 - variance.sqrt().min(1.0)).max(0.0);
    round_to(confidence, 2)
}

/// Dense daily series of `limit` days ending at `today`.
///
/// Items are bucketed by the UTC day of their publish time; items without a
/// publish time are left out. Days without items score 0.0.
pub fn daily_history(
    scored: &[ScoredNewsItem],
    today: NaiveDate,
    limit: usize,
) -> Vec<SentimentHistoryPoint> {
    let mut by_day: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for item in scored {
        if item.item.published_at == 0 {
            continue;
        }
        if let Some(day) = utc_date(item.item.published_at) {
            by_day.entry(day).or_default().push(item.sentiment_score);
        }
    }

    (0..limit)
        .map(|i| {
            let date = today - Duration::days((limit - 1 - i) as i64);
            let score = by_day
                .get(&date)
                .and_then(|scores| mean(scores))
                .map(|s| round_to(s, 3))
                .unwrap_or(0.0);
            SentimentHistoryPoint { date, score }
        })
        .collect()
}
