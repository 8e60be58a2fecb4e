use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{error, info};

use crate::external::provider::{NewsProvider, ProviderError};
use crate::models::NewsItem;

/// Upper bound on news items consumed per request, to bound scoring cost
pub const MAX_NEWS_ITEMS: usize = 20;

/// News Gateway.
///
/// Unlike the market data gateway, failures are returned to the caller as a
/// typed `ProviderError`; the aggregator decides how to degrade.
pub struct NewsService {
    provider: Arc<dyn NewsProvider>,
}

impl NewsService {
    pub fn new(provider: Arc<dyn NewsProvider>) -> Self {
        Self { provider }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_configured()
    }

    /// Company news for an inclusive date window, in provider order, capped at `MAX_NEWS_ITEMS`.
    pub async fn fetch_company_news(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NewsItem>, ProviderError> {
        let mut items = self
            .provider
            .fetch_company_news(symbol, start, end)
            .await
            .map_err(|e| {
                error!("News fetch failed for {}: {}", symbol, e);
                e
            })?;

        info!("Fetched {} news items for {} ({} to {})", items.len(), symbol, start, end);
        items.truncate(MAX_NEWS_ITEMS);
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedNews(usize);

    #[async_trait]
    impl NewsProvider for FixedNews {
        async fn fetch_company_news(&self, _: &str, _: NaiveDate, _: NaiveDate) -> Result<Vec<NewsItem>, ProviderError> {
            Ok((0..self.0)
                .map(|i| NewsItem { headline: format!("headline {}", i), ..Default::default() })
                .collect())
        }
    }

    struct BrokenNews;

    #[async_trait]
    impl NewsProvider for BrokenNews {
        async fn fetch_company_news(&self, _: &str, _: NaiveDate, _: NaiveDate) -> Result<Vec<NewsItem>, ProviderError> {
            Err(ProviderError::MalformedPayload("not a list".into()))
        }
    }

    fn window() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_caps_at_twenty_in_provider_order() {
        let svc = NewsService::new(Arc::new(FixedNews(35)));
        let (start, end) = window();

        let items = svc.fetch_company_news("AAPL", start, end).await.unwrap();
        assert_eq!(items.len(), MAX_NEWS_ITEMS);
        assert_eq!(items[0].headline, "headline 0");
        assert_eq!(items[19].headline, "headline 19");
    }

    #[tokio::test]
    async fn test_short_feed_is_untouched() {
        let svc = NewsService::new(Arc::new(FixedNews(3)));
        let (start, end) = window();
        assert_eq!(svc.fetch_company_news("AAPL", start, end).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let svc = NewsService::new(Arc::new(BrokenNews));
        let (start, end) = window();

        let err = svc.fetch_company_news("AAPL", start, end).await.unwrap_err();
        assert!(err.is_malformed());
    }
}
