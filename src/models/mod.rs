mod news;
mod price_point;
mod sentiment;

pub use news::{NewsItem, ScoredNewsItem};
pub use price_point::{normalize_series, PricePoint, Quote};
pub use sentiment::{
    AnalyzeQueryParams, SentimentAnalysis, SentimentDistribution, SentimentHistoryPoint,
    SentimentLabel,
};
