use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{PricePoint, ScoredNewsItem};

/// Display label attached to a sentiment score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "Positive"),
            SentimentLabel::Neutral => write!(f, "Neutral"),
            SentimentLabel::Negative => write!(f, "Negative"),
        }
    }
}

/// Bucket counts over the scored items. Always sums to `sources_analyzed`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SentimentDistribution {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentDistribution {
    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }
}

/// Single day in the dense daily sentiment series
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SentimentHistoryPoint {
    pub date: NaiveDate,
    pub score: f64,
}

/// Full response of one sentiment analysis request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SentimentAnalysis {
    pub ticker: String,
    pub overall_score: f64,
    pub sentiment_label: SentimentLabel,
    pub distribution: SentimentDistribution,
    pub confidence: f64,
    pub sources_analyzed: usize,
    pub current_price: Option<f64>,
    pub price_history: Vec<PricePoint>,
    pub sentiment_history: Vec<SentimentHistoryPoint>,
    pub news: Vec<ScoredNewsItem>,
}

/// Query parameters for `GET /sentiment/analyze`
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeQueryParams {
    pub ticker: String,
    /// Length of the returned daily sentiment series (default: 12)
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    12
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_serializes_with_wire_field_names() {
        let analysis = SentimentAnalysis {
            ticker: "AAPL".to_string(),
            overall_score: 0.05,
            sentiment_label: SentimentLabel::Negative,
            distribution: SentimentDistribution { positive: 1, neutral: 3, negative: 1 },
            confidence: 0.62,
            sources_analyzed: 5,
            current_price: None,
            price_history: vec![PricePoint {
                date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
                close: 170.33,
            }],
            sentiment_history: vec![],
            news: vec![],
        };

        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["sentiment_label"], "Negative");
        assert_eq!(json["distribution"]["neutral"], 3);
        assert!(json["current_price"].is_null());
        assert_eq!(json["price_history"][0]["date"], "2024-05-02");
        assert_eq!(json["price_history"][0]["close"], 170.33);
    }

    #[test]
    fn test_query_params_default_limit() {
        let params: AnalyzeQueryParams = serde_json::from_str(r#"{"ticker":"msft"}"#).unwrap();
        assert_eq!(params.limit, 12);
    }
}
