use serde::{Deserialize, Serialize};

use super::SentimentLabel;

/// A single news item as delivered by the news provider.
///
/// Missing text fields are carried as empty strings and a missing publish
/// time as `0`, so downstream code never has to branch on presence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub headline: String,
    pub summary: String,
    pub source: String,
    pub url: String,
    /// Unix seconds
    #[serde(rename = "datetime")]
    pub published_at: i64,
}

impl NewsItem {
    /// Text fed to the scorer: headline and summary joined by a space.
    pub fn scoring_text(&self) -> String {
        format!("{} {}", self.headline, self.summary).trim().to_string()
    }
}

/// News item with its sentiment attached. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredNewsItem {
    #[serde(flatten)]
    pub item: NewsItem,
    pub sentiment_score: f64,
    pub sentiment_label: SentimentLabel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoring_text_trims_missing_parts() {
        let item = NewsItem {
            headline: "Apple beats estimates".to_string(),
            ..Default::default()
        };
        assert_eq!(item.scoring_text(), "Apple beats estimates");

        let empty = NewsItem::default();
        assert_eq!(empty.scoring_text(), "");
    }

    #[test]
    fn test_scored_item_serializes_flat() {
        let scored = ScoredNewsItem {
            item: NewsItem {
                headline: "h".to_string(),
                summary: "s".to_string(),
                source: "Reuters".to_string(),
                url: "https://example.com/a".to_string(),
                published_at: 1_700_000_000,
            },
            sentiment_score: 0.421,
            sentiment_label: SentimentLabel::Positive,
        };

        let json = serde_json::to_value(&scored).unwrap();
        assert_eq!(json["datetime"], 1_700_000_000);
        assert_eq!(json["source"], "Reuters");
        assert_eq!(json["sentiment_label"], "Positive");
        assert!(json.get("item").is_none());
    }
}
