use std::sync::Arc;

use crate::services::sentiment_service::SentimentService;

#[derive(Clone)]
pub struct AppState {
    pub sentiment_service: Arc<SentimentService>,
}
