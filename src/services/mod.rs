pub mod lexicon;
pub mod market_data_service;
pub mod news_service;
pub mod sentiment_service;
