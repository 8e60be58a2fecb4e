//! Market sentiment aggregation backend.
//!
//! Combines a live quote, a daily price series with provider fallbacks and
//! lexicon-scored company news into one `SentimentAnalysis` per ticker.

pub mod app;
pub mod config;
pub mod errors;
pub mod external;
pub mod logging;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
