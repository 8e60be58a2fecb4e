pub mod finnhub;
pub mod provider;
pub mod yahoo;
pub mod yahoo_chart;
