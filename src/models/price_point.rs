use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::utils::round_to;

/// Live quote for a symbol. Fetched once per request and never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub current_price: Option<f64>,
}

impl Quote {
    pub fn absent() -> Self {
        Self { current_price: None }
    }
}

// Daily closing price for one UTC calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    /// Builds a point with the close rounded to cents. Rejected when the
    /// rounded close is not finite, which includes closes that overflow while rounding.
    pub fn from_close(date: NaiveDate, close: f64) -> Option<Self> {
        let close = round_to(close, 2);
        close.is_finite().then_some(Self { date, close })
    }
}

/// Sorts ascending by date and collapses duplicate dates, keeping the latest close seen.
pub fn normalize_series(mut points: Vec<PricePoint>) -> Vec<PricePoint> {
    points.sort_by_key(|p| p.date);

    let mut out: Vec<PricePoint> = Vec::with_capacity(points.len());
    for point in points {
        match out.last_mut() {
            Some(last) if last.date == point.date => *last = point,
            _ => out.push(point),
        }
    }
    out
}
