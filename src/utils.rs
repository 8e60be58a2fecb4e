use chrono::{NaiveDate, NaiveTime};

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// UTC calendar day of a unix timestamp, `None` when out of range.
pub fn utc_date(timestamp: i64) -> Option<NaiveDate> {
    chrono::DateTime::from_timestamp(timestamp, 0).map(|dt| dt.date_naive())
}

/// First second of `date` in UTC, as unix seconds.
pub fn start_of_day_unix(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Last second of `date` in UTC, as unix seconds.
pub fn end_of_day_unix(date: NaiveDate) -> i64 {
    start_of_day_unix(date) + 86_399
}
