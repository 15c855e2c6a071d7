use std::ops::RangeInclusive;

use chrono::Datelike;

/// Primary keys for register records.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Monetary amounts in whole currency units (fractions allowed).
pub type Money = f64;

/// The current calendar year (UTC).
pub fn current_year() -> i32 {
    chrono::Utc::now().year()
}

/// Calendar years the register accepts (four digits).
pub const YEAR_RANGE: RangeInclusive<i32> = 1000..=9999;
