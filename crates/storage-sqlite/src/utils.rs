//! Column codecs and query helpers shared by the repositories.
//!
//! Decimals are stored as TEXT so that no precision is lost; dates as
//! `YYYY-MM-DD` and instants as RFC 3339 UTC so that text order is time order.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::errors::StorageError;

/// Maximum number of parameters for SQLite `IN (...)` queries.
///
/// SQLite limits the number of parameters in a statement (typically 999), so
/// long id lists are split into chunks of this size.
pub const SQLITE_MAX_PARAMS_CHUNK: usize = 500;

pub fn chunk_for_sqlite<T>(items: &[T]) -> impl Iterator<Item = &[T]> {
    items.chunks(SQLITE_MAX_PARAMS_CHUNK)
}

pub fn decimal_to_text(value: Decimal) -> String {
    value.normalize().to_string()
}

pub fn parse_decimal(column: &'static str, value: &str) -> Result<Decimal, StorageError> {
    Decimal::from_str(value).map_err(|_| StorageError::InvalidColumn {
        column,
        value: value.to_string(),
    })
}

pub fn date_to_text(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_date(column: &'static str, value: &str) -> Result<NaiveDate, StorageError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| StorageError::InvalidColumn {
        column,
        value: value.to_string(),
    })
}

pub fn instant_to_text(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_instant(column: &'static str, value: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| StorageError::InvalidColumn {
            column,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_chunk_for_sqlite_over_limit() {
        let items: Vec<i32> = (0..1200).collect();
        let chunks: Vec<_> = chunk_for_sqlite(&items).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), SQLITE_MAX_PARAMS_CHUNK);
        assert_eq!(chunks[2].len(), 200);
    }

    #[test]
    fn test_chunk_for_sqlite_empty() {
        let items: Vec<i64> = vec![];
        assert_eq!(chunk_for_sqlite(&items).count(), 0);
    }

    #[test]
    fn test_decimal_text_keeps_all_digits() {
        let text = decimal_to_text(dec!(1.696980));
        assert_eq!(text, "1.69698");
        assert_eq!(parse_decimal("quantity", &text).unwrap(), dec!(1.69698));
        assert!(parse_decimal("quantity", "abc").is_err());
    }

    #[test]
    fn test_instant_text_sorts_like_time() {
        let earlier = instant_to_text(Utc.with_ymd_and_hms(2024, 3, 8, 6, 0, 0).unwrap());
        let later = instant_to_text(Utc.with_ymd_and_hms(2024, 3, 11, 1, 30, 0).unwrap());
        assert!(earlier < later);
        assert_eq!(
            parse_instant("as_of", &earlier).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 8, 6, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_date_text_round_trips() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(date_to_text(date), "2024-01-05");
        assert_eq!(parse_date("date", "2024-01-05").unwrap(), date);
        assert!(parse_date("date", "05/01/2024").is_err());
    }
}
