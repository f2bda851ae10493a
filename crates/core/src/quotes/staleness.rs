//! Quote freshness.
//!
//! Uses trading days (weekdays) so that a Friday close checked on Monday is
//! not reported as three days old.

use chrono::NaiveDate;
use chrono_tz::Tz;

use super::model::PriceQuote;
use crate::utils::time_utils::{trading_days_between, valuation_date_from_utc};

/// Age of the quote in trading days relative to `today`, both taken in `tz`.
pub fn quote_age_trading_days(quote: &PriceQuote, today: NaiveDate, tz: Tz) -> u32 {
    let quote_date = valuation_date_from_utc(quote.as_of, tz);
    trading_days_between(quote_date, today)
}

/// True when the quote is older than `max_trading_days`.
pub fn is_quote_outdated(
    quote: &PriceQuote,
    today: NaiveDate,
    tz: Tz,
    max_trading_days: u32,
) -> bool {
    quote_age_trading_days(quote, today, tz) > max_trading_days
}
