use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;

/// Default timezone for valuation dates.
/// This is the canonical timezone used to convert UTC instants to domain dates
/// when no `valuation_timezone` is configured.
pub const DEFAULT_VALUATION_TZ: Tz = chrono_tz::Asia::Taipei;

/// Converts a UTC instant to a valuation date in the given timezone.
///
/// This is the single source of truth for converting instants to domain dates.
/// Use this whenever you need to derive a "business date" from a timestamp.
pub fn valuation_date_from_utc(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Today's valuation date in the given timezone.
pub fn valuation_date_today(tz: Tz) -> NaiveDate {
    valuation_date_from_utc(Utc::now(), tz)
}

pub fn is_trading_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Counts weekdays in `(start, end]`. Returns zero when `end <= start`.
///
/// A quote from Friday checked on Monday is one trading day old.
pub fn trading_days_between(start: NaiveDate, end: NaiveDate) -> u32 {
    if end <= start {
        return 0;
    }
    let mut days = 0;
    let mut current = start;
    while current < end {
        match current.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
        if is_trading_day(current) {
            days += 1;
        }
    }
    days
}
