use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FxError {
    #[error("No exchange rate for {from}/{to} on or before {date} and no fallback rate configured")]
    RateUnavailable {
        from: String,
        to: String,
        date: NaiveDate,
    },

    #[error("Invalid exchange rate {rate} for {from}/{to}")]
    InvalidExchangeRate {
        from: String,
        to: String,
        rate: Decimal,
    },

    #[error("Invalid currency code: '{0}'")]
    InvalidCurrencyCode(String),
}
