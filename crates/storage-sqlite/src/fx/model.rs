//! Database model for stored exchange rates.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::StorageError;
use crate::utils::{
    date_to_text, decimal_to_text, instant_to_text, parse_date, parse_decimal, parse_instant,
};
use pennywise_core::fx::ExchangeRate;

#[derive(
    Queryable,
    Selectable,
    Insertable,
    Debug,
    Clone,
    Serialize,
    Deserialize,
    PartialEq,
)]
#[diesel(table_name = crate::schema::exchange_rates)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRateDB {
    pub from_currency: String,
    pub to_currency: String,
    pub rate_date: String,
    pub rate: String,
    pub source: String,
    pub updated_at: String,
}

impl From<&ExchangeRate> for ExchangeRateDB {
    fn from(rate: &ExchangeRate) -> Self {
        Self {
            from_currency: rate.from_currency.clone(),
            to_currency: rate.to_currency.clone(),
            rate_date: date_to_text(rate.date),
            rate: decimal_to_text(rate.rate),
            source: rate.source.clone(),
            updated_at: instant_to_text(rate.updated_at),
        }
    }
}

impl TryFrom<ExchangeRateDB> for ExchangeRate {
    type Error = StorageError;

    fn try_from(db: ExchangeRateDB) -> Result<Self, Self::Error> {
        Ok(ExchangeRate {
            rate: parse_decimal("exchange_rates.rate", &db.rate)?,
            date: parse_date("exchange_rates.rate_date", &db.rate_date)?,
            updated_at: parse_instant("exchange_rates.updated_at", &db.updated_at)?,
            from_currency: db.from_currency,
            to_currency: db.to_currency,
            source: db.source,
        })
    }
}
