//! Database model for stored price quotes.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::StorageError;
use crate::utils::{decimal_to_text, instant_to_text, parse_decimal, parse_instant};
use pennywise_core::quotes::PriceQuote;

#[derive(Queryable, Selectable, Insertable, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[diesel(table_name = crate::schema::price_quotes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct PriceQuoteDB {
    pub symbol: String,
    pub as_of: String,
    pub price: String,
    pub currency: String,
    pub source: String,
    pub is_stale: bool,
}

impl From<&PriceQuote> for PriceQuoteDB {
    fn from(quote: &PriceQuote) -> Self {
        Self {
            symbol: quote.symbol.clone(),
            as_of: instant_to_text(quote.as_of),
            price: decimal_to_text(quote.price),
            currency: quote.currency.clone(),
            source: quote.source.clone(),
            is_stale: quote.is_stale,
        }
    }
}

impl TryFrom<PriceQuoteDB> for PriceQuote {
    type Error = StorageError;

    fn try_from(db: PriceQuoteDB) -> Result<Self, Self::Error> {
        Ok(PriceQuote {
            price: parse_decimal("price_quotes.price", &db.price)?,
            as_of: parse_instant("price_quotes.as_of", &db.as_of)?,
            symbol: db.symbol,
            currency: db.currency,
            source: db.source,
            is_stale: db.is_stale,
        })
    }
}
