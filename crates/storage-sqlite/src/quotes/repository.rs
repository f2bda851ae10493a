use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;

use super::model::PriceQuoteDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::price_quotes;
use pennywise_core::quotes::{PriceQuote, PriceQuoteSourceTrait, QuoteError};
use pennywise_core::transactions::AssetType;
use pennywise_core::Result;

/// Quote source backed by the `price_quotes` table. The newest row per symbol
/// is the current price.
pub struct PriceQuoteRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PriceQuoteRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    /// Stores a quote. A second quote for the same symbol and instant replaces
    /// the first.
    pub async fn upsert_quote(&self, quote: PriceQuote) -> Result<PriceQuote> {
        quote.validate()?;
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<PriceQuote> {
                let row = PriceQuoteDB::from(&quote);
                diesel::insert_into(price_quotes::table)
                    .values(&row)
                    .on_conflict((price_quotes::symbol, price_quotes::as_of))
                    .do_update()
                    .set((
                        price_quotes::price.eq(&row.price),
                        price_quotes::currency.eq(&row.currency),
                        price_quotes::source.eq(&row.source),
                        price_quotes::is_stale.eq(row.is_stale),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(quote)
            })
            .await
    }

    pub fn latest_quote(&self, symbol: &str) -> Result<Option<PriceQuote>> {
        let mut conn = get_connection(&self.pool)?;
        let row = price_quotes::table
            .filter(price_quotes::symbol.eq(symbol))
            .order(price_quotes::as_of.desc())
            .select(PriceQuoteDB::as_select())
            .first::<PriceQuoteDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(PriceQuote::try_from).transpose()?)
    }
}

#[async_trait]
impl PriceQuoteSourceTrait for PriceQuoteRepository {
    async fn get_price(&self, symbol: &str, _asset_type: AssetType) -> Result<PriceQuote> {
        self.latest_quote(symbol)?
            .ok_or_else(|| QuoteError::unavailable(symbol, "no stored quote").into())
    }
}
