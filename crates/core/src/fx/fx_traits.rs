use super::fx_model::{ExchangeRate, NewExchangeRate};
use crate::errors::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Trait defining the contract for exchange-rate storage.
///
/// Reads return `Ok(None)` when nothing is stored; `Err` is reserved for the
/// store itself failing.
#[async_trait]
pub trait ExchangeRateStoreTrait: Send + Sync {
    fn get_by_date(&self, from: &str, to: &str, date: NaiveDate) -> Result<Option<ExchangeRate>>;

    /// Most recent rate dated strictly before `date`.
    fn get_latest_before(
        &self,
        from: &str,
        to: &str,
        date: NaiveDate,
    ) -> Result<Option<ExchangeRate>>;

    fn get_latest(&self, from: &str, to: &str) -> Result<Option<ExchangeRate>>;

    /// Inserts a rate or overwrites the one stored for the same key.
    async fn upsert(&self, rate: ExchangeRate) -> Result<ExchangeRate>;
}

/// Trait defining the contract for FX service operations.
#[async_trait]
pub trait FxServiceTrait: Send + Sync {
    async fn record_rate(&self, new_rate: NewExchangeRate) -> Result<ExchangeRate>;

    fn get_latest_rate(&self, from: &str, to: &str) -> Result<Option<ExchangeRate>>;
}
