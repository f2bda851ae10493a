use async_trait::async_trait;

use super::model::PriceQuote;
use crate::errors::Result;
use crate::transactions::AssetType;

/// Contract for anything that can price a symbol.
///
/// Failures are per symbol: an `Err` for one symbol says nothing about others.
#[async_trait]
pub trait PriceQuoteSourceTrait: Send + Sync {
    async fn get_price(&self, symbol: &str, asset_type: AssetType) -> Result<PriceQuote>;
}
