//! Price quote domain model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::errors::QuoteError;

/// A live or last-known price for one symbol.
///
/// # Fields
///
/// * `price` - Last price in `currency`
/// * `as_of` - When the price was observed by the provider
/// * `source` - Provider label passed through to the holding (e.g. "YAHOO", "MANUAL")
/// * `is_stale` - Freshness flag set by the provider itself
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub symbol: String,
    pub price: Decimal,
    pub currency: String,
    pub as_of: DateTime<Utc>,
    pub source: String,
    #[serde(default)]
    pub is_stale: bool,
}

impl PriceQuote {
    /// Rejects quotes that cannot be used for valuation.
    pub fn validate(&self) -> Result<(), QuoteError> {
        if self.price <= Decimal::ZERO {
            return Err(QuoteError::InvalidQuote {
                symbol: self.symbol.clone(),
                reason: format!("price must be positive, got {}", self.price),
            });
        }
        if self.currency.trim().is_empty() {
            return Err(QuoteError::InvalidQuote {
                symbol: self.symbol.clone(),
                reason: "currency is empty".to_string(),
            });
        }
        Ok(())
    }
}
