use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::errors::{CalculatorError, Error};
use crate::fx::FxError;
use crate::transactions::AssetType;

/// Why a holding's valuation should not be trusted as current.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceStaleReason {
    /// The quote source itself marked the price stale.
    ProviderFlagged,
    /// The quote is older than the configured number of trading days.
    #[serde(rename_all = "camelCase")]
    OutdatedQuote {
        as_of: DateTime<Utc>,
        trading_days: u32,
    },
    /// Today's price conversion used the fixed default rate.
    FallbackFxRate { from: String, to: String },
    /// Some of the cost basis was converted at the fixed default rate.
    HistoricalFallbackFxRate { count: usize },
}

/// An open position valued at the current price.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub symbol: String,
    pub name: Option<String>,
    pub asset_type: AssetType,
    pub quantity: Decimal,
    pub avg_cost: Decimal,
    pub total_cost: Decimal,
    /// Quote price in `price_currency`.
    pub current_price: Decimal,
    pub price_currency: String,
    pub price_as_of: DateTime<Utc>,
    /// Price-currency-to-reporting rate used for the current price.
    pub fx_rate: Decimal,
    pub current_price_reporting_currency: Decimal,
    pub market_value: Decimal,
    pub unrealized_pl: Decimal,
    pub unrealized_pl_pct: Decimal,
    pub price_source: String,
    pub is_price_stale: bool,
    pub price_stale_reasons: Vec<PriceStaleReason>,
    pub reporting_currency: String,
    pub open_date: NaiveDate,
}

/// Coarse category of a per-symbol failure in a batch computation.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// No stored rate and no fallback rate configured.
    RateUnavailable,
    Oversell,
    InvalidTransaction,
    PriceUnavailable,
    /// A collaborator failed or returned unusable data for this symbol.
    Source,
}

impl FailureKind {
    pub fn of(error: &Error) -> Self {
        match error {
            Error::Fx(FxError::RateUnavailable { .. }) => FailureKind::RateUnavailable,
            // A currency code on the transaction or quote that is not usable.
            Error::Fx(FxError::InvalidCurrencyCode(_)) => FailureKind::InvalidTransaction,
            // A stored rate that is zero or negative.
            Error::Fx(FxError::InvalidExchangeRate { .. }) => FailureKind::Source,
            Error::Calculation(CalculatorError::Oversell { .. }) => FailureKind::Oversell,
            Error::Calculation(_) => FailureKind::InvalidTransaction,
            Error::Quote(_) => FailureKind::PriceUnavailable,
            _ => FailureKind::Source,
        }
    }
}

/// A symbol left out of a batch result.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SymbolFailure {
    pub symbol: String,
    pub kind: FailureKind,
    pub message: String,
}

impl SymbolFailure {
    pub fn new(symbol: &str, error: &Error) -> Self {
        Self {
            symbol: symbol.to_string(),
            kind: FailureKind::of(error),
            message: error.to_string(),
        }
    }
}

/// Result of a batch holdings computation. Both lists are sorted by symbol.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HoldingsReport {
    pub holdings: Vec<Holding>,
    pub failures: Vec<SymbolFailure>,
    /// True when cancellation left symbols unprocessed.
    pub cancelled: bool,
}

/// Cooperative cancellation shared between a batch and its caller.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
