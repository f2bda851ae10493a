use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::portfolio::holdings::SymbolFailure;
use crate::transactions::AssetType;
use crate::utils::decimal_utils::percentage_of;

/// Gain or loss realized by one sell. Derived from the transaction history,
/// never authoritative: it is recomputed by replay and keyed by the sell's id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RealizedProfitRecord {
    /// Id of the sell transaction.
    pub transaction_id: i64,
    pub symbol: String,
    pub asset_type: AssetType,
    pub sell_date: NaiveDate,
    pub quantity: Decimal,
    /// Gross sell amount in reporting currency.
    pub sell_amount: Decimal,
    /// Sell fee in reporting currency.
    pub sell_fee: Decimal,
    /// Cost of the FIFO-matched lot fragments in reporting currency.
    pub cost_basis: Decimal,
    pub realized_pl: Decimal,
    pub realized_pl_pct: Decimal,
    /// Reporting currency.
    pub currency: String,
    /// Set when the sell or any lot it consumed was converted at the fixed
    /// fallback rate.
    #[serde(default)]
    pub fx_fallback: bool,
}

impl RealizedProfitRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        transaction_id: i64,
        symbol: &str,
        asset_type: AssetType,
        sell_date: NaiveDate,
        quantity: Decimal,
        sell_amount: Decimal,
        sell_fee: Decimal,
        cost_basis: Decimal,
        currency: &str,
    ) -> Self {
        let realized_pl = (sell_amount - sell_fee) - cost_basis;
        Self {
            transaction_id,
            symbol: symbol.to_string(),
            asset_type,
            sell_date,
            quantity,
            sell_amount,
            sell_fee,
            cost_basis,
            realized_pl,
            realized_pl_pct: percentage_of(realized_pl, cost_basis),
            currency: currency.to_string(),
            fx_fallback: false,
        }
    }
}

/// Outcome of persisting a batch of records.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecordingReport {
    pub recorded: Vec<RealizedProfitRecord>,
    /// Sell transaction ids whose record could not be written.
    pub missing: Vec<i64>,
}

/// Outcome of re-syncing one symbol's realized profits with its history.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RealizedSyncReport {
    pub symbol: String,
    pub recorded: Vec<RealizedProfitRecord>,
    pub missing: Vec<i64>,
    /// Records deleted because their sell no longer exists.
    pub removed: Vec<i64>,
    /// Sells whose record relies on the fallback rate.
    pub fx_fallbacks: Vec<i64>,
}

/// Outcome of re-syncing a set of symbols.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RealizedSyncBatch {
    pub reports: Vec<RealizedSyncReport>,
    pub failures: Vec<SymbolFailure>,
}
