use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::portfolio::lots::Lot;
use crate::portfolio::realized::RealizedProfitRecord;
use crate::transactions::AssetType;

/// Open position of a symbol after replay, in reporting currency.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CostBasisSnapshot {
    pub symbol: String,
    pub name: Option<String>,
    pub asset_type: AssetType,
    pub quantity: Decimal,
    /// `total_cost / quantity`.
    pub avg_cost: Decimal,
    /// Sum of `remaining_quantity * unit_cost` over the open lots.
    pub total_cost: Decimal,
    /// Open date of the oldest open lot.
    pub open_date: NaiveDate,
    /// Transaction currency of the most recent transaction.
    pub currency: String,
    pub reporting_currency: String,
    pub lots: Vec<Lot>,
}

/// A conversion during replay that used the configured fixed rate.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FxFallbackUsage {
    pub transaction_id: i64,
    pub from_currency: String,
    pub to_currency: String,
    pub date: NaiveDate,
    pub rate: Decimal,
}

/// Everything a replay produces.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReplayOutcome {
    /// `None` when nothing is left open.
    pub snapshot: Option<CostBasisSnapshot>,
    /// One record per sell, in replay order.
    pub realized: Vec<RealizedProfitRecord>,
    pub fx_fallbacks: Vec<FxFallbackUsage>,
}
