use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An open quantity acquired by a single buy.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    /// Id of the buy transaction that opened the lot.
    pub transaction_id: i64,
    pub symbol: String,
    pub open_date: NaiveDate,
    /// Quantity bought. Never changes.
    pub original_quantity: Decimal,
    /// Quantity not yet consumed by sells. Only ever decreases.
    pub remaining_quantity: Decimal,
    /// `(gross amount + fee)` in reporting currency divided by the bought quantity.
    pub unit_cost: Decimal,
    /// Transaction-to-reporting rate applied at open, kept for audit.
    pub fx_rate: Decimal,
}

impl Lot {
    /// Remaining cost in reporting currency.
    pub fn remaining_cost(&self) -> Decimal {
        self.remaining_quantity * self.unit_cost
    }

    /// Replay order key.
    pub fn order_key(&self) -> (NaiveDate, i64) {
        (self.open_date, self.transaction_id)
    }
}

/// The part of one lot taken by a sell.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConsumedLot {
    pub lot_transaction_id: i64,
    pub open_date: NaiveDate,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    /// True when the consumption emptied the lot.
    pub closed_lot: bool,
}

impl ConsumedLot {
    pub fn cost(&self) -> Decimal {
        self.quantity * self.unit_cost
    }
}

/// Sums over the open lots of a ledger.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LedgerTotals {
    pub total_quantity: Decimal,
    pub total_cost: Decimal,
}
