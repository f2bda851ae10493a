//! Database model for realized-profit records.

use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::StorageError;
use crate::utils::{date_to_text, decimal_to_text, instant_to_text, parse_date, parse_decimal};
use pennywise_core::portfolio::realized::RealizedProfitRecord;
use pennywise_core::transactions::AssetType;

#[derive(Queryable, Selectable, Insertable, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[diesel(table_name = crate::schema::realized_profits)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct RealizedProfitDB {
    pub transaction_id: i64,
    pub symbol: String,
    pub asset_type: String,
    pub sell_date: String,
    pub quantity: String,
    pub sell_amount: String,
    pub sell_fee: String,
    pub cost_basis: String,
    pub realized_pl: String,
    pub realized_pl_pct: String,
    pub currency: String,
    pub fx_fallback: bool,
    pub updated_at: String,
}

impl From<&RealizedProfitRecord> for RealizedProfitDB {
    fn from(record: &RealizedProfitRecord) -> Self {
        Self {
            transaction_id: record.transaction_id,
            symbol: record.symbol.clone(),
            asset_type: record.asset_type.as_db_str().to_string(),
            sell_date: date_to_text(record.sell_date),
            quantity: decimal_to_text(record.quantity),
            sell_amount: decimal_to_text(record.sell_amount),
            sell_fee: decimal_to_text(record.sell_fee),
            cost_basis: decimal_to_text(record.cost_basis),
            realized_pl: decimal_to_text(record.realized_pl),
            realized_pl_pct: decimal_to_text(record.realized_pl_pct),
            currency: record.currency.clone(),
            fx_fallback: record.fx_fallback,
            updated_at: instant_to_text(Utc::now()),
        }
    }
}

impl TryFrom<RealizedProfitDB> for RealizedProfitRecord {
    type Error = StorageError;

    fn try_from(db: RealizedProfitDB) -> Result<Self, Self::Error> {
        let asset_type =
            AssetType::from_db_str(&db.asset_type).ok_or_else(|| StorageError::InvalidColumn {
                column: "realized_profits.asset_type",
                value: db.asset_type.clone(),
            })?;

        Ok(RealizedProfitRecord {
            transaction_id: db.transaction_id,
            asset_type,
            sell_date: parse_date("realized_profits.sell_date", &db.sell_date)?,
            quantity: parse_decimal("realized_profits.quantity", &db.quantity)?,
            sell_amount: parse_decimal("realized_profits.sell_amount", &db.sell_amount)?,
            sell_fee: parse_decimal("realized_profits.sell_fee", &db.sell_fee)?,
            cost_basis: parse_decimal("realized_profits.cost_basis", &db.cost_basis)?,
            realized_pl: parse_decimal("realized_profits.realized_pl", &db.realized_pl)?,
            realized_pl_pct: parse_decimal(
                "realized_profits.realized_pl_pct",
                &db.realized_pl_pct,
            )?,
            symbol: db.symbol,
            currency: db.currency,
            fx_fallback: db.fx_fallback,
        })
    }
}
