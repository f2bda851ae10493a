//! Database model for recorded transactions.

use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::StorageError;
use crate::utils::{date_to_text, decimal_to_text, instant_to_text, parse_date, parse_decimal};
use pennywise_core::transactions::{AssetType, Transaction, TransactionSide};

#[derive(
    Queryable, Identifiable, Selectable, Insertable, Debug, Clone, Serialize, Deserialize, PartialEq,
)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct TransactionDB {
    pub id: i64,
    pub date: String,
    pub symbol: String,
    pub name: Option<String>,
    pub asset_type: String,
    pub side: String,
    pub quantity: String,
    pub price: String,
    pub gross_amount: String,
    pub fee: String,
    pub tax: String,
    pub currency: String,
    pub created_at: String,
}

impl From<Transaction> for TransactionDB {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id,
            date: date_to_text(tx.date),
            symbol: tx.symbol,
            name: tx.name,
            asset_type: tx.asset_type.as_db_str().to_string(),
            side: tx.side.as_db_str().to_string(),
            quantity: decimal_to_text(tx.quantity),
            price: decimal_to_text(tx.price),
            gross_amount: decimal_to_text(tx.gross_amount),
            fee: decimal_to_text(tx.fee),
            tax: decimal_to_text(tx.tax),
            currency: tx.currency,
            created_at: instant_to_text(Utc::now()),
        }
    }
}

impl TryFrom<TransactionDB> for Transaction {
    type Error = StorageError;

    fn try_from(db: TransactionDB) -> Result<Self, Self::Error> {
        let asset_type =
            AssetType::from_db_str(&db.asset_type).ok_or_else(|| StorageError::InvalidColumn {
                column: "transactions.asset_type",
                value: db.asset_type.clone(),
            })?;
        let side = TransactionSide::from_db_str(&db.side).ok_or_else(|| {
            StorageError::InvalidColumn {
                column: "transactions.side",
                value: db.side.clone(),
            }
        })?;

        Ok(Transaction {
            id: db.id,
            date: parse_date("transactions.date", &db.date)?,
            symbol: db.symbol,
            name: db.name,
            asset_type,
            side,
            quantity: parse_decimal("transactions.quantity", &db.quantity)?,
            price: parse_decimal("transactions.price", &db.price)?,
            gross_amount: parse_decimal("transactions.gross_amount", &db.gross_amount)?,
            fee: parse_decimal("transactions.fee", &db.fee)?,
            tax: parse_decimal("transactions.tax", &db.tax)?,
            currency: db.currency,
        })
    }
}
