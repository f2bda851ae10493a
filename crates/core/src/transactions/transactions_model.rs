use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{CalculatorError, Result};

/// What kind of instrument a symbol is. Passed through to price sources so
/// they can route the lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetType {
    #[default]
    Stock,
    Etf,
    Fund,
    Bond,
    Crypto,
    Other,
}

impl AssetType {
    /// Returns the database string representation (SCREAMING_SNAKE_CASE).
    pub const fn as_db_str(&self) -> &'static str {
        match self {
            AssetType::Stock => "STOCK",
            AssetType::Etf => "ETF",
            AssetType::Fund => "FUND",
            AssetType::Bond => "BOND",
            AssetType::Crypto => "CRYPTO",
            AssetType::Other => "OTHER",
        }
    }

    /// Parses an asset type from its database string.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "STOCK" => Some(AssetType::Stock),
            "ETF" => Some(AssetType::Etf),
            "FUND" => Some(AssetType::Fund),
            "BOND" => Some(AssetType::Bond),
            "CRYPTO" => Some(AssetType::Crypto),
            "OTHER" => Some(AssetType::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionSide {
    Buy,
    Sell,
}

impl TransactionSide {
    pub const fn as_db_str(&self) -> &'static str {
        match self {
            TransactionSide::Buy => "BUY",
            TransactionSide::Sell => "SELL",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "BUY" => Some(TransactionSide::Buy),
            "SELL" => Some(TransactionSide::Sell),
            _ => None,
        }
    }
}

/// A recorded buy or sell. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub date: NaiveDate,
    pub symbol: String,
    /// Display name of the instrument, carried through to the holding.
    #[serde(default)]
    pub name: Option<String>,
    pub asset_type: AssetType,
    pub side: TransactionSide,
    pub quantity: Decimal,
    pub price: Decimal,
    /// Total traded value in the transaction currency, before fees.
    pub gross_amount: Decimal,
    #[serde(default)]
    pub fee: Decimal,
    #[serde(default)]
    pub tax: Decimal,
    pub currency: String,
}

impl Transaction {
    pub fn is_buy(&self) -> bool {
        self.side == TransactionSide::Buy
    }

    /// Checks the field constraints the engine relies on.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| -> crate::errors::Error {
            CalculatorError::InvalidTransaction {
                transaction_id: self.id,
                reason,
            }
            .into()
        };

        if self.symbol.trim().is_empty() {
            return Err(invalid("symbol is empty".to_string()));
        }
        if self.currency.trim().is_empty() {
            return Err(invalid("currency is empty".to_string()));
        }
        if self.quantity <= Decimal::ZERO {
            return Err(invalid(format!("quantity must be positive, got {}", self.quantity)));
        }
        if self.price <= Decimal::ZERO {
            return Err(invalid(format!("price must be positive, got {}", self.price)));
        }
        if self.gross_amount.is_sign_negative() {
            return Err(invalid(format!(
                "gross amount must not be negative, got {}",
                self.gross_amount
            )));
        }
        if self.fee.is_sign_negative() {
            return Err(invalid(format!("fee must not be negative, got {}", self.fee)));
        }
        if self.tax.is_sign_negative() {
            return Err(invalid(format!("tax must not be negative, got {}", self.tax)));
        }
        Ok(())
    }
}

/// Orders transactions by `(date, id)`, the replay order.
pub fn sort_for_replay(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
}
