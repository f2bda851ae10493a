use serde::{Deserialize, Serialize};

use super::transactions_model::{AssetType, Transaction};
use crate::errors::Result;

/// Narrows a batch holdings computation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingsFilter {
    pub asset_type: Option<AssetType>,
    pub symbol: Option<String>,
}

impl HoldingsFilter {
    pub fn for_symbol(symbol: &str) -> Self {
        Self {
            asset_type: None,
            symbol: Some(symbol.to_string()),
        }
    }

    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.asset_type
            .map_or(true, |asset_type| transaction.asset_type == asset_type)
            && self
                .symbol
                .as_deref()
                .map_or(true, |symbol| transaction.symbol == symbol)
    }
}

/// Read access to the recorded transaction history.
pub trait TransactionSourceTrait: Send + Sync {
    /// All transactions of one symbol, in any order. The engine sorts.
    fn list_by_symbol(&self, symbol: &str) -> Result<Vec<Transaction>>;

    /// Distinct symbols with at least one transaction matching the filter.
    fn list_symbols(&self, filter: &HoldingsFilter) -> Result<Vec<String>>;
}
