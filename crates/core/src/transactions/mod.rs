//! Transactions module - the read-only buy/sell history the engine replays.

mod transactions_model;
mod transactions_traits;

pub use transactions_model::{sort_for_replay, AssetType, Transaction, TransactionSide};
pub use transactions_traits::{HoldingsFilter, TransactionSourceTrait};
