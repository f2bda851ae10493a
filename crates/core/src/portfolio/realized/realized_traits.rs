use async_trait::async_trait;

use super::realized_model::{RealizedProfitRecord, RealizedSyncBatch, RealizedSyncReport};
use crate::errors::Result;
use crate::transactions::{HoldingsFilter, Transaction};

/// Storage for realized-profit records.
///
/// Writes are keyed by the sell transaction id, so repeating one is harmless.
#[async_trait]
pub trait RealizedProfitStoreTrait: Send + Sync {
    async fn upsert_by_transaction_id(
        &self,
        record: RealizedProfitRecord,
    ) -> Result<RealizedProfitRecord>;

    fn list_by_symbol(&self, symbol: &str) -> Result<Vec<RealizedProfitRecord>>;

    /// Deletes the records of the given sells. Returns the number removed.
    async fn delete_by_transaction_ids(&self, transaction_ids: Vec<i64>) -> Result<usize>;
}

#[async_trait]
pub trait RealizedProfitServiceTrait: Send + Sync {
    /// Pure replay: the records a symbol's history produces, nothing persisted.
    fn replay_for_realized_profit(
        &self,
        symbol: &str,
        transactions: &[Transaction],
    ) -> Result<Vec<RealizedProfitRecord>>;

    /// Replays the stored history of `symbol`, records every sell and removes
    /// records whose sell is gone. If the history no longer replays, the
    /// symbol's stored records are removed before the error is returned.
    async fn sync_symbol(&self, symbol: &str) -> Result<RealizedSyncReport>;

    /// `sync_symbol` for every symbol matching the filter. A symbol that fails
    /// lands in the batch's failures; the others are still synced.
    async fn sync_all(&self, filter: &HoldingsFilter) -> Result<RealizedSyncBatch>;
}
