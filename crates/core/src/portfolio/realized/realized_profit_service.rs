use async_trait::async_trait;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::Arc;

use super::realized_model::{RealizedProfitRecord, RealizedSyncBatch, RealizedSyncReport};
use super::realized_profit_recorder::RealizedProfitRecorder;
use super::realized_traits::{RealizedProfitServiceTrait, RealizedProfitStoreTrait};
use crate::errors::Result;
use crate::portfolio::fifo::FifoEngine;
use crate::portfolio::holdings::SymbolFailure;
use crate::transactions::{HoldingsFilter, Transaction, TransactionSourceTrait};

/// Keeps stored realized profits in line with the transaction history.
pub struct RealizedProfitService {
    transactions: Arc<dyn TransactionSourceTrait>,
    store: Arc<dyn RealizedProfitStoreTrait>,
    engine: Arc<FifoEngine>,
    recorder: RealizedProfitRecorder,
}

impl RealizedProfitService {
    pub fn new(
        transactions: Arc<dyn TransactionSourceTrait>,
        store: Arc<dyn RealizedProfitStoreTrait>,
        engine: Arc<FifoEngine>,
        recorder: RealizedProfitRecorder,
    ) -> Self {
        Self {
            transactions,
            store,
            engine,
            recorder,
        }
    }

    /// Drops every stored record of `symbol`. Used when its history no longer
    /// replays, so no figure derived from an older history survives.
    async fn purge_symbol(&self, symbol: &str) -> Result<usize> {
        let stale: Vec<i64> = self
            .store
            .list_by_symbol(symbol)?
            .into_iter()
            .map(|r| r.transaction_id)
            .collect();
        if stale.is_empty() {
            return Ok(0);
        }
        self.store.delete_by_transaction_ids(stale).await
    }
}

#[async_trait]
impl RealizedProfitServiceTrait for RealizedProfitService {
    fn replay_for_realized_profit(
        &self,
        symbol: &str,
        transactions: &[Transaction],
    ) -> Result<Vec<RealizedProfitRecord>> {
        Ok(self.engine.replay(symbol, transactions)?.realized)
    }

    async fn sync_symbol(&self, symbol: &str) -> Result<RealizedSyncReport> {
        let history = self.transactions.list_by_symbol(symbol)?;
        let realized = match self.replay_for_realized_profit(symbol, &history) {
            Ok(realized) => realized,
            Err(e) => {
                match self.purge_symbol(symbol).await {
                    Ok(0) => {}
                    Ok(purged) => warn!(
                        "Replay of {} failed; removed {} stale realized profit record(s)",
                        symbol, purged
                    ),
                    Err(purge_err) => warn!(
                        "Replay of {} failed and its stale records could not be removed: {}",
                        symbol, purge_err
                    ),
                }
                return Err(e);
            }
        };
        let live_sells: HashSet<i64> = realized.iter().map(|r| r.transaction_id).collect();

        let recording = self.recorder.record_all(realized).await;

        let orphans: Vec<i64> = self
            .store
            .list_by_symbol(symbol)?
            .into_iter()
            .map(|r| r.transaction_id)
            .filter(|id| !live_sells.contains(id))
            .collect();
        if !orphans.is_empty() {
            let removed = self.store.delete_by_transaction_ids(orphans.clone()).await?;
            info!(
                "Removed {} realized profit record(s) of {} with no matching sell",
                removed, symbol
            );
        }

        debug!(
            "Synced realized profit of {}: {} recorded, {} missing",
            symbol,
            recording.recorded.len(),
            recording.missing.len()
        );
        let fx_fallbacks = recording
            .recorded
            .iter()
            .filter(|r| r.fx_fallback)
            .map(|r| r.transaction_id)
            .collect();
        Ok(RealizedSyncReport {
            symbol: symbol.to_string(),
            recorded: recording.recorded,
            missing: recording.missing,
            removed: orphans,
            fx_fallbacks,
        })
    }

    async fn sync_all(&self, filter: &HoldingsFilter) -> Result<RealizedSyncBatch> {
        let symbols = self.transactions.list_symbols(filter)?;
        let mut batch = RealizedSyncBatch::default();
        for symbol in symbols {
            match self.sync_symbol(&symbol).await {
                Ok(report) => batch.reports.push(report),
                Err(e) => {
                    warn!("Realized profit sync of {} failed: {}", symbol, e);
                    batch.failures.push(SymbolFailure::new(&symbol, &e));
                }
            }
        }
        Ok(batch)
    }
}
