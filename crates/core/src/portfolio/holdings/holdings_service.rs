use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use std::sync::Arc;

use super::holding_aggregator::HoldingAggregator;
use super::holdings_model::{CancellationFlag, Holding, HoldingsReport, SymbolFailure};
use crate::errors::Result;
use crate::fx::ExchangeRateResolver;
use crate::portfolio::fifo::FifoEngine;
use crate::quotes::PriceQuoteSourceTrait;
use crate::settings::EngineSettings;
use crate::transactions::{HoldingsFilter, Transaction, TransactionSourceTrait};

#[async_trait]
pub trait HoldingsServiceTrait: Send + Sync {
    /// Values one symbol's history. `Ok(None)` when nothing is left open.
    async fn compute_holding(
        &self,
        symbol: &str,
        transactions: &[Transaction],
    ) -> Result<Option<Holding>>;

    /// Values every symbol matching `filter`.
    ///
    /// Per-symbol failures end up in the report; only failing to list the
    /// symbols fails the call.
    async fn compute_all_holdings(
        &self,
        filter: &HoldingsFilter,
        cancel: &CancellationFlag,
    ) -> Result<HoldingsReport>;
}

pub struct HoldingsService {
    transactions: Arc<dyn TransactionSourceTrait>,
    quotes: Arc<dyn PriceQuoteSourceTrait>,
    engine: Arc<FifoEngine>,
    aggregator: HoldingAggregator,
    max_concurrency: usize,
}

impl HoldingsService {
    pub fn new(
        transactions: Arc<dyn TransactionSourceTrait>,
        quotes: Arc<dyn PriceQuoteSourceTrait>,
        resolver: Arc<ExchangeRateResolver>,
        settings: &EngineSettings,
    ) -> Self {
        Self {
            transactions,
            quotes,
            engine: Arc::new(FifoEngine::new(resolver.clone(), &settings.reporting_currency)),
            aggregator: HoldingAggregator::new(resolver, settings),
            max_concurrency: settings.max_concurrency.max(1),
        }
    }

    pub fn engine(&self) -> Arc<FifoEngine> {
        self.engine.clone()
    }

    async fn compute_stored(&self, symbol: &str) -> Result<Option<Holding>> {
        let history = self.transactions.list_by_symbol(symbol)?;
        self.compute_holding(symbol, &history).await
    }
}

#[async_trait]
impl HoldingsServiceTrait for HoldingsService {
    async fn compute_holding(
        &self,
        symbol: &str,
        transactions: &[Transaction],
    ) -> Result<Option<Holding>> {
        let outcome = self.engine.replay(symbol, transactions)?;
        let Some(snapshot) = outcome.snapshot else {
            debug!("{} has no open position", symbol);
            return Ok(None);
        };

        let quote = self.quotes.get_price(symbol, snapshot.asset_type).await?;
        let holding = self
            .aggregator
            .build_with_fallbacks(&snapshot, &quote, &outcome.fx_fallbacks)?;
        Ok(Some(holding))
    }

    async fn compute_all_holdings(
        &self,
        filter: &HoldingsFilter,
        cancel: &CancellationFlag,
    ) -> Result<HoldingsReport> {
        let symbols = self.transactions.list_symbols(filter)?;
        let total = symbols.len();
        debug!(
            "Computing holdings for {} symbol(s), at most {} at a time",
            total, self.max_concurrency
        );

        let results: Vec<(String, Result<Option<Holding>>)> = stream::iter(symbols)
            .take_while(|_| futures::future::ready(!cancel.is_cancelled()))
            .map(|symbol| async move {
                let result = self.compute_stored(&symbol).await;
                (symbol, result)
            })
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await;

        let processed = results.len();
        let mut report = HoldingsReport {
            cancelled: processed < total,
            ..Default::default()
        };
        for (symbol, result) in results {
            match result {
                Ok(Some(holding)) => report.holdings.push(holding),
                Ok(None) => {}
                Err(e) => {
                    warn!("Leaving {} out of holdings: {}", symbol, e);
                    report.failures.push(SymbolFailure::new(&symbol, &e));
                }
            }
        }
        report.holdings.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        report.failures.sort_by(|a, b| a.symbol.cmp(&b.symbol));

        if report.cancelled {
            info!(
                "Holdings computation cancelled after {} of {} symbol(s)",
                processed, total
            );
        }
        Ok(report)
    }
}
