use log::{debug, trace};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::Arc;

use super::fifo_model::{CostBasisSnapshot, FxFallbackUsage, ReplayOutcome};
use crate::errors::{CalculatorError, Result};
use crate::fx::{ExchangeRateResolver, ResolvedRate};
use crate::portfolio::lots::{ConsumedLot, Lot, LotLedger};
use crate::portfolio::realized::RealizedProfitRecord;
use crate::transactions::{sort_for_replay, Transaction};

/// Replays the transaction history of one symbol through a FIFO lot ledger.
///
/// Buys are converted at the buy date's rate, sells at the sell date's rate.
/// The engine owns no state between calls: every replay builds its own ledger.
pub struct FifoEngine {
    resolver: Arc<ExchangeRateResolver>,
    reporting_currency: String,
}

impl FifoEngine {
    pub fn new(resolver: Arc<ExchangeRateResolver>, reporting_currency: &str) -> Self {
        Self {
            resolver,
            reporting_currency: reporting_currency.to_string(),
        }
    }

    pub fn reporting_currency(&self) -> &str {
        &self.reporting_currency
    }

    /// Replays `transactions` of `symbol` in `(date, id)` order.
    ///
    /// Any invalid transaction, oversell or unresolvable rate fails the whole
    /// symbol; there is no partial outcome.
    pub fn replay(&self, symbol: &str, transactions: &[Transaction]) -> Result<ReplayOutcome> {
        let mut ordered = transactions.to_vec();
        sort_for_replay(&mut ordered);

        let mut ledger = LotLedger::new(symbol);
        let mut outcome = ReplayOutcome::default();
        let mut fallback_buys = HashSet::new();

        for tx in &ordered {
            tx.validate()?;
            if tx.symbol != symbol {
                return Err(CalculatorError::InvalidTransaction {
                    transaction_id: tx.id,
                    reason: format!("belongs to {}, not {}", tx.symbol, symbol),
                }
                .into());
            }

            let rate = self.rate_for(tx, &mut outcome.fx_fallbacks)?;
            if tx.is_buy() {
                let cost = rate.convert(tx.gross_amount + tx.fee);
                ledger.add_lot(Lot {
                    transaction_id: tx.id,
                    symbol: symbol.to_string(),
                    open_date: tx.date,
                    original_quantity: tx.quantity,
                    remaining_quantity: tx.quantity,
                    unit_cost: cost / tx.quantity,
                    fx_rate: rate.rate,
                })?;
                if rate.is_fallback() {
                    fallback_buys.insert(tx.id);
                }
                trace!("{} buy {} x{} cost {}", symbol, tx.id, tx.quantity, cost);
            } else {
                let consumed = ledger.consume(tx.quantity, tx.id)?;
                let cost_basis: Decimal = consumed.iter().map(ConsumedLot::cost).sum();
                let mut record = RealizedProfitRecord::new(
                    tx.id,
                    symbol,
                    tx.asset_type,
                    tx.date,
                    tx.quantity,
                    rate.convert(tx.gross_amount),
                    rate.convert(tx.fee),
                    cost_basis,
                    &self.reporting_currency,
                );
                record.fx_fallback = rate.is_fallback()
                    || consumed
                        .iter()
                        .any(|c| fallback_buys.contains(&c.lot_transaction_id));
                trace!(
                    "{} sell {} x{} across {} lot(s), realized {}",
                    symbol,
                    tx.id,
                    tx.quantity,
                    consumed.len(),
                    record.realized_pl
                );
                outcome.realized.push(record);
            }
        }

        outcome.snapshot = self.snapshot_of(&ledger, &ordered);
        debug!(
            "Replayed {} transaction(s) of {}: {} sell(s), open quantity {}",
            ordered.len(),
            symbol,
            outcome.realized.len(),
            ledger.total_quantity()
        );
        Ok(outcome)
    }

    fn rate_for(
        &self,
        tx: &Transaction,
        fallbacks: &mut Vec<FxFallbackUsage>,
    ) -> Result<ResolvedRate> {
        let rate = self
            .resolver
            .resolve(&tx.currency, &self.reporting_currency, tx.date)?;
        if rate.is_fallback() {
            fallbacks.push(FxFallbackUsage {
                transaction_id: tx.id,
                from_currency: rate.from_currency.clone(),
                to_currency: rate.to_currency.clone(),
                date: tx.date,
                rate: rate.rate,
            });
        }
        Ok(rate)
    }

    fn snapshot_of(&self, ledger: &LotLedger, ordered: &[Transaction]) -> Option<CostBasisSnapshot> {
        let open_date = ledger.open_date()?;
        let totals = ledger.snapshot();
        if totals.total_quantity <= Decimal::ZERO {
            return None;
        }
        let last = ordered.last()?;

        Some(CostBasisSnapshot {
            symbol: ledger.symbol().to_string(),
            name: ordered.iter().rev().find_map(|tx| tx.name.clone()),
            asset_type: last.asset_type,
            quantity: totals.total_quantity,
            avg_cost: totals.total_cost / totals.total_quantity,
            total_cost: totals.total_cost,
            open_date,
            currency: last.currency.clone(),
            reporting_currency: self.reporting_currency.clone(),
            lots: ledger.lots().iter().cloned().collect(),
        })
    }
}
