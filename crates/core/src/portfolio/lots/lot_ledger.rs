use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use std::collections::VecDeque;

use super::lot_model::{ConsumedLot, LedgerTotals, Lot};
use crate::errors::{CalculatorError, Result};

/// FIFO queue of the open lots of one symbol.
///
/// Lots are kept in `(open_date, transaction_id)` order; the head is always the
/// oldest lot and is the first one consumed. One ledger exists per symbol per
/// replay and is never shared.
#[derive(Debug, Clone, Default)]
pub struct LotLedger {
    symbol: String,
    lots: VecDeque<Lot>,
}

impl LotLedger {
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            lots: VecDeque::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn lots(&self) -> &VecDeque<Lot> {
        &self.lots
    }

    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }

    /// Open date of the oldest open lot.
    pub fn open_date(&self) -> Option<NaiveDate> {
        self.lots.front().map(|lot| lot.open_date)
    }

    pub fn total_quantity(&self) -> Decimal {
        self.lots.iter().map(|lot| lot.remaining_quantity).sum()
    }

    /// Appends a lot at the tail.
    ///
    /// The lot must not sort before the current tail, otherwise FIFO order
    /// would break.
    pub fn add_lot(&mut self, lot: Lot) -> Result<()> {
        if lot.remaining_quantity <= Decimal::ZERO {
            return Err(CalculatorError::InvalidTransaction {
                transaction_id: lot.transaction_id,
                reason: format!(
                    "lot quantity must be positive, got {}",
                    lot.remaining_quantity
                ),
            }
            .into());
        }
        if lot.symbol != self.symbol {
            return Err(CalculatorError::InvalidTransaction {
                transaction_id: lot.transaction_id,
                reason: format!(
                    "lot for {} added to the ledger of {}",
                    lot.symbol, self.symbol
                ),
            }
            .into());
        }
        if let Some(tail) = self.lots.back() {
            if lot.order_key() < tail.order_key() {
                return Err(CalculatorError::Calculation(format!(
                    "lot {} ({}) opened before tail lot {} ({}) of {}",
                    lot.transaction_id,
                    lot.open_date,
                    tail.transaction_id,
                    tail.open_date,
                    self.symbol
                ))
                .into());
            }
        }
        self.lots.push_back(lot);
        Ok(())
    }

    /// Takes `quantity` from the oldest lots first.
    ///
    /// Spans as many lots as needed; fully consumed lots leave the ledger.
    /// Fails with `Oversell` and leaves the ledger untouched when less than
    /// `quantity` is open.
    pub fn consume(
        &mut self,
        quantity: Decimal,
        sell_transaction_id: i64,
    ) -> Result<Vec<ConsumedLot>> {
        if quantity <= Decimal::ZERO {
            return Err(CalculatorError::InvalidTransaction {
                transaction_id: sell_transaction_id,
                reason: format!("sell quantity must be positive, got {}", quantity),
            }
            .into());
        }

        let available = self.total_quantity();
        if available < quantity {
            return Err(CalculatorError::Oversell {
                symbol: self.symbol.clone(),
                transaction_id: sell_transaction_id,
                requested: quantity,
                available,
            }
            .into());
        }

        let mut remaining = quantity;
        let mut consumed = Vec::new();

        while remaining > Decimal::ZERO {
            let Some(head) = self.lots.front_mut() else {
                // Unreachable after the availability check above.
                return Err(CalculatorError::Calculation(format!(
                    "ledger of {} ran empty while consuming for transaction {}",
                    self.symbol, sell_transaction_id
                ))
                .into());
            };

            let take = std::cmp::min(head.remaining_quantity, remaining);
            head.remaining_quantity -= take;
            remaining -= take;

            let closed_lot = head.remaining_quantity.is_zero();
            consumed.push(ConsumedLot {
                lot_transaction_id: head.transaction_id,
                open_date: head.open_date,
                quantity: take,
                unit_cost: head.unit_cost,
                closed_lot,
            });

            if closed_lot {
                if let Some(closed) = self.lots.pop_front() {
                    debug!(
                        "Lot {} of {} closed by transaction {}",
                        closed.transaction_id, self.symbol, sell_transaction_id
                    );
                }
            }
        }

        Ok(consumed)
    }

    pub fn snapshot(&self) -> LedgerTotals {
        LedgerTotals {
            total_quantity: self.total_quantity(),
            total_cost: self.lots.iter().map(Lot::remaining_cost).sum(),
        }
    }
}
