//! Lot bookkeeping: open lots per symbol and FIFO consumption.

mod lot_ledger;
mod lot_model;

pub use lot_ledger::LotLedger;
pub use lot_model::{ConsumedLot, LedgerTotals, Lot};
