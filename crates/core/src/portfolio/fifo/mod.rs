//! FIFO replay of a symbol's transaction history.

mod fifo_engine;
mod fifo_model;

pub use fifo_engine::FifoEngine;
pub use fifo_model::{CostBasisSnapshot, FxFallbackUsage, ReplayOutcome};
