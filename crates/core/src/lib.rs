//! Pennywise Core - holdings cost-basis engine.
//!
//! Replays buy/sell histories through FIFO lot ledgers, records realized
//! profit per sell and values open positions at live prices. The crate is
//! database-agnostic: the collaborator traits it defines are implemented by
//! the `storage-sqlite` crate.

pub mod constants;
pub mod errors;
pub mod fx;
pub mod portfolio;
pub mod quotes;
pub mod settings;
pub mod transactions;
pub mod utils;

// Re-export common types from the portfolio module
pub use portfolio::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
