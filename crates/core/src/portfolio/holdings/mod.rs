//! Holdings - open positions valued at live prices.

mod holding_aggregator;
mod holdings_model;
mod holdings_service;

pub use holding_aggregator::HoldingAggregator;
pub use holdings_model::{
    CancellationFlag, FailureKind, Holding, HoldingsReport, PriceStaleReason, SymbolFailure,
};
pub use holdings_service::{HoldingsService, HoldingsServiceTrait};
