//! Realized profit - per-sell records, their persistence and re-sync.

mod realized_model;
mod realized_profit_recorder;
mod realized_profit_service;
mod realized_traits;

pub use realized_model::{
    RealizedProfitRecord, RealizedSyncBatch, RealizedSyncReport, RecordingReport,
};
pub use realized_profit_recorder::RealizedProfitRecorder;
pub use realized_profit_service::RealizedProfitService;
pub use realized_traits::{RealizedProfitServiceTrait, RealizedProfitStoreTrait};
