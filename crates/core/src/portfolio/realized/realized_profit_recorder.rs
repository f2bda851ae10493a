use log::{debug, error, warn};
use std::sync::Arc;
use std::time::Duration;

use super::realized_model::{RealizedProfitRecord, RecordingReport};
use super::realized_traits::RealizedProfitStoreTrait;
use crate::errors::Result;
use crate::settings::EngineSettings;

/// Writes realized-profit records with bounded retries.
///
/// Writes are idempotent upserts keyed by the sell transaction id, so a retry
/// after an ambiguous failure never duplicates a record.
#[derive(Clone)]
pub struct RealizedProfitRecorder {
    store: Arc<dyn RealizedProfitStoreTrait>,
    max_attempts: u32,
    backoff: Duration,
}

impl RealizedProfitRecorder {
    pub fn new(store: Arc<dyn RealizedProfitStoreTrait>, settings: &EngineSettings) -> Self {
        Self {
            store,
            max_attempts: settings.persistence_max_attempts.max(1),
            backoff: Duration::from_millis(settings.persistence_retry_backoff_ms),
        }
    }

    /// Upserts one record. Storage failures are retried with linear backoff;
    /// any other error is returned immediately.
    pub async fn record(&self, record: RealizedProfitRecord) -> Result<RealizedProfitRecord> {
        let mut attempt = 1;
        loop {
            match self.store.upsert_by_transaction_id(record.clone()).await {
                Ok(saved) => {
                    debug!(
                        "Recorded realized profit of sell {} ({}) on attempt {}",
                        saved.transaction_id, saved.symbol, attempt
                    );
                    return Ok(saved);
                }
                Err(e) if e.is_persistence_failure() && attempt < self.max_attempts => {
                    warn!(
                        "Writing realized profit of sell {} failed (attempt {}/{}): {}",
                        record.transaction_id, attempt, self.max_attempts, e
                    );
                    tokio::time::sleep(self.backoff * attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Records every entry. Failures do not stop the batch; their sell ids are
    /// listed in `missing`.
    pub async fn record_all(&self, records: Vec<RealizedProfitRecord>) -> RecordingReport {
        let mut report = RecordingReport::default();
        for record in records {
            let transaction_id = record.transaction_id;
            match self.record(record).await {
                Ok(saved) => report.recorded.push(saved),
                Err(e) => {
                    error!(
                        "Giving up on realized profit of sell {}: {}",
                        transaction_id, e
                    );
                    report.missing.push(transaction_id);
                }
            }
        }
        report
    }
}
