use super::currency::normalize_currency_code;
use super::fx_errors::FxError;
use super::fx_model::{ExchangeRate, NewExchangeRate};
use super::fx_traits::{ExchangeRateStoreTrait, FxServiceTrait};
use crate::constants::MANUAL_RATE_SOURCE;
use crate::errors::{Result, ValidationError};
use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;

#[derive(Clone)]
pub struct FxService {
    store: Arc<dyn ExchangeRateStoreTrait>,
}

impl FxService {
    pub fn new(store: Arc<dyn ExchangeRateStoreTrait>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl FxServiceTrait for FxService {
    /// Validates and upserts a rate. Recording the same pair twice for one
    /// date overwrites the earlier value.
    async fn record_rate(&self, new_rate: NewExchangeRate) -> Result<ExchangeRate> {
        let from = normalize_currency_code(&new_rate.from_currency)?;
        let to = normalize_currency_code(&new_rate.to_currency)?;

        if from == to {
            return Err(ValidationError::InvalidInput(format!(
                "Exchange rate needs two different currencies, got {}/{}",
                from, to
            ))
            .into());
        }
        if new_rate.rate <= Decimal::ZERO {
            return Err(FxError::InvalidExchangeRate {
                from,
                to,
                rate: new_rate.rate,
            }
            .into());
        }

        let rate = ExchangeRate {
            from_currency: from,
            to_currency: to,
            rate: new_rate.rate,
            date: new_rate.date,
            source: new_rate
                .source
                .unwrap_or_else(|| MANUAL_RATE_SOURCE.to_string()),
            updated_at: Utc::now(),
        };

        debug!(
            "Recording {} rate {} for {}",
            ExchangeRate::make_pair_key(&rate.from_currency, &rate.to_currency),
            rate.rate,
            rate.date
        );
        self.store.upsert(rate).await
    }

    fn get_latest_rate(&self, from: &str, to: &str) -> Result<Option<ExchangeRate>> {
        let from = normalize_currency_code(from)?;
        let to = normalize_currency_code(to)?;
        self.store.get_latest(&from, &to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use crate::portfolio::test_support::{d, MockRateStore};
    use rust_decimal_macros::dec;

    fn new_rate(from: &str, to: &str, rate: Decimal) -> NewExchangeRate {
        NewExchangeRate {
            from_currency: from.to_string(),
            to_currency: to.to_string(),
            rate,
            date: d(2024, 3, 1),
            source: None,
        }
    }

    #[tokio::test]
    async fn test_record_rate_normalizes_and_defaults_source() {
        let service = FxService::new(Arc::new(MockRateStore::default()));

        let stored = service
            .record_rate(new_rate(" usd", "twd ", dec!(31.5)))
            .await
            .unwrap();
        assert_eq!(stored.from_currency, "USD");
        assert_eq!(stored.to_currency, "TWD");
        assert_eq!(stored.source, MANUAL_RATE_SOURCE);

        let latest = service.get_latest_rate("usd", "TWD").unwrap().unwrap();
        assert_eq!(latest.rate, dec!(31.5));
    }

    #[tokio::test]
    async fn test_record_rate_overwrites_same_day() {
        let service = FxService::new(Arc::new(MockRateStore::default()));

        service
            .record_rate(new_rate("USD", "TWD", dec!(31.5)))
            .await
            .unwrap();
        service
            .record_rate(new_rate("USD", "TWD", dec!(31.7)))
            .await
            .unwrap();

        let latest = service.get_latest_rate("USD", "TWD").unwrap().unwrap();
        assert_eq!(latest.rate, dec!(31.7));
    }

    #[tokio::test]
    async fn test_record_rate_rejects_bad_input() {
        let service = FxService::new(Arc::new(MockRateStore::default()));

        let same_pair = service.record_rate(new_rate("USD", "usd", dec!(1))).await;
        assert!(matches!(same_pair, Err(Error::Validation(_))));

        let zero = service.record_rate(new_rate("USD", "TWD", dec!(0))).await;
        assert!(matches!(
            zero,
            Err(Error::Fx(FxError::InvalidExchangeRate { .. }))
        ));

        let negative = service.record_rate(new_rate("USD", "TWD", dec!(-31))).await;
        assert!(negative.is_err());
        assert!(service.get_latest_rate("USD", "TWD").unwrap().is_none());
    }
}
