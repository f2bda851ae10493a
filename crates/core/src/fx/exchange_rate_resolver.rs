use chrono::NaiveDate;
use chrono_tz::Tz;
use dashmap::DashMap;
use log::{debug, warn};
use rust_decimal::Decimal;
use std::sync::Arc;

use super::currency::normalize_currency_code;
use super::fx_errors::FxError;
use super::fx_model::{ExchangeRate, RateProvenance, ResolvedRate};
use super::fx_traits::ExchangeRateStoreTrait;
use crate::errors::Result;
use crate::settings::EngineSettings;
use crate::utils::time_utils::valuation_date_today;

/// One step of the resolution chain.
///
/// `Ok(None)` hands over to the next step; `Err` aborts the chain.
pub trait RateStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn try_resolve(
        &self,
        store: &dyn ExchangeRateStoreTrait,
        from: &str,
        to: &str,
        date: NaiveDate,
    ) -> Result<Option<ResolvedRate>>;
}

/// A stored rate for exactly the requested date.
pub struct ExactDateStrategy;

impl RateStrategy for ExactDateStrategy {
    fn name(&self) -> &'static str {
        "exact-date"
    }

    fn try_resolve(
        &self,
        store: &dyn ExchangeRateStoreTrait,
        from: &str,
        to: &str,
        date: NaiveDate,
    ) -> Result<Option<ResolvedRate>> {
        let found = lookup_either_direction(from, to, |f, t| store.get_by_date(f, t, date))?;
        Ok(found.map(|rate| resolved(rate, date, RateProvenance::ExactDate)))
    }
}

/// The most recent stored rate strictly before the requested date.
pub struct PriorDateStrategy;

impl RateStrategy for PriorDateStrategy {
    fn name(&self) -> &'static str {
        "prior-date"
    }

    fn try_resolve(
        &self,
        store: &dyn ExchangeRateStoreTrait,
        from: &str,
        to: &str,
        date: NaiveDate,
    ) -> Result<Option<ResolvedRate>> {
        // Direct and inverse series are independent; take whichever is newer.
        let direct = store.get_latest_before(from, to, date)?;
        let inverse = store
            .get_latest_before(to, from, date)?
            .and_then(|rate| rate.inverted());
        let newest = match (direct, inverse) {
            (Some(d), Some(i)) => Some(if i.date > d.date { i } else { d }),
            (d, i) => d.or(i),
        };
        match newest {
            Some(rate) => {
                ensure_positive(&rate)?;
                Ok(Some(resolved(rate, date, RateProvenance::PriorDate)))
            }
            None => Ok(None),
        }
    }
}

/// Chain terminator: the configured constant, or `RateUnavailable` when the
/// fallback is disabled.
#[derive(Debug, Clone, Copy)]
pub struct FixedDefaultRate {
    rate: Option<Decimal>,
}

impl FixedDefaultRate {
    pub fn new(rate: Option<Decimal>) -> Self {
        Self { rate }
    }

    fn resolve(&self, from: &str, to: &str, date: NaiveDate) -> Result<ResolvedRate> {
        match self.rate {
            Some(rate) => Ok(ResolvedRate {
                from_currency: from.to_string(),
                to_currency: to.to_string(),
                rate,
                requested_date: date,
                quoted_date: None,
                provenance: RateProvenance::Fallback,
            }),
            None => Err(FxError::RateUnavailable {
                from: from.to_string(),
                to: to.to_string(),
                date,
            }
            .into()),
        }
    }
}

type TodayFn = dyn Fn() -> NaiveDate + Send + Sync;

/// Resolves conversion rates through exact date → prior date → fixed default.
///
/// Answers are memoized per `(from, to, date)` for the resolver's lifetime so a
/// batch never sees two different rates for the same key.
pub struct ExchangeRateResolver {
    store: Arc<dyn ExchangeRateStoreTrait>,
    strategies: Vec<Box<dyn RateStrategy>>,
    terminator: FixedDefaultRate,
    today: Arc<TodayFn>,
    cache: DashMap<(String, String, NaiveDate), ResolvedRate>,
}

impl ExchangeRateResolver {
    pub fn new(store: Arc<dyn ExchangeRateStoreTrait>, settings: &EngineSettings) -> Self {
        let tz: Tz = settings.valuation_timezone;
        Self {
            store,
            strategies: vec![Box::new(ExactDateStrategy), Box::new(PriorDateStrategy)],
            terminator: FixedDefaultRate::new(settings.fallback_fx_rate),
            today: Arc::new(move || valuation_date_today(tz)),
            cache: DashMap::new(),
        }
    }

    /// Pins "today" to a fixed date, e.g. to re-run a snapshot as of a past day.
    pub fn with_fixed_today(mut self, date: NaiveDate) -> Self {
        self.today = Arc::new(move || date);
        self.cache.clear();
        self
    }

    pub fn today(&self) -> NaiveDate {
        (self.today)()
    }

    /// Unit rate from `from` to `to` valid for `date`.
    pub fn resolve(&self, from: &str, to: &str, date: NaiveDate) -> Result<ResolvedRate> {
        let from = normalize_currency_code(from)?;
        let to = normalize_currency_code(to)?;

        if from == to {
            return Ok(ResolvedRate::identity(&from, date));
        }

        let key = (from.clone(), to.clone(), date);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit.clone());
        }

        let resolution = self.run_chain(&from, &to, date)?;
        self.cache.insert(key, resolution.clone());
        Ok(resolution)
    }

    /// Rate for today's valuation date.
    pub fn resolve_current(&self, from: &str, to: &str) -> Result<ResolvedRate> {
        self.resolve(from, to, self.today())
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    fn run_chain(&self, from: &str, to: &str, date: NaiveDate) -> Result<ResolvedRate> {
        for strategy in &self.strategies {
            if let Some(found) = strategy.try_resolve(self.store.as_ref(), from, to, date)? {
                if found.provenance == RateProvenance::PriorDate {
                    debug!(
                        "No {}/{} rate on {}. Using rate from {:?} ({}).",
                        from,
                        to,
                        date,
                        found.quoted_date,
                        strategy.name()
                    );
                }
                return Ok(found);
            }
        }

        let fallback = self.terminator.resolve(from, to, date)?;
        warn!(
            "No stored {}/{} rate on or before {}. Using fixed fallback rate {}.",
            from, to, date, fallback.rate
        );
        Ok(fallback)
    }
}

/// Tries the direct pair, then the inverse pair.
fn lookup_either_direction<F>(from: &str, to: &str, lookup: F) -> Result<Option<ExchangeRate>>
where
    F: Fn(&str, &str) -> Result<Option<ExchangeRate>>,
{
    let found = match lookup(from, to)? {
        Some(rate) => Some(rate),
        None => lookup(to, from)?.and_then(|rate| rate.inverted()),
    };
    if let Some(rate) = &found {
        ensure_positive(rate)?;
    }
    Ok(found)
}

fn ensure_positive(rate: &ExchangeRate) -> Result<()> {
    if rate.rate <= Decimal::ZERO {
        return Err(FxError::InvalidExchangeRate {
            from: rate.from_currency.clone(),
            to: rate.to_currency.clone(),
            rate: rate.rate,
        }
        .into());
    }
    Ok(())
}

fn resolved(rate: ExchangeRate, requested: NaiveDate, provenance: RateProvenance) -> ResolvedRate {
    ResolvedRate {
        from_currency: rate.from_currency,
        to_currency: rate.to_currency,
        rate: rate.rate,
        requested_date: requested,
        quoted_date: Some(rate.date),
        provenance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{DatabaseError, Error};
    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockRateStore {
        rates: Mutex<BTreeMap<(String, String, NaiveDate), Decimal>>,
        fail: Mutex<bool>,
        reads: AtomicUsize,
    }

    impl MockRateStore {
        fn add(&self, from: &str, to: &str, date: NaiveDate, rate: Decimal) {
            self.rates
                .lock()
                .unwrap()
                .insert((from.to_string(), to.to_string(), date), rate);
        }

        fn make(from: &str, to: &str, date: NaiveDate, rate: Decimal) -> ExchangeRate {
            ExchangeRate {
                from_currency: from.to_string(),
                to_currency: to.to_string(),
                rate,
                date,
                source: "TEST".to_string(),
                updated_at: Utc::now(),
            }
        }

        fn check(&self) -> Result<()> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if *self.fail.lock().unwrap() {
                return Err(Error::Database(DatabaseError::ConnectionFailed(
                    "store offline".to_string(),
                )));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ExchangeRateStoreTrait for MockRateStore {
        fn get_by_date(
            &self,
            from: &str,
            to: &str,
            date: NaiveDate,
        ) -> Result<Option<ExchangeRate>> {
            self.check()?;
            let rates = self.rates.lock().unwrap();
            Ok(rates
                .get(&(from.to_string(), to.to_string(), date))
                .map(|r| Self::make(from, to, date, *r)))
        }

        fn get_latest_before(
            &self,
            from: &str,
            to: &str,
            date: NaiveDate,
        ) -> Result<Option<ExchangeRate>> {
            self.check()?;
            let rates = self.rates.lock().unwrap();
            Ok(rates
                .iter()
                .filter(|((f, t, d), _)| f == from && t == to && *d < date)
                .max_by_key(|((_, _, d), _)| *d)
                .map(|((_, _, d), r)| Self::make(from, to, *d, *r)))
        }

        fn get_latest(&self, from: &str, to: &str) -> Result<Option<ExchangeRate>> {
            self.check()?;
            let rates = self.rates.lock().unwrap();
            Ok(rates
                .iter()
                .filter(|((f, t, _), _)| f == from && t == to)
                .max_by_key(|((_, _, d), _)| *d)
                .map(|((_, _, d), r)| Self::make(from, to, *d, *r)))
        }

        async fn upsert(&self, rate: ExchangeRate) -> Result<ExchangeRate> {
            self.add(&rate.from_currency, &rate.to_currency, rate.date, rate.rate);
            Ok(rate)
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn resolver(store: Arc<MockRateStore>, fallback: Option<Decimal>) -> ExchangeRateResolver {
        let settings = EngineSettings::default().with_fallback_fx_rate(fallback);
        ExchangeRateResolver::new(store, &settings)
    }

    #[test]
    fn test_same_currency_is_identity_without_lookup() {
        let store = Arc::new(MockRateStore::default());
        let resolver = resolver(store.clone(), Some(dec!(30)));
        let rate = resolver.resolve("twd", "TWD", d(2024, 1, 2)).unwrap();
        assert_eq!(rate.rate, Decimal::ONE);
        assert_eq!(rate.provenance, RateProvenance::Identity);
        assert_eq!(store.reads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_exact_date_wins() {
        let store = Arc::new(MockRateStore::default());
        store.add("USD", "TWD", d(2024, 1, 1), dec!(30.9));
        store.add("USD", "TWD", d(2024, 1, 2), dec!(31.5));
        let resolver = resolver(store, Some(dec!(30)));

        let rate = resolver.resolve("USD", "TWD", d(2024, 1, 2)).unwrap();
        assert_eq!(rate.rate, dec!(31.5));
        assert_eq!(rate.provenance, RateProvenance::ExactDate);
        assert_eq!(rate.quoted_date, Some(d(2024, 1, 2)));
    }

    #[test]
    fn test_prior_date_used_when_exact_missing() {
        let store = Arc::new(MockRateStore::default());
        store.add("USD", "TWD", d(2024, 1, 1), dec!(30.9));
        store.add("USD", "TWD", d(2024, 1, 10), dec!(32.0));
        let resolver = resolver(store, Some(dec!(30)));

        let rate = resolver.resolve("USD", "TWD", d(2024, 1, 5)).unwrap();
        assert_eq!(rate.rate, dec!(30.9));
        assert_eq!(rate.provenance, RateProvenance::PriorDate);
        assert_eq!(rate.quoted_date, Some(d(2024, 1, 1)));
        assert!(!rate.is_fallback());
    }

    #[test]
    fn test_later_rate_is_never_used_for_earlier_date() {
        let store = Arc::new(MockRateStore::default());
        store.add("USD", "TWD", d(2024, 2, 1), dec!(32.0));
        let resolver = resolver(store, Some(dec!(30)));

        let rate = resolver.resolve("USD", "TWD", d(2024, 1, 5)).unwrap();
        assert_eq!(rate.provenance, RateProvenance::Fallback);
        assert_eq!(rate.rate, dec!(30));
    }

    #[test]
    fn test_fallback_is_flagged() {
        let store = Arc::new(MockRateStore::default());
        let resolver = resolver(store, Some(dec!(30.0)));
        let rate = resolver.resolve("USD", "TWD", d(2024, 1, 5)).unwrap();
        assert!(rate.is_fallback());
        assert_eq!(rate.quoted_date, None);
        assert_eq!(rate.rate, dec!(30.0));
    }

    #[test]
    fn test_rate_unavailable_without_fallback() {
        let store = Arc::new(MockRateStore::default());
        let resolver = resolver(store, None);
        let err = resolver.resolve("USD", "TWD", d(2024, 1, 5)).unwrap_err();
        assert!(matches!(err, Error::Fx(FxError::RateUnavailable { .. })));
    }

    #[test]
    fn test_store_failure_is_not_masked_by_fallback() {
        let store = Arc::new(MockRateStore::default());
        *store.fail.lock().unwrap() = true;
        let resolver = resolver(store, Some(dec!(30)));
        let err = resolver.resolve("USD", "TWD", d(2024, 1, 5)).unwrap_err();
        assert!(matches!(err, Error::Database(_)));
    }

    #[test]
    fn test_inverse_pair_is_used() {
        let store = Arc::new(MockRateStore::default());
        store.add("TWD", "USD", d(2024, 1, 2), dec!(0.03125));
        let resolver = resolver(store, Some(dec!(30)));
        let rate = resolver.resolve("USD", "TWD", d(2024, 1, 2)).unwrap();
        assert_eq!(rate.rate, dec!(32));
        assert_eq!(rate.provenance, RateProvenance::ExactDate);
    }

    #[test]
    fn test_non_positive_stored_rate_is_rejected() {
        let store = Arc::new(MockRateStore::default());
        store.add("USD", "TWD", d(2024, 1, 2), Decimal::ZERO);
        let resolver = resolver(store, Some(dec!(30)));
        let err = resolver.resolve("USD", "TWD", d(2024, 1, 2)).unwrap_err();
        assert!(matches!(err, Error::Fx(FxError::InvalidExchangeRate { .. })));
    }

    #[test]
    fn test_resolutions_are_memoized() {
        let store = Arc::new(MockRateStore::default());
        store.add("USD", "TWD", d(2024, 1, 2), dec!(31.5));
        let resolver = resolver(store.clone(), Some(dec!(30)));

        let first = resolver.resolve("USD", "TWD", d(2024, 1, 2)).unwrap();
        let reads = store.reads.load(Ordering::SeqCst);
        store.add("USD", "TWD", d(2024, 1, 2), dec!(99));
        let second = resolver.resolve("USD", "TWD", d(2024, 1, 2)).unwrap();

        assert_eq!(first, second);
        assert_eq!(store.reads.load(Ordering::SeqCst), reads);

        resolver.clear_cache();
        let third = resolver.resolve("USD", "TWD", d(2024, 1, 2)).unwrap();
        assert_eq!(third.rate, dec!(99));
    }

    #[test]
    fn test_resolve_current_uses_today() {
        let store = Arc::new(MockRateStore::default());
        store.add("USD", "TWD", d(2024, 6, 30), dec!(32.4));
        let resolver = resolver(store, Some(dec!(30))).with_fixed_today(d(2024, 7, 1));

        let rate = resolver.resolve_current("USD", "TWD").unwrap();
        assert_eq!(rate.requested_date, d(2024, 7, 1));
        assert_eq!(rate.rate, dec!(32.4));
        assert_eq!(rate.provenance, RateProvenance::PriorDate);
    }
}
