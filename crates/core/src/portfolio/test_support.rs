//! Fixtures shared by the portfolio service tests.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::{DatabaseError, Error, Result};
use crate::fx::{ExchangeRate, ExchangeRateResolver, ExchangeRateStoreTrait};
use crate::portfolio::realized::{RealizedProfitRecord, RealizedProfitStoreTrait};
use crate::settings::EngineSettings;
use crate::transactions::{
    AssetType, HoldingsFilter, Transaction, TransactionSide, TransactionSourceTrait,
};

#[derive(Default)]
pub struct MockRateStore {
    rates: Mutex<Vec<ExchangeRate>>,
    pub fail: Mutex<bool>,
}

impl MockRateStore {
    pub fn with_rate(self, from: &str, to: &str, date: NaiveDate, rate: Decimal) -> Self {
        self.rates.lock().unwrap().push(ExchangeRate {
            from_currency: from.to_string(),
            to_currency: to.to_string(),
            rate,
            date,
            source: "TEST".to_string(),
            updated_at: Utc::now(),
        });
        self
    }

    fn check(&self) -> Result<()> {
        if *self.fail.lock().unwrap() {
            return Err(Error::Database(DatabaseError::QueryFailed(
                "rate store offline".to_string(),
            )));
        }
        Ok(())
    }

    fn find<P>(&self, from: &str, to: &str, predicate: P) -> Result<Option<ExchangeRate>>
    where
        P: Fn(&ExchangeRate) -> bool,
    {
        self.check()?;
        Ok(self
            .rates
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.from_currency == from && r.to_currency == to && predicate(r))
            .max_by_key(|r| r.date)
            .cloned())
    }
}

#[async_trait]
impl ExchangeRateStoreTrait for MockRateStore {
    fn get_by_date(&self, from: &str, to: &str, date: NaiveDate) -> Result<Option<ExchangeRate>> {
        self.find(from, to, |r| r.date == date)
    }

    fn get_latest_before(
        &self,
        from: &str,
        to: &str,
        date: NaiveDate,
    ) -> Result<Option<ExchangeRate>> {
        self.find(from, to, |r| r.date < date)
    }

    fn get_latest(&self, from: &str, to: &str) -> Result<Option<ExchangeRate>> {
        self.find(from, to, |_| true)
    }

    async fn upsert(&self, rate: ExchangeRate) -> Result<ExchangeRate> {
        let mut rates = self.rates.lock().unwrap();
        rates.retain(|r| {
            !(r.from_currency == rate.from_currency
                && r.to_currency == rate.to_currency
                && r.date == rate.date)
        });
        rates.push(rate.clone());
        Ok(rate)
    }
}

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn resolver(store: MockRateStore, today: NaiveDate) -> Arc<ExchangeRateResolver> {
    Arc::new(
        ExchangeRateResolver::new(Arc::new(store), &EngineSettings::default())
            .with_fixed_today(today),
    )
}

#[allow(clippy::too_many_arguments)]
pub fn trade(
    id: i64,
    date: NaiveDate,
    symbol: &str,
    side: TransactionSide,
    quantity: Decimal,
    gross_amount: Decimal,
    fee: Decimal,
    currency: &str,
) -> Transaction {
    Transaction {
        id,
        date,
        symbol: symbol.to_string(),
        name: None,
        asset_type: AssetType::Stock,
        side,
        quantity,
        price: gross_amount / quantity,
        gross_amount,
        fee,
        tax: Decimal::ZERO,
        currency: currency.to_string(),
    }
}

pub fn buy(id: i64, date: NaiveDate, quantity: Decimal, gross_amount: Decimal) -> Transaction {
    trade(id, date, "2330", TransactionSide::Buy, quantity, gross_amount, Decimal::ZERO, "TWD")
}

pub fn sell(
    id: i64,
    date: NaiveDate,
    quantity: Decimal,
    gross_amount: Decimal,
    fee: Decimal,
) -> Transaction {
    trade(id, date, "2330", TransactionSide::Sell, quantity, gross_amount, fee, "TWD")
}

#[derive(Default)]
pub struct MockTransactionSource {
    pub transactions: Mutex<Vec<Transaction>>,
    /// Symbols whose `list_by_symbol` fails.
    pub failing: Mutex<Vec<String>>,
}

impl MockTransactionSource {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self {
            transactions: Mutex::new(transactions),
            failing: Mutex::new(Vec::new()),
        }
    }

    pub fn remove(&self, id: i64) {
        self.transactions.lock().unwrap().retain(|tx| tx.id != id);
    }
}

impl TransactionSourceTrait for MockTransactionSource {
    fn list_by_symbol(&self, symbol: &str) -> Result<Vec<Transaction>> {
        if self.failing.lock().unwrap().iter().any(|s| s == symbol) {
            return Err(Error::Database(DatabaseError::QueryFailed(format!(
                "cannot read {}",
                symbol
            ))));
        }
        Ok(self
            .transactions
            .lock()
            .unwrap()
            .iter()
            .filter(|tx| tx.symbol == symbol)
            .cloned()
            .collect())
    }

    fn list_symbols(&self, filter: &HoldingsFilter) -> Result<Vec<String>> {
        let mut symbols: Vec<String> = self
            .transactions
            .lock()
            .unwrap()
            .iter()
            .filter(|tx| filter.matches(tx))
            .map(|tx| tx.symbol.clone())
            .collect();
        symbols.sort();
        symbols.dedup();
        Ok(symbols)
    }
}

#[derive(Default)]
pub struct MockRealizedStore {
    pub records: Mutex<BTreeMap<i64, RealizedProfitRecord>>,
    /// Number of upcoming upserts that fail.
    pub failures_left: AtomicU32,
    pub upsert_calls: AtomicU32,
}

impl MockRealizedStore {
    pub fn failing(times: u32) -> Self {
        let store = Self::default();
        store.failures_left.store(times, Ordering::SeqCst);
        store
    }

    pub fn calls(&self) -> u32 {
        self.upsert_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RealizedProfitStoreTrait for MockRealizedStore {
    async fn upsert_by_transaction_id(
        &self,
        record: RealizedProfitRecord,
    ) -> Result<RealizedProfitRecord> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        let left = self.failures_left.load(Ordering::SeqCst);
        if left > 0 {
            self.failures_left.store(left - 1, Ordering::SeqCst);
            return Err(Error::Database(DatabaseError::QueryFailed(
                "database is locked".to_string(),
            )));
        }
        self.records
            .lock()
            .unwrap()
            .insert(record.transaction_id, record.clone());
        Ok(record)
    }

    fn list_by_symbol(&self, symbol: &str) -> Result<Vec<RealizedProfitRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.symbol == symbol)
            .cloned()
            .collect())
    }

    async fn delete_by_transaction_ids(&self, transaction_ids: Vec<i64>) -> Result<usize> {
        let mut records = self.records.lock().unwrap();
        Ok(transaction_ids
            .iter()
            .filter(|id| records.remove(*id).is_some())
            .count())
    }
}
