use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;

use super::model::ExchangeRateDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::exchange_rates;
use crate::utils::date_to_text;
use pennywise_core::fx::{ExchangeRate, ExchangeRateStoreTrait};
use pennywise_core::Result;

enum DateBound {
    On(String),
    Before(String),
    Any,
}

pub struct ExchangeRateRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl ExchangeRateRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    fn first_match(
        &self,
        from: &str,
        to: &str,
        bound: DateBound,
    ) -> Result<Option<ExchangeRate>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = exchange_rates::table
            .filter(exchange_rates::from_currency.eq(from.to_string()))
            .filter(exchange_rates::to_currency.eq(to.to_string()))
            .order(exchange_rates::rate_date.desc())
            .select(ExchangeRateDB::as_select())
            .into_boxed();
        match bound {
            DateBound::On(date) => query = query.filter(exchange_rates::rate_date.eq(date)),
            DateBound::Before(date) => query = query.filter(exchange_rates::rate_date.lt(date)),
            DateBound::Any => {}
        }

        let row = query
            .first::<ExchangeRateDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(ExchangeRate::try_from).transpose()?)
    }
}

#[async_trait]
impl ExchangeRateStoreTrait for ExchangeRateRepository {
    fn get_by_date(&self, from: &str, to: &str, date: NaiveDate) -> Result<Option<ExchangeRate>> {
        self.first_match(from, to, DateBound::On(date_to_text(date)))
    }

    fn get_latest_before(
        &self,
        from: &str,
        to: &str,
        date: NaiveDate,
    ) -> Result<Option<ExchangeRate>> {
        self.first_match(from, to, DateBound::Before(date_to_text(date)))
    }

    fn get_latest(&self, from: &str, to: &str) -> Result<Option<ExchangeRate>> {
        self.first_match(from, to, DateBound::Any)
    }

    async fn upsert(&self, rate: ExchangeRate) -> Result<ExchangeRate> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<ExchangeRate> {
                let row = ExchangeRateDB::from(&rate);
                diesel::insert_into(exchange_rates::table)
                    .values(&row)
                    .on_conflict((
                        exchange_rates::from_currency,
                        exchange_rates::to_currency,
                        exchange_rates::rate_date,
                    ))
                    .do_update()
                    .set((
                        exchange_rates::rate.eq(&row.rate),
                        exchange_rates::source.eq(&row.source),
                        exchange_rates::updated_at.eq(&row.updated_at),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(rate)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{d, test_db};
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn usd_twd(date: NaiveDate, rate: Decimal, source: &str) -> ExchangeRate {
        ExchangeRate {
            from_currency: "USD".to_string(),
            to_currency: "TWD".to_string(),
            rate,
            date,
            source: source.to_string(),
            updated_at: Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_upsert_same_day_overwrites() {
        let (pool, writer, _dir) = test_db();
        let repo = ExchangeRateRepository::new(pool, writer);

        repo.upsert(usd_twd(d(2024, 3, 1), dec!(31.2), "MANUAL"))
            .await
            .unwrap();
        repo.upsert(usd_twd(d(2024, 3, 1), dec!(31.45), "BANK"))
            .await
            .unwrap();

        let stored = repo
            .get_by_date("USD", "TWD", d(2024, 3, 1))
            .unwrap()
            .unwrap();
        assert_eq!(stored.rate, dec!(31.45));
        assert_eq!(stored.source, "BANK");
        assert!(repo.get_by_date("TWD", "USD", d(2024, 3, 1)).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_latest_before_is_strictly_earlier() {
        let (pool, writer, _dir) = test_db();
        let repo = ExchangeRateRepository::new(pool, writer);

        for (date, rate) in [
            (d(2024, 2, 27), dec!(31.1)),
            (d(2024, 2, 29), dec!(31.3)),
            (d(2024, 3, 4), dec!(31.6)),
        ] {
            repo.upsert(usd_twd(date, rate, "MANUAL")).await.unwrap();
        }

        let before = repo
            .get_latest_before("USD", "TWD", d(2024, 3, 4))
            .unwrap()
            .unwrap();
        assert_eq!(before.date, d(2024, 2, 29));
        assert_eq!(before.rate, dec!(31.3));
        assert!(repo
            .get_latest_before("USD", "TWD", d(2024, 2, 27))
            .unwrap()
            .is_none());

        let latest = repo.get_latest("USD", "TWD").unwrap().unwrap();
        assert_eq!(latest.date, d(2024, 3, 4));
    }
}
