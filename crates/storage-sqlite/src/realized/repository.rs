use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;

use super::model::RealizedProfitDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::realized_profits;
use crate::utils::chunk_for_sqlite;
use pennywise_core::portfolio::realized::{RealizedProfitRecord, RealizedProfitStoreTrait};
use pennywise_core::Result;

pub struct RealizedProfitRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl RealizedProfitRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl RealizedProfitStoreTrait for RealizedProfitRepository {
    async fn upsert_by_transaction_id(
        &self,
        record: RealizedProfitRecord,
    ) -> Result<RealizedProfitRecord> {
        self.writer
            .exec(
                move |conn: &mut SqliteConnection| -> Result<RealizedProfitRecord> {
                    let row = RealizedProfitDB::from(&record);
                    diesel::insert_into(realized_profits::table)
                        .values(&row)
                        .on_conflict(realized_profits::transaction_id)
                        .do_update()
                        .set((
                            realized_profits::symbol.eq(&row.symbol),
                            realized_profits::asset_type.eq(&row.asset_type),
                            realized_profits::sell_date.eq(&row.sell_date),
                            realized_profits::quantity.eq(&row.quantity),
                            realized_profits::sell_amount.eq(&row.sell_amount),
                            realized_profits::sell_fee.eq(&row.sell_fee),
                            realized_profits::cost_basis.eq(&row.cost_basis),
                            realized_profits::realized_pl.eq(&row.realized_pl),
                            realized_profits::realized_pl_pct.eq(&row.realized_pl_pct),
                            realized_profits::currency.eq(&row.currency),
                            realized_profits::fx_fallback.eq(row.fx_fallback),
                            realized_profits::updated_at.eq(&row.updated_at),
                        ))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                    Ok(record)
                },
            )
            .await
    }

    fn list_by_symbol(&self, symbol: &str) -> Result<Vec<RealizedProfitRecord>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = realized_profits::table
            .filter(realized_profits::symbol.eq(symbol))
            .order((
                realized_profits::sell_date.asc(),
                realized_profits::transaction_id.asc(),
            ))
            .select(RealizedProfitDB::as_select())
            .load::<RealizedProfitDB>(&mut conn)
            .map_err(StorageError::from)?;

        rows.into_iter()
            .map(|row| RealizedProfitRecord::try_from(row).map_err(Into::into))
            .collect()
    }

    async fn delete_by_transaction_ids(&self, transaction_ids: Vec<i64>) -> Result<usize> {
        if transaction_ids.is_empty() {
            return Ok(0);
        }
        let removed = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut removed = 0;
                for chunk in chunk_for_sqlite(&transaction_ids) {
                    removed += diesel::delete(
                        realized_profits::table
                            .filter(realized_profits::transaction_id.eq_any(chunk.to_vec())),
                    )
                    .execute(conn)
                    .map_err(StorageError::from)?;
                }
                Ok(removed)
            })
            .await?;
        debug!("Removed {} realized-profit record(s)", removed);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{d, test_db, tx};
    use crate::transactions::{TransactionRepository, TransactionWriterTrait};
    use pennywise_core::transactions::{AssetType, TransactionSide};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn record(id: i64, sell_amount: Decimal) -> RealizedProfitRecord {
        RealizedProfitRecord::new(
            id,
            "2330",
            AssetType::Stock,
            d(2024, 1, 3),
            dec!(1),
            sell_amount,
            dec!(1.5),
            dec!(100),
            "TWD",
        )
    }

    async fn seed_sells(pool: &Arc<DbPool>, writer: &WriteHandle, ids: &[i64]) {
        let transactions = TransactionRepository::new(pool.clone(), writer.clone());
        transactions
            .insert(tx(1, d(2024, 1, 2), "2330", TransactionSide::Buy, dec!(10), dec!(100)))
            .await
            .unwrap();
        for id in ids {
            transactions
                .insert(tx(*id, d(2024, 1, 3), "2330", TransactionSide::Sell, dec!(1), dec!(110)))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent_per_sell() {
        let (pool, writer, _dir) = test_db();
        seed_sells(&pool, &writer, &[2]).await;
        let repo = RealizedProfitRepository::new(pool, writer);

        repo.upsert_by_transaction_id(record(2, dec!(110)))
            .await
            .unwrap();
        repo.upsert_by_transaction_id(record(2, dec!(110)))
            .await
            .unwrap();
        repo.upsert_by_transaction_id(record(2, dec!(120)))
            .await
            .unwrap();

        let stored = repo.list_by_symbol("2330").unwrap();
        assert_eq!(stored, vec![record(2, dec!(120))]);
        assert_eq!(stored[0].realized_pl, dec!(18.5));
    }

    #[tokio::test]
    async fn test_fallback_flag_is_stored_and_updated() {
        let (pool, writer, _dir) = test_db();
        seed_sells(&pool, &writer, &[2]).await;
        let repo = RealizedProfitRepository::new(pool, writer);

        let mut flagged = record(2, dec!(110));
        flagged.fx_fallback = true;
        repo.upsert_by_transaction_id(flagged).await.unwrap();
        assert!(repo.list_by_symbol("2330").unwrap()[0].fx_fallback);

        // A later replay with a stored rate clears the flag.
        repo.upsert_by_transaction_id(record(2, dec!(110)))
            .await
            .unwrap();
        assert!(!repo.list_by_symbol("2330").unwrap()[0].fx_fallback);
    }

    #[tokio::test]
    async fn test_record_needs_existing_sell() {
        let (pool, writer, _dir) = test_db();
        let repo = RealizedProfitRepository::new(pool, writer);

        assert!(repo
            .upsert_by_transaction_id(record(42, dec!(110)))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_delete_by_transaction_ids() {
        let (pool, writer, _dir) = test_db();
        seed_sells(&pool, &writer, &[2, 3, 4]).await;
        let repo = RealizedProfitRepository::new(pool, writer);
        for id in [2, 3, 4] {
            repo.upsert_by_transaction_id(record(id, dec!(110)))
                .await
                .unwrap();
        }

        assert_eq!(repo.delete_by_transaction_ids(vec![2, 4, 99]).await.unwrap(), 2);
        assert_eq!(repo.delete_by_transaction_ids(Vec::new()).await.unwrap(), 0);

        let left: Vec<i64> = repo
            .list_by_symbol("2330")
            .unwrap()
            .iter()
            .map(|r| r.transaction_id)
            .collect();
        assert_eq!(left, vec![3]);
    }
}
