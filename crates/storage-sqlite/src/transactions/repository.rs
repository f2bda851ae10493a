use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;

use super::model::TransactionDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::transactions;
use pennywise_core::transactions::{HoldingsFilter, Transaction, TransactionSourceTrait};
use pennywise_core::Result;

/// Trait for recording transactions. The engine itself only reads them.
#[async_trait]
pub trait TransactionWriterTrait: Send + Sync {
    async fn insert(&self, transaction: Transaction) -> Result<Transaction>;

    /// Deletes a transaction. Its realized-profit record goes with it.
    async fn delete(&self, transaction_id: i64) -> Result<usize>;
}

pub struct TransactionRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl TransactionRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

impl TransactionSourceTrait for TransactionRepository {
    fn list_by_symbol(&self, symbol: &str) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = transactions::table
            .filter(transactions::symbol.eq(symbol))
            .order((transactions::date.asc(), transactions::id.asc()))
            .select(TransactionDB::as_select())
            .load::<TransactionDB>(&mut conn)
            .map_err(StorageError::from)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(Transaction::try_from(row)?);
        }
        Ok(out)
    }

    fn list_symbols(&self, filter: &HoldingsFilter) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = transactions::table
            .select(transactions::symbol)
            .distinct()
            .order(transactions::symbol.asc())
            .into_boxed();
        if let Some(asset_type) = filter.asset_type {
            query = query.filter(transactions::asset_type.eq(asset_type.as_db_str()));
        }
        if let Some(symbol) = filter.symbol.as_deref() {
            query = query.filter(transactions::symbol.eq(symbol.to_string()));
        }
        let symbols = query
            .load::<String>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(symbols)
    }
}

#[async_trait]
impl TransactionWriterTrait for TransactionRepository {
    async fn insert(&self, transaction: Transaction) -> Result<Transaction> {
        transaction.validate()?;
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Transaction> {
                let row = TransactionDB::from(transaction.clone());
                diesel::insert_into(transactions::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(transaction)
            })
            .await
    }

    async fn delete(&self, transaction_id: i64) -> Result<usize> {
        let deleted = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let target = transactions::table.filter(transactions::id.eq(transaction_id));
                let deleted = diesel::delete(target)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(deleted)
            })
            .await?;
        debug!("Deleted transaction {} ({} row)", transaction_id, deleted);
        Ok(deleted)
    }
}
