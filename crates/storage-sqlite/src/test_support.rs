use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;
use tempfile::{tempdir, TempDir};

use crate::db::{create_pool, init, run_migrations, spawn_writer, DbPool, WriteHandle};
use pennywise_core::transactions::{AssetType, Transaction, TransactionSide};

/// A migrated database in a temp dir. Keep the `TempDir` alive for the test.
pub(crate) fn test_db() -> (Arc<DbPool>, WriteHandle, TempDir) {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("test.db");
    let db_path = init(&db_path.to_string_lossy()).expect("Failed to init database");

    let pool = create_pool(&db_path).expect("Failed to create pool");
    run_migrations(&pool).expect("Failed to run migrations");
    let writer = spawn_writer((*pool).clone());
    (pool, writer, temp_dir)
}

pub(crate) fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).expect("valid date")
}

pub(crate) fn tx(
    id: i64,
    date: NaiveDate,
    symbol: &str,
    side: TransactionSide,
    quantity: Decimal,
    price: Decimal,
) -> Transaction {
    Transaction {
        id,
        date,
        symbol: symbol.to_string(),
        name: None,
        asset_type: AssetType::Stock,
        side,
        quantity,
        price,
        gross_amount: quantity * price,
        fee: Decimal::ZERO,
        tax: Decimal::ZERO,
        currency: "USD".to_string(),
    }
}
