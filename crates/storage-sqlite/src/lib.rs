//! SQLite storage for Pennywise.
//!
//! This crate is the only place where Diesel appears. It provides:
//! - Connection pooling, PRAGMAs and embedded migrations
//! - A single writer actor that serializes every write
//! - Repository implementations of the storage traits defined in `pennywise-core`
//!
//! ```text
//!   pennywise-core (engine, traits)
//!            │
//!            ▼
//!   storage-sqlite (this crate)
//!            │
//!            ▼
//!        SQLite DB
//! ```
//!
//! Readers take pooled connections; writers go through [`WriteHandle`].

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod fx;
pub mod quotes;
pub mod realized;
pub mod transactions;

pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection,
    DbPool, WriteHandle,
};

pub use errors::{IntoCore, StorageError};

pub use fx::ExchangeRateRepository;
pub use quotes::PriceQuoteRepository;
pub use realized::RealizedProfitRepository;
pub use transactions::{TransactionRepository, TransactionWriterTrait};

pub use pennywise_core::errors::{DatabaseError, Error, Result};

#[cfg(test)]
pub(crate) mod test_support;
