mod config;

use std::sync::Arc;

use config::Config;
use pennywise_core::fx::ExchangeRateResolver;
use pennywise_core::portfolio::holdings::{
    CancellationFlag, HoldingsService, HoldingsServiceTrait,
};
use pennywise_core::portfolio::realized::{
    RealizedProfitRecorder, RealizedProfitService, RealizedProfitServiceTrait,
};
use pennywise_core::settings::EngineSettings;
use pennywise_storage_sqlite::{
    create_pool, db, run_migrations, spawn_writer, ExchangeRateRepository, PriceQuoteRepository,
    RealizedProfitRepository, TransactionRepository,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

fn init_tracing() {
    let log_format = std::env::var("PENNYWISE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr; stdout carries the report.
    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env()?;
    let settings = EngineSettings::from_env()?;

    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);
    let pool = create_pool(&db_path)?;
    run_migrations(&pool)?;
    let writer = spawn_writer((*pool).clone());

    let transactions = Arc::new(TransactionRepository::new(pool.clone(), writer.clone()));
    let rates = Arc::new(ExchangeRateRepository::new(pool.clone(), writer.clone()));
    let quotes = Arc::new(PriceQuoteRepository::new(pool.clone(), writer.clone()));
    let realized_store = Arc::new(RealizedProfitRepository::new(pool.clone(), writer));

    let mut resolver = ExchangeRateResolver::new(rates, &settings);
    if let Some(as_of) = config.as_of {
        tracing::info!("Valuing as of {}", as_of);
        resolver = resolver.with_fixed_today(as_of);
    }
    let resolver = Arc::new(resolver);

    let holdings = HoldingsService::new(transactions.clone(), quotes, resolver, &settings);

    if config.skip_realized {
        tracing::info!("Skipping realized-profit sync");
    } else {
        let realized = RealizedProfitService::new(
            transactions,
            realized_store.clone(),
            holdings.engine(),
            RealizedProfitRecorder::new(realized_store, &settings),
        );
        let batch = realized.sync_all(&config.filter).await?;
        let incomplete = batch.reports.iter().filter(|r| !r.missing.is_empty()).count();
        let on_fallback: usize = batch.reports.iter().map(|r| r.fx_fallbacks.len()).sum();
        tracing::info!(
            "Realized profit synced for {} symbol(s), {} incomplete, {} failed, {} sell(s) on fallback rate",
            batch.reports.len(),
            incomplete,
            batch.failures.len(),
            on_fallback
        );
        for failure in &batch.failures {
            tracing::warn!("Realized profit of {} not synced: {}", failure.symbol, failure.message);
        }
    }

    let cancel = CancellationFlag::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing symbols already in progress");
            on_signal.cancel();
        }
    });

    let report = holdings
        .compute_all_holdings(&config.filter, &cancel)
        .await?;
    tracing::info!(
        "{} holding(s), {} failure(s){}",
        report.holdings.len(),
        report.failures.len(),
        if report.cancelled { ", cancelled" } else { "" }
    );

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
