/// Reporting currency used when nothing is configured
pub const DEFAULT_REPORTING_CURRENCY: &str = "TWD";

/// Last-resort units of reporting currency per unit of source currency.
/// Placeholder value, not a market rate; see `EngineSettings::fallback_fx_rate`.
pub const DEFAULT_FALLBACK_FX_RATE: &str = "30.0";

/// Decimal precision for persisted rates
pub const DECIMAL_PRECISION: u32 = 6;

/// Quotes older than this many trading days are flagged as stale
pub const DEFAULT_PRICE_STALE_TRADING_DAYS: u32 = 3;

/// Maximum number of symbols computed concurrently in a batch
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Attempts made to persist one realized-profit record
pub const DEFAULT_PERSISTENCE_MAX_ATTEMPTS: u32 = 3;

/// Base backoff between persistence attempts, multiplied by the attempt number
pub const DEFAULT_PERSISTENCE_RETRY_BACKOFF_MS: u64 = 200;

/// Source label written on rates recorded through the FX service
pub const MANUAL_RATE_SOURCE: &str = "MANUAL";
