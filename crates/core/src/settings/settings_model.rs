use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::constants::{
    DEFAULT_FALLBACK_FX_RATE, DEFAULT_MAX_CONCURRENCY, DEFAULT_PERSISTENCE_MAX_ATTEMPTS,
    DEFAULT_PERSISTENCE_RETRY_BACKOFF_MS, DEFAULT_PRICE_STALE_TRADING_DAYS,
    DEFAULT_REPORTING_CURRENCY,
};
use crate::errors::{Error, Result};
use crate::fx::normalize_currency_code;
use crate::utils::time_utils::DEFAULT_VALUATION_TZ;

pub const ENV_REPORTING_CURRENCY: &str = "PENNYWISE_REPORTING_CURRENCY";
pub const ENV_FALLBACK_FX_RATE: &str = "PENNYWISE_FALLBACK_FX_RATE";
pub const ENV_VALUATION_TZ: &str = "PENNYWISE_VALUATION_TZ";
pub const ENV_PRICE_STALE_TRADING_DAYS: &str = "PENNYWISE_PRICE_STALE_TRADING_DAYS";
pub const ENV_MAX_CONCURRENCY: &str = "PENNYWISE_MAX_CONCURRENCY";
pub const ENV_PERSISTENCE_MAX_ATTEMPTS: &str = "PENNYWISE_PERSISTENCE_MAX_ATTEMPTS";
pub const ENV_PERSISTENCE_RETRY_BACKOFF_MS: &str = "PENNYWISE_PERSISTENCE_RETRY_BACKOFF_MS";

/// Engine-wide configuration shared by the resolver, the engine and the services.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    /// Currency every cost basis and P/L figure is expressed in.
    pub reporting_currency: String,
    /// Fixed rate used when no stored rate exists. `None` disables the
    /// fallback and turns a missing rate into `RateUnavailable`.
    pub fallback_fx_rate: Option<Decimal>,
    /// Timezone deciding what "today" means for current-rate resolution.
    pub valuation_timezone: Tz,
    pub price_stale_trading_days: u32,
    pub max_concurrency: usize,
    pub persistence_max_attempts: u32,
    pub persistence_retry_backoff_ms: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            reporting_currency: DEFAULT_REPORTING_CURRENCY.to_string(),
            fallback_fx_rate: Decimal::from_str(DEFAULT_FALLBACK_FX_RATE).ok(),
            valuation_timezone: DEFAULT_VALUATION_TZ,
            price_stale_trading_days: DEFAULT_PRICE_STALE_TRADING_DAYS,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            persistence_max_attempts: DEFAULT_PERSISTENCE_MAX_ATTEMPTS,
            persistence_retry_backoff_ms: DEFAULT_PERSISTENCE_RETRY_BACKOFF_MS,
        }
    }
}

impl EngineSettings {
    /// Builds settings from `PENNYWISE_*` environment variables, falling back
    /// to defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`EngineSettings::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(currency) = lookup(ENV_REPORTING_CURRENCY) {
            settings.reporting_currency = normalize_currency_code(&currency).map_err(|e| {
                Error::InvalidConfigValue(format!("{}: {}", ENV_REPORTING_CURRENCY, e))
            })?;
        }

        if let Some(raw) = lookup(ENV_FALLBACK_FX_RATE) {
            let raw = raw.trim();
            settings.fallback_fx_rate =
                if raw.is_empty() || raw.eq_ignore_ascii_case("none") {
                    None
                } else {
                    let rate = Decimal::from_str(raw).map_err(|e| {
                        Error::InvalidConfigValue(format!("{}: {}", ENV_FALLBACK_FX_RATE, e))
                    })?;
                    if rate <= Decimal::ZERO {
                        return Err(Error::InvalidConfigValue(format!(
                            "{} must be positive, got {}",
                            ENV_FALLBACK_FX_RATE, rate
                        )));
                    }
                    Some(rate)
                };
        }

        if let Some(raw) = lookup(ENV_VALUATION_TZ) {
            settings.valuation_timezone = raw.trim().parse::<Tz>().map_err(|e| {
                Error::InvalidConfigValue(format!("{}: {}", ENV_VALUATION_TZ, e))
            })?;
        }

        if let Some(raw) = lookup(ENV_PRICE_STALE_TRADING_DAYS) {
            settings.price_stale_trading_days = parse_number(ENV_PRICE_STALE_TRADING_DAYS, &raw)?;
        }

        if let Some(raw) = lookup(ENV_MAX_CONCURRENCY) {
            settings.max_concurrency = parse_number(ENV_MAX_CONCURRENCY, &raw)?;
        }

        if let Some(raw) = lookup(ENV_PERSISTENCE_MAX_ATTEMPTS) {
            settings.persistence_max_attempts = parse_number(ENV_PERSISTENCE_MAX_ATTEMPTS, &raw)?;
        }

        if let Some(raw) = lookup(ENV_PERSISTENCE_RETRY_BACKOFF_MS) {
            settings.persistence_retry_backoff_ms =
                parse_number(ENV_PERSISTENCE_RETRY_BACKOFF_MS, &raw)?;
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_concurrency == 0 {
            return Err(Error::InvalidConfigValue(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.persistence_max_attempts == 0 {
            return Err(Error::InvalidConfigValue(
                "persistence_max_attempts must be at least 1".to_string(),
            ));
        }
        if let Some(rate) = self.fallback_fx_rate {
            if rate <= Decimal::ZERO {
                return Err(Error::InvalidConfigValue(format!(
                    "fallback_fx_rate must be positive, got {}",
                    rate
                )));
            }
        }
        Ok(())
    }

    pub fn with_fallback_fx_rate(mut self, rate: Option<Decimal>) -> Self {
        self.fallback_fx_rate = rate;
        self
    }
}

fn parse_number<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| Error::InvalidConfigValue(format!("{}: {}", key, e)))
}
