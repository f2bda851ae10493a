//! FX (Foreign Exchange) module - rate models, storage contract, resolution chain.

pub mod currency;
mod exchange_rate_resolver;
mod fx_errors;
mod fx_model;
mod fx_service;
mod fx_traits;

pub use currency::normalize_currency_code;
pub use exchange_rate_resolver::{
    ExactDateStrategy, ExchangeRateResolver, FixedDefaultRate, PriorDateStrategy, RateStrategy,
};
pub use fx_errors::FxError;
pub use fx_model::{ExchangeRate, NewExchangeRate, RateProvenance, ResolvedRate};
pub use fx_service::FxService;
pub use fx_traits::{ExchangeRateStoreTrait, FxServiceTrait};
