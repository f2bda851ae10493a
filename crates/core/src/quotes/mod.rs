//! Price quotes consumed by the holdings valuation.

mod errors;
mod model;
mod source;
pub mod staleness;

pub use errors::QuoteError;
pub use model::PriceQuote;
pub use source::PriceQuoteSourceTrait;
