//! Quote-related error types.

use thiserror::Error;

/// Errors raised by price quote sources.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuoteError {
    /// No usable quote for the symbol. The symbol is left out of holdings.
    #[error("No price available for {symbol}: {reason}")]
    PriceUnavailable { symbol: String, reason: String },

    /// The source answered with something the engine cannot value with.
    #[error("Invalid quote for {symbol}: {reason}")]
    InvalidQuote { symbol: String, reason: String },
}

impl QuoteError {
    pub fn unavailable(symbol: &str, reason: impl Into<String>) -> Self {
        QuoteError::PriceUnavailable {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }
}
