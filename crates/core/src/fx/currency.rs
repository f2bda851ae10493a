use super::fx_errors::FxError;

/// Normalizes a currency code for lookups: trims and upper-cases it.
///
/// Accepts 3 to 5 ASCII alphanumerics so that crypto tickers such as `USDT`
/// pass alongside ISO 4217 codes.
pub fn normalize_currency_code(code: &str) -> Result<String, FxError> {
    let trimmed = code.trim();
    let valid = (3..=5).contains(&trimmed.len())
        && trimmed.chars().all(|c| c.is_ascii_alphanumeric());
    if !valid {
        return Err(FxError::InvalidCurrencyCode(code.to_string()));
    }
    Ok(trimmed.to_ascii_uppercase())
}
