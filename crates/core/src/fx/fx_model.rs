use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A stored conversion rate, keyed by `(from_currency, to_currency, date)`.
///
/// `rate` is units of `to_currency` per unit of `from_currency`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    pub from_currency: String,
    pub to_currency: String,
    #[serde(serialize_with = "serialize_decimal_6")]
    pub rate: Decimal,
    pub date: NaiveDate,
    pub source: String,
    pub updated_at: DateTime<Utc>,
}

impl ExchangeRate {
    /// Returns the same quote expressed for the opposite direction.
    /// `None` for a zero rate, which has no inverse.
    pub fn inverted(&self) -> Option<ExchangeRate> {
        if self.rate.is_zero() {
            return None;
        }
        Some(ExchangeRate {
            from_currency: self.to_currency.clone(),
            to_currency: self.from_currency.clone(),
            rate: Decimal::ONE / self.rate,
            date: self.date,
            source: self.source.clone(),
            updated_at: self.updated_at,
        })
    }

    /// Creates a pair key for logging and caching.
    /// Returns format: "USD/TWD"
    pub fn make_pair_key(from: &str, to: &str) -> String {
        format!("{}/{}", from, to)
    }
}

fn serialize_decimal_6<S>(decimal: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let rounded = decimal.round_dp(crate::constants::DECIMAL_PRECISION);
    serializer.serialize_str(&rounded.to_string())
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewExchangeRate {
    pub from_currency: String,
    pub to_currency: String,
    pub rate: Decimal,
    pub date: NaiveDate,
    #[serde(default)]
    pub source: Option<String>,
}

/// Where a resolved rate came from.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateProvenance {
    /// Same currency on both sides, no lookup.
    Identity,
    /// A stored rate for exactly the requested date.
    ExactDate,
    /// The most recent stored rate before the requested date.
    PriorDate,
    /// The configured fixed default. Not a market quote.
    Fallback,
}

/// The answer of the resolver for one `(from, to, date)` request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRate {
    pub from_currency: String,
    pub to_currency: String,
    pub rate: Decimal,
    /// Date the request was made for.
    pub requested_date: NaiveDate,
    /// Date the underlying quote belongs to. `None` for identity and fallback.
    pub quoted_date: Option<NaiveDate>,
    pub provenance: RateProvenance,
}

impl ResolvedRate {
    pub fn identity(currency: &str, date: NaiveDate) -> Self {
        Self {
            from_currency: currency.to_string(),
            to_currency: currency.to_string(),
            rate: Decimal::ONE,
            requested_date: date,
            quoted_date: None,
            provenance: RateProvenance::Identity,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.provenance == RateProvenance::Fallback
    }

    pub fn convert(&self, amount: Decimal) -> Decimal {
        amount * self.rate
    }
}
