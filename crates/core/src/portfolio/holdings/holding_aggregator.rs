use chrono_tz::Tz;
use log::warn;
use std::sync::Arc;

use super::holdings_model::{Holding, PriceStaleReason};
use crate::errors::Result;
use crate::fx::ExchangeRateResolver;
use crate::portfolio::fifo::{CostBasisSnapshot, FxFallbackUsage};
use crate::quotes::staleness::quote_age_trading_days;
use crate::quotes::PriceQuote;
use crate::settings::EngineSettings;
use crate::utils::decimal_utils::percentage_of;

/// Values a cost-basis snapshot at a live quote.
pub struct HoldingAggregator {
    resolver: Arc<ExchangeRateResolver>,
    reporting_currency: String,
    valuation_timezone: Tz,
    stale_after_trading_days: u32,
}

impl HoldingAggregator {
    pub fn new(resolver: Arc<ExchangeRateResolver>, settings: &EngineSettings) -> Self {
        Self {
            resolver,
            reporting_currency: settings.reporting_currency.clone(),
            valuation_timezone: settings.valuation_timezone,
            stale_after_trading_days: settings.price_stale_trading_days,
        }
    }

    pub fn build(&self, snapshot: &CostBasisSnapshot, quote: &PriceQuote) -> Result<Holding> {
        self.build_with_fallbacks(snapshot, quote, &[])
    }

    /// Like [`HoldingAggregator::build`], also flagging the holding when its
    /// cost basis was converted at the fixed default rate. Fallbacks of sells
    /// and of fully closed lots are ignored.
    pub fn build_with_fallbacks(
        &self,
        snapshot: &CostBasisSnapshot,
        quote: &PriceQuote,
        historical_fallbacks: &[FxFallbackUsage],
    ) -> Result<Holding> {
        quote.validate()?;

        let rate = self
            .resolver
            .resolve_current(&quote.currency, &self.reporting_currency)?;
        let current_price_reporting_currency = rate.convert(quote.price);
        let market_value = snapshot.quantity * current_price_reporting_currency;
        let unrealized_pl = market_value - snapshot.total_cost;

        let mut reasons = Vec::new();
        if quote.is_stale {
            reasons.push(PriceStaleReason::ProviderFlagged);
        }
        let age = quote_age_trading_days(quote, self.resolver.today(), self.valuation_timezone);
        if age > self.stale_after_trading_days {
            reasons.push(PriceStaleReason::OutdatedQuote {
                as_of: quote.as_of,
                trading_days: age,
            });
        }
        if rate.is_fallback() {
            reasons.push(PriceStaleReason::FallbackFxRate {
                from: rate.from_currency.clone(),
                to: rate.to_currency.clone(),
            });
        }
        // Only buys that still back an open lot feed the cost basis.
        let open_lot_fallbacks = historical_fallbacks
            .iter()
            .filter(|usage| {
                snapshot
                    .lots
                    .iter()
                    .any(|lot| lot.transaction_id == usage.transaction_id)
            })
            .count();
        if open_lot_fallbacks > 0 {
            reasons.push(PriceStaleReason::HistoricalFallbackFxRate {
                count: open_lot_fallbacks,
            });
        }
        if !reasons.is_empty() {
            warn!("Holding {} is flagged stale: {:?}", snapshot.symbol, reasons);
        }

        Ok(Holding {
            symbol: snapshot.symbol.clone(),
            name: snapshot.name.clone(),
            asset_type: snapshot.asset_type,
            quantity: snapshot.quantity,
            avg_cost: snapshot.avg_cost,
            total_cost: snapshot.total_cost,
            current_price: quote.price,
            price_currency: quote.currency.clone(),
            price_as_of: quote.as_of,
            fx_rate: rate.rate,
            current_price_reporting_currency,
            market_value,
            unrealized_pl,
            unrealized_pl_pct: percentage_of(unrealized_pl, snapshot.total_cost),
            price_source: quote.source.clone(),
            is_price_stale: !reasons.is_empty(),
            price_stale_reasons: reasons,
            reporting_currency: self.reporting_currency.clone(),
            open_date: snapshot.open_date,
        })
    }
}
