//! Turning an entry signal into a market order request.

use kfx_core::error::StrategyError;
use kfx_core::types::{FillPolicy, OrderRequest, Side, Signal, SymbolInfo, Tick};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Tags and execution parameters stamped on every order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderSettings {
    /// Identifying tag stored with each order
    pub magic: u64,
    /// Note stored with each order
    pub comment: String,
    /// Maximum accepted slippage, in points
    pub deviation: u32,
    /// Filling policy
    pub filling: FillPolicy,
}

impl Default for OrderSettings {
    fn default() -> Self {
        Self {
            magic: 100_000,
            comment: "KFX Bot Entry".to_string(),
            deviation: 20,
            filling: FillPolicy::Ioc,
        }
    }
}

/// Builds order requests of a fixed volume.
#[derive(Debug, Clone)]
pub struct OrderTemplate {
    volume: Decimal,
    settings: OrderSettings,
}

impl OrderTemplate {
    pub fn new(volume: Decimal, settings: OrderSettings) -> Self {
        Self { volume, settings }
    }

    pub fn volume(&self) -> Decimal {
        self.volume
    }

    pub fn settings(&self) -> &OrderSettings {
        &self.settings
    }

    /// Build the order for an entry signal.
    ///
    /// Buys are priced at the ask and sells at the bid of `tick`; stop-loss
    /// and take-profit come from the signal. All prices are rounded to the
    /// symbol's digits. Returns `Ok(None)` for a no-entry signal.
    pub fn build(
        &self,
        signal: &Signal,
        info: &SymbolInfo,
        tick: &Tick,
    ) -> Result<Option<OrderRequest>, StrategyError> {
        let (side, levels) = match signal {
            Signal::Buy(levels) => (Side::Buy, levels),
            Signal::Sell(levels) => (Side::Sell, levels),
            Signal::None(_) => return Ok(None),
        };

        let raw_price = match side {
            Side::Buy => tick.ask,
            Side::Sell => tick.bid,
        };
        let price = normalize(info, "price", raw_price)?;
        let stop_loss = normalize(info, "stop_loss", levels.stop_loss)?;
        let take_profit = normalize(info, "take_profit", levels.take_profit)?;

        debug!(
            symbol = %info.symbol,
            %side,
            %price,
            %stop_loss,
            %take_profit,
            "Built market order"
        );

        let request = OrderRequest::market(info.symbol.clone(), side, self.volume, price)
            .with_protection(stop_loss, take_profit)
            .with_deviation(self.settings.deviation)
            .with_tags(self.settings.magic, self.settings.comment.clone())
            .with_filling(self.settings.filling);

        Ok(Some(request))
    }
}

fn normalize(info: &SymbolInfo, field: &'static str, value: f64) -> Result<Decimal, StrategyError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(StrategyError::InvalidPrice { field, value });
    }
    info.normalize_price(value)
        .ok_or(StrategyError::InvalidPrice { field, value })
}
