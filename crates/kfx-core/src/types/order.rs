//! Order request, receipt and account types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Terminal return code for an executed request.
pub const RETCODE_DONE: u32 = 10009;

/// Order side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// How long an order stays working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeInForce {
    /// Good til canceled
    #[default]
    Gtc,
    /// Valid for the trading day only
    Day,
}

/// What to do with the unfilled part of a market order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FillPolicy {
    /// Immediate or cancel
    #[default]
    Ioc,
    /// Fill or kill
    Fok,
    /// Leave the remainder working
    Return,
}

/// A market order with attached stop-loss and take-profit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Symbol to trade
    pub symbol: String,
    /// Buy or sell
    pub side: Side,
    /// Volume in lots
    pub volume: Decimal,
    /// Requested execution price (ask for buys, bid for sells)
    pub price: Decimal,
    /// Protective stop
    pub stop_loss: Decimal,
    /// Profit target
    pub take_profit: Decimal,
    /// Maximum accepted slippage, in points
    pub deviation: u32,
    /// Identifying tag stored with the order
    pub magic: u64,
    /// Free-text note stored with the order
    pub comment: String,
    /// Time in force
    pub time_in_force: TimeInForce,
    /// Filling policy
    pub filling: FillPolicy,
}

impl OrderRequest {
    /// Create a market order request with no protection or tags.
    pub fn market(symbol: impl Into<String>, side: Side, volume: Decimal, price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            volume,
            price,
            stop_loss: Decimal::ZERO,
            take_profit: Decimal::ZERO,
            deviation: 0,
            magic: 0,
            comment: String::new(),
            time_in_force: TimeInForce::Gtc,
            filling: FillPolicy::Ioc,
        }
    }

    /// Attach stop-loss and take-profit prices.
    pub fn with_protection(mut self, stop_loss: Decimal, take_profit: Decimal) -> Self {
        self.stop_loss = stop_loss;
        self.take_profit = take_profit;
        self
    }

    /// Set the maximum slippage in points.
    pub fn with_deviation(mut self, deviation: u32) -> Self {
        self.deviation = deviation;
        self
    }

    /// Set the identifying tag and note.
    pub fn with_tags(mut self, magic: u64, comment: impl Into<String>) -> Self {
        self.magic = magic;
        self.comment = comment.into();
        self
    }

    /// Set the filling policy.
    pub fn with_filling(mut self, filling: FillPolicy) -> Self {
        self.filling = filling;
        self
    }
}

/// Confirmation of an executed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderReceipt {
    /// Terminal-assigned ticket
    pub ticket: u64,
    /// Symbol traded
    pub symbol: String,
    /// Buy or sell
    pub side: Side,
    /// Executed volume
    pub volume: Decimal,
    /// Executed price
    pub price: Decimal,
    /// Terminal return code
    pub retcode: u32,
    /// Terminal comment
    pub comment: String,
    /// When the receipt was produced
    pub timestamp: DateTime<Utc>,
}

/// Trading account summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Account number
    pub login: u64,
    /// Trade server name
    pub server: String,
    /// Deposit currency
    pub currency: String,
    /// Balance
    pub balance: Decimal,
    /// Equity
    pub equity: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_order_request_builders() {
        let request = OrderRequest::market("EURUSDm", Side::Buy, dec!(0.1), dec!(1.08520))
            .with_protection(dec!(1.08460), dec!(1.08640))
            .with_deviation(20)
            .with_tags(100000, "KFX Bot Entry");

        assert_eq!(request.symbol, "EURUSDm");
        assert_eq!(request.side, Side::Buy);
        assert_eq!(request.volume, dec!(0.1));
        assert_eq!(request.stop_loss, dec!(1.08460));
        assert_eq!(request.take_profit, dec!(1.08640));
        assert_eq!(request.deviation, 20);
        assert_eq!(request.magic, 100000);
        assert_eq!(request.time_in_force, TimeInForce::Gtc);
        assert_eq!(request.filling, FillPolicy::Ioc);
    }

    #[test]
    fn test_side() {
        assert_eq!(Side::Sell.to_string(), "SELL");
    }

    #[test]
    fn test_fill_policy_serde() {
        let json = serde_json::to_string(&FillPolicy::Ioc).unwrap();
        assert_eq!(json, "\"ioc\"");
        let parsed: FillPolicy = serde_json::from_str("\"fok\"").unwrap();
        assert_eq!(parsed, FillPolicy::Fok);
    }
}
