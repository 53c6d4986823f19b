//! HTTP bridge to a trading terminal gateway.

use async_trait::async_trait;
use chrono::Utc;
use kfx_core::error::{BrokerError, DataError};
use kfx_core::traits::{MarketData, OrderSink};
use kfx_core::types::{
    AccountInfo, Candle, FillPolicy, OrderReceipt, OrderRequest, Side, SymbolInfo, Tick,
    TimeInForce, Timeframe, RETCODE_DONE,
};
use reqwest::{header, Client, Response, StatusCode};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Terminal gateway connection settings.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl BridgeConfig {
    /// Create config without authentication.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            timeout: Duration::from_secs(10),
        }
    }

    /// Read the bearer token from the named environment variable, if set.
    pub fn with_token_env(mut self, var: &str) -> Self {
        self.token = std::env::var(var).ok().filter(|t| !t.is_empty());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Gateway response types
#[derive(Debug, Deserialize)]
struct GatewayAccount {
    login: u64,
    server: String,
    currency: String,
    balance: f64,
    equity: f64,
}

#[derive(Debug, Deserialize)]
struct GatewaySymbol {
    symbol: String,
    point: f64,
    digits: u32,
}

#[derive(Debug, Deserialize)]
struct GatewaySelect {
    selected: bool,
}

#[derive(Debug, Deserialize)]
struct GatewayTick {
    bid: f64,
    ask: f64,
    /// Unix milliseconds
    time_msc: i64,
}

#[derive(Debug, Deserialize)]
struct GatewayRate {
    /// Unix seconds
    time: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    tick_volume: f64,
}

#[derive(Debug, Serialize)]
struct GatewayOrder<'a> {
    action: &'static str,
    symbol: &'a str,
    volume: f64,
    #[serde(rename = "type")]
    order_type: &'static str,
    price: f64,
    sl: f64,
    tp: f64,
    deviation: u32,
    magic: u64,
    comment: &'a str,
    type_time: &'static str,
    type_filling: &'static str,
}

#[derive(Debug, Deserialize)]
struct GatewayOrderResult {
    retcode: u32,
    #[serde(default)]
    order: u64,
    #[serde(default)]
    volume: f64,
    #[serde(default)]
    price: f64,
    #[serde(default)]
    comment: String,
}

/// Terminal gateway client.
///
/// Serves both as the market data provider and as the order sink.
pub struct TerminalBridge {
    config: BridgeConfig,
    client: Client,
}

impl TerminalBridge {
    /// Create a new bridge client.
    pub fn new(config: BridgeConfig) -> Result<Self, BrokerError> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = &config.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| BrokerError::Configuration(e.to_string()))?,
            );
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| BrokerError::Connection(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>, DataError> {
        let resp = self
            .client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = check_status(resp)
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        resp.json()
            .await
            .map(Some)
            .map_err(|e| DataError::ParseError(e.to_string()))
    }
}

async fn check_status(resp: Response) -> Result<Response, BrokerError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(BrokerError::AuthenticationError(format!("{}: {}", status, text)));
    }
    Err(BrokerError::ApiError(format!("{}: {}", status, text)))
}

fn to_f64(field: &str, value: Decimal) -> Result<f64, BrokerError> {
    value
        .to_f64()
        .ok_or_else(|| BrokerError::ApiError(format!("{} out of range: {}", field, value)))
}

fn to_decimal(field: &str, value: f64) -> Result<Decimal, BrokerError> {
    Decimal::from_f64(value)
        .ok_or_else(|| BrokerError::ApiError(format!("Invalid {}: {}", field, value)))
}

fn side_str(side: Side) -> &'static str {
    match side {
        Side::Buy => "buy",
        Side::Sell => "sell",
    }
}

fn time_in_force_str(tif: TimeInForce) -> &'static str {
    match tif {
        TimeInForce::Gtc => "gtc",
        TimeInForce::Day => "day",
    }
}

fn filling_str(filling: FillPolicy) -> &'static str {
    match filling {
        FillPolicy::Ioc => "ioc",
        FillPolicy::Fok => "fok",
        FillPolicy::Return => "return",
    }
}

#[async_trait]
impl MarketData for TerminalBridge {
    async fn select_symbol(&self, symbol: &str) -> Result<bool, DataError> {
        let resp = self
            .client
            .post(self.url(&format!("/symbols/{}/select", symbol)))
            .send()
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        let resp = check_status(resp)
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;
        let body: GatewaySelect = resp
            .json()
            .await
            .map_err(|e| DataError::ParseError(e.to_string()))?;

        Ok(body.selected)
    }

    async fn symbol_info(&self, symbol: &str) -> Result<SymbolInfo, DataError> {
        let info: GatewaySymbol = self
            .get_json(&format!("/symbols/{}", symbol), &[])
            .await?
            .ok_or_else(|| DataError::SymbolNotFound(symbol.to_string()))?;

        Ok(SymbolInfo::new(info.symbol, info.point, info.digits))
    }

    async fn latest_tick(&self, symbol: &str) -> Result<Option<Tick>, DataError> {
        let tick: Option<GatewayTick> = self
            .get_json(&format!("/symbols/{}/tick", symbol), &[])
            .await?;

        Ok(tick.map(|t| Tick {
            symbol: symbol.to_string(),
            bid: t.bid,
            ask: t.ask,
            timestamp: t.time_msc,
        }))
    }

    async fn recent_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<Candle>, DataError> {
        let query = [
            ("timeframe", timeframe.to_string()),
            ("start", "0".to_string()),
            ("count", count.to_string()),
        ];
        let rates: Vec<GatewayRate> = self
            .get_json(&format!("/symbols/{}/rates", symbol), &query)
            .await?
            .ok_or_else(|| DataError::SymbolNotFound(symbol.to_string()))?;

        let mut candles: Vec<Candle> = rates
            .into_iter()
            .map(|r| {
                Candle::new(r.time * 1000, r.open, r.high, r.low, r.close)
                    .with_tick_volume(r.tick_volume)
            })
            .collect();
        candles.sort_by_key(|c| c.timestamp);

        debug!(symbol, %timeframe, requested = count, received = candles.len(), "Fetched rates");
        Ok(candles)
    }

    fn name(&self) -> &str {
        "Terminal"
    }
}

#[async_trait]
impl OrderSink for TerminalBridge {
    async fn account(&self) -> Result<AccountInfo, BrokerError> {
        let resp = self
            .client
            .get(self.url("/account"))
            .send()
            .await
            .map_err(|e| BrokerError::Connection(e.to_string()))?;
        let account: GatewayAccount = check_status(resp)
            .await?
            .json()
            .await
            .map_err(|e| BrokerError::ApiError(e.to_string()))?;

        Ok(AccountInfo {
            login: account.login,
            server: account.server,
            currency: account.currency,
            balance: to_decimal("balance", account.balance)?,
            equity: to_decimal("equity", account.equity)?,
        })
    }

    async fn submit_order(&self, request: OrderRequest) -> Result<OrderReceipt, BrokerError> {
        let body = GatewayOrder {
            action: "deal",
            symbol: &request.symbol,
            volume: to_f64("volume", request.volume)?,
            order_type: side_str(request.side),
            price: to_f64("price", request.price)?,
            sl: to_f64("sl", request.stop_loss)?,
            tp: to_f64("tp", request.take_profit)?,
            deviation: request.deviation,
            magic: request.magic,
            comment: &request.comment,
            type_time: time_in_force_str(request.time_in_force),
            type_filling: filling_str(request.filling),
        };

        debug!(symbol = %request.symbol, side = %request.side, "Sending order");

        let resp = self
            .client
            .post(self.url("/orders"))
            .json(&body)
            .send()
            .await
            .map_err(|e| BrokerError::Connection(e.to_string()))?;
        let result: GatewayOrderResult = check_status(resp)
            .await?
            .json()
            .await
            .map_err(|e| BrokerError::ApiError(e.to_string()))?;

        if result.retcode != RETCODE_DONE {
            return Err(BrokerError::OrderRejected(result.comment));
        }

        info!(
            ticket = result.order,
            symbol = %request.symbol,
            price = result.price,
            "Order executed"
        );

        let price = if result.price > 0.0 {
            to_decimal("price", result.price)?
        } else {
            request.price
        };
        let volume = if result.volume > 0.0 {
            to_decimal("volume", result.volume)?
        } else {
            request.volume
        };

        Ok(OrderReceipt {
            ticket: result.order,
            symbol: request.symbol,
            side: request.side,
            volume,
            price,
            retcode: result.retcode,
            comment: result.comment,
            timestamp: Utc::now(),
        })
    }

    fn name(&self) -> &str {
        "Terminal"
    }
}
