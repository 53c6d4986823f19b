//! Paper order sink for dry runs and replays.

use async_trait::async_trait;
use chrono::Utc;
use kfx_core::error::BrokerError;
use kfx_core::traits::OrderSink;
use kfx_core::types::{AccountInfo, OrderReceipt, OrderRequest, RETCODE_DONE};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Simulated sink that fills every order at its request price.
pub struct PaperSink {
    account: AccountInfo,
    receipts: Mutex<Vec<OrderReceipt>>,
    next_ticket: AtomicU64,
    reject_reason: Option<String>,
}

impl PaperSink {
    /// Create a paper sink with a starting balance.
    pub fn new(balance: Decimal) -> Self {
        Self {
            account: AccountInfo {
                login: 0,
                server: "paper".to_string(),
                currency: "USD".to_string(),
                balance,
                equity: balance,
            },
            receipts: Mutex::new(Vec::new()),
            next_ticket: AtomicU64::new(1),
            reject_reason: None,
        }
    }

    /// Refuse every order with the given reason.
    pub fn rejecting(mut self, reason: impl Into<String>) -> Self {
        self.reject_reason = Some(reason.into());
        self
    }

    /// Receipts of every accepted order, in submission order.
    pub fn receipts(&self) -> Vec<OrderReceipt> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<OrderReceipt>> {
        // Receipts are append-only, so a poisoned lock still holds valid data
        self.receipts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for PaperSink {
    fn default() -> Self {
        Self::new(Decimal::new(10_000, 0))
    }
}

#[async_trait]
impl OrderSink for PaperSink {
    async fn account(&self) -> Result<AccountInfo, BrokerError> {
        Ok(self.account.clone())
    }

    async fn submit_order(&self, request: OrderRequest) -> Result<OrderReceipt, BrokerError> {
        if let Some(reason) = &self.reject_reason {
            return Err(BrokerError::OrderRejected(reason.clone()));
        }
        if request.volume <= Decimal::ZERO {
            return Err(BrokerError::OrderRejected("Invalid volume".to_string()));
        }

        let receipt = OrderReceipt {
            ticket: self.next_ticket.fetch_add(1, Ordering::SeqCst),
            symbol: request.symbol,
            side: request.side,
            volume: request.volume,
            price: request.price,
            retcode: RETCODE_DONE,
            comment: request.comment,
            timestamp: Utc::now(),
        };

        debug!(ticket = receipt.ticket, symbol = %receipt.symbol, "Paper fill");
        self.lock().push(receipt.clone());
        Ok(receipt)
    }

    fn name(&self) -> &str {
        "Paper"
    }
}
