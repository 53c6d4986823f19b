//! Order sink trait.

use crate::error::BrokerError;
use crate::types::{AccountInfo, OrderReceipt, OrderRequest};
use async_trait::async_trait;

/// Destination for market orders.
///
/// A sink either executes the request or refuses it. Refusals come back as
/// [`BrokerError::OrderRejected`] carrying the terminal's reason.
#[async_trait]
pub trait OrderSink: Send + Sync {
    /// Get account information.
    async fn account(&self) -> Result<AccountInfo, BrokerError>;

    /// Submit a market order.
    ///
    /// # Arguments
    /// * `request` - The order request to submit
    ///
    /// # Returns
    /// A receipt for the executed order
    async fn submit_order(&self, request: OrderRequest) -> Result<OrderReceipt, BrokerError>;

    /// Get the sink name.
    fn name(&self) -> &str;
}
