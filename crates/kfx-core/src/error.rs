//! Error types for the signal bot.

use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum KfxError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),

    #[error("Broker error: {0}")]
    Broker(#[from] BrokerError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Strategy-specific errors.
#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid price for {field}: {value}")]
    InvalidPrice { field: &'static str, value: f64 },
}

/// Order sink and terminal errors.
#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// The terminal answered but refused the request. Carries its reason.
    #[error("Order rejected: {0}")]
    OrderRejected(String),

    #[error("API error: {0}")]
    ApiError(String),
}

/// Market data errors.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("No data available for the requested range")]
    NoDataAvailable,

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Result type alias for bot operations.
pub type KfxResult<T> = Result<T, KfxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let err: KfxError = BrokerError::OrderRejected("Invalid stops".to_string()).into();
        assert_eq!(err.to_string(), "Broker error: Order rejected: Invalid stops");

        let err: KfxError = DataError::SymbolNotFound("NOPE".to_string()).into();
        assert_eq!(err.to_string(), "Data error: Symbol not found: NOPE");
    }
}
