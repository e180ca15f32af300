//! Error types for the pair protection system.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration file error: {0}")]
    ConfigFile(#[from] config::ConfigError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid timeframe: {0}")]
    InvalidTimeframe(String),

    #[error("Invalid unlock_at value {0:?}, expected HH:MM")]
    InvalidUnlockAt(String),

    #[error("Cannot calculate a lock end without trades")]
    NoTrades,

    #[error("Trade history error: {message}")]
    TradeHistory { message: String },
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn trade_history(message: impl Into<String>) -> Self {
        Self::TradeHistory {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
