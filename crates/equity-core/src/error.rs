//! Error types for equity research operations

use thiserror::Error;

/// Equity research specific errors
#[derive(Debug, Error)]
pub enum ResearchError {
    /// API request failed
    #[error("API error: {0}")]
    ApiError(String),

    /// Invalid ticker symbol provided
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable {
        symbol: String,
        reason: String,
    },

    /// Rate limit exceeded for API
    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded {
        provider: String,
    },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Filesystem error (cache, reports, stock database)
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// Alpha Vantage API error
    #[error("Alpha Vantage error: {0}")]
    AlphaVantageError(String),

    /// FRED API error
    #[error("FRED error: {0}")]
    FredError(String),

    /// Technical indicator calculation error
    #[error("Technical indicator error: {0}")]
    IndicatorError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Cache error
    #[error("Cache error: {0}")]
    CacheError(String),

    /// Stock database or lookup error
    #[error("Search error: {0}")]
    SearchError(String),

    /// Not enough price history to run a backtest
    #[error("Insufficient data for backtest: need {required} bars, got {actual}")]
    InsufficientData {
        required: usize,
        actual: usize,
    },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type alias for research operations
pub type Result<T> = std::result::Result<T, ResearchError>;

impl From<ta::errors::TaError> for ResearchError {
    fn from(err: ta::errors::TaError) -> Self {
        ResearchError::IndicatorError(err.to_string())
    }
}

impl From<yahoo_finance_api::YahooError> for ResearchError {
    fn from(err: yahoo_finance_api::YahooError) -> Self {
        let msg = err.to_string();
        if msg.contains("429") || msg.contains("Too Many") {
            ResearchError::RateLimitExceeded {
                provider: "Yahoo Finance".to_string(),
            }
        } else {
            ResearchError::YahooFinanceError(msg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ResearchError::InvalidSymbol("INVALID".to_string());
        assert_eq!(err.to_string(), "Invalid symbol: INVALID");

        let err = ResearchError::DataUnavailable {
            symbol: "AAPL".to_string(),
            reason: "No data found".to_string(),
        };
        assert_eq!(err.to_string(), "Data not available for AAPL: No data found");

        let err = ResearchError::InsufficientData {
            required: 100,
            actual: 42,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient data for backtest: need 100 bars, got 42"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ResearchError = io.into();
        assert!(matches!(err, ResearchError::IoError(_)));
        assert!(err.to_string().contains("missing"));
    }
}
