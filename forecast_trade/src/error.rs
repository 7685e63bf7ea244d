//! Error types for the forecast_trade crate

use thiserror::Error;

/// Custom error types for the forecast_trade crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The provider returned no usable data for the symbol
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// The price history is shorter than the indicator warm-up requires
    #[error("Insufficient history: need at least {required} observations, got {actual}")]
    InsufficientHistory { required: usize, actual: usize },

    /// No (or too few) rows remain after the horizon shift
    #[error("Insufficient training data: need at least {required} rows, got {actual}")]
    InsufficientTrainingData { required: usize, actual: usize },

    /// Opaque failure while fetching market data
    #[error("Provider error for {symbol}: {source}")]
    Provider {
        symbol: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error related to data validation
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from indicator calculations
    #[error("Math error: {0}")]
    Math(#[from] trade_math::MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from CSV parsing
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error from JSON (de)serialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ForecastError {
    /// Wrap an arbitrary fetch failure for `symbol`
    pub fn provider<E>(symbol: &str, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        ForecastError::Provider {
            symbol: symbol.to_string(),
            source: source.into(),
        }
    }

    /// Whether this error means "no forecast available" for a symbol,
    /// as opposed to a caller or configuration mistake.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            ForecastError::DataUnavailable(_)
                | ForecastError::InsufficientHistory { .. }
                | ForecastError::InsufficientTrainingData { .. }
                | ForecastError::Provider { .. }
                | ForecastError::InvalidData(_)
                | ForecastError::Csv(_)
                | ForecastError::Io(_)
        )
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;
