use thiserror::Error;

/// Validation and contract errors exposed by `quoteboard-core`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("invalid provider '{value}', expected one of alphavantage, yahoo")]
    InvalidProvider { value: String },
    #[error("invalid rsi source '{value}', expected one of upstream, local, off")]
    InvalidRsiSource { value: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },
    #[error("unix timestamp {value} is out of range")]
    TimestampOutOfRange { value: i64 },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },
    #[error("rsi {value} is outside 0..=100")]
    RsiOutOfRange { value: f64 },

    #[error("chart point high must be >= low")]
    InvalidPointRange,
    #[error("chart point open/close must be within high/low range")]
    InvalidPointBounds,
}
