use serde::{Deserialize, Serialize};

use crate::{Symbol, UtcDateTime, ValidationError};

/// Point-in-time quote snapshot for one board symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: Symbol,
    pub display_name: String,
    pub price: f64,
    pub previous_close: f64,
    pub change: f64,
    pub change_percent: f64,
    pub rsi: Option<f64>,
    pub as_of: UtcDateTime,
    /// Set when the values were generated locally instead of fetched.
    pub is_synthetic: bool,
}

impl Quote {
    /// Build a quote from a last price and the previous session close.
    ///
    /// `change` and `change_percent` are always derived here so every provider
    /// reports them the same way. A non-positive previous close yields a zero
    /// percentage.
    pub fn new(
        symbol: Symbol,
        display_name: impl Into<String>,
        price: f64,
        previous_close: f64,
        as_of: UtcDateTime,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("price", price)?;
        validate_non_negative("previous_close", previous_close)?;

        let (change, change_percent) = derive_change(price, previous_close);

        Ok(Self {
            symbol,
            display_name: display_name.into(),
            price,
            previous_close,
            change,
            change_percent,
            rsi: None,
            as_of,
            is_synthetic: false,
        })
    }

    /// Infallible constructor for locally generated quotes.
    ///
    /// Non-finite or negative inputs are replaced by zero and the RSI is clamped
    /// into range, so the result always satisfies the `Quote` invariants.
    pub fn placeholder(
        symbol: Symbol,
        display_name: impl Into<String>,
        price: f64,
        previous_close: f64,
        rsi: Option<f64>,
        as_of: UtcDateTime,
    ) -> Self {
        let price = non_negative_or_zero(price);
        let previous_close = non_negative_or_zero(previous_close);
        let (change, change_percent) = derive_change(price, previous_close);

        Self {
            symbol,
            display_name: display_name.into(),
            price,
            previous_close,
            change,
            change_percent,
            rsi: rsi.map(|value| non_negative_or_zero(value).min(100.0)),
            as_of,
            is_synthetic: true,
        }
    }
}

/// One OHLCV sample of an intraday chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub timestamp: UtcDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl ChartPoint {
    pub fn new(
        timestamp: UtcDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("open", open)?;
        validate_non_negative("high", high)?;
        validate_non_negative("low", low)?;
        validate_non_negative("close", close)?;

        if high < low {
            return Err(ValidationError::InvalidPointRange);
        }

        if open < low || open > high || close < low || close > high {
            return Err(ValidationError::InvalidPointBounds);
        }

        Ok(Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        })
    }
}

fn derive_change(price: f64, previous_close: f64) -> (f64, f64) {
    let change = price - previous_close;
    let change_percent = if previous_close > 0.0 {
        change / previous_close * 100.0
    } else {
        0.0
    };
    (change, change_percent)
}

fn non_negative_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// Check an RSI reading is finite and inside `0..=100`.
pub fn validate_rsi(value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field: "rsi" });
    }
    if !(0.0..=100.0).contains(&value) {
        return Err(ValidationError::RsiOutOfRange { value });
    }
    Ok(value)
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}
