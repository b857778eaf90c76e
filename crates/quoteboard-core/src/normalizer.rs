//! Provider payload normalization.
//!
//! Normalizers are pure: raw response body in, domain values or a
//! [`FetchError`] out. Keeping them apart from transport lets every payload
//! shape be tested without a network stub.

use crate::data_source::FetchError;
use crate::{ChartPoint, Listing, Quote, ValidationError};

pub trait Normalizer: Send + Sync {
    /// Converts a quote payload into a [`Quote`] for `listing`.
    ///
    /// # Errors
    ///
    /// Returns a schema error for upstream error payloads and for missing or
    /// non-numeric required fields. Rate-limit notices map to
    /// [`FetchErrorKind::RateLimited`](crate::data_source::FetchErrorKind::RateLimited).
    fn parse_quote(&self, listing: &Listing, raw: &str) -> Result<Quote, FetchError>;

    /// Converts a series payload into chart points, oldest first.
    ///
    /// Individual malformed points are dropped; an empty result is an error.
    ///
    /// # Errors
    ///
    /// Same conditions as [`parse_quote`](Normalizer::parse_quote).
    fn parse_series(&self, raw: &str) -> Result<Vec<ChartPoint>, FetchError>;
}

impl From<ValidationError> for FetchError {
    fn from(error: ValidationError) -> Self {
        FetchError::schema(error.to_string())
    }
}

/// Reads a numeric field that a provider encodes as a JSON string.
pub(crate) fn parse_decimal(field: &str, raw: Option<&str>) -> Result<f64, FetchError> {
    let raw = raw
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| FetchError::schema(format!("missing field '{field}'")))?;

    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| FetchError::schema(format!("field '{field}' is not numeric: '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::FetchErrorKind;

    #[test]
    fn parses_string_encoded_numbers() {
        assert_eq!(parse_decimal("05. price", Some(" 118.45 ")).expect("numeric"), 118.45);
    }

    #[test]
    fn rejects_missing_and_garbage_values() {
        let missing = parse_decimal("05. price", None).expect_err("missing");
        assert_eq!(missing.kind(), FetchErrorKind::Schema);
        assert!(missing.message().contains("05. price"));

        assert!(parse_decimal("05. price", Some("")).is_err());
        assert!(parse_decimal("05. price", Some("n/a")).is_err());
        assert!(parse_decimal("05. price", Some("NaN")).is_err());
    }
}
