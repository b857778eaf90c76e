use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::GuardedTransport;
use crate::data_source::{DataSource, FetchError, FetchFuture};
use crate::http_client::{HttpClient, HttpRequest};
use crate::normalizer::{parse_decimal, Normalizer};
use crate::provider_policy::ProviderPolicy;
use crate::{
    validate_rsi, ChartPoint, Granularity, Listing, ProviderId, Quote, UtcDateTime,
};

const ENDPOINT: &str = "https://www.alphavantage.co/query";
const RSI_TIME_PERIOD: u32 = 14;

/// Alpha Vantage adapter: GLOBAL_QUOTE, TIME_SERIES_INTRADAY and RSI.
///
/// Every call needs an API key; without one the adapter fails with
/// `CredentialMissing` before touching the network.
pub struct AlphaVantageAdapter {
    transport: GuardedTransport,
    normalizer: AlphaVantageNormalizer,
}

impl AlphaVantageAdapter {
    pub fn new(policy: ProviderPolicy, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            transport: GuardedTransport::new(policy, http_client),
            normalizer: AlphaVantageNormalizer,
        }
    }

    fn api_key<'k>(&self, credential: Option<&'k str>) -> Result<&'k str, FetchError> {
        credential
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| FetchError::credential_missing(ProviderId::Alphavantage))
    }

    fn query(params: &[(&str, &str)]) -> String {
        let query = params
            .iter()
            .map(|(name, value)| format!("{name}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{ENDPOINT}?{query}")
    }
}

impl DataSource for AlphaVantageAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Alphavantage
    }

    fn supports_upstream_rsi(&self) -> bool {
        true
    }

    fn quote<'a>(
        &'a self,
        listing: &'a Listing,
        credential: Option<&'a str>,
    ) -> FetchFuture<'a, Quote> {
        Box::pin(async move {
            let api_key = self.api_key(credential)?;
            let url = Self::query(&[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", &listing.alphavantage_ticker),
                ("apikey", api_key),
            ]);

            let body = self.transport.get(HttpRequest::get(url)).await?;
            self.normalizer.parse_quote(listing, &body)
        })
    }

    fn series<'a>(
        &'a self,
        listing: &'a Listing,
        granularity: Granularity,
        credential: Option<&'a str>,
    ) -> FetchFuture<'a, Vec<ChartPoint>> {
        Box::pin(async move {
            let api_key = self.api_key(credential)?;
            let url = Self::query(&[
                ("function", "TIME_SERIES_INTRADAY"),
                ("symbol", &listing.alphavantage_ticker),
                ("interval", interval_param(granularity)),
                ("outputsize", "compact"),
                ("apikey", api_key),
            ]);

            let body = self.transport.get(HttpRequest::get(url)).await?;
            self.normalizer.parse_series(&body)
        })
    }

    fn upstream_rsi<'a>(
        &'a self,
        listing: &'a Listing,
        credential: Option<&'a str>,
    ) -> FetchFuture<'a, f64> {
        Box::pin(async move {
            let api_key = self.api_key(credential)?;
            let time_period = RSI_TIME_PERIOD.to_string();
            let url = Self::query(&[
                ("function", "RSI"),
                ("symbol", &listing.alphavantage_ticker),
                ("interval", "daily"),
                ("time_period", &time_period),
                ("series_type", "close"),
                ("apikey", api_key),
            ]);

            let body = self.transport.get(HttpRequest::get(url)).await?;
            self.normalizer.parse_rsi(&body)
        })
    }
}

fn interval_param(granularity: Granularity) -> &'static str {
    match granularity {
        Granularity::OneMinute => "1min",
        Granularity::FiveMinutes => "5min",
        Granularity::FifteenMinutes => "15min",
        Granularity::ThirtyMinutes => "30min",
        Granularity::SixtyMinutes => "60min",
    }
}

/// Parses Alpha Vantage payloads, where every number arrives as a string.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlphaVantageNormalizer;

impl AlphaVantageNormalizer {
    /// Reads the most recent reading of a `Technical Analysis: RSI` payload.
    ///
    /// # Errors
    ///
    /// Schema error when the payload carries no readings or the latest one is
    /// not a number in `0..=100`.
    pub fn parse_rsi(&self, raw: &str) -> Result<f64, FetchError> {
        let payload = parse_payload(raw)?;
        let readings = payload
            .get("Technical Analysis: RSI")
            .ok_or_else(|| FetchError::schema("alphavantage response has no RSI readings"))?;
        let readings: BTreeMap<String, RsiReading> = serde_json::from_value(readings.clone())
            .map_err(|error| FetchError::schema(format!("malformed alphavantage RSI: {error}")))?;

        // Keys are ISO dates, so the last key is the latest reading.
        let (_, latest) = readings
            .iter()
            .next_back()
            .ok_or_else(|| FetchError::schema("alphavantage response has no RSI readings"))?;
        let value = parse_decimal("RSI", latest.rsi.as_deref())?;
        Ok(validate_rsi(value)?)
    }
}

impl Normalizer for AlphaVantageNormalizer {
    fn parse_quote(&self, listing: &Listing, raw: &str) -> Result<Quote, FetchError> {
        let payload = parse_payload(raw)?;
        let quote = payload
            .get("Global Quote")
            .ok_or_else(|| FetchError::schema("alphavantage response has no 'Global Quote'"))?;
        let quote: GlobalQuote = serde_json::from_value(quote.clone()).map_err(|error| {
            FetchError::schema(format!("malformed alphavantage quote: {error}"))
        })?;

        let price = parse_decimal("05. price", quote.price.as_deref())?;
        let previous_close = parse_decimal("08. previous close", quote.previous_close.as_deref())?;
        let as_of = quote
            .latest_trading_day
            .as_deref()
            .and_then(|day| UtcDateTime::parse_date(day).ok())
            .unwrap_or_else(UtcDateTime::now);

        Ok(Quote::new(
            listing.symbol.clone(),
            listing.display_name.clone(),
            price,
            previous_close,
            as_of,
        )?)
    }

    fn parse_series(&self, raw: &str) -> Result<Vec<ChartPoint>, FetchError> {
        let payload = parse_payload(raw)?;
        let series = payload
            .iter()
            .find(|(key, _)| key.starts_with("Time Series"))
            .map(|(_, value)| value)
            .ok_or_else(|| FetchError::schema("alphavantage response has no time series"))?;
        let bars: BTreeMap<String, IntradayBar> = serde_json::from_value(series.clone())
            .map_err(|error| FetchError::schema(format!("malformed alphavantage series: {error}")))?;

        let points = bars
            .iter()
            .filter_map(|(stamp, bar)| match bar.to_point(stamp) {
                Ok(point) => Some(point),
                Err(error) => {
                    debug!(stamp, %error, "dropping alphavantage bar");
                    None
                }
            })
            .collect::<Vec<_>>();

        if points.is_empty() {
            return Err(FetchError::schema("alphavantage series has no usable points"));
        }
        Ok(points)
    }
}

/// Decodes the top-level object and surfaces `Error Message`, `Note` and
/// `Information` payloads as failures.
fn parse_payload(raw: &str) -> Result<BTreeMap<String, Value>, FetchError> {
    let payload: BTreeMap<String, Value> = serde_json::from_str(raw).map_err(|error| {
        FetchError::schema(format!("alphavantage response is not a JSON object: {error}"))
    })?;

    if let Some(message) = payload.get("Error Message").and_then(Value::as_str) {
        return Err(FetchError::schema(format!("alphavantage error: {message}")));
    }
    if let Some(message) = ["Note", "Information"]
        .iter()
        .find_map(|key| payload.get(*key).and_then(Value::as_str))
    {
        return Err(FetchError::rate_limited(format!("alphavantage notice: {message}")));
    }

    Ok(payload)
}

#[derive(Debug, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "05. price")]
    price: Option<String>,
    #[serde(rename = "07. latest trading day")]
    latest_trading_day: Option<String>,
    #[serde(rename = "08. previous close")]
    previous_close: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IntradayBar {
    #[serde(rename = "1. open")]
    open: Option<String>,
    #[serde(rename = "2. high")]
    high: Option<String>,
    #[serde(rename = "3. low")]
    low: Option<String>,
    #[serde(rename = "4. close")]
    close: Option<String>,
    #[serde(rename = "5. volume")]
    volume: Option<String>,
}

impl IntradayBar {
    /// Stamps are exchange-local wall clock without a zone; they are kept as UTC.
    fn to_point(&self, stamp: &str) -> Result<ChartPoint, FetchError> {
        let timestamp = UtcDateTime::parse_naive(stamp)?;
        let volume = self
            .volume
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .unwrap_or(0);

        Ok(ChartPoint::new(
            timestamp,
            parse_decimal("1. open", self.open.as_deref())?,
            parse_decimal("2. high", self.high.as_deref())?,
            parse_decimal("3. low", self.low.as_deref())?,
            parse_decimal("4. close", self.close.as_deref())?,
            volume,
        )?)
    }
}

#[derive(Debug, Deserialize)]
struct RsiReading {
    #[serde(rename = "RSI")]
    rsi: Option<String>,
}
