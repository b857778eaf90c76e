use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use super::GuardedTransport;
use crate::data_source::{DataSource, FetchError, FetchFuture};
use crate::http_client::{HttpClient, HttpRequest};
use crate::normalizer::Normalizer;
use crate::provider_policy::ProviderPolicy;
use crate::{ChartPoint, Granularity, Listing, ProviderId, Quote, UtcDateTime};

const CHART_ENDPOINT: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Yahoo Finance adapter over the public v8 chart endpoint.
///
/// The chart endpoint needs no API key or crumb; quote and series both come
/// from it with different range parameters. Yahoo publishes no RSI, so
/// upstream RSI stays unsupported.
pub struct YahooAdapter {
    transport: GuardedTransport,
    normalizer: YahooNormalizer,
}

impl YahooAdapter {
    pub fn new(policy: ProviderPolicy, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            transport: GuardedTransport::new(policy, http_client),
            normalizer: YahooNormalizer,
        }
    }

    fn chart_request(ticker: &str, range: &str, interval: &str) -> HttpRequest {
        HttpRequest::get(format!(
            "{CHART_ENDPOINT}/{}?range={range}&interval={interval}",
            urlencoding::encode(ticker)
        ))
        .with_header("user-agent", BROWSER_USER_AGENT)
        .with_header("accept", "application/json")
        .with_header("referer", "https://finance.yahoo.com/")
    }
}

impl DataSource for YahooAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn quote<'a>(
        &'a self,
        listing: &'a Listing,
        credential: Option<&'a str>,
    ) -> FetchFuture<'a, Quote> {
        let _ = credential;
        Box::pin(async move {
            let request = Self::chart_request(&listing.yahoo_ticker, "1d", "1d");
            let body = self.transport.get(request).await?;
            self.normalizer.parse_quote(listing, &body)
        })
    }

    fn series<'a>(
        &'a self,
        listing: &'a Listing,
        granularity: Granularity,
        credential: Option<&'a str>,
    ) -> FetchFuture<'a, Vec<ChartPoint>> {
        let _ = credential;
        Box::pin(async move {
            let request = Self::chart_request(
                &listing.yahoo_ticker,
                range_for(granularity),
                granularity.as_str(),
            );
            let body = self.transport.get(request).await?;
            self.normalizer.parse_series(&body)
        })
    }
}

/// Widest range Yahoo serves for each intraday bucket without thinning it out.
fn range_for(granularity: Granularity) -> &'static str {
    match granularity {
        Granularity::OneMinute => "1d",
        Granularity::FiveMinutes | Granularity::FifteenMinutes => "5d",
        Granularity::ThirtyMinutes | Granularity::SixtyMinutes => "1mo",
    }
}

/// Parses v8 chart payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct YahooNormalizer;

impl YahooNormalizer {
    fn first_result(raw: &str) -> Result<ChartResult, FetchError> {
        let envelope: ChartEnvelope = serde_json::from_str(raw)
            .map_err(|error| FetchError::schema(format!("malformed yahoo chart: {error}")))?;

        if let Some(error) = envelope.chart.error {
            return Err(FetchError::schema(format!(
                "yahoo error: {}",
                error
                    .description
                    .or(error.code)
                    .unwrap_or_else(|| String::from("unspecified"))
            )));
        }

        envelope
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| FetchError::schema("yahoo chart has no result"))
    }
}

impl Normalizer for YahooNormalizer {
    fn parse_quote(&self, listing: &Listing, raw: &str) -> Result<Quote, FetchError> {
        let meta = Self::first_result(raw)?
            .meta
            .ok_or_else(|| FetchError::schema("yahoo chart has no meta block"))?;

        let price = meta
            .regular_market_price
            .ok_or_else(|| FetchError::schema("missing field 'regularMarketPrice'"))?;
        let previous_close = meta
            .previous_close
            .or(meta.chart_previous_close)
            .ok_or_else(|| FetchError::schema("missing field 'chartPreviousClose'"))?;
        let as_of = match meta.regular_market_time {
            Some(seconds) => UtcDateTime::from_unix_timestamp(seconds)?,
            None => UtcDateTime::now(),
        };

        Ok(Quote::new(
            listing.symbol.clone(),
            listing.display_name.clone(),
            price,
            previous_close,
            as_of,
        )?)
    }

    fn parse_series(&self, raw: &str) -> Result<Vec<ChartPoint>, FetchError> {
        let result = Self::first_result(raw)?;
        let timestamps = result.timestamp.unwrap_or_default();
        let columns = result
            .indicators
            .and_then(|indicators| indicators.quote.into_iter().next())
            .ok_or_else(|| FetchError::schema("yahoo chart has no quote indicators"))?;

        let points = timestamps
            .iter()
            .enumerate()
            .filter_map(|(index, &seconds)| match columns.point_at(index, seconds) {
                Ok(point) => point,
                Err(error) => {
                    debug!(index, %error, "dropping yahoo bar");
                    None
                }
            })
            .collect::<Vec<_>>();

        if points.is_empty() {
            return Err(FetchError::schema("yahoo series has no usable points"));
        }
        Ok(points)
    }
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
    previous_close: Option<f64>,
    chart_previous_close: Option<f64>,
    regular_market_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
}

/// Column-oriented OHLCV; Yahoo pads gaps with `null`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuoteColumns {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

impl QuoteColumns {
    /// `Ok(None)` for padded gaps, `Err` for values that break point invariants.
    fn point_at(&self, index: usize, seconds: i64) -> Result<Option<ChartPoint>, FetchError> {
        let column = |values: &[Option<f64>]| values.get(index).copied().flatten();

        let (Some(open), Some(high), Some(low), Some(close)) = (
            column(self.open.as_slice()),
            column(self.high.as_slice()),
            column(self.low.as_slice()),
            column(self.close.as_slice()),
        ) else {
            return Ok(None);
        };
        let volume = column(self.volume.as_slice())
            .filter(|value| value.is_finite() && *value > 0.0)
            .map_or(0, |value| value as u64);

        Ok(Some(ChartPoint::new(
            UtcDateTime::from_unix_timestamp(seconds)?,
            open,
            high,
            low,
            close,
            volume,
        )?))
    }
}
