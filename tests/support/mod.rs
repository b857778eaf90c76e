//! Shared doubles for the quoteboard integration tests.
//!
//! Nothing here touches the network: [`StubHttpClient`] answers every request
//! from a closure and records what was asked.

#![allow(dead_code)]

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use quoteboard_core::{
    HttpClient, HttpError, HttpRequest, HttpResponse, ProviderId, ProviderPolicy, RsiSource,
    StockDataService,
};
use serde_json::json;

type Responder = dyn Fn(&HttpRequest) -> Result<HttpResponse, HttpError> + Send + Sync;

/// Counting HTTP double.
pub struct StubHttpClient {
    responder: Box<Responder>,
    requests: Mutex<Vec<HttpRequest>>,
    delay: Option<Duration>,
}

impl StubHttpClient {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, HttpError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Every request fails at the transport level.
    pub fn failing() -> Self {
        Self::new(|_| Err(HttpError::new("connection refused")))
    }

    /// Every request gets the same 200 body.
    pub fn always(body: impl Into<String>) -> Self {
        let body = body.into();
        Self::new(move |_| Ok(HttpResponse::ok_json(body.clone())))
    }

    /// Holds each response back for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().expect("lock").len()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("lock").clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|request| request.url).collect()
    }
}

impl HttpClient for StubHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let response = (self.responder)(&request);
        self.requests.lock().expect("lock").push(request);
        let delay = self.delay;
        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            response
        })
    }
}

/// Yahoo v8 chart payload: quote fields in `meta`, one bar per close at
/// one-minute spacing.
pub fn yahoo_chart(price: f64, previous_close: f64, closes: &[f64]) -> String {
    let start = 1_736_828_100_i64;
    let timestamps = (0..closes.len())
        .map(|index| start + 60 * index as i64)
        .collect::<Vec<_>>();
    let highs = closes.iter().map(|close| close + 1.0).collect::<Vec<_>>();
    let lows = closes.iter().map(|close| close - 1.0).collect::<Vec<_>>();
    let volumes = vec![1_000_u64; closes.len()];

    json!({
        "chart": {
            "result": [{
                "meta": {
                    "regularMarketPrice": price,
                    "chartPreviousClose": previous_close,
                    "regularMarketTime": start + 3_600
                },
                "timestamp": timestamps,
                "indicators": {
                    "quote": [{
                        "open": closes,
                        "high": highs,
                        "low": lows,
                        "close": closes,
                        "volume": volumes
                    }]
                }
            }],
            "error": null
        }
    })
    .to_string()
}

/// Alpha Vantage GLOBAL_QUOTE payload.
pub fn alphavantage_quote(price: f64, previous_close: f64) -> String {
    json!({
        "Global Quote": {
            "05. price": format!("{price:.4}"),
            "07. latest trading day": "2025-01-14",
            "08. previous close": format!("{previous_close:.4}"),
        }
    })
    .to_string()
}

/// Alpha Vantage daily RSI payload whose latest reading is `latest`.
pub fn alphavantage_rsi(latest: f64) -> String {
    json!({
        "Meta Data": {},
        "Technical Analysis: RSI": {
            "2025-01-13": { "RSI": "47.0000" },
            "2025-01-14": { "RSI": format!("{latest:.4}") },
        }
    })
    .to_string()
}

/// Yahoo-backed service without RSI, so each quote costs exactly one request.
pub fn yahoo_service(client: Arc<StubHttpClient>) -> StockDataService {
    StockDataService::builder()
        .with_provider(ProviderId::Yahoo)
        .with_http_client(client)
        .with_rsi_source(RsiSource::Off)
        .build()
}

/// Alpha Vantage service with a key and no local request budget.
pub fn alphavantage_service(client: Arc<StubHttpClient>, rsi_source: RsiSource) -> StockDataService {
    StockDataService::builder()
        .with_policy(ProviderPolicy::alphavantage_default().with_quota(None))
        .with_http_client(client)
        .with_credential("demo-key")
        .with_rsi_source(rsi_source)
        .build()
}
