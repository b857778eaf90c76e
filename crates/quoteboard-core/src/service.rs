//! # Stock Data Service
//!
//! Entry point for the board: resolves symbols, serves fresh quotes from the
//! cache, fetches the rest through the configured provider adapter and
//! substitutes placeholder data whenever that fails.
//!
//! | Operation | Returns | Notes |
//! |-----------|---------|-------|
//! | [`get_quote`](StockDataService::get_quote) | [`Quote`] | Never fails |
//! | [`fetch_quote`](StockDataService::fetch_quote) | [`Fetched<Quote>`] | Same, plus origin |
//! | [`get_chart_series`](StockDataService::get_chart_series) | `Vec<ChartPoint>` | At most 50 points |
//! | [`get_quotes`](StockDataService::get_quotes) | `Vec<Quote>` | Concurrent, input order |
//!
//! Failures never reach the caller. They are logged at `warn` and kept on
//! [`DataOrigin::Synthetic`] for anyone who needs to know why.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

use futures::future::join_all;
use tracing::{debug, warn};

use crate::adapters::source_with_policy;
use crate::cache::{CacheEntry, QuoteCache, DEFAULT_CACHE_TTL};
use crate::config::{RsiSource, ServiceConfig};
use crate::data_source::{DataSource, FetchError, FetchErrorKind};
use crate::http_client::{HttpClient, NoopHttpClient, ReqwestHttpClient};
use crate::indicators::{self, NEUTRAL_RSI};
use crate::provider_policy::ProviderPolicy;
use crate::synthetic::SyntheticGenerator;
use crate::{
    validate_rsi, ChartPoint, Granularity, Listing, ProviderId, Quote, Symbol, SymbolUniverse,
    UtcDateTime,
};

/// Maximum number of points returned for a chart.
pub const MAX_CHART_POINTS: usize = 50;

/// Where a served value came from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataOrigin {
    /// A quote still inside the cache TTL.
    Cache,
    /// A live fetch from the provider.
    Upstream(ProviderId),
    /// Placeholder data, with the failure that forced it.
    Synthetic(FetchError),
}

impl DataOrigin {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Upstream(_) => "upstream",
            Self::Synthetic(_) => "synthetic",
        }
    }
}

/// A served value and its [`DataOrigin`].
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub value: T,
    pub origin: DataOrigin,
}

impl<T> Fetched<T> {
    fn new(value: T, origin: DataOrigin) -> Self {
        Self { value, origin }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self.origin, DataOrigin::Synthetic(_))
    }

    pub fn failure(&self) -> Option<&FetchError> {
        match &self.origin {
            DataOrigin::Synthetic(error) => Some(error),
            DataOrigin::Cache | DataOrigin::Upstream(_) => None,
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Quote and chart service shared by every view of the board.
///
/// Build one with [`StockDataServiceBuilder`] and share it through an `Arc`;
/// all methods take `&self`.
pub struct StockDataService {
    source: Arc<dyn DataSource>,
    universe: SymbolUniverse,
    cache: QuoteCache,
    rsi_source: RsiSource,
    synthetic: SyntheticGenerator,
    credential: RwLock<Option<String>>,
    in_flight: Mutex<HashMap<Symbol, Arc<tokio::sync::Mutex<()>>>>,
}

impl StockDataService {
    pub fn builder() -> StockDataServiceBuilder {
        StockDataServiceBuilder::new()
    }

    pub fn provider(&self) -> ProviderId {
        self.source.id()
    }

    pub fn universe(&self) -> &SymbolUniverse {
        &self.universe
    }

    pub fn rsi_source(&self) -> RsiSource {
        self.rsi_source
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache.ttl()
    }

    /// Latest quote for `symbol`; placeholder data when it cannot be fetched.
    pub async fn get_quote(&self, symbol: &str) -> Quote {
        self.fetch_quote(symbol).await.into_value()
    }

    /// Like [`get_quote`](Self::get_quote), reporting where the quote came from.
    pub async fn fetch_quote(&self, raw: &str) -> Fetched<Quote> {
        let Some(listing) = self.universe.resolve(raw) else {
            let error = FetchError::unknown_symbol(raw);
            log_fallback(raw, &error, "serving placeholder quote");
            return Fetched::new(self.unknown_symbol_quote(raw), DataOrigin::Synthetic(error));
        };
        let symbol = &listing.symbol;

        if let Some(entry) = self.cache.get_fresh(symbol, Instant::now()).await {
            debug!(%symbol, "quote cache hit");
            return cached(entry);
        }

        // Only one upstream fetch per symbol; later callers wait and reuse it.
        let lock = self.in_flight_lock(symbol);
        let _guard = lock.lock().await;

        if let Some(entry) = self.cache.get_fresh(symbol, Instant::now()).await {
            debug!(%symbol, "quote filled by concurrent fetch");
            return cached(entry);
        }

        let (quote, failure) = match self.fetch_live_quote(listing).await {
            Ok(quote) => (quote, None),
            Err(error) => {
                log_fallback(symbol.as_str(), &error, "serving placeholder quote");
                (self.placeholder_quote(listing), Some(error))
            }
        };

        // A missing key is resolved by `set_credential`, so its placeholder
        // must not outlive it.
        let kind = failure.as_ref().map(FetchError::kind);
        if kind != Some(FetchErrorKind::CredentialMissing) {
            self.cache
                .put(symbol.clone(), quote.clone(), failure.clone(), Instant::now())
                .await;
        }

        match failure {
            Some(error) => Fetched::new(quote, DataOrigin::Synthetic(error)),
            None => Fetched::new(quote, DataOrigin::Upstream(self.source.id())),
        }
    }

    /// Quotes for every symbol in `symbols`, fetched concurrently.
    ///
    /// The result has one entry per input, in input order; a failing symbol
    /// gets placeholder data without affecting the others.
    pub async fn get_quotes<S: AsRef<str>>(&self, symbols: &[S]) -> Vec<Quote> {
        self.fetch_quotes(symbols)
            .await
            .into_iter()
            .map(Fetched::into_value)
            .collect()
    }

    pub async fn fetch_quotes<S: AsRef<str>>(&self, symbols: &[S]) -> Vec<Fetched<Quote>> {
        join_all(symbols.iter().map(|symbol| self.fetch_quote(symbol.as_ref()))).await
    }

    /// Intraday chart for `symbol` at the bucket nearest `interval_minutes`.
    pub async fn get_chart_series(&self, symbol: &str, interval_minutes: u32) -> Vec<ChartPoint> {
        self.fetch_chart_series(symbol, interval_minutes)
            .await
            .into_value()
    }

    /// Like [`get_chart_series`](Self::get_chart_series), reporting the origin.
    pub async fn fetch_chart_series(
        &self,
        raw: &str,
        interval_minutes: u32,
    ) -> Fetched<Vec<ChartPoint>> {
        let granularity = Granularity::from_minutes(interval_minutes);

        let (result, baseline_price) = match self.universe.resolve(raw) {
            Some(listing) => {
                let credential = self.credential();
                let series = self
                    .source
                    .series(listing, granularity, credential.as_deref())
                    .await
                    .and_then(prepare_series);
                (series, listing.baseline.price)
            }
            None => (
                Err(FetchError::unknown_symbol(raw)),
                self.universe.default_listing().baseline.price,
            ),
        };

        match result {
            Ok(points) => Fetched::new(points, DataOrigin::Upstream(self.source.id())),
            Err(error) => {
                log_fallback(raw, &error, "serving placeholder series");
                let points = self.synthetic.series(baseline_price, UtcDateTime::now());
                Fetched::new(points, DataOrigin::Synthetic(error))
            }
        }
    }

    /// Sets the API key used for subsequent fetches. A blank key clears it.
    pub fn set_credential(&self, key: impl Into<String>) {
        let key = key.into();
        let key = key.trim();
        *self.credential_slot() = (!key.is_empty()).then(|| key.to_owned());
    }

    pub fn credential(&self) -> Option<String> {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear_credential(&self) {
        *self.credential_slot() = None;
    }

    fn credential_slot(&self) -> std::sync::RwLockWriteGuard<'_, Option<String>> {
        self.credential
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn in_flight_lock(&self, symbol: &Symbol) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks.entry(symbol.clone()).or_default().clone()
    }

    async fn fetch_live_quote(&self, listing: &Listing) -> Result<Quote, FetchError> {
        let credential = self.credential();
        let quote = self.source.quote(listing, credential.as_deref()).await?;
        debug!(symbol = %listing.symbol, price = quote.price, "fetched upstream quote");

        let rsi = self.rsi_for(listing, credential.as_deref()).await;
        Ok(Quote { rsi, ..quote })
    }

    /// RSI for a live quote. Retrieval problems degrade to the neutral value.
    async fn rsi_for(&self, listing: &Listing, credential: Option<&str>) -> Option<f64> {
        let reading = match self.rsi_source {
            RsiSource::Off => return None,
            RsiSource::Upstream if self.source.supports_upstream_rsi() => {
                self.source.upstream_rsi(listing, credential).await
            }
            RsiSource::Upstream | RsiSource::Local => self.local_rsi(listing, credential).await,
        };

        let rsi = reading.and_then(|value| validate_rsi(value).map_err(FetchError::from));
        Some(rsi.unwrap_or_else(|error| {
            log_fallback(listing.symbol.as_str(), &error, "using neutral rsi");
            NEUTRAL_RSI
        }))
    }

    async fn local_rsi(&self, listing: &Listing, credential: Option<&str>) -> Result<f64, FetchError> {
        let points = self
            .source
            .series(listing, Granularity::FiveMinutes, credential)
            .await
            .and_then(prepare_series)?;
        let closes = points.iter().map(|point| point.close).collect::<Vec<_>>();
        Ok(indicators::rsi(&closes))
    }

    fn placeholder_quote(&self, listing: &Listing) -> Quote {
        let quote = self.synthetic.quote(
            listing.symbol.clone(),
            &listing.display_name,
            &listing.baseline,
            UtcDateTime::now(),
        );
        self.apply_rsi_source(quote)
    }

    /// Placeholder built from the default listing's baseline but labelled
    /// with the requested symbol when that symbol is well formed.
    fn unknown_symbol_quote(&self, raw: &str) -> Quote {
        let fallback = self.universe.default_listing();
        let (symbol, display_name) = match Symbol::parse(raw) {
            Ok(symbol) => {
                let name = symbol.as_str().to_owned();
                (symbol, name)
            }
            Err(_) => (fallback.symbol.clone(), fallback.display_name.clone()),
        };

        let quote =
            self.synthetic
                .quote(symbol, &display_name, &fallback.baseline, UtcDateTime::now());
        self.apply_rsi_source(quote)
    }

    fn apply_rsi_source(&self, quote: Quote) -> Quote {
        match self.rsi_source {
            RsiSource::Off => Quote { rsi: None, ..quote },
            RsiSource::Upstream | RsiSource::Local => quote,
        }
    }
}

/// A cached placeholder is still reported as synthetic, with its failure.
fn cached(entry: CacheEntry) -> Fetched<Quote> {
    let origin = match entry.failure {
        Some(error) => DataOrigin::Synthetic(error),
        None => DataOrigin::Cache,
    };
    Fetched::new(entry.quote, origin)
}

/// Sorts ascending, drops repeated timestamps, keeps the newest
/// [`MAX_CHART_POINTS`] and then removes points with a non-positive close.
fn prepare_series(mut points: Vec<ChartPoint>) -> Result<Vec<ChartPoint>, FetchError> {
    points.sort_by_key(|point| point.timestamp);
    points.dedup_by_key(|point| point.timestamp);

    if points.len() > MAX_CHART_POINTS {
        points.drain(..points.len() - MAX_CHART_POINTS);
    }
    points.retain(|point| point.close > 0.0);

    if points.is_empty() {
        return Err(FetchError::schema("series has no points with a positive close"));
    }
    Ok(points)
}

fn log_fallback(symbol: &str, error: &FetchError, action: &str) {
    warn!(
        symbol,
        kind = ?error.kind(),
        message = error.message(),
        "{action}"
    );
}

/// Builder for [`StockDataService`].
///
/// Defaults: Alpha Vantage through reqwest, the NSE universe, a 30 second
/// cache and upstream RSI.
pub struct StockDataServiceBuilder {
    provider: ProviderId,
    policy: Option<ProviderPolicy>,
    http_client: Option<Arc<dyn HttpClient>>,
    source: Option<Arc<dyn DataSource>>,
    universe: SymbolUniverse,
    cache_ttl: Duration,
    rsi_source: RsiSource,
    credential: Option<String>,
    synthetic: Option<SyntheticGenerator>,
    offline: bool,
}

impl Default for StockDataServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StockDataServiceBuilder {
    pub fn new() -> Self {
        Self {
            provider: ProviderId::Alphavantage,
            policy: None,
            http_client: None,
            source: None,
            universe: SymbolUniverse::nse_default(),
            cache_ttl: DEFAULT_CACHE_TTL,
            rsi_source: RsiSource::default(),
            credential: None,
            synthetic: None,
            offline: false,
        }
    }

    /// Applies every setting carried by `config`.
    pub fn with_config(self, config: &ServiceConfig) -> Self {
        let builder = self
            .with_provider(config.provider)
            .with_cache_ttl(config.cache_ttl)
            .with_rsi_source(config.rsi_source)
            .offline(config.offline);

        match &config.api_key {
            Some(key) => builder.with_credential(key.clone()),
            None => builder,
        }
    }

    pub fn with_provider(mut self, provider: ProviderId) -> Self {
        self.provider = provider;
        self
    }

    /// Overrides the provider's default timeout, quota and breaker settings.
    /// The policy's provider id wins over [`with_provider`](Self::with_provider).
    pub fn with_policy(mut self, policy: ProviderPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Uses a ready-made adapter instead of building one.
    pub fn with_source(mut self, source: Arc<dyn DataSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_universe(mut self, universe: SymbolUniverse) -> Self {
        self.universe = universe;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_rsi_source(mut self, rsi_source: RsiSource) -> Self {
        self.rsi_source = rsi_source;
        self
    }

    pub fn with_credential(mut self, key: impl Into<String>) -> Self {
        self.credential = Some(key.into());
        self
    }

    pub fn with_synthetic_generator(mut self, generator: SyntheticGenerator) -> Self {
        self.synthetic = Some(generator);
        self
    }

    /// Route all traffic to [`NoopHttpClient`], so every value is a placeholder.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn build(self) -> StockDataService {
        let source = match self.source {
            Some(source) => source,
            None => {
                let http_client: Arc<dyn HttpClient> = if self.offline {
                    Arc::new(NoopHttpClient)
                } else {
                    self.http_client
                        .unwrap_or_else(|| Arc::new(ReqwestHttpClient::new()))
                };
                let policy = self
                    .policy
                    .unwrap_or_else(|| ProviderPolicy::default_for(self.provider));
                source_with_policy(policy, http_client)
            }
        };

        let service = StockDataService {
            source,
            universe: self.universe,
            cache: QuoteCache::new(self.cache_ttl),
            rsi_source: self.rsi_source,
            synthetic: self.synthetic.unwrap_or_default(),
            credential: RwLock::new(None),
            in_flight: Mutex::new(HashMap::new()),
        };
        if let Some(key) = self.credential {
            service.set_credential(key);
        }
        service
    }
}
