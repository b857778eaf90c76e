//! # Quoteboard Core
//!
//! Quote and intraday chart acquisition for a small, fixed board of NSE
//! instruments.
//!
//! ## Overview
//!
//! - **Domain models** for quotes, chart points and the symbol universe
//! - **Provider adapters** for Alpha Vantage and Yahoo Finance behind one trait
//! - **Quote cache** with a fixed freshness window
//! - **RSI** from a provider endpoint or computed locally
//! - **Synthetic fallback** so every call returns something drawable
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Alpha Vantage and Yahoo adapters, guarded transport |
//! | [`cache`] | Per-symbol quote cache |
//! | [`circuit_breaker`] | Circuit breaker for upstream calls |
//! | [`config`] | Service settings and environment overrides |
//! | [`data_source`] | Adapter trait and [`FetchError`] |
//! | [`domain`] | Quote, ChartPoint, Symbol, SymbolUniverse |
//! | [`http_client`] | HTTP client abstraction |
//! | [`indicators`] | RSI |
//! | [`normalizer`] | Payload normalization trait |
//! | [`provider_policy`] | Timeouts, quotas and breaker settings per provider |
//! | [`service`] | [`StockDataService`], the public entry point |
//! | [`synthetic`] | Placeholder quotes and series |
//! | [`throttling`] | Local request budget |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use quoteboard_core::{ProviderId, StockDataService};
//!
//! #[tokio::main]
//! async fn main() {
//!     let service = StockDataService::builder()
//!         .with_provider(ProviderId::Yahoo)
//!         .build();
//!
//!     let quote = service.get_quote("TATASTEEL").await;
//!     println!("{} {:.2} ({:+.2}%)", quote.symbol, quote.price, quote.change_percent);
//!
//!     let chart = service.get_chart_series("NIFTY50", 15).await;
//!     println!("{} points", chart.len());
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / Board    │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ StockDataService│────▶│ QuoteCache       │
//! └────────┬────────┘     └──────────────────┘
//!          │  on failure ┌──────────────────┐
//!          ├────────────▶│ Synthetic data   │
//!          ▼             └──────────────────┘
//! ┌─────────────────┐     ┌──────────────────┐
//! │ DataSource      │────▶│ Circuit breaker  │
//! │ (adapter)       │     │ Throttle         │
//! └────────┬────────┘     └────────┬─────────┘
//!          │                       ▼
//!          │              ┌──────────────────┐
//!          └─ Normalizer  │ HttpClient       │
//!                         └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Public service calls never fail. Internally every fetch returns
//! `Result<_, FetchError>`; the `fetch_*` variants expose the reason:
//!
//! ```rust,ignore
//! use quoteboard_core::{DataOrigin, FetchErrorKind};
//!
//! let fetched = service.fetch_quote("TATASTEEL").await;
//! if let DataOrigin::Synthetic(error) = &fetched.origin {
//!     if error.kind() == FetchErrorKind::CredentialMissing {
//!         // prompt for an API key
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! - API keys live in memory only and are masked in logged URLs
//! - All HTTP requests use TLS via reqwest

pub mod adapters;
pub mod cache;
pub mod circuit_breaker;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod indicators;
pub mod normalizer;
pub mod provider_policy;
pub mod service;
pub mod source;
pub mod synthetic;
pub mod throttling;

// Adapter implementations
pub use adapters::{
    source_for, AlphaVantageAdapter, AlphaVantageNormalizer, YahooAdapter, YahooNormalizer,
};

// Caching
pub use cache::{CacheEntry, QuoteCache, DEFAULT_CACHE_TTL};

// Circuit breaker
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};

// Configuration
pub use config::{RsiSource, ServiceConfig};

// Data source trait and failures
pub use data_source::{DataSource, FetchError, FetchErrorKind, FetchFuture};

// Domain models
pub use domain::{
    validate_rsi, Baseline, ChartPoint, Granularity, Listing, Quote, Symbol, SymbolUniverse,
    UtcDateTime,
};

// Error types
pub use error::ValidationError;

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
};

// Indicators
pub use indicators::{rsi, NEUTRAL_RSI, RSI_PERIOD};

// Normalization
pub use normalizer::Normalizer;

// Provider policies
pub use provider_policy::{ProviderPolicy, RequestQuota};

// Service
pub use service::{
    DataOrigin, Fetched, StockDataService, StockDataServiceBuilder, MAX_CHART_POINTS,
};

// Source identifiers
pub use source::ProviderId;

// Synthetic data
pub use synthetic::{SyntheticGenerator, SYNTHETIC_SERIES_LEN};

// Throttling
pub use throttling::Throttle;
