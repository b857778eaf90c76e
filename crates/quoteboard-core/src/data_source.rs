//! Provider adapter contract and the typed failure it reports.
//!
//! | Operation | Output | Description |
//! |-----------|--------|-------------|
//! | [`DataSource::quote`] | [`Quote`] | Last price and previous close |
//! | [`DataSource::series`] | `Vec<ChartPoint>` | Intraday OHLCV at a [`Granularity`] |
//! | [`DataSource::upstream_rsi`] | `f64` | Provider-computed RSI, where published |
//!
//! Adapters never fall back to placeholder data themselves; every problem is
//! returned as a [`FetchError`] and the service decides what to show.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{ChartPoint, Granularity, Listing, ProviderId, Quote};

/// Why an upstream fetch did not produce data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    /// Network failure, timeout, non-2xx status or open circuit.
    Transport,
    /// Local request budget for the provider is exhausted.
    RateLimited,
    /// Upstream error payload, or fields missing / non-numeric / out of range.
    Schema,
    /// The provider needs an API key and none is set.
    CredentialMissing,
    /// The symbol is not part of the configured universe.
    UnknownSymbol,
    /// The provider does not offer the requested operation.
    Unsupported,
}

/// Structured fetch failure carried through the service instead of a panic
/// or an early return to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    kind: FetchErrorKind,
    message: String,
}

impl FetchError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Transport, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::RateLimited, message)
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Schema, message)
    }

    pub fn credential_missing(provider: ProviderId) -> Self {
        Self::new(
            FetchErrorKind::CredentialMissing,
            format!("{provider} requires an API key and none is set"),
        )
    }

    pub fn unknown_symbol(raw: &str) -> Self {
        Self::new(
            FetchErrorKind::UnknownSymbol,
            format!("symbol '{}' is not on the board", raw.trim()),
        )
    }

    pub fn unsupported(provider: ProviderId, operation: &str) -> Self {
        Self::new(
            FetchErrorKind::Unsupported,
            format!("{provider} does not support {operation}"),
        )
    }

    fn new(kind: FetchErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> FetchErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            FetchErrorKind::Transport => "fetch.transport",
            FetchErrorKind::RateLimited => "fetch.rate_limited",
            FetchErrorKind::Schema => "fetch.schema",
            FetchErrorKind::CredentialMissing => "fetch.credential_missing",
            FetchErrorKind::UnknownSymbol => "fetch.unknown_symbol",
            FetchErrorKind::Unsupported => "fetch.unsupported",
        }
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for FetchError {}

pub type FetchFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, FetchError>> + Send + 'a>>;

/// Upstream provider adapter.
///
/// Implementations own their transport and resilience state (circuit
/// breaker, throttle) and translate provider payloads through their
/// [`Normalizer`](crate::normalizer::Normalizer).
///
/// Implementations must be `Send + Sync`; one adapter instance serves every
/// concurrent symbol fetch of the service.
pub trait DataSource: Send + Sync {
    /// Returns the provider identifier.
    fn id(&self) -> ProviderId;

    /// Whether [`upstream_rsi`](DataSource::upstream_rsi) is backed by a real endpoint.
    fn supports_upstream_rsi(&self) -> bool {
        false
    }

    /// Fetches the latest quote for `listing`. The returned quote has no RSI.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the credential is missing, the transport
    /// fails, or the payload cannot be normalized.
    fn quote<'a>(&'a self, listing: &'a Listing, credential: Option<&'a str>)
        -> FetchFuture<'a, Quote>;

    /// Fetches the intraday series for `listing`, oldest point first.
    ///
    /// # Errors
    ///
    /// Same conditions as [`quote`](DataSource::quote).
    fn series<'a>(
        &'a self,
        listing: &'a Listing,
        granularity: Granularity,
        credential: Option<&'a str>,
    ) -> FetchFuture<'a, Vec<ChartPoint>>;

    /// Fetches the provider's own RSI reading for `listing`.
    ///
    /// # Errors
    ///
    /// Defaults to [`FetchErrorKind::Unsupported`].
    fn upstream_rsi<'a>(
        &'a self,
        listing: &'a Listing,
        credential: Option<&'a str>,
    ) -> FetchFuture<'a, f64> {
        let _ = (listing, credential);
        let provider = self.id();
        Box::pin(async move { Err(FetchError::unsupported(provider, "rsi")) })
    }
}
