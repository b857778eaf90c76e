//! In-memory per-symbol quote cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::data_source::FetchError;
use crate::{Quote, Symbol};

/// Default freshness window for cached quotes.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

/// A stored quote and the instant it was fetched.
///
/// Placeholder quotes keep the failure that produced them, so a cache hit
/// reports the same reason as the original fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub quote: Quote,
    pub failure: Option<FetchError>,
    pub fetched_at: Instant,
}

impl CacheEntry {
    /// Fresh while strictly younger than `ttl` at `now`.
    pub fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.fetched_at) < ttl
    }
}

/// Thread-safe quote cache keyed by symbol.
///
/// Entries are replaced on every write and never evicted; the symbol set is
/// small and fixed, so stale entries simply wait to be superseded.
#[derive(Debug, Clone)]
pub struct QuoteCache {
    inner: Arc<tokio::sync::RwLock<HashMap<Symbol, CacheEntry>>>,
    ttl: Duration,
}

impl QuoteCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get the entry for `symbol`, fresh or not.
    pub async fn get(&self, symbol: &Symbol) -> Option<CacheEntry> {
        let store = self.inner.read().await;
        store.get(symbol).cloned()
    }

    /// Get the entry for `symbol` only if it is still fresh at `now`.
    pub async fn get_fresh(&self, symbol: &Symbol, now: Instant) -> Option<CacheEntry> {
        let store = self.inner.read().await;
        store
            .get(symbol)
            .filter(|entry| entry.is_fresh(now, self.ttl))
            .cloned()
    }

    /// Store `quote` as fetched at `now`, replacing any previous entry.
    /// `failure` is set for placeholders.
    pub async fn put(
        &self,
        symbol: Symbol,
        quote: Quote,
        failure: Option<FetchError>,
        now: Instant,
    ) {
        let mut store = self.inner.write().await;
        store.insert(
            symbol,
            CacheEntry {
                quote,
                failure,
                fetched_at: now,
            },
        );
    }

    /// Number of entries, stale ones included.
    pub async fn len(&self) -> usize {
        let store = self.inner.read().await;
        store.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for QuoteCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UtcDateTime;

    fn quote(symbol: &str, price: f64) -> Quote {
        Quote::new(
            Symbol::parse(symbol).expect("symbol"),
            symbol,
            price,
            100.0,
            UtcDateTime::parse("2025-01-14T10:00:00Z").expect("timestamp"),
        )
        .expect("valid quote")
    }

    #[test]
    fn freshness_is_strictly_less_than_ttl() {
        let fetched_at = Instant::now();
        let entry = CacheEntry {
            quote: quote("TATASTEEL", 118.45),
            failure: None,
            fetched_at,
        };
        let ttl = Duration::from_secs(30);

        assert!(entry.is_fresh(fetched_at, ttl));
        assert!(entry.is_fresh(fetched_at + Duration::from_millis(29_999), ttl));
        assert!(!entry.is_fresh(fetched_at + ttl, ttl));
        assert!(!entry.is_fresh(fetched_at + Duration::from_secs(45), ttl));
    }

    #[tokio::test]
    async fn put_replaces_previous_entry() {
        let cache = QuoteCache::default();
        let symbol = Symbol::parse("HDFCBANK").expect("symbol");
        let now = Instant::now();

        assert!(cache.get(&symbol).await.is_none());

        cache.put(symbol.clone(), quote("HDFCBANK", 1687.90), None, now).await;
        cache.put(symbol.clone(), quote("HDFCBANK", 1690.00), None, now).await;

        assert_eq!(cache.len().await, 1);
        let entry = cache.get(&symbol).await.expect("entry present");
        assert_eq!(entry.quote.price, 1690.00);
    }

    #[tokio::test]
    async fn get_fresh_ignores_stale_entries() {
        let cache = QuoteCache::new(Duration::from_millis(100));
        let symbol = Symbol::parse("NIFTY50").expect("symbol");
        let fetched_at = Instant::now();

        cache
            .put(symbol.clone(), quote("NIFTY50", 24587.20), None, fetched_at)
            .await;
        assert!(cache.get_fresh(&symbol, fetched_at).await.is_some());

        let later = fetched_at + Duration::from_millis(150);
        assert!(cache.get_fresh(&symbol, later).await.is_none());
        // Stale entries remain until superseded.
        assert!(cache.get(&symbol).await.is_some());
    }

    #[tokio::test]
    async fn placeholder_entries_keep_their_failure() {
        let cache = QuoteCache::default();
        let symbol = Symbol::parse("TATAMOTORS").expect("symbol");
        let failure = FetchError::transport("connection refused");

        cache
            .put(
                symbol.clone(),
                quote("TATAMOTORS", 975.0),
                Some(failure.clone()),
                Instant::now(),
            )
            .await;

        let entry = cache.get_fresh(&symbol, Instant::now()).await.expect("fresh");
        assert_eq!(entry.failure, Some(failure));
    }

    #[tokio::test]
    async fn clones_share_storage() {
        let cache = QuoteCache::default();
        let clone = cache.clone();
        let symbol = Symbol::parse("INDIAVIX").expect("symbol");

        clone
            .put(symbol.clone(), quote("INDIAVIX", 13.45), None, Instant::now())
            .await;
        assert!(!cache.is_empty().await);
    }
}
