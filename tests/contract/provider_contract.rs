//! Contract tests shared by every provider adapter.
//!
//! Each adapter is driven through the `DataSource` trait only, against a
//! stub transport, so these hold for any provider added later.

#[path = "../support/mod.rs"]
mod support;

use std::sync::Arc;

use quoteboard_core::{
    source_for, FetchErrorKind, Granularity, HttpResponse, Listing, ProviderId, SymbolUniverse,
};
use support::{alphavantage_quote, yahoo_chart, StubHttpClient};

const AV_SERIES: &str = r#"{
    "Meta Data": {},
    "Time Series (15min)": {
        "2025-01-14 10:30:00": { "1. open": "119.0", "2. high": "119.5", "3. low": "118.9", "4. close": "119.2", "5. volume": "900" },
        "2025-01-14 10:00:00": { "1. open": "118.5", "2. high": "119.0", "3. low": "118.4", "4. close": "118.9", "5. volume": "1200" },
        "2025-01-14 10:15:00": { "1. open": "118.9", "2. high": "119.1", "3. low": "118.8", "4. close": "119.0", "5. volume": "800" }
    }
}"#;

fn listing(symbol: &str) -> Listing {
    SymbolUniverse::nse_default()
        .resolve(symbol)
        .cloned()
        .expect("listed symbol")
}

fn credential_for(provider: ProviderId) -> Option<&'static str> {
    provider.requires_credential().then_some("demo-key")
}

/// Stub answering each provider's quote and series requests for TATASTEEL.
fn healthy_client(provider: ProviderId) -> StubHttpClient {
    match provider {
        ProviderId::Alphavantage => StubHttpClient::new(|request| {
            let body = if request.url.contains("GLOBAL_QUOTE") {
                alphavantage_quote(120.8, 118.45)
            } else {
                AV_SERIES.to_owned()
            };
            Ok(HttpResponse::ok_json(body))
        }),
        ProviderId::Yahoo => StubHttpClient::always(yahoo_chart(120.8, 118.45, &[118.9, 119.0, 119.2])),
    }
}

// =============================================================================
// Contract: quotes
// =============================================================================

#[tokio::test]
async fn every_provider_returns_a_canonical_quote_for_the_listing() {
    for provider in ProviderId::ALL {
        // Given: a provider answering with a valid quote payload
        let client = Arc::new(healthy_client(provider));
        let source = source_for(provider, client.clone());
        let tata = listing("TATASTEEL");

        // When: the quote is fetched through the trait
        let quote = source
            .quote(&tata, credential_for(provider))
            .await
            .unwrap_or_else(|error| panic!("{provider}: {error}"));

        // Then: it carries the board symbol and derived change, no RSI
        assert_eq!(source.id(), provider);
        assert_eq!(quote.symbol.as_str(), "TATASTEEL", "{provider}");
        assert_eq!(quote.display_name, "Tata Steel Limited", "{provider}");
        assert_eq!(quote.price, 120.8, "{provider}");
        assert_eq!(quote.previous_close, 118.45, "{provider}");
        assert!((quote.change - 2.35).abs() < 1e-9, "{provider}");
        assert!((quote.change_percent - 2.35 / 118.45 * 100.0).abs() < 1e-9, "{provider}");
        assert_eq!(quote.rsi, None, "{provider}");
        assert!(!quote.is_synthetic, "{provider}");
        assert_eq!(client.calls(), 1, "{provider}");
    }
}

#[tokio::test]
async fn every_provider_addresses_its_own_ticker() {
    let nifty = listing("NIFTY50");

    let client = Arc::new(StubHttpClient::failing());
    let source = source_for(ProviderId::Alphavantage, client.clone());
    let _ = source.quote(&nifty, Some("demo-key")).await;
    assert!(client.urls()[0].contains("symbol=NIFTY50.BSE"));

    let client = Arc::new(StubHttpClient::failing());
    let source = source_for(ProviderId::Yahoo, client.clone());
    let _ = source.quote(&nifty, None).await;
    assert!(client.urls()[0].contains("/chart/%5ENSEI?"));
}

// =============================================================================
// Contract: series
// =============================================================================

#[tokio::test]
async fn every_provider_returns_series_oldest_first() {
    for provider in ProviderId::ALL {
        let client = Arc::new(healthy_client(provider));
        let source = source_for(provider, client);

        let points = source
            .series(
                &listing("TATASTEEL"),
                Granularity::FifteenMinutes,
                credential_for(provider),
            )
            .await
            .unwrap_or_else(|error| panic!("{provider}: {error}"));

        assert_eq!(points.len(), 3, "{provider}");
        assert!(
            points
                .windows(2)
                .all(|pair| pair[0].timestamp < pair[1].timestamp),
            "{provider}: timestamps must ascend"
        );
        for point in &points {
            assert!(point.high >= point.open.max(point.close), "{provider}");
            assert!(point.low <= point.open.min(point.close), "{provider}");
        }
    }
}

#[tokio::test]
async fn series_request_names_the_bucket() {
    let client = Arc::new(healthy_client(ProviderId::Alphavantage));
    let source = source_for(ProviderId::Alphavantage, client.clone());
    source
        .series(&listing("TATASTEEL"), Granularity::FifteenMinutes, Some("demo-key"))
        .await
        .expect("series");
    assert!(client.urls()[0].contains("interval=15min"));

    let client = Arc::new(healthy_client(ProviderId::Yahoo));
    let source = source_for(ProviderId::Yahoo, client.clone());
    source
        .series(&listing("TATASTEEL"), Granularity::FifteenMinutes, None)
        .await
        .expect("series");
    assert!(client.urls()[0].ends_with("range=5d&interval=15m"));
}

// =============================================================================
// Contract: failures
// =============================================================================

#[tokio::test]
async fn non_success_status_is_a_transport_failure() {
    for provider in ProviderId::ALL {
        let client = Arc::new(StubHttpClient::new(|_| {
            Ok(HttpResponse::with_status(503, "service unavailable"))
        }));
        let source = source_for(provider, client);

        let error = source
            .quote(&listing("HDFCBANK"), credential_for(provider))
            .await
            .expect_err("503 must fail");

        assert_eq!(error.kind(), FetchErrorKind::Transport, "{provider}");
        assert!(error.message().contains("503"), "{provider}");
    }
}

#[tokio::test]
async fn garbage_body_is_a_schema_failure() {
    for provider in ProviderId::ALL {
        let client = Arc::new(StubHttpClient::always("<html>maintenance</html>"));
        let source = source_for(provider, client);

        let error = source
            .quote(&listing("HDFCBANK"), credential_for(provider))
            .await
            .expect_err("html must fail");

        assert_eq!(error.kind(), FetchErrorKind::Schema, "{provider}");
    }
}

#[tokio::test]
async fn circuit_opens_after_three_consecutive_failures() {
    for provider in ProviderId::ALL {
        // Given: a transport that always fails
        let client = Arc::new(StubHttpClient::failing());
        let source = source_for(provider, client.clone());
        let vix = listing("INDIAVIX");

        // When: four quotes are requested back to back
        for _ in 0..3 {
            let error = source
                .quote(&vix, credential_for(provider))
                .await
                .expect_err("transport down");
            assert_eq!(error.kind(), FetchErrorKind::Transport);
        }
        let error = source
            .quote(&vix, credential_for(provider))
            .await
            .expect_err("circuit open");

        // Then: the fourth is refused without touching the network
        assert_eq!(error.kind(), FetchErrorKind::Transport, "{provider}");
        assert!(error.message().contains("circuit breaker is open"), "{provider}");
        assert_eq!(client.calls(), 3, "{provider}");
    }
}

#[tokio::test]
async fn requests_carry_the_provider_timeout() {
    let client = Arc::new(StubHttpClient::failing());
    let source = source_for(ProviderId::Alphavantage, client.clone());
    let _ = source.quote(&listing("TATASTEEL"), Some("demo-key")).await;
    assert_eq!(client.requests()[0].timeout_ms, 5_000);

    let client = Arc::new(StubHttpClient::failing());
    let source = source_for(ProviderId::Yahoo, client.clone());
    let _ = source.quote(&listing("TATASTEEL"), None).await;
    assert_eq!(client.requests()[0].timeout_ms, 10_000);
}

// =============================================================================
// Contract: credentials and RSI capability
// =============================================================================

#[tokio::test]
async fn keyed_provider_without_credential_never_calls_out() {
    let client = Arc::new(healthy_client(ProviderId::Alphavantage));
    let source = source_for(ProviderId::Alphavantage, client.clone());
    let tata = listing("TATASTEEL");

    for credential in [None, Some(""), Some("   ")] {
        let error = source
            .quote(&tata, credential)
            .await
            .expect_err("no key");
        assert_eq!(error.kind(), FetchErrorKind::CredentialMissing);

        let error = source
            .upstream_rsi(&tata, credential)
            .await
            .expect_err("no key");
        assert_eq!(error.kind(), FetchErrorKind::CredentialMissing);
    }

    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn only_providers_with_an_indicator_endpoint_serve_upstream_rsi() {
    let yahoo = source_for(ProviderId::Yahoo, Arc::new(StubHttpClient::failing()));
    let alphavantage = source_for(ProviderId::Alphavantage, Arc::new(StubHttpClient::failing()));

    assert!(alphavantage.supports_upstream_rsi());
    assert!(!yahoo.supports_upstream_rsi());

    let error = yahoo
        .upstream_rsi(&listing("TATASTEEL"), None)
        .await
        .expect_err("yahoo has no RSI endpoint");
    assert_eq!(error.kind(), FetchErrorKind::Unsupported);
}

#[tokio::test]
async fn alphavantage_free_tier_budget_is_enforced_locally() {
    // Given: the default Alpha Vantage policy (5 requests per minute)
    let client = Arc::new(healthy_client(ProviderId::Alphavantage));
    let source = source_for(ProviderId::Alphavantage, client.clone());
    let tata = listing("TATASTEEL");

    // When: six quotes are requested inside the window
    for _ in 0..5 {
        source.quote(&tata, Some("demo-key")).await.expect("within budget");
    }
    let error = source
        .quote(&tata, Some("demo-key"))
        .await
        .expect_err("budget exhausted");

    // Then: the sixth is rate limited without a request
    assert_eq!(error.kind(), FetchErrorKind::RateLimited);
    assert_eq!(client.calls(), 5);
}
