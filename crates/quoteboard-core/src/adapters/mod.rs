//! Provider adapters and the guarded transport they share.

mod alphavantage;
mod yahoo;

use std::sync::Arc;

use tracing::debug;

pub use alphavantage::{AlphaVantageAdapter, AlphaVantageNormalizer};
pub use yahoo::{YahooAdapter, YahooNormalizer};

use crate::circuit_breaker::CircuitBreaker;
use crate::data_source::{DataSource, FetchError};
use crate::http_client::{HttpClient, HttpRequest};
use crate::provider_policy::ProviderPolicy;
use crate::throttling::Throttle;
use crate::ProviderId;

/// Builds the adapter for `provider` on top of `http_client` with the
/// provider's default policy.
pub fn source_for(provider: ProviderId, http_client: Arc<dyn HttpClient>) -> Arc<dyn DataSource> {
    source_with_policy(ProviderPolicy::default_for(provider), http_client)
}

/// Builds the adapter named by `policy.provider_id` with an explicit policy.
pub fn source_with_policy(
    policy: ProviderPolicy,
    http_client: Arc<dyn HttpClient>,
) -> Arc<dyn DataSource> {
    match policy.provider_id {
        ProviderId::Alphavantage => Arc::new(AlphaVantageAdapter::new(policy, http_client)),
        ProviderId::Yahoo => Arc::new(YahooAdapter::new(policy, http_client)),
    }
}

/// HTTP GET wrapped in the provider's circuit breaker and request budget.
///
/// Transport failures and non-2xx statuses count against the breaker; any
/// 2xx response closes it, whatever the body turns out to contain.
pub(crate) struct GuardedTransport {
    policy: ProviderPolicy,
    http_client: Arc<dyn HttpClient>,
    circuit_breaker: CircuitBreaker,
    throttle: Option<Throttle>,
}

impl GuardedTransport {
    pub(crate) fn new(policy: ProviderPolicy, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            circuit_breaker: CircuitBreaker::new(policy.circuit_breaker),
            throttle: policy.quota.map(Throttle::new),
            policy,
            http_client,
        }
    }

    pub(crate) fn provider(&self) -> ProviderId {
        self.policy.provider_id
    }

    #[cfg(test)]
    pub(crate) fn circuit_state(&self) -> crate::circuit_breaker::CircuitState {
        self.circuit_breaker.state()
    }

    pub(crate) async fn get(&self, request: HttpRequest) -> Result<String, FetchError> {
        let provider = self.provider();

        if !self.circuit_breaker.allow_request() {
            return Err(FetchError::transport(format!(
                "{provider} circuit breaker is open"
            )));
        }

        if let Some(throttle) = &self.throttle {
            if let Err(wait) = throttle.acquire() {
                return Err(FetchError::rate_limited(format!(
                    "{provider} request budget exhausted; retry in {:.1}s",
                    wait.as_secs_f64()
                )));
            }
        }

        let request = request.with_timeout_ms(self.policy.request_timeout_ms());
        debug!(%provider, url = %request.redacted_url(), "requesting upstream");

        let response = match self.http_client.execute(request).await {
            Ok(response) => response,
            Err(error) => {
                self.circuit_breaker.record_failure();
                return Err(FetchError::transport(format!(
                    "{provider} transport error: {}",
                    error.message()
                )));
            }
        };

        if !response.is_success() {
            self.circuit_breaker.record_failure();
            return Err(FetchError::transport(format!(
                "{provider} returned status {}",
                response.status
            )));
        }

        self.circuit_breaker.record_success();
        Ok(response.body)
    }
}
