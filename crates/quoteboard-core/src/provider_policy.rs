use std::time::Duration;

use crate::circuit_breaker::CircuitBreakerConfig;
use crate::ProviderId;

/// Request budget enforced locally before calling a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestQuota {
    pub window: Duration,
    pub limit: u32,
}

/// Per-provider transport limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderPolicy {
    pub provider_id: ProviderId,
    pub request_timeout: Duration,
    /// `None` means the provider publishes no hard limit.
    pub quota: Option<RequestQuota>,
    pub circuit_breaker: CircuitBreakerConfig,
}

impl ProviderPolicy {
    /// Free tier: 5 requests per minute.
    pub fn alphavantage_default() -> Self {
        Self {
            provider_id: ProviderId::Alphavantage,
            request_timeout: Duration::from_secs(5),
            quota: Some(RequestQuota {
                window: Duration::from_secs(60),
                limit: 5,
            }),
            circuit_breaker: CircuitBreakerConfig::default(),
        }
    }

    pub fn yahoo_default() -> Self {
        Self {
            provider_id: ProviderId::Yahoo,
            request_timeout: Duration::from_secs(10),
            quota: None,
            circuit_breaker: CircuitBreakerConfig::default(),
        }
    }

    pub fn default_for(provider_id: ProviderId) -> Self {
        match provider_id {
            ProviderId::Alphavantage => Self::alphavantage_default(),
            ProviderId::Yahoo => Self::yahoo_default(),
        }
    }

    /// Timeout in the unit carried by [`HttpRequest`](crate::http_client::HttpRequest).
    pub fn request_timeout_ms(&self) -> u64 {
        u64::try_from(self.request_timeout.as_millis()).unwrap_or(u64::MAX)
    }

    pub fn with_quota(mut self, quota: Option<RequestQuota>) -> Self {
        self.quota = quota;
        self
    }
}
