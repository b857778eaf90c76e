use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Runtime circuit state for one provider's upstream calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

/// Circuit breaker thresholds and timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub open_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            open_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Closed { failures: u32 },
    Open { since: Instant, failures: u32 },
    Probing { since: Instant, failures: u32 },
}

impl Phase {
    fn failures(self) -> u32 {
        match self {
            Self::Closed { failures }
            | Self::Open { failures, .. }
            | Self::Probing { failures, .. } => failures,
        }
    }
}

/// Consecutive-failure breaker shared by every fetch against one provider.
///
/// While open, requests are refused without touching the network. Once
/// `open_timeout` has passed, a single probe is let through and everything
/// else is refused until it reports back: success closes the circuit, failure
/// reopens it for another timeout. A probe that never reports is replaced
/// after `open_timeout`.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    phase: Mutex<Phase>,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            phase: Mutex::new(Phase::Closed { failures: 0 }),
        }
    }

    pub fn allow_request(&self) -> bool {
        let mut phase = self.lock();
        match *phase {
            Phase::Closed { .. } => true,
            Phase::Open { since, failures } | Phase::Probing { since, failures } => {
                if since.elapsed() < self.config.open_timeout {
                    return false;
                }
                *phase = Phase::Probing {
                    since: Instant::now(),
                    failures,
                };
                true
            }
        }
    }

    pub fn record_success(&self) {
        *self.lock() = Phase::Closed { failures: 0 };
    }

    pub fn record_failure(&self) {
        let mut phase = self.lock();
        let failures = phase.failures().saturating_add(1);

        *phase = match *phase {
            Phase::Closed { .. } if failures < self.config.failure_threshold => {
                Phase::Closed { failures }
            }
            // A late failure from before the trip does not extend the timeout.
            Phase::Open { since, .. } => Phase::Open { since, failures },
            Phase::Closed { .. } | Phase::Probing { .. } => Phase::Open {
                since: Instant::now(),
                failures,
            },
        };
    }

    pub fn state(&self) -> CircuitState {
        match *self.lock() {
            Phase::Closed { .. } => CircuitState::Closed,
            Phase::Open { .. } => CircuitState::Open,
            Phase::Probing { .. } => CircuitState::HalfOpen,
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.lock().failures()
    }

    fn lock(&self) -> MutexGuard<'_, Phase> {
        self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
