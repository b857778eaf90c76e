use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

use crate::provider_policy::RequestQuota;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Local request budget for one provider.
///
/// A denied request is not queued or retried: the caller gets the wait time
/// back and reports a rate-limited fetch, which the service turns into
/// placeholder data for this round.
#[derive(Clone)]
pub struct Throttle {
    limiter: Arc<DirectRateLimiter>,
    clock: DefaultClock,
}

impl Throttle {
    pub fn new(quota: RequestQuota) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::direct(quota_from_window(quota))),
            clock: DefaultClock::default(),
        }
    }

    /// Takes one unit of budget, or returns how long until one is available.
    pub fn acquire(&self) -> Result<(), Duration> {
        self.limiter
            .check()
            .map_err(|not_until| not_until.wait_time_from(self.clock.now()))
    }
}

impl std::fmt::Debug for Throttle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttle").finish_non_exhaustive()
    }
}

/// Spreads `limit` cells evenly over `window` and allows the full limit as
/// an initial burst.
fn quota_from_window(quota: RequestQuota) -> Quota {
    let burst = NonZeroU32::new(quota.limit).unwrap_or(NonZeroU32::MIN);

    let seconds_per_cell = (quota.window.as_secs_f64() / f64::from(burst.get())).max(0.001);
    let period = Duration::from_secs_f64(seconds_per_cell);

    Quota::with_period(period)
        .unwrap_or_else(|| Quota::per_second(burst))
        .allow_burst(burst)
}
