//! Placeholder quotes and chart series for when live data is unavailable.
//!
//! Values are baseline figures plus bounded uniform noise. They exist so the
//! board always has something to draw and carry no statistical meaning.

use std::sync::Mutex;

use crate::{Baseline, ChartPoint, Quote, Symbol, UtcDateTime};

/// Number of points in a generated chart series.
pub const SYNTHETIC_SERIES_LEN: usize = 50;

const PRICE_JITTER: f64 = 0.005;
const RSI_JITTER: f64 = 2.0;
const BODY_JITTER: f64 = 0.01;
const WICK_JITTER: f64 = 0.005;
const MAX_VOLUME: u64 = 100_000;

/// Random source for placeholder data.
#[derive(Debug)]
pub struct SyntheticGenerator {
    rng: Mutex<fastrand::Rng>,
}

impl Default for SyntheticGenerator {
    fn default() -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::new()),
        }
    }
}

impl SyntheticGenerator {
    /// Deterministic generator for reproducible output.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::with_seed(seed)),
        }
    }

    /// Baseline quote with jittered price and RSI, stamped `as_of`.
    ///
    /// The previous close stays fixed at `baseline.price - baseline.change`, so
    /// change and percentage are re-derived from the jittered price and keep a
    /// consistent sign.
    pub fn quote(
        &self,
        symbol: Symbol,
        display_name: &str,
        baseline: &Baseline,
        as_of: UtcDateTime,
    ) -> Quote {
        let mut rng = self.rng();
        let price = baseline.price * (1.0 + PRICE_JITTER * symmetric(&mut rng));
        let rsi = (baseline.rsi + RSI_JITTER * symmetric(&mut rng)).clamp(0.0, 100.0);

        Quote::placeholder(
            symbol,
            display_name,
            price,
            baseline.previous_close(),
            Some(rsi),
            as_of,
        )
    }

    /// [`SYNTHETIC_SERIES_LEN`] one-minute points ending at `end`.
    pub fn series(&self, baseline_price: f64, end: UtcDateTime) -> Vec<ChartPoint> {
        let base = if baseline_price.is_finite() {
            baseline_price.max(0.0)
        } else {
            0.0
        };
        let mut rng = self.rng();

        (0..SYNTHETIC_SERIES_LEN)
            .map(|index| {
                let minutes_back = (SYNTHETIC_SERIES_LEN - 1 - index) as i64;
                let open = base * (1.0 + BODY_JITTER * symmetric(&mut rng));
                let close = base * (1.0 + BODY_JITTER * symmetric(&mut rng));
                let high = open.max(close) + base * WICK_JITTER * rng.f64();
                let low = (open.min(close) - base * WICK_JITTER * rng.f64()).max(0.0);

                ChartPoint {
                    timestamp: end.minus_minutes(minutes_back),
                    open,
                    high,
                    low,
                    close,
                    volume: rng.u64(0..MAX_VOLUME),
                }
            })
            .collect()
    }

    fn rng(&self) -> std::sync::MutexGuard<'_, fastrand::Rng> {
        // A poisoned generator still produces usable numbers.
        self.rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Uniform sample in `[-1, 1)`.
fn symmetric(rng: &mut fastrand::Rng) -> f64 {
    rng.f64() * 2.0 - 1.0
}
