//! Technical indicators computed from close-price series.

/// Lookback below which RSI is reported as neutral.
pub const RSI_PERIOD: usize = 14;

/// Value reported when RSI cannot be computed.
pub const NEUTRAL_RSI: f64 = 50.0;

/// Relative Strength Index over the whole window, using flat averages.
///
/// Successive differences are split into gains and losses and each sum is
/// divided by `closes.len() - 1`. There is no Wilder smoothing, so results
/// differ from charting packages on long windows.
///
/// Fewer than [`RSI_PERIOD`] closes yield [`NEUTRAL_RSI`]; a window without
/// any loss yields `100.0`.
pub fn rsi(closes: &[f64]) -> f64 {
    if closes.len() < RSI_PERIOD {
        return NEUTRAL_RSI;
    }

    let (gains, losses) = closes
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .fold((0.0_f64, 0.0_f64), |(gains, losses), diff| {
            if diff > 0.0 {
                (gains + diff, losses)
            } else {
                (gains, losses - diff)
            }
        });

    let steps = (closes.len() - 1) as f64;
    let avg_gain = gains / steps;
    let avg_loss = losses / steps;

    if avg_loss == 0.0 {
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}
