//! Moving-average trend filter
//!
//! Compares a short and a long simple moving average of closes to classify
//! the market as upward, downward, or flat. The result feeds the grid
//! builder's side bias; callers without a trend opinion pass no signal.

use statrs::statistics::Statistics;

use crate::types::{PricePoint, TrendSignal};

/// Relative distance the short MA must clear the long MA by, 0.5%
const TREND_THRESHOLD: f64 = 0.005;

/// Classify the trend over the trailing window.
///
/// `short` and `long` are moving-average lengths in points, `short < long`.
/// A window too small to fill the long average, or malformed periods, yield
/// `Flat`: with no usable signal the grid stays unbiased.
pub fn classify(window: &[PricePoint], short: usize, long: usize) -> TrendSignal {
    if short == 0 || short >= long || window.len() < long {
        return TrendSignal::Flat;
    }

    let closes: Vec<f64> = window.iter().map(|p| p.close).collect();
    let ma_short = closes[closes.len() - short..].iter().mean();
    let ma_long = closes[closes.len() - long..].iter().mean();

    if ma_short > ma_long * (1.0 + TREND_THRESHOLD) {
        TrendSignal::Upward
    } else if ma_short < ma_long * (1.0 - TREND_THRESHOLD) {
        TrendSignal::Downward
    } else {
        TrendSignal::Flat
    }
}
