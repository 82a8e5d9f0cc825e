//! Volatility estimation
//!
//! Converts a window of historical prices into a single volatility figure:
//! population standard deviation of closes as a percentage of their mean.
//! Population (not sample) variance is deliberate for short deterministic
//! windows.

use statrs::statistics::Statistics;

use crate::error::{EngineError, Result};
use crate::types::{PricePoint, VolatilityReading};

/// Estimate volatility over an ordered window of prices.
///
/// Pure function of the window; `computed_at` is taken from the last point so
/// the result is reproducible without a clock.
pub fn estimate(window: &[PricePoint]) -> Result<VolatilityReading> {
    if window.len() < 2 {
        return Err(EngineError::InsufficientData {
            needed: 2,
            got: window.len(),
        });
    }

    let closes: Vec<f64> = window.iter().map(|p| p.close).collect();
    let mean = closes.iter().mean();
    if mean <= 0.0 {
        return Err(EngineError::InvalidPrice(mean));
    }

    let stdev = closes.iter().population_std_dev();
    let value = stdev / mean * 100.0;

    tracing::debug!(volatility_pct = value, points = window.len(), "volatility estimated");

    Ok(VolatilityReading {
        value,
        computed_at: window[window.len() - 1].timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};

    fn window(prices: &[f64]) -> Vec<PricePoint> {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                timestamp: start + Duration::hours(i as i64),
                close,
            })
            .collect()
    }

    #[test]
    fn rejects_short_window() {
        let err = estimate(&window(&[100.0])).unwrap_err();
        assert_eq!(err, EngineError::InsufficientData { needed: 2, got: 1 });
        assert!(estimate(&[]).is_err());
    }

    #[test]
    fn constant_prices_have_zero_volatility() {
        let reading = estimate(&window(&[100.0, 100.0, 100.0])).unwrap();
        assert_relative_eq!(reading.value, 0.0);
    }

    #[test]
    fn matches_population_stdev_over_mean() {
        // closes 90, 100, 110: mean 100, population stdev sqrt(200/3)
        let reading = estimate(&window(&[90.0, 100.0, 110.0])).unwrap();
        let expected = (200.0_f64 / 3.0).sqrt() / 100.0 * 100.0;
        assert_relative_eq!(reading.value, expected, epsilon = 1e-12);
    }

    #[test]
    fn invariant_to_linear_scaling() {
        let base = [95.0, 101.0, 98.5, 103.2, 99.9];
        let scaled: Vec<f64> = base.iter().map(|p| p * 1000.0).collect();

        let a = estimate(&window(&base)).unwrap();
        let b = estimate(&window(&scaled)).unwrap();
        assert_relative_eq!(a.value, b.value, epsilon = 1e-9);
        assert!(a.value >= 0.0);
    }

    #[test]
    fn computed_at_is_last_point() {
        let w = window(&[100.0, 101.0, 102.0]);
        let reading = estimate(&w).unwrap();
        assert_eq!(reading.computed_at, w[2].timestamp);
    }
}
