//! Adaptive grid construction
//!
//! Builds a fresh price ladder around the current price. Spacing is floored
//! by the configured minimum and widened by volatility, the overall range
//! expands with volatility, and level weights concentrate position size near
//! the current price.

use itertools::Itertools;

use crate::config::{GridConfig, LevelDistribution};
use crate::error::{EngineError, Result};
use crate::types::{Grid, GridLevel, SideBias, TrendSignal, VolatilityReading};

/// Base grid half-range, percent of current price
const BASE_HALF_RANGE_PCT: f64 = 1.5;
/// Floor of the per-level weight shape before normalization; keeps edge
/// levels funded while still favoring the center
const WEIGHT_FLOOR: f64 = 0.4;

/// Build a grid around `current_price`.
///
/// Pure function: identical inputs produce an identical grid. The grid's
/// build timestamp is taken from the volatility reading so no clock is read.
pub fn build(
    current_price: f64,
    volatility: &VolatilityReading,
    config: &GridConfig,
    trend: Option<TrendSignal>,
) -> Result<Grid> {
    let n = config.levels;
    if n < 2 {
        return Err(EngineError::InvalidLevelCount(n));
    }
    if current_price <= 0.0 {
        return Err(EngineError::InvalidPrice(current_price));
    }

    // More volatility widens the spacing, never below the configured minimum
    let spacing_pct = config.base_spacing_pct.max(volatility.value / 10.0);

    // Range expands proportionally with volatility around a 1.5% anchor
    let half_range_pct = BASE_HALF_RANGE_PCT * (1.0 + volatility.value / 100.0);
    let lower = current_price * (1.0 - half_range_pct / 100.0);
    let upper = current_price * (1.0 + half_range_pct / 100.0);
    if lower >= upper {
        return Err(EngineError::InvalidRange { lower, upper });
    }

    let prices: Vec<f64> = (0..n)
        .map(|i| {
            let t = i as f64 / (n - 1) as f64;
            let position = match config.distribution {
                LevelDistribution::Linear => t,
                // Odd-power transform concentrates levels near the center
                LevelDistribution::Clustered { power } => {
                    ((2.0 * t - 1.0).powi(power as i32) + 1.0) / 2.0
                }
            };
            round_to(lower + (upper - lower) * position, config.price_precision)
        })
        .collect();

    // Rounding at coarse precision can collapse adjacent levels
    for (a, b) in prices.iter().tuple_windows() {
        if a >= b {
            return Err(EngineError::InvalidRange {
                lower: *a,
                upper: *b,
            });
        }
    }

    let mid = (n - 1) as f64 / 2.0;
    let mut raw_weights: Vec<f64> = (0..n)
        .map(|i| {
            let distance_factor = 1.0 - (i as f64 - mid).abs() / mid;
            WEIGHT_FLOOR + (1.0 - WEIGHT_FLOOR) * distance_factor
        })
        .collect();

    let biases: Vec<SideBias> = prices
        .iter()
        .map(|&price| {
            if price < current_price {
                SideBias::Buy
            } else if price > current_price {
                SideBias::Sell
            } else {
                SideBias::Neutral
            }
        })
        .collect();

    // Shift weight mass toward the trend side
    if let Some(signal) = trend {
        let favored = match signal {
            TrendSignal::Upward => Some(SideBias::Buy),
            TrendSignal::Downward => Some(SideBias::Sell),
            TrendSignal::Flat => None,
        };
        if let Some(side) = favored {
            for (w, bias) in raw_weights.iter_mut().zip(&biases) {
                if *bias == side {
                    *w *= 1.0 + config.trend_weight_bias;
                }
            }
        }
    }

    let total: f64 = raw_weights.iter().sum();
    let levels: Vec<GridLevel> = prices
        .into_iter()
        .zip(raw_weights)
        .zip(biases)
        .enumerate()
        .map(|(index, ((price, w), side_bias))| GridLevel {
            index,
            price,
            weight: w / total,
            side_bias,
        })
        .collect();

    tracing::debug!(
        levels = n,
        spacing_pct,
        lower = levels[0].price,
        upper = levels[n - 1].price,
        volatility_pct = volatility.value,
        "grid rebuilt"
    );

    Ok(Grid::new(
        levels,
        spacing_pct,
        current_price,
        volatility.computed_at,
    ))
}

fn round_to(value: f64, dp: u32) -> f64 {
    let factor = 10f64.powi(dp as i32);
    (value * factor).round() / factor
}
