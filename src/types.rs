//! Core data types used across the grid trading core

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// A single observed market price. Immutable once recorded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

impl PricePoint {
    /// Create a price point, rejecting non-positive prices
    pub fn new(timestamp: DateTime<Utc>, close: f64) -> Result<Self> {
        if close <= 0.0 {
            return Err(EngineError::InvalidPrice(close));
        }
        Ok(Self { timestamp, close })
    }
}

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

/// Completed trade record, appended once when an order pair closes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub opened_at: DateTime<Utc>,
    pub closed_at: DateTime<Utc>,
    pub entry_price: f64,
    pub exit_price: f64,
    pub side: Side,
    pub pnl: f64,
    pub fee: f64,
}

impl Trade {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        opened_at: DateTime<Utc>,
        closed_at: DateTime<Utc>,
        entry_price: f64,
        exit_price: f64,
        side: Side,
        pnl: f64,
        fee: f64,
    ) -> Result<Self> {
        if entry_price <= 0.0 {
            return Err(EngineError::InvalidPrice(entry_price));
        }
        if exit_price <= 0.0 {
            return Err(EngineError::InvalidPrice(exit_price));
        }
        if fee < 0.0 {
            return Err(EngineError::InvalidPrice(fee));
        }
        Ok(Self {
            opened_at,
            closed_at,
            entry_price,
            exit_price,
            side,
            pnl,
            fee,
        })
    }
}

/// Volatility expressed as a percentage of the mean price over a window.
/// Recomputed each tick; carries no persisted identity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VolatilityReading {
    /// Non-negative, in percent units (e.g. 0.83 means 0.83%)
    pub value: f64,
    pub computed_at: DateTime<Utc>,
}

/// Directional hint for weighting grid levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendSignal {
    Upward,
    Downward,
    Flat,
}

/// Which side a grid level leans toward once filled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SideBias {
    Buy,
    Sell,
    Neutral,
}

/// A single price level within a grid
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GridLevel {
    pub index: usize,
    pub price: f64,
    /// Position-size weight in (0, 1]; weights sum to 1 across the grid
    pub weight: f64,
    pub side_bias: SideBias,
}

/// An ordered ladder of price levels bracketing the reference price.
///
/// Built fresh on each adaptation tick; the previous grid is discarded, so
/// fills pending against the old grid are reconciled by the execution loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    levels: Vec<GridLevel>,
    spacing_pct: f64,
    reference_price: f64,
    built_at: DateTime<Utc>,
}

impl Grid {
    pub(crate) fn new(
        levels: Vec<GridLevel>,
        spacing_pct: f64,
        reference_price: f64,
        built_at: DateTime<Utc>,
    ) -> Self {
        Self {
            levels,
            spacing_pct,
            reference_price,
            built_at,
        }
    }

    /// Levels in strictly increasing price order
    pub fn levels(&self) -> &[GridLevel] {
        &self.levels
    }

    /// Volatility-adjusted spacing between adjacent levels, in percent
    pub fn spacing_pct(&self) -> f64 {
        self.spacing_pct
    }

    /// Price the grid was anchored at when built
    pub fn reference_price(&self) -> f64 {
        self.reference_price
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn lower_bound(&self) -> f64 {
        self.levels.first().map(|l| l.price).unwrap_or(0.0)
    }

    pub fn upper_bound(&self) -> f64 {
        self.levels.last().map(|l| l.price).unwrap_or(0.0)
    }

    /// Whether the grid should be rebuilt: either it is older than `max_age`
    /// or the price has drifted outside the banded grid range.
    pub fn needs_rebuild(&self, current_price: f64, now: DateTime<Utc>, max_age: Duration) -> bool {
        if now - self.built_at >= max_age {
            return true;
        }
        current_price < self.lower_bound() * 0.99 || current_price > self.upper_bound() * 1.01
    }
}

/// Profit factor: total gains over total losses.
///
/// A run with no losing trades yet is an expected steady state, so the
/// undefined case is a sentinel rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProfitFactor {
    Ratio(f64),
    /// No losing trades: the ratio is unbounded
    Undefined,
}

impl ProfitFactor {
    pub fn is_undefined(&self) -> bool {
        matches!(self, ProfitFactor::Undefined)
    }

    /// Numeric view, mapping the undefined sentinel to +infinity
    pub fn as_f64(&self) -> f64 {
        match self {
            ProfitFactor::Ratio(r) => *r,
            ProfitFactor::Undefined => f64::INFINITY,
        }
    }
}

impl std::fmt::Display for ProfitFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfitFactor::Ratio(r) => write!(f, "{:.2}", r),
            ProfitFactor::Undefined => write!(f, "inf"),
        }
    }
}

/// Point-in-time aggregate trading statistics, fully derived from the trade
/// history and recomputed from scratch on each request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskMetrics {
    /// Percentage of profitable trades, 0..=100
    pub win_rate: f64,
    /// Mean pnl over winning trades (0 if none)
    pub avg_profit: f64,
    /// Mean pnl over losing trades (0 if none, otherwise negative)
    pub avg_loss: f64,
    pub profit_factor: ProfitFactor,
    /// Peak-to-trough decline of cumulative pnl, percent of peak
    pub max_drawdown_pct: f64,
    /// Mean per-trade pnl over its sample standard deviation (not annualized)
    pub sharpe_ratio: f64,
    pub total_trades: usize,
    pub profitable_trades: usize,
    pub losing_trades: usize,
}

/// Why the governor paused the trading day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PauseReason {
    DailyLossLimit,
    MaxTradesReached,
}

/// Instruction from the risk governor to the execution loop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RiskDirective {
    Continue,
    /// Multiply grid spacing by `factor` (< 1) on the next rebuild
    ReduceSpacing { factor: f64 },
    /// Replace the current stop-loss percentage
    TightenStop { stop_loss_pct: f64 },
    /// Stop trading until the external new-day signal
    PauseDay { reason: PauseReason },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn price_point_rejects_non_positive() {
        assert!(PricePoint::new(ts(), 0.0).is_err());
        assert!(PricePoint::new(ts(), -5.0).is_err());
        assert!(PricePoint::new(ts(), 100.0).is_ok());
    }

    #[test]
    fn trade_rejects_negative_fee() {
        let t = Trade::new(ts(), ts(), 100.0, 101.0, Side::Buy, 1.0, -0.1);
        assert_eq!(t.unwrap_err(), EngineError::InvalidPrice(-0.1));
    }

    #[test]
    fn profit_factor_sentinel() {
        assert!(ProfitFactor::Undefined.is_undefined());
        assert_eq!(ProfitFactor::Undefined.as_f64(), f64::INFINITY);
        assert_eq!(ProfitFactor::Ratio(1.5).as_f64(), 1.5);
    }

    #[test]
    fn grid_needs_rebuild_on_age_and_band() {
        let levels = vec![
            GridLevel {
                index: 0,
                price: 98.0,
                weight: 0.5,
                side_bias: SideBias::Buy,
            },
            GridLevel {
                index: 1,
                price: 102.0,
                weight: 0.5,
                side_bias: SideBias::Sell,
            },
        ];
        let grid = Grid::new(levels, 0.5, 100.0, ts());

        let fresh = ts() + Duration::hours(1);
        assert!(!grid.needs_rebuild(100.0, fresh, Duration::hours(12)));
        // Price escaped the band
        assert!(grid.needs_rebuild(104.0, fresh, Duration::hours(12)));
        assert!(grid.needs_rebuild(96.0, fresh, Duration::hours(12)));
        // Grid too old
        let stale = ts() + Duration::hours(13);
        assert!(grid.needs_rebuild(100.0, stale, Duration::hours(12)));
    }
}
