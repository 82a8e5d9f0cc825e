//! Configuration management
//!
//! Explicit parameter bundle for the grid and risk engines, loaded from JSON.
//! Nothing here reads global state; the scheduling loop owns the config and
//! passes it down.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::EngineError;

/// How level prices are distributed between the grid bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum LevelDistribution {
    /// Evenly spaced levels, inclusive of both bounds
    Linear,
    /// Levels concentrated near the reference price via an odd-power
    /// transform of the normalized position
    Clustered { power: u32 },
}

impl Default for LevelDistribution {
    fn default() -> Self {
        LevelDistribution::Linear
    }
}

/// Grid geometry parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Number of grid levels, at least 2
    pub levels: usize,
    /// Minimum spacing between adjacent levels, percent
    pub base_spacing_pct: f64,
    /// Decimal places for level prices (instrument tick precision)
    #[serde(default = "default_price_precision")]
    pub price_precision: u32,
    #[serde(default)]
    pub distribution: LevelDistribution,
    /// Extra weight mass shifted toward the trend side, as a fraction
    #[serde(default = "default_trend_weight_bias")]
    pub trend_weight_bias: f64,
}

fn default_price_precision() -> u32 {
    2
}

fn default_trend_weight_bias() -> f64 {
    0.25
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            levels: 7,
            base_spacing_pct: 0.3,
            price_precision: 2,
            distribution: LevelDistribution::Linear,
            trend_weight_bias: 0.25,
        }
    }
}

/// Risk governor thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Pause the day once daily pnl reaches this loss (currency units)
    pub daily_loss_limit: f64,
    pub max_trades_per_day: u32,
    /// Tighten the stop once max drawdown exceeds this, percent
    pub drawdown_ceiling_pct: f64,
    /// Reduce spacing once the Sharpe ratio falls below this
    pub sharpe_floor: f64,
    /// Minimum trade sample before the Sharpe rule applies
    pub min_trades_for_sharpe: usize,
    /// Stop-loss distance, percent
    pub stop_loss_pct: f64,
    /// Spacing multiplier issued by the Sharpe rule, < 1
    pub spacing_reduction_factor: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        RiskConfig {
            daily_loss_limit: 50.0,
            max_trades_per_day: 8,
            drawdown_ceiling_pct: 15.0,
            sharpe_floor: 1.0,
            min_trades_for_sharpe: 10,
            stop_loss_pct: 0.3,
            spacing_reduction_factor: 0.8,
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub risk: RiskConfig,
}

impl EngineConfig {
    /// Load configuration from a JSON file and validate it
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).context("Failed to read config file")?;
        let config: EngineConfig =
            serde_json::from_str(&contents).context("Failed to parse config JSON")?;
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Fail fast on constraint violations.
    ///
    /// These are the only unrecoverable conditions in the core, so they are
    /// checked at construction time rather than on every tick.
    pub fn validate(&self) -> std::result::Result<(), EngineError> {
        if self.grid.levels < 2 {
            return Err(EngineError::InvalidLevelCount(self.grid.levels));
        }
        if self.grid.base_spacing_pct <= 0.0 {
            return Err(EngineError::InvalidPrice(self.grid.base_spacing_pct));
        }
        if self.risk.stop_loss_pct <= 0.0 {
            return Err(EngineError::InvalidPrice(self.risk.stop_loss_pct));
        }
        if self.risk.spacing_reduction_factor <= 0.0 || self.risk.spacing_reduction_factor >= 1.0 {
            return Err(EngineError::InvalidPrice(self.risk.spacing_reduction_factor));
        }
        Ok(())
    }
}
