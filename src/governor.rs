//! Risk governance
//!
//! A per-day state machine over the performance metrics and daily counters.
//! Rules are evaluated in order, first match wins; a pause is sticky for the
//! rest of the day until the external new-day signal arrives.

use chrono::NaiveDate;

use crate::config::RiskConfig;
use crate::error::{EngineError, Result};
use crate::types::{PauseReason, RiskDirective, RiskMetrics};

/// Day-scoped risk governor.
///
/// This is the only mutable state in the core. It is not internally
/// synchronized: callers polling from more than one thread must wrap it in a
/// `Mutex` (or give it to a single owner), otherwise two concurrent
/// evaluations could both observe the active state and double-pause.
#[derive(Debug, Clone)]
pub struct RiskGovernor {
    config: RiskConfig,
    day: NaiveDate,
    paused: Option<PauseReason>,
    current_stop_pct: f64,
}

impl RiskGovernor {
    /// Create a governor for the given trading day.
    ///
    /// Configuration constraints are checked here and nowhere else; a
    /// violated constraint is the one unrecoverable condition in the core.
    pub fn new(config: RiskConfig, day: NaiveDate) -> Result<Self> {
        if config.stop_loss_pct <= 0.0 {
            return Err(EngineError::InvalidPrice(config.stop_loss_pct));
        }
        if config.spacing_reduction_factor <= 0.0 || config.spacing_reduction_factor >= 1.0 {
            return Err(EngineError::InvalidPrice(config.spacing_reduction_factor));
        }
        let current_stop_pct = config.stop_loss_pct;
        Ok(Self {
            config,
            day,
            paused: None,
            current_stop_pct,
        })
    }

    /// Evaluate the gating rules for the current tick.
    ///
    /// While paused this only re-confirms the pause; no other directive is
    /// issued until `start_new_day` resets the state.
    pub fn evaluate(
        &mut self,
        metrics: &RiskMetrics,
        daily_pnl: f64,
        daily_trade_count: u32,
    ) -> RiskDirective {
        if let Some(reason) = self.paused {
            return RiskDirective::PauseDay { reason };
        }

        if daily_pnl <= -self.config.daily_loss_limit {
            tracing::warn!(daily_pnl, limit = self.config.daily_loss_limit, "daily loss limit hit, pausing");
            return self.pause(PauseReason::DailyLossLimit);
        }

        if daily_trade_count >= self.config.max_trades_per_day {
            tracing::warn!(daily_trade_count, "daily trade cap reached, pausing");
            return self.pause(PauseReason::MaxTradesReached);
        }

        if metrics.max_drawdown_pct > self.config.drawdown_ceiling_pct {
            self.current_stop_pct *= 0.5;
            tracing::info!(
                max_drawdown_pct = metrics.max_drawdown_pct,
                stop_loss_pct = self.current_stop_pct,
                "drawdown ceiling exceeded, tightening stop"
            );
            return RiskDirective::TightenStop {
                stop_loss_pct: self.current_stop_pct,
            };
        }

        if metrics.total_trades >= self.config.min_trades_for_sharpe
            && metrics.sharpe_ratio < self.config.sharpe_floor
        {
            tracing::info!(
                sharpe_ratio = metrics.sharpe_ratio,
                factor = self.config.spacing_reduction_factor,
                "sharpe below floor, reducing spacing"
            );
            return RiskDirective::ReduceSpacing {
                factor: self.config.spacing_reduction_factor,
            };
        }

        RiskDirective::Continue
    }

    fn pause(&mut self, reason: PauseReason) -> RiskDirective {
        self.paused = Some(reason);
        RiskDirective::PauseDay { reason }
    }

    /// External day-boundary signal. Resets the pause and the stop-loss only
    /// when `day` is actually a later day, keeping the transition idempotent.
    pub fn start_new_day(&mut self, day: NaiveDate) -> bool {
        if day <= self.day {
            return false;
        }
        self.day = day;
        self.paused = None;
        self.current_stop_pct = self.config.stop_loss_pct;
        tracing::info!(%day, "daily risk state reset");
        true
    }

    pub fn is_paused(&self) -> bool {
        self.paused.is_some()
    }

    pub fn current_stop_pct(&self) -> f64 {
        self.current_stop_pct
    }

    pub fn day(&self) -> NaiveDate {
        self.day
    }
}

/// Position-size factor from volatility: shrink orders as the market gets
/// noisier, never below 20% of the base size.
pub fn volatility_size_factor(volatility_pct: f64) -> f64 {
    (1.0 - volatility_pct / 20.0).max(0.2)
}

/// Position-size multiplier from recent performance: lean in modestly on a
/// strong record, pull back on a weak one.
pub fn performance_size_multiplier(metrics: &RiskMetrics) -> f64 {
    let pf = metrics.profit_factor.as_f64();
    if metrics.win_rate > 60.0 && pf > 1.5 && metrics.max_drawdown_pct < 10.0 {
        1.1
    } else if metrics.win_rate < 40.0 || pf < 1.0 || metrics.max_drawdown_pct > 20.0 {
        0.8
    } else {
        1.0
    }
}
