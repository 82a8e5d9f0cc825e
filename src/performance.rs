//! Trade-history performance tracking
//!
//! Recomputes aggregate metrics from scratch on every call. Histories are
//! small (tens to low thousands of trades), so a full pass is cheaper than
//! maintaining incremental state that can drift.

use statrs::statistics::Statistics;

use crate::error::{EngineError, Result};
use crate::types::{ProfitFactor, RiskMetrics, Trade};

/// Compute point-in-time metrics over a chronologically ordered history.
pub fn compute(history: &[Trade]) -> Result<RiskMetrics> {
    if history.is_empty() {
        return Err(EngineError::EmptyHistory);
    }

    let pnls: Vec<f64> = history.iter().map(|t| t.pnl).collect();
    let wins: Vec<f64> = pnls.iter().copied().filter(|&p| p > 0.0).collect();
    let losses: Vec<f64> = pnls.iter().copied().filter(|&p| p < 0.0).collect();

    let total = pnls.len();
    let win_rate = wins.len() as f64 / total as f64 * 100.0;

    let avg_profit = if wins.is_empty() { 0.0 } else { wins.iter().mean() };
    let avg_loss = if losses.is_empty() { 0.0 } else { losses.iter().mean() };

    let gross_profit: f64 = wins.iter().sum();
    let gross_loss: f64 = losses.iter().sum::<f64>().abs();
    let profit_factor = if gross_loss > 0.0 {
        ProfitFactor::Ratio(gross_profit / gross_loss)
    } else {
        ProfitFactor::Undefined
    };

    let metrics = RiskMetrics {
        win_rate,
        avg_profit,
        avg_loss,
        profit_factor,
        max_drawdown_pct: max_drawdown_pct(&pnls),
        sharpe_ratio: sharpe_ratio(&pnls, None),
        total_trades: total,
        profitable_trades: wins.len(),
        losing_trades: losses.len(),
    };

    tracing::debug!(
        total_trades = metrics.total_trades,
        win_rate = metrics.win_rate,
        max_drawdown_pct = metrics.max_drawdown_pct,
        sharpe_ratio = metrics.sharpe_ratio,
        "risk metrics recomputed"
    );

    Ok(metrics)
}

/// Maximum peak-to-trough decline of cumulative pnl, percent of the peak.
///
/// While the running peak is non-positive the percentage is meaningless (the
/// naive formula explodes), so those points contribute zero drawdown.
fn max_drawdown_pct(pnls: &[f64]) -> f64 {
    let mut cumulative = 0.0;
    let mut peak = f64::MIN;
    let mut max_dd = 0.0_f64;

    for &pnl in pnls {
        cumulative += pnl;
        if cumulative > peak {
            peak = cumulative;
        }
        if peak > 0.0 {
            let dd = (peak - cumulative) / peak * 100.0;
            max_dd = max_dd.max(dd);
        }
    }

    max_dd
}

/// Sharpe ratio over the per-trade pnl series: mean over sample (N-1)
/// standard deviation. Pass `periods_per_year` to annualize by its square
/// root; the default is unscaled.
pub fn sharpe_ratio(pnls: &[f64], periods_per_year: Option<f64>) -> f64 {
    if pnls.len() < 2 {
        return 0.0;
    }
    let mean = pnls.iter().mean();
    let stdev = pnls.iter().std_dev();
    if stdev == 0.0 {
        return 0.0;
    }
    let scale = periods_per_year.map_or(1.0, f64::sqrt);
    mean / stdev * scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Side;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};

    fn history(pnls: &[f64]) -> Vec<Trade> {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        pnls.iter()
            .enumerate()
            .map(|(i, &pnl)| Trade {
                opened_at: start + Duration::hours(i as i64),
                closed_at: start + Duration::hours(i as i64 + 1),
                entry_price: 100.0,
                exit_price: 100.0 + pnl,
                side: Side::Buy,
                pnl,
                fee: 0.1,
            })
            .collect()
    }

    #[test]
    fn empty_history_is_an_error() {
        assert_eq!(compute(&[]).unwrap_err(), EngineError::EmptyHistory);
    }

    #[test]
    fn mixed_history_scenario() {
        // cumulative [10, 20, 15, 10, 5], peak stays 20 after the second
        // trade, worst drawdown (20 - 5) / 20 = 75%
        let metrics = compute(&history(&[10.0, 10.0, -5.0, -5.0, -5.0])).unwrap();

        assert_eq!(metrics.total_trades, 5);
        assert_eq!(metrics.profitable_trades, 2);
        assert_eq!(metrics.losing_trades, 3);
        assert_relative_eq!(metrics.win_rate, 40.0);
        assert_relative_eq!(metrics.avg_profit, 10.0);
        assert_relative_eq!(metrics.avg_loss, -5.0);
        assert_relative_eq!(metrics.profit_factor.as_f64(), 20.0 / 15.0, epsilon = 1e-12);
        assert_relative_eq!(metrics.max_drawdown_pct, 75.0);
    }

    #[test]
    fn all_winning_history() {
        let metrics = compute(&history(&[4.0, 2.0, 6.0])).unwrap();

        assert!(metrics.profit_factor.is_undefined());
        assert_eq!(metrics.losing_trades, 0);
        assert_relative_eq!(metrics.win_rate, 100.0);
        assert_relative_eq!(metrics.max_drawdown_pct, 0.0);
        assert_relative_eq!(metrics.avg_loss, 0.0);
    }

    #[test]
    fn drawdown_ignores_non_positive_peak() {
        // Cumulative pnl never goes positive; the naive percentage would
        // blow up, the convention here reports zero instead
        let metrics = compute(&history(&[-10.0, -5.0, 3.0, -2.0])).unwrap();
        assert_relative_eq!(metrics.max_drawdown_pct, 0.0);
    }

    #[test]
    fn drawdown_counts_only_after_positive_peak() {
        // Peak 5 after recovery, then a 6-point fall below zero: the fall is
        // measured against the positive peak
        let metrics = compute(&history(&[-10.0, 15.0, -6.0])).unwrap();
        assert_relative_eq!(metrics.max_drawdown_pct, (5.0 - (-1.0)) / 5.0 * 100.0);
    }

    #[test]
    fn sharpe_uses_sample_stdev() {
        let pnls = [1.0, 2.0, 3.0];
        // mean 2, sample stdev 1
        assert_relative_eq!(sharpe_ratio(&pnls, None), 2.0, epsilon = 1e-12);
        assert_relative_eq!(
            sharpe_ratio(&pnls, Some(365.0)),
            2.0 * 365.0_f64.sqrt(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn sharpe_degenerate_cases() {
        assert_eq!(sharpe_ratio(&[5.0], None), 0.0);
        assert_eq!(sharpe_ratio(&[3.0, 3.0, 3.0], None), 0.0);
    }

    #[test]
    fn zero_pnl_trades_count_as_non_profitable() {
        let metrics = compute(&history(&[0.0, 5.0])).unwrap();
        assert_eq!(metrics.profitable_trades, 1);
        assert_eq!(metrics.losing_trades, 0);
        assert_relative_eq!(metrics.win_rate, 50.0);
        assert!(metrics.profit_factor.is_undefined());
    }
}
