//! Dual momentum: long when both the 1-month and 3-month trends are up and
//! volatility is contained, flat otherwise.

use super::metrics;
use super::models::{BacktestReport, EquityPoint, Trade, TradeAction};
use crate::data::PriceBar;
use crate::error::{ResearchError, Result};
use crate::technical::series::{momentum_at, volatility_at};

/// Bars required before a backtest is attempted
pub const MIN_BACKTEST_BARS: usize = 100;

const RECENT_TRADES: usize = 10;
const RECENT_EQUITY_POINTS: usize = 100;

/// Entry/exit thresholds, as fractions
#[derive(Debug, Clone)]
pub struct DualMomentumParams {
    pub short_lookback: usize,
    pub long_lookback: usize,
    pub volatility_window: usize,
    pub entry_short_momentum: f64,
    pub entry_long_momentum: f64,
    pub entry_max_volatility: f64,
    pub exit_short_momentum: f64,
    pub exit_volatility: f64,
}

impl Default for DualMomentumParams {
    fn default() -> Self {
        Self {
            short_lookback: 21,
            long_lookback: 63,
            volatility_window: 20,
            entry_short_momentum: 0.02,
            entry_long_momentum: 0.05,
            entry_max_volatility: 0.40,
            exit_short_momentum: -0.01,
            exit_volatility: 0.50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BarSignal {
    Buy,
    Sell,
    Hold,
}

impl DualMomentumParams {
    /// Signal for one bar. Unavailable inputs never trigger a condition and
    /// an exit always wins over an entry.
    pub(crate) fn signal(&self, short: Option<f64>, long: Option<f64>, vol: Option<f64>) -> BarSignal {
        let exit = short.is_some_and(|m| m < self.exit_short_momentum)
            || vol.is_some_and(|v| v > self.exit_volatility);
        let entry = short.is_some_and(|m| m > self.entry_short_momentum)
            && long.is_some_and(|m| m > self.entry_long_momentum)
            && vol.is_some_and(|v| v < self.entry_max_volatility);

        if exit {
            BarSignal::Sell
        } else if entry {
            BarSignal::Buy
        } else {
            BarSignal::Hold
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DualMomentumBacktester {
    params: DualMomentumParams,
}

impl DualMomentumBacktester {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: DualMomentumParams) -> Self {
        Self { params }
    }

    /// Simulate the strategy over a chronologically ordered history.
    ///
    /// The whole account goes in on a buy and comes out on a sell, filled at
    /// the bar's close with no costs.
    pub fn run(&self, bars: &[PriceBar], initial_capital: f64) -> Result<BacktestReport> {
        if bars.len() < MIN_BACKTEST_BARS {
            return Err(ResearchError::InsufficientData {
                required: MIN_BACKTEST_BARS,
                actual: bars.len(),
            });
        }
        if !initial_capital.is_finite() || initial_capital <= 0.0 {
            return Err(ResearchError::ConfigError(format!(
                "initial capital must be positive, got {initial_capital}"
            )));
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let p = &self.params;

        let mut cash = initial_capital;
        let mut shares = 0.0;
        let mut trades = Vec::new();
        let mut equity = Vec::with_capacity(bars.len() - 1);

        for (i, bar) in bars.iter().enumerate().skip(1) {
            let price = bar.close;
            let signal = p.signal(
                momentum_at(&closes, i, p.short_lookback),
                momentum_at(&closes, i, p.long_lookback),
                volatility_at(&closes, i, p.volatility_window),
            );

            match signal {
                BarSignal::Buy if shares == 0.0 && price > 0.0 => {
                    shares = cash / price;
                    cash = 0.0;
                    trades.push(Trade {
                        timestamp: bar.timestamp,
                        action: TradeAction::Buy,
                        price,
                        shares,
                    });
                }
                BarSignal::Sell if shares > 0.0 => {
                    cash = shares * price;
                    trades.push(Trade {
                        timestamp: bar.timestamp,
                        action: TradeAction::Sell,
                        price,
                        shares,
                    });
                    shares = 0.0;
                }
                _ => {}
            }

            equity.push(EquityPoint {
                timestamp: bar.timestamp,
                equity: cash + shares * price,
            });
        }

        let values: Vec<f64> = equity.iter().map(|e| e.equity).collect();
        let final_equity = values.last().copied().unwrap_or(initial_capital);
        let total_return_pct = (final_equity / initial_capital - 1.0) * 100.0;
        let buy_hold_return_pct = match (closes.first(), closes.last()) {
            (Some(&first), Some(&last)) if first > 0.0 => (last / first - 1.0) * 100.0,
            _ => 0.0,
        };

        let report = BacktestReport {
            strategy: "dual_momentum".to_string(),
            bars_used: bars.len(),
            initial_capital,
            final_equity,
            total_return_pct,
            annualized_return_pct: metrics::annualized_return(&values),
            max_drawdown_pct: metrics::max_drawdown(&values),
            sharpe_ratio: metrics::sharpe_ratio(&values),
            win_rate_pct: metrics::win_rate(&trades),
            total_trades: trades.len(),
            buy_hold_return_pct,
            outperformance_pct: total_return_pct - buy_hold_return_pct,
            trades: tail(trades, RECENT_TRADES),
            equity_curve: tail(equity, RECENT_EQUITY_POINTS),
        };

        tracing::info!(
            bars = report.bars_used,
            trades = report.total_trades,
            total_return = format!("{:.2}%", report.total_return_pct),
            "Dual momentum backtest finished"
        );
        Ok(report)
    }
}

fn tail<T>(mut items: Vec<T>, n: usize) -> Vec<T> {
    let start = items.len().saturating_sub(n);
    items.split_off(start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{bars, ramp};

    #[test]
    fn test_requires_history() {
        let err = DualMomentumBacktester::new()
            .run(&bars(&ramp(100.0, 110.0, 60)), 10_000.0)
            .unwrap_err();
        assert!(matches!(
            err,
            ResearchError::InsufficientData { required: 100, actual: 60 }
        ));
    }

    #[test]
    fn test_rejects_non_positive_capital() {
        let history = bars(&ramp(100.0, 200.0, 150));
        assert!(DualMomentumBacktester::new().run(&history, 0.0).is_err());
    }

    #[test]
    fn test_signal_rules() {
        let p = DualMomentumParams::default();
        assert_eq!(p.signal(Some(0.03), Some(0.06), Some(0.2)), BarSignal::Buy);
        assert_eq!(p.signal(Some(0.03), None, Some(0.2)), BarSignal::Hold);
        assert_eq!(p.signal(Some(0.03), Some(0.06), Some(0.45)), BarSignal::Hold);
        assert_eq!(p.signal(Some(-0.02), Some(0.06), Some(0.2)), BarSignal::Sell);
        assert_eq!(p.signal(None, None, Some(0.6)), BarSignal::Sell);
        assert_eq!(p.signal(None, None, None), BarSignal::Hold);
    }

    #[test]
    fn test_uptrend_buys_once_and_holds() {
        let closes = ramp(100.0, 200.0, 200);
        let report = DualMomentumBacktester::new()
            .run(&bars(&closes), 10_000.0)
            .unwrap();

        // the 3-month lookback first exists at bar 63
        assert_eq!(report.total_trades, 1);
        assert_eq!(report.trades[0].action, TradeAction::Buy);
        assert!((report.trades[0].price - closes[63]).abs() < 1e-9);

        let expected = 10_000.0 * 200.0 / closes[63];
        assert!((report.final_equity - expected).abs() < 1e-6);
        assert!((report.buy_hold_return_pct - 100.0).abs() < 1e-9);
        assert!(report.outperformance_pct < 0.0);
        assert_eq!(report.max_drawdown_pct, 0.0);
        assert_eq!(report.win_rate_pct, 0.0);
        assert_eq!(report.equity_curve.len(), 100);
        assert_eq!(report.bars_used, 200);
    }

    #[test]
    fn test_reversal_sells_with_real_share_count() {
        let mut closes = ramp(100.0, 160.0, 120);
        closes.extend(ramp(159.0, 100.0, 80));
        let report = DualMomentumBacktester::new()
            .run(&bars(&closes), 10_000.0)
            .unwrap();

        assert_eq!(report.total_trades, 2);
        let (buy, sell) = (&report.trades[0], &report.trades[1]);
        assert_eq!(sell.action, TradeAction::Sell);
        assert!((sell.shares - buy.shares).abs() < 1e-9);
        assert!((report.final_equity - sell.shares * sell.price).abs() < 1e-6);
        assert!(report.max_drawdown_pct > 0.0);
        assert!(report.total_return_pct > report.buy_hold_return_pct);
    }
}
