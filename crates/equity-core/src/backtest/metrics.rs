//! Performance statistics over an equity curve

use super::models::{Trade, TradeAction};
use crate::data::{mean, sample_std};
use crate::technical::series::TRADING_DAYS;

const RISK_FREE_RATE: f64 = 0.02;

/// Compound annual growth between the first and last equity values, in percent.
pub fn annualized_return(equity: &[f64]) -> f64 {
    if equity.len() < 2 || equity[0] <= 0.0 {
        return 0.0;
    }
    let total = equity[equity.len() - 1] / equity[0] - 1.0;
    let years = equity.len() as f64 / TRADING_DAYS;
    ((1.0 + total).powf(1.0 / years) - 1.0) * 100.0
}

/// Largest peak-to-trough decline, in percent.
pub fn max_drawdown(equity: &[f64]) -> f64 {
    if equity.len() < 2 {
        return 0.0;
    }
    let mut peak = equity[0];
    let mut worst = 0.0_f64;
    for &value in equity {
        peak = peak.max(value);
        if peak > 0.0 {
            worst = worst.max((peak - value) / peak * 100.0);
        }
    }
    worst
}

/// Annualized Sharpe ratio of daily equity returns against a 2% risk-free rate.
///
/// Zero when there are fewer than two returns or no variation at all.
pub fn sharpe_ratio(equity: &[f64]) -> f64 {
    let returns: Vec<f64> = equity
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .collect();
    if returns.len() < 2 {
        return 0.0;
    }

    let std = sample_std(&returns);
    if std <= 0.0 {
        return 0.0;
    }
    let excess = mean(&returns) - RISK_FREE_RATE / TRADING_DAYS;
    TRADING_DAYS.sqrt() * excess / std
}

/// Share of buy/sell pairs that closed above the entry, in percent.
///
/// Needs at least two completed round trips.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.len() < 4 {
        return 0.0;
    }

    let pairs: Vec<(&Trade, &Trade)> = trades
        .chunks_exact(2)
        .map(|pair| (&pair[0], &pair[1]))
        .filter(|(buy, sell)| buy.action == TradeAction::Buy && sell.action == TradeAction::Sell)
        .collect();
    if pairs.is_empty() {
        return 0.0;
    }

    let wins = pairs.iter().filter(|(buy, sell)| sell.price > buy.price).count();
    wins as f64 / pairs.len() as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn trade(action: TradeAction, price: f64) -> Trade {
        Trade {
            timestamp: Utc::now(),
            action,
            price,
            shares: 1.0,
        }
    }

    #[test]
    fn test_max_drawdown() {
        assert!((max_drawdown(&[100.0, 120.0, 90.0, 130.0]) - 25.0).abs() < 1e-9);
        assert_eq!(max_drawdown(&[100.0, 110.0, 120.0]), 0.0);
        assert_eq!(max_drawdown(&[100.0]), 0.0);
    }

    #[test]
    fn test_annualized_return() {
        let mut curve = vec![100.0; 252];
        curve.push(110.0);
        let annual = annualized_return(&curve);
        assert!(annual > 9.9 && annual < 10.0);
        assert_eq!(annualized_return(&[100.0]), 0.0);
    }

    #[test]
    fn test_sharpe_flat_and_rising() {
        assert_eq!(sharpe_ratio(&[100.0; 10]), 0.0);
        assert_eq!(sharpe_ratio(&[100.0, 101.0]), 0.0);

        let rising = [100.0, 101.0, 101.5, 103.0, 103.2, 104.5];
        assert!(sharpe_ratio(&rising) > 0.0);
    }

    #[test]
    fn test_win_rate_pairs() {
        use TradeAction::{Buy, Sell};
        let trades = [
            trade(Buy, 10.0),
            trade(Sell, 12.0),
            trade(Buy, 12.0),
            trade(Sell, 11.0),
        ];
        assert!((win_rate(&trades) - 50.0).abs() < 1e-9);
        assert_eq!(win_rate(&trades[..2]), 0.0);

        // an open position at the end is ignored
        let mut open = trades.to_vec();
        open.push(trade(Buy, 11.0));
        assert!((win_rate(&open) - 50.0).abs() < 1e-9);
    }
}
