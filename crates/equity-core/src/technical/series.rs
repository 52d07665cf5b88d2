//! Whole-series indicator helpers shared by the calculator, the backtester
//! and the dashboard chart

use crate::data::{PriceBar, pct_returns, sample_std};
use crate::error::{ResearchError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ta::Next;
use ta::indicators::{ExponentialMovingAverage, SimpleMovingAverage};

/// Trading days per year used to annualize volatility
pub const TRADING_DAYS: f64 = 252.0;

/// Simple moving average at every point; early values average what is available.
pub fn sma_series(values: &[f64], period: usize) -> Result<Vec<f64>> {
    let mut sma = SimpleMovingAverage::new(period)
        .map_err(|e| ResearchError::IndicatorError(e.to_string()))?;
    Ok(values.iter().map(|&v| sma.next(v)).collect())
}

/// Exponential moving average at every point
pub fn ema_series(values: &[f64], period: usize) -> Result<Vec<f64>> {
    let mut ema = ExponentialMovingAverage::new(period)
        .map_err(|e| ResearchError::IndicatorError(e.to_string()))?;
    Ok(values.iter().map(|&v| ema.next(v)).collect())
}

/// Fractional change from `lookback` bars before `index` to `index`.
pub fn momentum_at(values: &[f64], index: usize, lookback: usize) -> Option<f64> {
    let past = *values.get(index.checked_sub(lookback)?)?;
    let current = *values.get(index)?;
    (past > 0.0).then(|| current / past - 1.0)
}

/// Annualized standard deviation of the `window` daily returns ending at `index`.
pub fn volatility_at(values: &[f64], index: usize, window: usize) -> Option<f64> {
    let start = index.checked_sub(window)?;
    let slice = values.get(start..=index)?;
    let returns = pct_returns(slice);
    (returns.len() >= 2).then(|| sample_std(&returns) * TRADING_DAYS.sqrt())
}

/// One point of the dashboard price chart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartPoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub sma20: Option<f64>,
    pub sma50: Option<f64>,
    pub synthetic: bool,
}

/// Close prices with MA20/MA50 overlays for the newest `last_n` bars.
///
/// Averages are only reported once their window is full.
pub fn chart_series(bars: &[PriceBar], last_n: usize) -> Result<Vec<ChartPoint>> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let sma20 = sma_series(&closes, 20)?;
    let sma50 = sma_series(&closes, 50)?;
    let start = bars.len().saturating_sub(last_n);

    Ok(bars
        .iter()
        .enumerate()
        .skip(start)
        .map(|(i, bar)| ChartPoint {
            timestamp: bar.timestamp,
            close: bar.close,
            sma20: (i + 1 >= 20).then(|| sma20[i]),
            sma50: (i + 1 >= 50).then(|| sma50[i]),
            synthetic: bar.synthetic,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_series() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let sma = sma_series(&values, 3).unwrap();
        assert_eq!(sma.len(), 5);
        assert!((sma[4] - 4.0).abs() < 1e-9);
        assert!(sma_series(&values, 0).is_err());
    }

    #[test]
    fn test_ema_tracks_constant() {
        let ema = ema_series(&[10.0; 30], 12).unwrap();
        assert!((ema[29] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_momentum_and_volatility() {
        let values: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        assert!((momentum_at(&values, 21, 21).unwrap() - 0.21).abs() < 1e-9);
        assert!(momentum_at(&values, 5, 21).is_none());

        let flat = [50.0; 25];
        assert_eq!(volatility_at(&flat, 24, 20), Some(0.0));
        assert!(volatility_at(&flat, 10, 20).is_none());
    }

    #[test]
    fn test_chart_series_overlays() {
        let bars = crate::data::synthetic::simulated_series(100.0, 60, Utc::now(), 3);
        let points = chart_series(&bars, 45).unwrap();
        assert_eq!(points.len(), 45);
        // first point is bar index 15
        assert!(points[0].sma20.is_none());
        assert!(points[4].sma20.is_some());
        assert!(points[33].sma50.is_none());
        assert!(points[34].sma50.is_some());
        assert_eq!(points.last().unwrap().close, 100.0);
    }
}
