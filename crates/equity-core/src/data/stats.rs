//! Quote summary, descriptive statistics and basic indicators over a history

use super::models::{BasicTechnicals, LatestQuote, PriceBar, PriceData, PriceStats};
use statrs::statistics::Statistics;

/// Bars needed before the basic technicals are considered meaningful
pub const SUFFICIENT_BARS: usize = 20;

impl PriceData {
    /// Derive every summary field from a chronologically ordered history.
    pub fn from_history(history: Vec<PriceBar>) -> Self {
        let closes: Vec<f64> = history.iter().map(|b| b.close).collect();
        let latest = latest_quote(&history);
        let stats = price_stats(&history, latest.current);
        let technicals = basic_technicals(&closes, latest.current);

        Self {
            history,
            latest,
            stats,
            technicals,
        }
    }
}

fn latest_quote(history: &[PriceBar]) -> LatestQuote {
    let Some(last) = history.last() else {
        return LatestQuote::default();
    };

    let prev_close = if history.len() > 1 {
        history[history.len() - 2].close
    } else {
        last.close
    };
    let change = last.close - prev_close;
    let change_pct = if history.len() > 1 && prev_close > 0.0 {
        (last.close / prev_close - 1.0) * 100.0
    } else {
        0.0
    };

    LatestQuote {
        current: last.close,
        open: last.open,
        high: last.high,
        low: last.low,
        volume: last.volume,
        prev_close,
        change,
        change_pct,
        has_sufficient_data: history.len() >= SUFFICIENT_BARS,
    }
}

fn price_stats(history: &[PriceBar], current: f64) -> PriceStats {
    if history.is_empty() {
        return PriceStats::default();
    }

    let closes: Vec<f64> = history.iter().map(|b| b.close).collect();
    let max = closes.iter().copied().fold(f64::MIN, f64::max);
    let min = closes.iter().copied().fold(f64::MAX, f64::min);
    let current_vs_high = if max > 0.0 {
        (current / max - 1.0) * 100.0
    } else {
        0.0
    };

    PriceStats {
        mean: mean(&closes),
        std: sample_std(&closes),
        min,
        max,
        current_vs_high,
        avg_volume: mean(&history.iter().map(|b| b.volume).collect::<Vec<_>>()),
        data_points: history.len(),
    }
}

fn basic_technicals(closes: &[f64], current: f64) -> BasicTechnicals {
    let ma20 = trailing_mean(closes, 20).unwrap_or(current);
    let ma50 = trailing_mean(closes, 50);
    let price_vs_ma50 = match ma50 {
        Some(ma) if ma > 0.0 => (current / ma - 1.0) * 100.0,
        _ => 0.0,
    };

    BasicTechnicals {
        ma20,
        ma50: ma50.unwrap_or(current),
        rsi: wilder_rsi(closes, 14).unwrap_or(50.0),
        price_vs_ma50,
        can_calculate: closes.len() >= SUFFICIENT_BARS,
    }
}

/// Arithmetic mean; zero for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().mean()
    }
}

/// Sample standard deviation (n - 1); zero below two values.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        0.0
    } else {
        values.iter().std_dev()
    }
}

/// Mean of the last `period` values.
pub fn trailing_mean(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    Some(mean(&values[values.len() - period..]))
}

/// Simple daily returns between consecutive values.
pub fn pct_returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .collect()
}

/// RSI with Wilder smoothing (alpha = 1/period, averages seeded at zero).
///
/// Returns `None` with fewer than two closes. A series with no losses reads
/// 100, one with no movement at all reads 50. `ta`'s RSI smooths with
/// 2 / (n + 1) instead, so this one is computed here.
pub fn wilder_rsi(closes: &[f64], period: usize) -> Option<f64> {
    if closes.len() < 2 || period == 0 {
        return None;
    }

    let alpha = 1.0 / period as f64;
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for w in closes.windows(2) {
        let delta = w[1] - w[0];
        avg_gain = alpha * delta.max(0.0) + (1.0 - alpha) * avg_gain;
        avg_loss = alpha * (-delta).max(0.0) + (1.0 - alpha) * avg_loss;
    }

    if avg_loss == 0.0 {
        return Some(if avg_gain == 0.0 { 50.0 } else { 100.0 });
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn bars(closes: &[f64]) -> Vec<PriceBar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceBar {
                timestamp: start + Duration::days(i as i64),
                open: c,
                high: c * 1.01,
                low: c * 0.99,
                close: c,
                volume: 1_000_000.0 + i as f64,
                synthetic: false,
            })
            .collect()
    }

    #[test]
    fn test_latest_quote_change() {
        let data = PriceData::from_history(bars(&[100.0, 110.0]));
        assert_eq!(data.latest.current, 110.0);
        assert_eq!(data.latest.prev_close, 100.0);
        assert!((data.latest.change - 10.0).abs() < 1e-9);
        assert!((data.latest.change_pct - 10.0).abs() < 1e-9);
        assert!(!data.latest.has_sufficient_data);
    }

    #[test]
    fn test_single_bar_has_no_change() {
        let data = PriceData::from_history(bars(&[42.0]));
        assert_eq!(data.latest.prev_close, 42.0);
        assert_eq!(data.latest.change_pct, 0.0);
    }

    #[test]
    fn test_stats_and_fallbacks() {
        let closes: Vec<f64> = (1..=30).map(f64::from).collect();
        let data = PriceData::from_history(bars(&closes));

        assert_eq!(data.stats.max, 30.0);
        assert_eq!(data.stats.min, 1.0);
        assert_eq!(data.stats.current_vs_high, 0.0);
        assert_eq!(data.stats.data_points, 30);
        // MA20 of 11..=30
        assert!((data.technicals.ma20 - 20.5).abs() < 1e-9);
        // not enough bars for MA50, falls back to price
        assert_eq!(data.technicals.ma50, 30.0);
        assert_eq!(data.technicals.price_vs_ma50, 0.0);
        assert!(data.technicals.can_calculate);
        assert!(data.latest.has_sufficient_data);
    }

    #[test]
    fn test_current_vs_high_negative_after_drop() {
        let data = PriceData::from_history(bars(&[100.0, 120.0, 90.0]));
        assert!((data.stats.current_vs_high - (-25.0)).abs() < 1e-9);
    }

    #[test]
    fn test_wilder_rsi_extremes() {
        let rising: Vec<f64> = (1..=30).map(f64::from).collect();
        assert_eq!(wilder_rsi(&rising, 14), Some(100.0));

        let flat = vec![10.0; 30];
        assert_eq!(wilder_rsi(&flat, 14), Some(50.0));

        let falling: Vec<f64> = (1..=30).rev().map(f64::from).collect();
        assert!(wilder_rsi(&falling, 14).unwrap() < 1.0);

        assert_eq!(wilder_rsi(&[1.0], 14), None);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), 0.0);
        assert!((mean(&[1.0, 2.0, 3.0, 4.0]) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_sample_std() {
        assert_eq!(sample_std(&[]), 0.0);
        assert_eq!(sample_std(&[5.0]), 0.0);
        assert!((sample_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]) - 2.138_089_935).abs() < 1e-6);
    }
}
