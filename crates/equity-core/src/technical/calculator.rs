//! Trend, momentum and volatility indicators over a price history

use super::series::{sma_series, volatility_at};
use crate::data::PriceBar;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ta::Next;
use ta::indicators::{
    AverageTrueRange, BollingerBands, FastStochastic, MovingAverageConvergenceDivergence,
    RelativeStrengthIndex,
};

/// Below this many bars only basic indicators are reported
pub const MIN_FULL_BARS: usize = 10;
const MIN_TREND_BARS: usize = 30;
const MIN_STRENGTH_BARS: usize = 50;
const MIN_MOMENTUM_BARS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorMode {
    /// Too little history; defaults stand in for most values
    Basic,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacdSignal {
    Bullish,
    Bearish,
    Neutral,
}

impl MacdSignal {
    pub fn label(self) -> &'static str {
        match self {
            Self::Bullish => "bullish",
            Self::Bearish => "bearish",
            Self::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendStrength {
    Rising,
    Falling,
    Sideways,
    Moderate,
    InsufficientData,
}

impl TrendStrength {
    pub fn label(self) -> &'static str {
        match self {
            Self::Rising => "short-term uptrend",
            Self::Falling => "short-term downtrend",
            Self::Sideways => "sideways",
            Self::Moderate => "moderate",
            Self::InsufficientData => "insufficient data",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalBias {
    Bullish,
    Bearish,
    Neutral,
}

impl SignalBias {
    pub fn label(self) -> &'static str {
        match self {
            Self::Bullish => "bullish",
            Self::Bearish => "bearish",
            Self::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendIndicators {
    pub macd_signal: MacdSignal,
    /// Where the close sits inside the Bollinger band, 0 = lower, 1 = upper
    pub bb_position: f64,
    pub ma_cross: Vec<String>,
    pub trend_strength: TrendStrength,
}

impl TrendIndicators {
    /// `upper`, `lower` or `middle` third of the band
    pub fn band_zone(&self) -> &'static str {
        if self.bb_position > 0.8 {
            "upper"
        } else if self.bb_position < 0.2 {
            "lower"
        } else {
            "middle"
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentumIndicators {
    pub rsi_14: f64,
    pub stoch_k: f64,
    pub oversold: bool,
    pub overbought: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolatilityIndicators {
    /// ATR(14) as a percent of the close
    pub atr_percent: f64,
    /// Annualized, percent
    pub volatility_20d: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalSignals {
    pub signals: Vec<String>,
    pub overall: SignalBias,
    pub score: f64,
    /// 0-100
    pub confidence: f64,
    pub note: Option<String>,
}

/// Everything the calculator derives from one history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalIndicators {
    pub mode: IndicatorMode,
    pub current_price: f64,
    /// MA5/MA10/MA20 where enough bars exist
    pub moving_averages: BTreeMap<String, f64>,
    pub trend: TrendIndicators,
    pub momentum: MomentumIndicators,
    pub volatility: VolatilityIndicators,
    pub signals: TechnicalSignals,
}

/// Stateless indicator calculator
#[derive(Debug, Clone, Copy, Default)]
pub struct IndicatorCalculator;

impl IndicatorCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Compute all indicator blocks for `bars` (oldest first).
    ///
    /// Financial names get damped signal confidence, since their prices
    /// follow rates and credit more than chart patterns.
    pub fn compute(&self, bars: &[PriceBar], is_financial: bool) -> Result<TechnicalIndicators> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let current_price = closes.last().copied().unwrap_or(0.0);
        let moving_averages = short_moving_averages(&closes);

        if bars.len() < MIN_FULL_BARS {
            tracing::debug!(bars = bars.len(), "Too few bars, using basic indicators");
            return Ok(basic_indicators(current_price, moving_averages));
        }

        let trend = trend_indicators(&closes)?;
        let momentum = momentum_indicators(bars)?;
        let volatility = volatility_indicators(bars)?;
        let mut signals = generate_signals(&trend, &momentum);

        if is_financial {
            signals.note =
                Some("Technical signals carry less weight for financial stocks".to_string());
            signals.confidence = (signals.confidence * 0.7).max(20.0);
        }

        Ok(TechnicalIndicators {
            mode: IndicatorMode::Full,
            current_price,
            moving_averages,
            trend,
            momentum,
            volatility,
            signals,
        })
    }
}

fn short_moving_averages(closes: &[f64]) -> BTreeMap<String, f64> {
    [5, 10, 20]
        .into_iter()
        .filter(|&period| closes.len() >= period)
        .map(|period| {
            let window = &closes[closes.len() - period..];
            (format!("ma{period}"), window.iter().sum::<f64>() / period as f64)
        })
        .collect()
}

fn basic_indicators(current_price: f64, moving_averages: BTreeMap<String, f64>) -> TechnicalIndicators {
    TechnicalIndicators {
        mode: IndicatorMode::Basic,
        current_price,
        moving_averages,
        trend: TrendIndicators {
            macd_signal: MacdSignal::Neutral,
            bb_position: 0.5,
            ma_cross: vec!["based on basic data".to_string()],
            trend_strength: TrendStrength::Moderate,
        },
        momentum: MomentumIndicators {
            rsi_14: 50.0,
            stoch_k: 50.0,
            oversold: false,
            overbought: false,
        },
        volatility: VolatilityIndicators {
            atr_percent: 2.0,
            volatility_20d: 20.0,
        },
        signals: TechnicalSignals {
            signals: vec!["Using basic technical indicators".to_string()],
            overall: SignalBias::Neutral,
            score: 0.0,
            confidence: 40.0,
            note: None,
        },
    }
}

fn trend_indicators(closes: &[f64]) -> Result<TrendIndicators> {
    let n = closes.len();
    if n < MIN_TREND_BARS {
        return Ok(TrendIndicators {
            macd_signal: MacdSignal::Neutral,
            bb_position: 0.5,
            ma_cross: vec!["insufficient data".to_string()],
            trend_strength: TrendStrength::InsufficientData,
        });
    }

    let mut macd = MovingAverageConvergenceDivergence::new(12, 26, 9)?;
    let mut bands = BollingerBands::new(20, 2.0)?;
    let (mut macd_out, mut band_out) = (None, None);
    for &close in closes {
        macd_out = Some(macd.next(close));
        band_out = Some(bands.next(close));
    }

    let macd_signal = match macd_out {
        Some(out) if out.macd > out.signal => MacdSignal::Bullish,
        Some(_) => MacdSignal::Bearish,
        None => MacdSignal::Neutral,
    };

    let current = closes[n - 1];
    let bb_position = match band_out {
        Some(out) if out.upper > out.lower => (current - out.lower) / (out.upper - out.lower),
        _ => 0.5,
    };

    let ma20 = sma_series(closes, 20)?;
    let crossed_up = closes[n - 2] <= ma20[n - 2] && current > ma20[n - 1];
    let ma_cross = vec![if crossed_up {
        "price crossed above MA20".to_string()
    } else {
        "no significant cross".to_string()
    }];

    let trend_strength = if n < MIN_STRENGTH_BARS {
        TrendStrength::InsufficientData
    } else {
        let base = closes[n - 20];
        let change = if base > 0.0 { (current / base - 1.0) * 100.0 } else { 0.0 };
        if change > 5.0 {
            TrendStrength::Rising
        } else if change < -5.0 {
            TrendStrength::Falling
        } else {
            TrendStrength::Sideways
        }
    };

    Ok(TrendIndicators {
        macd_signal,
        bb_position,
        ma_cross,
        trend_strength,
    })
}

fn momentum_indicators(bars: &[PriceBar]) -> Result<MomentumIndicators> {
    if bars.len() < MIN_MOMENTUM_BARS {
        return Ok(MomentumIndicators {
            rsi_14: 50.0,
            stoch_k: 50.0,
            oversold: false,
            overbought: false,
        });
    }

    let mut rsi = RelativeStrengthIndex::new(14)?;
    let mut stoch = FastStochastic::new(14)?;
    let (mut rsi_14, mut stoch_k) = (50.0, 50.0);
    for bar in bars {
        rsi_14 = rsi.next(bar.close);
        stoch_k = stoch.next(bar);
    }
    if !rsi_14.is_finite() {
        rsi_14 = 50.0;
    }
    if !stoch_k.is_finite() {
        stoch_k = 50.0;
    }

    Ok(MomentumIndicators {
        rsi_14,
        stoch_k,
        oversold: rsi_14 < 30.0 || stoch_k < 20.0,
        overbought: rsi_14 > 70.0 || stoch_k > 80.0,
    })
}

fn volatility_indicators(bars: &[PriceBar]) -> Result<VolatilityIndicators> {
    if bars.len() < MIN_MOMENTUM_BARS {
        return Ok(VolatilityIndicators {
            atr_percent: 0.0,
            volatility_20d: 0.0,
        });
    }

    let mut atr = AverageTrueRange::new(14)?;
    let mut last_atr = 0.0;
    for bar in bars {
        last_atr = atr.next(bar);
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let current = closes[closes.len() - 1];
    let atr_percent = if current > 0.0 { last_atr / current * 100.0 } else { 0.0 };
    let volatility_20d = volatility_at(&closes, closes.len() - 1, 20).unwrap_or(0.0) * 100.0;

    Ok(VolatilityIndicators {
        atr_percent,
        volatility_20d,
    })
}

fn generate_signals(trend: &TrendIndicators, momentum: &MomentumIndicators) -> TechnicalSignals {
    let mut signals = Vec::new();
    let mut score = 0.0;

    if momentum.rsi_14 < 30.0 {
        signals.push("RSI oversold".to_string());
        score += 1.0;
    } else if momentum.rsi_14 > 70.0 {
        signals.push("RSI overbought".to_string());
        score -= 1.0;
    }

    match trend.trend_strength {
        TrendStrength::Rising => score += 0.5,
        TrendStrength::Falling => score -= 0.5,
        _ => {}
    }

    let overall = if score >= 1.0 {
        SignalBias::Bullish
    } else if score <= -1.0 {
        SignalBias::Bearish
    } else {
        SignalBias::Neutral
    };

    TechnicalSignals {
        signals,
        overall,
        score,
        confidence: (f64::abs(score) * 30.0).min(80.0),
        note: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn bars_from(closes: &[f64]) -> Vec<PriceBar> {
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
                volume: 1_000_000.0,
                synthetic: false,
            })
            .collect()
    }

    #[test]
    fn test_basic_mode_below_ten_bars() {
        let bars = bars_from(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0]);
        let ind = IndicatorCalculator::new().compute(&bars, true).unwrap();

        assert_eq!(ind.mode, IndicatorMode::Basic);
        assert_eq!(ind.current_price, 15.0);
        assert!((ind.moving_averages["ma5"] - 13.0).abs() < 1e-9);
        assert!(!ind.moving_averages.contains_key("ma10"));
        assert_eq!(ind.signals.confidence, 40.0);
        assert!(ind.signals.note.is_none());
    }

    #[test]
    fn test_short_history_defaults() {
        let closes: Vec<f64> = (0..15).map(|i| 50.0 + i as f64).collect();
        let ind = IndicatorCalculator::new().compute(&bars_from(&closes), false).unwrap();

        assert_eq!(ind.mode, IndicatorMode::Full);
        assert_eq!(ind.trend.trend_strength, TrendStrength::InsufficientData);
        assert_eq!(ind.momentum.rsi_14, 50.0);
        assert_eq!(ind.volatility.atr_percent, 0.0);
        assert_eq!(ind.signals.overall, SignalBias::Neutral);
    }

    #[test]
    fn test_steady_uptrend_is_overbought_and_rising() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        let ind = IndicatorCalculator::new().compute(&bars_from(&closes), false).unwrap();

        assert_eq!(ind.trend.trend_strength, TrendStrength::Rising);
        assert_eq!(ind.trend.macd_signal, MacdSignal::Bullish);
        assert!(ind.momentum.overbought);
        assert!(ind.momentum.rsi_14 > 70.0);
        // RSI -1, trend +0.5
        assert!((ind.signals.score + 0.5).abs() < 1e-9);
        assert_eq!(ind.signals.overall, SignalBias::Neutral);
        assert!((ind.signals.confidence - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_downtrend_is_bearish_and_financial_damped() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 * 0.99_f64.powi(i)).collect();
        let calc = IndicatorCalculator::new();

        let plain = calc.compute(&bars_from(&closes), false).unwrap();
        assert_eq!(plain.trend.trend_strength, TrendStrength::Falling);
        assert!(plain.momentum.oversold);
        // RSI +1, trend -0.5
        assert!((plain.signals.score - 0.5).abs() < 1e-9);

        let financial = calc.compute(&bars_from(&closes), true).unwrap();
        assert_eq!(financial.signals.confidence, 20.0);
        assert!(financial.signals.note.is_some());
    }

    #[test]
    fn test_signal_confidence_cap() {
        let trend = TrendIndicators {
            macd_signal: MacdSignal::Bullish,
            bb_position: 0.1,
            ma_cross: Vec::new(),
            trend_strength: TrendStrength::Rising,
        };
        let momentum = MomentumIndicators {
            rsi_14: 25.0,
            stoch_k: 10.0,
            oversold: true,
            overbought: false,
        };
        let signals = generate_signals(&trend, &momentum);
        assert_eq!(signals.overall, SignalBias::Bullish);
        assert!((signals.confidence - 45.0).abs() < 1e-9);
        assert_eq!(signals.signals, vec!["RSI oversold".to_string()]);
    }
}
