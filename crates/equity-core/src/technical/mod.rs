//! Technical indicator calculation on top of the `ta` crate

mod calculator;
pub mod series;

pub use calculator::{
    IndicatorCalculator, IndicatorMode, MIN_FULL_BARS, MacdSignal, MomentumIndicators,
    SignalBias, TechnicalIndicators, TechnicalSignals, TrendIndicators, TrendStrength,
    VolatilityIndicators,
};
pub use series::{ChartPoint, chart_series, ema_series, sma_series};
