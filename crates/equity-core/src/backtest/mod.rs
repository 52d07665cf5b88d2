//! Strategy backtesting over daily price history

mod dual_momentum;
pub mod metrics;
mod models;

pub use dual_momentum::{DualMomentumBacktester, DualMomentumParams, MIN_BACKTEST_BARS};
pub use models::{BacktestReport, EquityPoint, Trade, TradeAction};

use crate::data::PriceBar;
use crate::error::{ResearchError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    DualMomentum,
    MeanReversion,
    TrendFollowing,
}

impl Strategy {
    pub fn code(self) -> &'static str {
        match self {
            Self::DualMomentum => "dual_momentum",
            Self::MeanReversion => "mean_reversion",
            Self::TrendFollowing => "trend_following",
        }
    }

    pub fn all() -> [Strategy; 3] {
        [Self::DualMomentum, Self::MeanReversion, Self::TrendFollowing]
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Strategy {
    type Err = ResearchError;

    fn from_str(s: &str) -> Result<Self> {
        let code = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::all()
            .into_iter()
            .find(|strategy| strategy.code() == code)
            .ok_or_else(|| ResearchError::ConfigError(format!("unknown strategy: {s}")))
    }
}

/// Run `strategy` over `bars`. Only dual momentum has an implementation.
pub fn run_strategy(strategy: Strategy, bars: &[PriceBar], initial_capital: f64) -> Result<BacktestReport> {
    match strategy {
        Strategy::DualMomentum => DualMomentumBacktester::new().run(bars, initial_capital),
        other => Err(ResearchError::Other(format!(
            "strategy {other} is not supported yet"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{bars, ramp};

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("dual-momentum".parse::<Strategy>().unwrap(), Strategy::DualMomentum);
        assert_eq!("Mean_Reversion".parse::<Strategy>().unwrap(), Strategy::MeanReversion);
        assert!("breakout".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_only_dual_momentum_runs() {
        let history = bars(&ramp(100.0, 150.0, 120));
        assert!(run_strategy(Strategy::DualMomentum, &history, 1_000.0).is_ok());

        let err = run_strategy(Strategy::TrendFollowing, &history, 1_000.0).unwrap_err();
        assert_eq!(err.to_string(), "strategy trend_following is not supported yet");
    }
}
