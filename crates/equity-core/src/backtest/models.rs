use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
}

/// One simulated fill at the bar's close
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub timestamp: DateTime<Utc>,
    pub action: TradeAction,
    pub price: f64,
    pub shares: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub equity: f64,
}

/// Outcome of a backtest run. Percentages are expressed as 0-100.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    pub strategy: String,
    pub bars_used: usize,
    pub initial_capital: f64,
    pub final_equity: f64,
    pub total_return_pct: f64,
    pub annualized_return_pct: f64,
    pub max_drawdown_pct: f64,
    pub sharpe_ratio: f64,
    pub win_rate_pct: f64,
    pub total_trades: usize,
    pub buy_hold_return_pct: f64,
    pub outperformance_pct: f64,
    /// Most recent trades only
    pub trades: Vec<Trade>,
    /// Most recent equity points only
    pub equity_curve: Vec<EquityPoint>,
}
