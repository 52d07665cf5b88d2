//! Market data types shared by the fetcher, the engine and the report

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One daily OHLCV bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// True when the bar was generated rather than fetched
    #[serde(default)]
    pub synthetic: bool,
}

impl ta::Open for PriceBar {
    fn open(&self) -> f64 {
        self.open
    }
}

impl ta::High for PriceBar {
    fn high(&self) -> f64 {
        self.high
    }
}

impl ta::Low for PriceBar {
    fn low(&self) -> f64 {
        self.low
    }
}

impl ta::Close for PriceBar {
    fn close(&self) -> f64 {
        self.close
    }
}

impl ta::Volume for PriceBar {
    fn volume(&self) -> f64 {
        self.volume
    }
}

/// Raw company and fundamental fields as reported by a provider.
///
/// Ratios such as margins and growth are fractions (0.25 == 25%), and
/// `debt_to_equity` is in percent, matching Yahoo's conventions. The fetcher
/// normalizes these into [`Fundamentals`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickerInfo {
    pub name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub currency: Option<String>,
    pub regular_market_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub forward_pe: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub price_to_sales: Option<f64>,
    pub price_to_book: Option<f64>,
    pub book_value: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub payout_ratio: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub earnings_growth: Option<f64>,
    pub gross_margins: Option<f64>,
    pub operating_margins: Option<f64>,
    pub profit_margins: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub return_on_assets: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub current_ratio: Option<f64>,
    pub free_cashflow: Option<f64>,
    pub recommendation_key: Option<String>,
    pub target_mean_price: Option<f64>,
    pub target_high_price: Option<f64>,
    pub target_low_price: Option<f64>,
    pub analyst_count: Option<u32>,
}

macro_rules! fill_missing {
    ($self:ident, $other:ident, $($field:ident),+ $(,)?) => {
        $(
            if $self.$field.is_none() {
                $self.$field = $other.$field;
            }
        )+
    };
}

impl TickerInfo {
    /// Fill every empty field from `other`, keeping values already present.
    pub fn merge_missing(&mut self, other: TickerInfo) {
        fill_missing!(
            self,
            other,
            name,
            sector,
            industry,
            currency,
            regular_market_price,
            market_cap,
            trailing_pe,
            forward_pe,
            peg_ratio,
            price_to_sales,
            price_to_book,
            book_value,
            dividend_yield,
            payout_ratio,
            revenue_growth,
            earnings_growth,
            gross_margins,
            operating_margins,
            profit_margins,
            return_on_equity,
            return_on_assets,
            debt_to_equity,
            current_ratio,
            free_cashflow,
            recommendation_key,
            target_mean_price,
            target_high_price,
            target_low_price,
            analyst_count,
        );
    }
}

/// Identity of the analyzed company
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub symbol: String,
    pub name: String,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub currency: String,
    pub is_financial: bool,
}

/// Normalized fundamentals; growth, margins and returns are in percent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fundamentals {
    pub market_cap: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub earnings_growth: Option<f64>,
    pub gross_margin: Option<f64>,
    pub operating_margin: Option<f64>,
    pub profit_margin: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub return_on_assets: Option<f64>,
    /// Debt/equity as a ratio (1.0 == debt equals equity)
    pub debt_to_equity: Option<f64>,
    pub current_ratio: Option<f64>,
    pub free_cash_flow: Option<f64>,
    pub dividend_yield: Option<f64>,
}

/// Price-to-book verdict for financial names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Attractiveness {
    Attractive,
    Fair,
    Expensive,
}

impl Attractiveness {
    pub fn from_price_to_book(pb: f64) -> Self {
        if pb < 1.5 {
            Self::Attractive
        } else if pb < 2.5 {
            Self::Fair
        } else {
            Self::Expensive
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Attractive => "attractive",
            Self::Fair => "fair",
            Self::Expensive => "expensive",
        }
    }
}

/// Valuation multiples
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Valuation {
    pub trailing_pe: Option<f64>,
    pub forward_pe: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub price_to_sales: Option<f64>,
    pub price_to_book: Option<f64>,
    pub attractiveness: Option<Attractiveness>,
}

/// Sell-side consensus
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalystView {
    pub recommendation: Option<String>,
    pub target_mean: Option<f64>,
    pub target_high: Option<f64>,
    pub target_low: Option<f64>,
    pub analyst_count: Option<u32>,
    /// Percent distance from the current price to the mean target
    pub upside_pct: Option<f64>,
}

/// Bank/insurer metrics (percent values where applicable)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialSectorMetrics {
    /// Approximated by the net profit margin
    pub net_interest_margin: Option<f64>,
    pub return_on_assets: Option<f64>,
    pub book_value_per_share: Option<f64>,
    pub price_to_book: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub payout_ratio: Option<f64>,
}

/// Most recent bar summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LatestQuote {
    pub current: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    pub prev_close: f64,
    pub change: f64,
    pub change_pct: f64,
    pub has_sufficient_data: bool,
}

/// Descriptive statistics over the close series
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceStats {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    /// Percent below (negative) the period high
    pub current_vs_high: f64,
    pub avg_volume: f64,
    pub data_points: usize,
}

/// Lightweight indicators computed straight from the history
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BasicTechnicals {
    pub ma20: f64,
    pub ma50: f64,
    pub rsi: f64,
    pub price_vs_ma50: f64,
    pub can_calculate: bool,
}

/// History plus everything derived from it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceData {
    pub history: Vec<PriceBar>,
    pub latest: LatestQuote,
    pub stats: PriceStats,
    pub technicals: BasicTechnicals,
}

/// How much of a snapshot came from real upstream data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataQuality {
    Full,
    Partial,
    Minimal,
}

impl DataQuality {
    pub fn label(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Partial => "partial",
            Self::Minimal => "minimal",
        }
    }
}

/// Everything the fetcher knows about one ticker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub symbol: String,
    pub company: CompanyProfile,
    pub price: PriceData,
    pub fundamentals: Fundamentals,
    pub valuation: Valuation,
    pub analyst: AnalystView,
    pub financial_metrics: Option<FinancialSectorMetrics>,
    pub data_quality: DataQuality,
    /// Number of generated bars in `price.history`
    pub synthetic_bars: usize,
    /// Upstream failure that forced fallback data
    pub error: Option<String>,
    pub fetched_at: DateTime<Utc>,
    /// Set when the snapshot was served from a cache
    #[serde(default, skip_serializing)]
    pub from_cache: bool,
}

impl MarketSnapshot {
    pub fn current_price(&self) -> f64 {
        self.price.latest.current
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.price.history
    }

    pub fn real_bars(&self) -> usize {
        self.price.history.len().saturating_sub(self.synthetic_bars)
    }

    pub fn has_simulated_data(&self) -> bool {
        self.synthetic_bars > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_missing_keeps_existing() {
        let mut primary = TickerInfo {
            name: Some("Apple Inc.".to_string()),
            trailing_pe: Some(30.0),
            ..Default::default()
        };
        let secondary = TickerInfo {
            name: Some("APPLE INC".to_string()),
            trailing_pe: Some(31.0),
            peg_ratio: Some(2.1),
            analyst_count: Some(40),
            ..Default::default()
        };

        primary.merge_missing(secondary);

        assert_eq!(primary.name.as_deref(), Some("Apple Inc."));
        assert_eq!(primary.trailing_pe, Some(30.0));
        assert_eq!(primary.peg_ratio, Some(2.1));
        assert_eq!(primary.analyst_count, Some(40));
    }

    #[test]
    fn test_attractiveness_bands() {
        assert_eq!(Attractiveness::from_price_to_book(1.2), Attractiveness::Attractive);
        assert_eq!(Attractiveness::from_price_to_book(1.5), Attractiveness::Fair);
        assert_eq!(Attractiveness::from_price_to_book(2.5), Attractiveness::Expensive);
    }
}
