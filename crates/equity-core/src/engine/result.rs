//! Analysis result types

use crate::data::DataQuality;
use crate::industry::Industry;
use crate::technical::TechnicalIndicators;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundamentalRating {
    Excellent,
    Good,
    Fair,
    Weak,
}

impl FundamentalRating {
    pub fn from_score(score: u32) -> Self {
        match score {
            6.. => Self::Excellent,
            4..=5 => Self::Good,
            2..=3 => Self::Fair,
            _ => Self::Weak,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Weak => "Weak",
        }
    }
}

/// Fundamental score out of [`FundamentalScore::MAX`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundamentalScore {
    pub score: u32,
    pub max_score: u32,
    pub rating: FundamentalRating,
    pub reasons: Vec<String>,
    /// Values the score was computed from, after defaults were applied
    pub metrics: BTreeMap<String, f64>,
}

impl FundamentalScore {
    pub const MAX: u32 = 8;

    pub fn ratio(&self) -> f64 {
        if self.max_score == 0 {
            return 0.0;
        }
        f64::from(self.score) / f64::from(self.max_score)
    }

    pub fn metric(&self, name: &str) -> f64 {
        self.metrics.get(name).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechnicalRating {
    OversoldOpportunity,
    NeutralBullish,
    Neutral,
    NeutralBearish,
    Caution,
    InsufficientData,
}

impl TechnicalRating {
    pub fn from_score(score: f64) -> Self {
        if score >= 4.5 {
            Self::OversoldOpportunity
        } else if score >= 3.0 {
            Self::NeutralBullish
        } else if score >= 1.5 {
            Self::Neutral
        } else if score > 0.0 {
            Self::NeutralBearish
        } else {
            Self::Caution
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::OversoldOpportunity => "Oversold / opportunity",
            Self::NeutralBullish => "Neutral-bullish",
            Self::Neutral => "Neutral",
            Self::NeutralBearish => "Neutral-bearish",
            Self::Caution => "Caution",
            Self::InsufficientData => "Insufficient data",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataStatus {
    Sufficient,
    Insufficient,
}

/// Raw readings behind a technical score
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndicatorsUsed {
    pub rsi: f64,
    pub current_vs_high: f64,
    pub volume_ratio: f64,
}

/// Technical score in half points, clamped to `0..=MAX`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalScore {
    pub score: f64,
    pub max_score: f64,
    pub rating: TechnicalRating,
    pub reasons: Vec<String>,
    pub data_status: DataStatus,
    pub indicators_used: Option<IndicatorsUsed>,
}

impl TechnicalScore {
    pub const MAX: f64 = 6.0;

    pub fn insufficient() -> Self {
        Self {
            score: 0.0,
            max_score: Self::MAX,
            rating: TechnicalRating::InsufficientData,
            reasons: vec!["Not enough price data".to_string()],
            data_status: DataStatus::Insufficient,
            indicators_used: None,
        }
    }

    pub fn ratio(&self) -> f64 {
        if self.max_score <= 0.0 {
            return 0.0;
        }
        self.score / self.max_score
    }

    pub fn is_insufficient(&self) -> bool {
        self.data_status == DataStatus::Insufficient
    }
}

/// Which way a recommendation leans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stance {
    Positive,
    Neutral,
    Cautious,
}

impl Stance {
    pub fn marker(self) -> &'static str {
        match self {
            Self::Positive => "🟢",
            Self::Neutral => "🟡",
            Self::Cautious => "🔴",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    ConsiderBuying,
    ConsiderAllocation,
    AttractiveValuation,
    TechnicalOpportunity,
    OversoldRebound,
    WatchBullish,
    FundamentalSupport,
    Watch,
    Cautious,
    FundamentalsSolidLimitedData,
    WatchLimitedData,
    CautiousLimitedData,
}

impl Recommendation {
    pub fn label(self) -> &'static str {
        match self {
            Self::ConsiderBuying => "Consider buying",
            Self::ConsiderAllocation => "Consider allocation",
            Self::AttractiveValuation => "Attractive valuation",
            Self::TechnicalOpportunity => "Technical opportunity",
            Self::OversoldRebound => "Oversold rebound opportunity",
            Self::WatchBullish => "Watch (bullish bias)",
            Self::FundamentalSupport => "Fundamental support",
            Self::Watch => "Watch",
            Self::Cautious => "Cautious",
            Self::FundamentalsSolidLimitedData => "Fundamentals solid (limited technical data)",
            Self::WatchLimitedData => "Watch (limited technical data)",
            Self::CautiousLimitedData => "Cautious (limited technical data)",
        }
    }

    pub fn stance(self) -> Stance {
        match self {
            Self::ConsiderBuying
            | Self::ConsiderAllocation
            | Self::AttractiveValuation
            | Self::TechnicalOpportunity => Stance::Positive,
            Self::OversoldRebound
            | Self::WatchBullish
            | Self::FundamentalSupport
            | Self::Watch
            | Self::FundamentalsSolidLimitedData
            | Self::WatchLimitedData => Stance::Neutral,
            Self::Cautious | Self::CautiousLimitedData => Stance::Cautious,
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Recommendation with a 0-5 confidence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub recommendation: Recommendation,
    pub confidence: f64,
    pub reasoning: String,
}

/// Everything the engine concludes about one ticker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub symbol: String,
    pub industry: Industry,
    pub profile_name: String,
    pub fundamentals: FundamentalScore,
    pub technicals: TechnicalScore,
    pub indicators: TechnicalIndicators,
    pub signal: Signal,
    pub risks: Vec<String>,
    pub data_quality: DataQuality,
    pub warnings: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn combined_score(&self) -> f64 {
        f64::from(self.fundamentals.score) + self.technicals.score
    }

    pub fn max_combined_score(&self) -> f64 {
        f64::from(self.fundamentals.max_score) + self.technicals.max_score
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        let warning = warning.into();
        if !self.warnings.contains(&warning) {
            self.warnings.push(warning);
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} {} - {} ({:.1}/5.0) [{}]",
            self.signal.recommendation.stance().marker(),
            self.symbol,
            self.signal.recommendation,
            self.signal.confidence,
            self.timestamp.format("%Y-%m-%d %H:%M UTC")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fundamental_rating_bands() {
        assert_eq!(FundamentalRating::from_score(8), FundamentalRating::Excellent);
        assert_eq!(FundamentalRating::from_score(6), FundamentalRating::Excellent);
        assert_eq!(FundamentalRating::from_score(5), FundamentalRating::Good);
        assert_eq!(FundamentalRating::from_score(2), FundamentalRating::Fair);
        assert_eq!(FundamentalRating::from_score(1), FundamentalRating::Weak);
    }

    #[test]
    fn test_technical_rating_bands() {
        assert_eq!(TechnicalRating::from_score(4.5), TechnicalRating::OversoldOpportunity);
        assert_eq!(TechnicalRating::from_score(3.0), TechnicalRating::NeutralBullish);
        assert_eq!(TechnicalRating::from_score(1.5), TechnicalRating::Neutral);
        assert_eq!(TechnicalRating::from_score(0.5), TechnicalRating::NeutralBearish);
        assert_eq!(TechnicalRating::from_score(0.0), TechnicalRating::Caution);
    }

    #[test]
    fn test_stances() {
        assert_eq!(Recommendation::ConsiderBuying.stance(), Stance::Positive);
        assert_eq!(Recommendation::Watch.stance(), Stance::Neutral);
        assert_eq!(Recommendation::CautiousLimitedData.stance(), Stance::Cautious);
    }

    #[test]
    fn test_insufficient_technical_score() {
        let score = TechnicalScore::insufficient();
        assert!(score.is_insufficient());
        assert_eq!(score.ratio(), 0.0);
        assert_eq!(score.rating.label(), "Insufficient data");
    }
}
