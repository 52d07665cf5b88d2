//! Industry-aware scoring engine
//!
//! Fundamentals and technicals are scored independently against the
//! selected [`IndustryProfile`](crate::industry::IndustryProfile), then
//! combined into a [`Signal`] through industry-specific rule tables.

mod analyzer;
mod fundamental;
mod result;
mod risk;
mod signal;
mod technical;

pub use analyzer::IndustryAnalyzer;
pub use fundamental::score_fundamentals;
pub use result::{
    AnalysisResult, DataStatus, FundamentalRating, FundamentalScore, IndicatorsUsed,
    Recommendation, Signal, Stance, TechnicalRating, TechnicalScore,
};
pub use risk::{MAX_RISKS, assess_risks};
pub use signal::generate_signal;
pub use technical::score_technicals;
