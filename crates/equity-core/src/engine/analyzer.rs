//! Industry analyzer: indicators, both scores, signal and risks in one pass

use super::fundamental::score_fundamentals;
use super::result::AnalysisResult;
use super::risk::assess_risks;
use super::signal::generate_signal;
use super::technical::score_technicals;
use crate::data::{DataQuality, MarketSnapshot};
use crate::error::Result;
use crate::industry::{Industry, IndustryProfile, profile};
use crate::technical::IndicatorCalculator;
use chrono::Utc;

/// Scores snapshots against one industry's profile
pub struct IndustryAnalyzer {
    industry: Industry,
    profile: &'static IndustryProfile,
    calculator: IndicatorCalculator,
}

impl IndustryAnalyzer {
    pub fn new(industry: Industry) -> Self {
        Self {
            industry,
            profile: profile(industry),
            calculator: IndicatorCalculator::new(),
        }
    }

    pub fn industry(&self) -> Industry {
        self.industry
    }

    pub fn profile(&self) -> &'static IndustryProfile {
        self.profile
    }

    /// Run the full analysis on a snapshot.
    ///
    /// Indicators are computed first so the technical score can use the
    /// momentum block.
    pub fn analyze(&self, snapshot: &MarketSnapshot) -> Result<AnalysisResult> {
        let indicators = self
            .calculator
            .compute(snapshot.bars(), snapshot.company.is_financial)?;

        let fundamentals = score_fundamentals(snapshot, self.profile);
        let technicals = score_technicals(snapshot, &indicators);
        let signal = generate_signal(&fundamentals, &technicals, self.profile, snapshot);
        let risks = assess_risks(snapshot, self.profile);

        tracing::info!(
            symbol = %snapshot.symbol,
            industry = %self.industry,
            fundamental = fundamentals.score,
            technical = technicals.score,
            recommendation = %signal.recommendation,
            "Analysis complete"
        );

        let mut result = AnalysisResult {
            symbol: snapshot.symbol.clone(),
            industry: self.industry,
            profile_name: self.industry.display_name().to_string(),
            fundamentals,
            technicals,
            indicators,
            signal,
            risks,
            data_quality: snapshot.data_quality,
            warnings: Vec::new(),
            timestamp: Utc::now(),
        };

        if !self.industry.has_dedicated_profile() {
            result.add_warning(format!(
                "No dedicated profile for {}, using {} thresholds",
                self.industry.display_name(),
                self.profile.industry.display_name()
            ));
        }
        if let Some(error) = &snapshot.error {
            result.add_warning(error.clone());
        }
        if snapshot.data_quality != DataQuality::Full {
            result.add_warning(format!("Data quality: {}", snapshot.data_quality.label()));
        }
        if snapshot.has_simulated_data() {
            result.add_warning(format!(
                "{} of {} price bars are simulated",
                snapshot.synthetic_bars,
                snapshot.bars().len()
            ));
        }
        if let Some(note) = &result.indicators.signals.note {
            let note = note.clone();
            result.add_warning(note);
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures;
    use crate::engine::Recommendation;
    use crate::technical::IndicatorMode;

    #[test]
    fn test_analyze_combines_scores() {
        let mut snapshot = fixtures::snapshot("MSFT", &fixtures::ramp(200.0, 120.0, 60));
        snapshot.fundamentals.revenue_growth = Some(25.0);
        snapshot.fundamentals.operating_margin = Some(35.0);
        snapshot.fundamentals.debt_to_equity = Some(0.2);
        snapshot.fundamentals.free_cash_flow = Some(5e9);
        snapshot.valuation.trailing_pe = Some(22.0);

        let result = IndustryAnalyzer::new(Industry::Software)
            .analyze(&snapshot)
            .unwrap();

        assert_eq!(result.fundamentals.score, 8);
        assert_eq!(result.technicals.score, 4.0);
        assert_eq!(result.combined_score(), 12.0);
        assert_eq!(result.max_combined_score(), 14.0);
        assert_eq!(result.signal.recommendation, Recommendation::ConsiderBuying);
        assert_eq!(result.indicators.mode, IndicatorMode::Full);
        assert_eq!(result.profile_name, "Software / Technology");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_borrowed_profile_and_simulated_data_warn() {
        let mut snapshot = fixtures::snapshot("NEE", &fixtures::ramp(60.0, 66.0, 60));
        snapshot.synthetic_bars = 40;
        snapshot.data_quality = DataQuality::Partial;

        let result = IndustryAnalyzer::new(Industry::Utilities)
            .analyze(&snapshot)
            .unwrap();

        assert_eq!(result.industry, Industry::Utilities);
        assert!(result.warnings.iter().any(|w| w.starts_with("No dedicated profile")));
        assert!(result.warnings.iter().any(|w| w == "40 of 60 price bars are simulated"));
        assert_eq!(
            result.risks.last().map(String::as_str),
            Some("Technical analysis partly based on simulated data")
        );
    }

    #[test]
    fn test_financial_indicator_note_is_surfaced() {
        let mut snapshot = fixtures::snapshot("JPM", &fixtures::ramp(150.0, 180.0, 60));
        snapshot.company.is_financial = true;

        let result = IndustryAnalyzer::new(Industry::Financial)
            .analyze(&snapshot)
            .unwrap();

        assert!(result.warnings.iter().any(|w| w.contains("financial stocks")));
    }
}
