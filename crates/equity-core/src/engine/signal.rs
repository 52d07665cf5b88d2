//! Recommendation synthesis from the two dimension scores

use super::result::{FundamentalScore, Recommendation, Signal, TechnicalScore};
use crate::data::MarketSnapshot;
use crate::industry::{Industry, IndustryProfile};

/// P/B assumed for a financial name with no reported book multiple
const MISSING_PRICE_TO_BOOK: f64 = 10.0;

/// Turn the two scores into a recommendation using the industry's rule table.
///
/// Energy leans on technicals, financials on fundamentals plus P/B, and every
/// other industry uses the default table, checked top to bottom.
pub fn generate_signal(
    fundamentals: &FundamentalScore,
    technicals: &TechnicalScore,
    profile: &IndustryProfile,
    snapshot: &MarketSnapshot,
) -> Signal {
    let f = fundamentals.ratio();
    let t = technicals.ratio();

    if technicals.is_insufficient() {
        let (recommendation, confidence) = if f >= 0.7 {
            (Recommendation::FundamentalsSolidLimitedData, 3.0)
        } else if f >= 0.4 {
            (Recommendation::WatchLimitedData, 2.5)
        } else {
            (Recommendation::CautiousLimitedData, 2.0)
        };
        return Signal {
            recommendation,
            confidence,
            reasoning: format!(
                "Fundamental score {}/{}, technical data insufficient",
                fundamentals.score, fundamentals.max_score
            ),
        };
    }

    let (recommendation, confidence) = match profile.industry {
        Industry::Energy => energy_rules(f, t),
        Industry::Financial => {
            let pb = snapshot
                .valuation
                .price_to_book
                .unwrap_or(MISSING_PRICE_TO_BOOK);
            financial_rules(f, pb)
        }
        _ => default_rules(f, t),
    };

    Signal {
        recommendation,
        confidence,
        reasoning: format!(
            "Fundamental score {}/{} ({:.1}%), technical score {}/{} ({:.1}%)",
            fundamentals.score,
            fundamentals.max_score,
            f * 100.0,
            technicals.score,
            technicals.max_score,
            t * 100.0
        ),
    }
}

fn energy_rules(f: f64, t: f64) -> (Recommendation, f64) {
    if f >= 0.6 && t >= 0.7 {
        (Recommendation::ConsiderAllocation, 4.0)
    } else if t >= 0.8 {
        (Recommendation::TechnicalOpportunity, 3.5)
    } else {
        (Recommendation::Watch, 2.5)
    }
}

fn financial_rules(f: f64, price_to_book: f64) -> (Recommendation, f64) {
    if f >= 0.7 && price_to_book < 2.0 {
        (Recommendation::AttractiveValuation, 4.0)
    } else {
        (Recommendation::Cautious, 3.0)
    }
}

fn default_rules(f: f64, t: f64) -> (Recommendation, f64) {
    if f >= 0.6 && t >= 0.6 {
        (Recommendation::ConsiderBuying, 4.0)
    } else if f >= 0.4 && t >= 0.7 {
        (Recommendation::TechnicalOpportunity, 3.5)
    } else if t >= 0.8 {
        (Recommendation::OversoldRebound, 3.0)
    } else if t >= 0.6 && f >= 0.3 {
        (Recommendation::WatchBullish, 2.8)
    } else if f >= 0.5 && t >= 0.3 {
        (Recommendation::FundamentalSupport, 2.8)
    } else {
        (Recommendation::Watch, 2.5)
    }
}
