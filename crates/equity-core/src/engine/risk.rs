//! Company and industry risk flags

use crate::data::{DataQuality, MarketSnapshot};
use crate::industry::IndustryProfile;

/// Risks listed in the result, most general first
pub const MAX_RISKS: usize = 3;

/// Collect up to [`MAX_RISKS`] risk statements.
///
/// The first two industry risk factors always lead, so company-specific flags
/// only surface when the profile lists fewer.
pub fn assess_risks(snapshot: &MarketSnapshot, profile: &IndustryProfile) -> Vec<String> {
    let rules = &profile.rules;
    let mut risks: Vec<String> = profile
        .risk_factors
        .iter()
        .take(2)
        .map(|r| (*r).to_string())
        .collect();

    let debt = snapshot.fundamentals.debt_to_equity;
    if let Some(debt) = debt.filter(|d| *d > rules.debt_warning) {
        risks.push(format!("High leverage risk (debt/equity: {debt:.2})"));
    }

    let pe = snapshot.valuation.trailing_pe;
    if let Some(pe) = pe.filter(|pe| *pe > rules.pe_warning) {
        risks.push(format!("High valuation risk (P/E: {pe:.1})"));
    }

    if snapshot.fundamentals.revenue_growth.is_some_and(|g| g < 0.0) {
        risks.push("Negative revenue growth".to_string());
    }

    if snapshot.data_quality != DataQuality::Full || snapshot.has_simulated_data() {
        risks.push("Technical analysis partly based on simulated data".to_string());
    }

    risks.truncate(MAX_RISKS);
    risks
}
