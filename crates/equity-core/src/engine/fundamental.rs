//! Fundamental scoring against an industry's thresholds

use super::result::{FundamentalRating, FundamentalScore};
use crate::data::MarketSnapshot;
use crate::industry::IndustryProfile;
use std::collections::BTreeMap;

/// Debt/equity assumed when the provider reports none
const MISSING_DEBT_RATIO: f64 = 10.0;

/// P/E strictly below this (and positive) earns a point
const REASONABLE_PE: f64 = 25.0;

/// Score growth, profitability, leverage, cash flow and valuation (max 8).
///
/// Missing values count against the company: growth, margin, cash flow and
/// P/E default to zero and debt/equity to 10.
pub fn score_fundamentals(snapshot: &MarketSnapshot, profile: &IndustryProfile) -> FundamentalScore {
    let rules = &profile.rules;
    let fundamentals = &snapshot.fundamentals;

    let revenue_growth = fundamentals.revenue_growth.unwrap_or(0.0);
    let operating_margin = fundamentals.operating_margin.unwrap_or(0.0);
    let debt_ratio = fundamentals.debt_to_equity.unwrap_or(MISSING_DEBT_RATIO);
    let fcf = fundamentals.free_cash_flow.unwrap_or(0.0);
    let pe = snapshot.valuation.trailing_pe.unwrap_or(0.0);

    let mut score = 0;
    let mut reasons = Vec::new();

    let growth = rules.growth;
    if revenue_growth >= growth.excellent {
        score += 2;
        reasons.push(format!("Strong revenue growth: {revenue_growth:.1}%"));
    } else if revenue_growth >= growth.good {
        score += 1;
        reasons.push(format!("Steady revenue growth: {revenue_growth:.1}%"));
    } else if revenue_growth >= growth.fair {
        reasons.push(format!("Modest revenue growth: {revenue_growth:.1}%"));
    } else {
        reasons.push(format!("Weak revenue growth: {revenue_growth:.1}%"));
    }

    let margin = rules.profitability;
    if operating_margin >= margin.excellent {
        score += 2;
        reasons.push(format!("Excellent operating margin: {operating_margin:.1}%"));
    } else if operating_margin >= margin.good {
        score += 1;
        reasons.push(format!("Healthy operating margin: {operating_margin:.1}%"));
    } else if operating_margin >= margin.fair {
        reasons.push(format!("Average operating margin: {operating_margin:.1}%"));
    } else {
        reasons.push(format!("Low operating margin: {operating_margin:.1}%"));
    }

    if debt_ratio < rules.debt_safe * 0.5 {
        score += 2;
        reasons.push(format!("Very low leverage: {debt_ratio:.2}"));
    } else if debt_ratio < rules.debt_safe {
        score += 1;
        reasons.push(format!("Moderate leverage: {debt_ratio:.2}"));
    } else {
        reasons.push(format!("High leverage: {debt_ratio:.2}"));
    }

    if fcf > 0.0 {
        score += 1;
        reasons.push("Positive free cash flow".to_string());
    }

    if pe > 0.0 && pe < REASONABLE_PE {
        score += 1;
        reasons.push(format!("Reasonable P/E: {pe:.1}"));
    } else if pe >= rules.pe_warning {
        reasons.push(format!("Elevated P/E: {pe:.1}"));
    }

    let metrics = BTreeMap::from([
        ("revenue_growth".to_string(), revenue_growth),
        ("operating_margin".to_string(), operating_margin),
        ("debt_to_equity".to_string(), debt_ratio),
        ("free_cashflow".to_string(), fcf),
        ("pe_ratio".to_string(), pe),
    ]);

    FundamentalScore {
        score,
        max_score: FundamentalScore::MAX,
        rating: FundamentalRating::from_score(score),
        reasons,
        metrics,
    }
}
