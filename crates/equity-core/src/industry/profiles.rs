//! Static industry profiles

use super::Industry;
use serde::Serialize;

/// Three-tier threshold (values in percent)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdTiers {
    pub excellent: f64,
    pub good: f64,
    pub fair: f64,
}

impl ThresholdTiers {
    pub const fn new(excellent: f64, good: f64, fair: f64) -> Self {
        Self {
            excellent,
            good,
            fair,
        }
    }
}

/// Thresholds used by fundamental scoring
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FundamentalRules {
    /// Revenue growth tiers
    pub growth: ThresholdTiers,
    /// Operating margin tiers
    pub profitability: ThresholdTiers,
    /// Debt/equity below this is considered safe
    pub debt_safe: f64,
    /// Debt/equity above this is flagged as a risk
    pub debt_warning: f64,
    /// P/E at or above this is flagged
    pub pe_warning: f64,
    /// P/B above this is flagged (financials only)
    pub pb_warning: Option<f64>,
}

/// Scoring rules and qualitative metadata for one industry
#[derive(Debug, Clone, Serialize)]
pub struct IndustryProfile {
    pub industry: Industry,
    pub description: &'static str,
    pub rules: FundamentalRules,
    pub key_metrics: &'static [&'static str],
    pub risk_factors: &'static [&'static str],
    pub themes: &'static [&'static str],
    pub strength_factors: &'static [&'static str],
    pub notes: &'static [&'static str],
}

static SOFTWARE: IndustryProfile = IndustryProfile {
    industry: Industry::Software,
    description: "SaaS, enterprise software and consumer software",
    rules: FundamentalRules {
        growth: ThresholdTiers::new(20.0, 10.0, 5.0),
        profitability: ThresholdTiers::new(30.0, 20.0, 10.0),
        debt_safe: 0.5,
        debt_warning: 1.0,
        pe_warning: 40.0,
        pb_warning: None,
    },
    key_metrics: &[
        "Revenue growth",
        "Gross margin",
        "Free cash flow",
        "Customer retention",
    ],
    risk_factors: &[
        "Technology disruption",
        "Market competition",
        "User churn",
        "Data security",
    ],
    themes: &[],
    strength_factors: &[],
    notes: &[],
};

static ENERGY: IndustryProfile = IndustryProfile {
    industry: Industry::Energy,
    description: "Oil, natural gas and renewable energy",
    rules: FundamentalRules {
        growth: ThresholdTiers::new(15.0, 8.0, 3.0),
        profitability: ThresholdTiers::new(25.0, 15.0, 8.0),
        debt_safe: 0.7,
        debt_warning: 1.2,
        pe_warning: 30.0,
        pb_warning: None,
    },
    key_metrics: &[
        "Cash flow per share",
        "Reserve replacement ratio",
        "Production cost per barrel",
        "Dividend yield",
    ],
    risk_factors: &[
        "Oil price volatility",
        "Geopolitical risk",
        "Energy transition",
        "Environmental regulation",
    ],
    themes: &[],
    strength_factors: &[],
    notes: &[],
};

static FINANCIAL: IndustryProfile = IndustryProfile {
    industry: Industry::Financial,
    description: "Banks, insurers, asset managers and investment banks",
    rules: FundamentalRules {
        growth: ThresholdTiers::new(12.0, 7.0, 3.0),
        profitability: ThresholdTiers::new(20.0, 15.0, 10.0),
        debt_safe: 10.0,
        debt_warning: 15.0,
        pe_warning: 15.0,
        pb_warning: Some(2.5),
    },
    key_metrics: &[
        "Return on equity (ROE)",
        "Net interest margin (NIM)",
        "Non-performing loan ratio (NPL)",
        "Capital adequacy ratio (CAR)",
        "Price to book (P/B)",
        "Dividend yield",
    ],
    risk_factors: &[
        "Interest rate risk",
        "Credit risk",
        "Regulatory risk",
        "Liquidity risk",
        "Economic cycle risk",
    ],
    themes: &[],
    strength_factors: &[],
    notes: &[
        "Technical analysis is less informative for financials",
        "Focus on fundamentals and valuation",
        "For banks, watch capital adequacy and NPL ratio",
        "For insurers, watch the investment portfolio and claims ratio",
    ],
};

static HEALTHCARE: IndustryProfile = IndustryProfile {
    industry: Industry::Healthcare,
    description: "Pharmaceuticals, biotechnology and medical devices",
    rules: FundamentalRules {
        growth: ThresholdTiers::new(20.0, 12.0, 6.0),
        profitability: ThresholdTiers::new(30.0, 20.0, 10.0),
        debt_safe: 0.6,
        debt_warning: 1.0,
        pe_warning: 35.0,
        pb_warning: None,
    },
    key_metrics: &[
        "R&D spend ratio",
        "Gross margin",
        "Drug approvals",
        "Patent expiries",
    ],
    risk_factors: &[
        "R&D failure",
        "Regulatory approval",
        "Patent cliff",
        "Drug price controls",
    ],
    themes: &[],
    strength_factors: &[],
    notes: &[],
};

static INDUSTRIAL: IndustryProfile = IndustryProfile {
    industry: Industry::Industrial,
    description: "Machinery, aerospace, construction and electrical equipment",
    rules: FundamentalRules {
        growth: ThresholdTiers::new(15.0, 8.0, 3.0),
        profitability: ThresholdTiers::new(20.0, 12.0, 6.0),
        debt_safe: 0.8,
        debt_warning: 1.5,
        pe_warning: 25.0,
        pb_warning: None,
    },
    key_metrics: &[
        "Order growth",
        "Capacity utilization",
        "Gross margin",
        "Inventory turnover",
    ],
    risk_factors: &[
        "Economic cycle",
        "Raw material costs",
        "Trade policy",
        "Currency risk",
    ],
    themes: &[],
    strength_factors: &[],
    notes: &[],
};

static CONSUMER_STAPLES: IndustryProfile = IndustryProfile {
    industry: Industry::ConsumerStaples,
    description: "Beverages, food, household products and staples retail",
    rules: FundamentalRules {
        growth: ThresholdTiers::new(10.0, 5.0, 2.0),
        profitability: ThresholdTiers::new(25.0, 15.0, 8.0),
        debt_safe: 1.5,
        debt_warning: 2.5,
        pe_warning: 35.0,
        pb_warning: None,
    },
    key_metrics: &[
        "Gross margin trend",
        "Market share",
        "Same-store sales",
        "Inventory turnover",
        "Free cash flow",
        "Dividend payout ratio",
        "Brand value ranking",
    ],
    risk_factors: &[
        "Raw material cost swings",
        "Shifting consumer preferences",
        "Regulatory changes",
        "Currency risk for multinationals",
        "Intensifying competition",
        "Supply chain disruption",
    ],
    themes: &[
        "Brand value investing",
        "Dividend income",
        "Defensive allocation",
        "Global expansion",
        "Product innovation",
    ],
    strength_factors: &[
        "Stable cash flow",
        "Brand moat",
        "Resilient essential demand",
        "Pricing power",
        "Distribution network",
    ],
    notes: &[
        "Demand is stable and only mildly cyclical",
        "Brands and distribution are the key barriers to entry",
        "Dividends and cash flow are usually steady",
        "Watch input cost control and pricing power",
        "International expansion is a major growth driver",
    ],
};

/// Profile for an industry; industries without a tuned profile use software.
pub fn profile(industry: Industry) -> &'static IndustryProfile {
    match industry {
        Industry::Energy => &ENERGY,
        Industry::Financial => &FINANCIAL,
        Industry::Healthcare => &HEALTHCARE,
        Industry::Industrial => &INDUSTRIAL,
        Industry::ConsumerStaples => &CONSUMER_STAPLES,
        _ => &SOFTWARE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_financial_profile_thresholds() {
        let p = profile(Industry::Financial);
        assert_eq!(p.rules.debt_safe, 10.0);
        assert_eq!(p.rules.pe_warning, 15.0);
        assert_eq!(p.rules.pb_warning, Some(2.5));
        assert_eq!(p.notes.len(), 4);
    }

    #[test]
    fn test_missing_profile_falls_back_to_software() {
        for industry in [
            Industry::Utilities,
            Industry::Materials,
            Industry::ConsumerDiscretionary,
        ] {
            assert_eq!(profile(industry).industry, Industry::Software);
        }
    }

    #[test]
    fn test_only_staples_has_themes() {
        for industry in Industry::all() {
            let p = profile(*industry);
            assert_eq!(
                !p.themes.is_empty(),
                p.industry == Industry::ConsumerStaples
            );
            assert!(p.risk_factors.len() >= 2);
        }
    }

    #[test]
    fn test_tiers_are_ordered() {
        for industry in Industry::all() {
            let rules = profile(*industry).rules;
            for tiers in [rules.growth, rules.profitability] {
                assert!(tiers.excellent > tiers.good && tiers.good > tiers.fair);
            }
            assert!(rules.debt_safe < rules.debt_warning);
        }
    }
}
