//! Narrative research report assembled from an analysis result

use crate::data::MarketSnapshot;
use crate::engine::{AnalysisResult, Stance};
use crate::industry::{Industry, IndustryProfile, profile};
use crate::technical::{IndicatorMode, MacdSignal, TrendStrength};
use chrono::{DateTime, Utc};
use equity_utils::{format_money, format_optional, format_percent, format_ratio};
use serde::{Deserialize, Serialize};

/// Section kinds in the order they appear in a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    CompanyOverview,
    CoreConclusion,
    Fundamentals,
    Technicals,
    Valuation,
    Risks,
    Strategy,
    IndustryInsight,
    InvestmentLogic,
}

impl SectionKind {
    pub fn all() -> [SectionKind; 9] {
        [
            Self::CompanyOverview,
            Self::CoreConclusion,
            Self::Fundamentals,
            Self::Technicals,
            Self::Valuation,
            Self::Risks,
            Self::Strategy,
            Self::IndustryInsight,
            Self::InvestmentLogic,
        ]
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::CompanyOverview => "1. Company Overview",
            Self::CoreConclusion => "2. Core Conclusion",
            Self::Fundamentals => "3. Fundamental Analysis",
            Self::Technicals => "4. Technical Analysis",
            Self::Valuation => "5. Valuation and Growth",
            Self::Risks => "6. Risks",
            Self::Strategy => "7. Strategy",
            Self::IndustryInsight => "8. Industry Insight and Outlook",
            Self::InvestmentLogic => "9. Investment Logic",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSection {
    pub kind: SectionKind,
    pub title: String,
    pub lines: Vec<String>,
}

/// A rendered-agnostic research report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchReport {
    pub symbol: String,
    pub company_name: String,
    pub industry: Industry,
    pub generated_at: DateTime<Utc>,
    pub sections: Vec<ReportSection>,
    pub disclaimer: Vec<String>,
}

impl ResearchReport {
    pub fn section(&self, kind: SectionKind) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    pub fn title(&self) -> String {
        format!("Equity Research Report - {}", self.symbol)
    }
}

/// Builds [`ResearchReport`]s from fixed templates
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportGenerator;

impl ReportGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(
        &self,
        snapshot: &MarketSnapshot,
        analysis: &AnalysisResult,
        industry: Industry,
    ) -> ResearchReport {
        let ctx = Context {
            snapshot,
            analysis,
            industry,
            profile: profile(industry),
        };
        let generated_at = Utc::now();

        let sections = SectionKind::all()
            .into_iter()
            .map(|kind| ReportSection {
                kind,
                title: kind.title().to_string(),
                lines: ctx.section(kind),
            })
            .collect();

        ResearchReport {
            symbol: snapshot.symbol.clone(),
            company_name: snapshot.company.name.clone(),
            industry,
            generated_at,
            sections,
            disclaimer: disclaimer(generated_at),
        }
    }
}

struct Context<'a> {
    snapshot: &'a MarketSnapshot,
    analysis: &'a AnalysisResult,
    industry: Industry,
    profile: &'static IndustryProfile,
}

impl Context<'_> {
    fn section(&self, kind: SectionKind) -> Vec<String> {
        match kind {
            SectionKind::CompanyOverview => self.company_overview(),
            SectionKind::CoreConclusion => self.core_conclusion(),
            SectionKind::Fundamentals => self.fundamentals(),
            SectionKind::Technicals => self.technicals(),
            SectionKind::Valuation => self.valuation(),
            SectionKind::Risks => self.risks(),
            SectionKind::Strategy => self.strategy(),
            SectionKind::IndustryInsight => self.industry_insight(),
            SectionKind::InvestmentLogic => self.investment_logic(),
        }
    }

    fn company_overview(&self) -> Vec<String> {
        let company = &self.snapshot.company;
        let f = &self.snapshot.fundamentals;
        let symbol = &self.snapshot.symbol;

        let mut lines = vec![
            format!("Company: {}", company.name),
            format!("Ticker: {symbol}"),
            format!("Sector: {}", company.sector.as_deref().unwrap_or("Unclassified")),
            format!("Industry: {}", company.industry.as_deref().unwrap_or("Unclassified")),
            format!(
                "Market cap: {}",
                format_optional(f.market_cap.filter(|c| *c > 0.0), format_money)
            ),
            format!("Price: ${:.2}", self.snapshot.current_price()),
            String::new(),
            "Key financials:".to_string(),
        ];

        for (label, value, formatter) in [
            ("Revenue growth", f.revenue_growth, format_percent as fn(f64) -> String),
            ("Operating margin", f.operating_margin, format_percent),
            ("Net margin", f.profit_margin, format_percent),
            ("Return on equity", f.return_on_equity, format_percent),
            ("Debt/equity", f.debt_to_equity, format_ratio),
        ] {
            lines.push(format!("  - {label}: {}", format_optional(value, formatter)));
        }

        let analyst = &self.snapshot.analyst;
        lines.push(String::new());
        lines.push("Analyst coverage:".to_string());
        lines.push(format!(
            "  - Consensus: {} ({} analysts)",
            analyst.recommendation.as_deref().unwrap_or("n/a"),
            analyst.analyst_count.unwrap_or(0)
        ));
        if let Some(target) = analyst.target_mean {
            let upside = analyst
                .upside_pct
                .map(|u| format!(" ({u:+.1}%)"))
                .unwrap_or_default();
            lines.push(format!("  - Mean target: ${target:.2}{upside}"));
        }

        lines.push(String::new());
        lines.push("Links:".to_string());
        lines.push(format!("  - Yahoo Finance: https://finance.yahoo.com/quote/{symbol}"));
        lines.push(format!("  - Seeking Alpha: https://seekingalpha.com/symbol/{symbol}"));
        lines.push(format!(
            "  - News: https://www.google.com/search?q={symbol}+stock+news&tbm=nws"
        ));
        lines
    }

    fn core_conclusion(&self) -> Vec<String> {
        let a = self.analysis;
        let rec = a.signal.recommendation;
        let fund = &a.fundamentals;
        let tech = &a.technicals;

        let mut lines = vec![
            format!("{} Recommendation: {rec}", rec.stance().marker()),
            format!("Confidence: {:.1}/5.0", a.signal.confidence),
            String::new(),
            format!(
                "Combined score: {}/{}",
                a.combined_score(),
                a.max_combined_score()
            ),
            format!(
                "  - Fundamentals: {}/{} ({:.1}%)",
                fund.score,
                fund.max_score,
                fund.ratio() * 100.0
            ),
            format!(
                "  - Technicals: {}/{} ({:.1}%)",
                tech.score,
                tech.max_score,
                tech.ratio() * 100.0
            ),
            String::new(),
            "Core logic:".to_string(),
            format!("  {}", a.signal.reasoning),
            String::new(),
            "Key points:".to_string(),
        ];

        let highlights = fund.reasons.iter().take(2).chain(tech.reasons.iter().take(1));
        for (i, reason) in highlights.enumerate() {
            lines.push(format!("  {}. {reason}", i + 1));
        }
        lines
    }

    fn fundamentals(&self) -> Vec<String> {
        let fund = &self.analysis.fundamentals;
        let growth = fund.metric("revenue_growth");
        let margin = fund.metric("operating_margin");
        let debt = fund.metric("debt_to_equity");
        let fcf = fund.metric("free_cashflow");

        let mut lines = vec![
            format!("Rating: {} ({}/{})", fund.rating.label(), fund.score, fund.max_score),
            String::new(),
            "Growth:".to_string(),
        ];
        lines.push(if growth > 15.0 {
            format!("  + Revenue growing fast ({growth:.1}%), the company is in an expansion phase")
        } else if growth > 5.0 {
            format!("  = Revenue growing steadily ({growth:.1}%)")
        } else if growth > 0.0 {
            format!("  ! Revenue growth is slow ({growth:.1}%), watch the growth drivers")
        } else {
            format!("  - Revenue is shrinking ({growth:.1}%)")
        });

        lines.push("Profitability:".to_string());
        lines.push(if margin > 20.0 {
            format!("  + Excellent operating margin ({margin:.1}%)")
        } else if margin > 10.0 {
            format!("  = Reasonable operating margin ({margin:.1}%)")
        } else {
            format!("  ! Thin operating margin ({margin:.1}%), watch cost control")
        });

        lines.push("Balance sheet:".to_string());
        lines.push(if debt < 0.5 {
            format!("  + Very low leverage ({debt:.2}), conservative structure")
        } else if debt < 1.0 {
            format!("  = Moderate leverage ({debt:.2})")
        } else if debt < 2.0 {
            format!("  ! Elevated leverage ({debt:.2}), watch debt service")
        } else {
            format!("  - Excessive leverage ({debt:.2}), financial risk")
        });

        lines.push("Cash flow:".to_string());
        lines.push(if fcf > 0.0 {
            format!("  + Positive free cash flow (about {})", format_money(fcf))
        } else {
            "  ! Free cash flow is negative or unreported".to_string()
        });

        if let Some(metrics) = &self.snapshot.financial_metrics {
            lines.push("Financial sector metrics:".to_string());
            lines.push(format!(
                "  - Net interest margin (approx.): {}",
                format_optional(metrics.net_interest_margin, format_percent)
            ));
            lines.push(format!(
                "  - Return on assets: {}",
                format_optional(metrics.return_on_assets, format_percent)
            ));
            lines.push(format!(
                "  - Book value per share: {}",
                format_optional(metrics.book_value_per_share, |v| format!("${v:.2}"))
            ));
            lines.push(format!(
                "  - Payout ratio: {}",
                format_optional(metrics.payout_ratio, format_percent)
            ));
        }
        lines
    }

    fn technicals(&self) -> Vec<String> {
        let tech = &self.analysis.technicals;
        let ind = &self.analysis.indicators;

        let mut lines = vec![format!(
            "Rating: {} ({}/{})",
            tech.rating.label(),
            tech.score,
            tech.max_score
        )];

        if tech.is_insufficient() {
            lines.push("! Not enough price history; treat this section as indicative only".to_string());
            lines.push("  Combine with other methods before deciding".to_string());
            return lines;
        }

        if self.snapshot.has_simulated_data() {
            lines.push(format!(
                "Data: {} real and {} simulated bars",
                self.snapshot.real_bars(),
                self.snapshot.synthetic_bars
            ));
        }

        lines.push(String::new());
        lines.push("Trend:".to_string());
        lines.push(match ind.trend.trend_strength {
            TrendStrength::Rising => "  ^ In a short-term uptrend".to_string(),
            TrendStrength::Falling => "  v In a short-term downtrend".to_string(),
            other => format!("  > Trend: {}", other.label()),
        });
        match ind.trend.macd_signal {
            MacdSignal::Bullish => lines.push("  MACD is bullish".to_string()),
            MacdSignal::Bearish => lines.push("  MACD is bearish".to_string()),
            MacdSignal::Neutral => {}
        }
        if ind.mode == IndicatorMode::Full {
            lines.push(format!(
                "  Bollinger position: {:.2} ({})",
                ind.trend.bb_position,
                ind.trend.band_zone()
            ));
        }
        for cross in &ind.trend.ma_cross {
            lines.push(format!("  {cross}"));
        }

        let momentum = &ind.momentum;
        let rsi = momentum.rsi_14;
        lines.push(String::new());
        lines.push("Momentum:".to_string());
        lines.push(if rsi < 30.0 {
            format!("  RSI ({rsi:.1}) is oversold, a rebound is possible")
        } else if rsi > 70.0 {
            format!("  RSI ({rsi:.1}) is overbought, watch for a pullback")
        } else {
            format!("  RSI ({rsi:.1}) is neutral")
        });
        lines.push(format!("  Stochastic %K: {:.1}", momentum.stoch_k));
        if momentum.oversold {
            lines.push("  Several indicators are oversold".to_string());
        }
        if momentum.overbought {
            lines.push("  Several indicators are overbought".to_string());
        }

        lines.push(String::new());
        lines.push("Volatility:".to_string());
        lines.push(format!("  ATR: {:.2}% of price", ind.volatility.atr_percent));
        lines.push(format!("  20-day volatility: {:.1}%", ind.volatility.volatility_20d));

        let stats = &self.snapshot.price.stats;
        lines.push(String::new());
        lines.push("Key levels:".to_string());
        lines.push(format!("  - vs period high: {:.1}%", stats.current_vs_high));
        lines.push(format!("  - Support (period low): ${:.2}", stats.min));
        lines.push(format!("  - Resistance (period high): ${:.2}", stats.max));

        if let Some(note) = &ind.signals.note {
            lines.push(String::new());
            lines.push(format!("Note: {note}"));
        }
        lines
    }

    fn valuation(&self) -> Vec<String> {
        let v = &self.snapshot.valuation;
        let mut lines = vec!["Price/earnings:".to_string()];

        match v.trailing_pe {
            Some(pe) if pe > 0.0 && pe < 20.0 => {
                lines.push(format!("  + P/E ({pe:.1}) is on the low side of reasonable"));
            }
            Some(pe) if (20.0..30.0).contains(&pe) => {
                lines.push(format!("  = P/E ({pe:.1}) is around the market average"));
            }
            Some(pe) if pe >= 30.0 => {
                lines.push(format!("  ! P/E ({pe:.1}) is high, watch valuation risk"));
            }
            _ => lines.push("  P/E not meaningful".to_string()),
        }
        if let (Some(forward), Some(trailing)) = (v.forward_pe, v.trailing_pe) {
            if forward > 0.0 && forward < trailing {
                lines.push(format!(
                    "  Forward P/E ({forward:.1}) below trailing implies expected earnings growth"
                ));
            }
        }

        lines.push(String::new());
        lines.push("Price/book:".to_string());
        match v.price_to_book {
            Some(pb) if pb > 0.0 && pb < 3.0 => {
                lines.push(format!("  + P/B ({pb:.2}) is reasonable"));
            }
            Some(pb) if pb >= 3.0 => {
                lines.push(format!("  ! P/B ({pb:.2}) is high, check asset quality"));
            }
            _ => lines.push("  P/B not available".to_string()),
        }

        lines.push(String::new());
        lines.push("Growth-adjusted (PEG):".to_string());
        match v.peg_ratio {
            Some(peg) if peg > 0.0 && peg < 1.0 => {
                lines.push(format!("  + PEG ({peg:.2}) below 1, growth looks cheap"));
            }
            Some(peg) if (1.0..2.0).contains(&peg) => {
                lines.push(format!("  = PEG ({peg:.2}), growth and valuation in line"));
            }
            Some(peg) if peg >= 2.0 => {
                lines.push(format!("  ! PEG ({peg:.2}) is high, growth needs to be proven"));
            }
            _ => lines.push("  PEG not available".to_string()),
        }
        if let Some(ps) = v.price_to_sales {
            lines.push(format!("  Price/sales: {ps:.2}"));
        }

        lines.push(String::new());
        lines.push("Overall:".to_string());
        lines.push(match v.attractiveness.map(|a| a.label()) {
            Some("attractive") => "  + Valuation is attractive with a margin of safety".to_string(),
            Some("expensive") => "  ! Valuation is rich, growth expectations must hold".to_string(),
            _ => "  = Valuation sits in a reasonable range".to_string(),
        });
        lines
    }

    fn risks(&self) -> Vec<String> {
        let mut lines = vec!["Industry risks:".to_string()];
        for (i, risk) in self.profile.risk_factors.iter().take(3).enumerate() {
            lines.push(format!("  {}. {risk}", i + 1));
        }

        let risks = &self.analysis.risks;
        if !risks.is_empty() {
            lines.push(String::new());
            lines.push("Company-specific risks:".to_string());
            for (i, risk) in risks.iter().enumerate() {
                lines.push(format!("  {}. {risk}", i + 1));
            }
        }

        lines.push(String::new());
        lines.push("Market risks:".to_string());
        for (i, risk) in MARKET_RISKS.iter().enumerate() {
            lines.push(format!("  {}. {risk}", i + 1));
        }

        let level = match risks.len() + 3 {
            0..=2 => "Low",
            3..=4 => "Medium",
            _ => "High",
        };
        lines.push(String::new());
        lines.push(format!("Risk level: {level}"));
        lines
    }

    fn strategy(&self) -> Vec<String> {
        let stance = self.analysis.signal.recommendation.stance();
        let (heading, steps): (&str, &[&str]) = match stance {
            Stance::Positive => (
                "Active allocation:",
                &[
                    "Build the position in tranches rather than all at once",
                    "Position size: 5-10% depending on risk tolerance",
                    "Stop loss: -8% to -10%",
                    "Return target: 15-25%",
                    "Holding period: 6-12 months",
                ],
            ),
            Stance::Neutral => (
                "Watch / hold:",
                &[
                    "Existing holders can keep the position",
                    "New money can wait for a better entry",
                    "Watch for breaks of key price levels",
                    "Follow earnings and industry news closely",
                    "A small starter position is acceptable",
                ],
            ),
            Stance::Cautious => (
                "Cautious / reduce:",
                &[
                    "Consider trimming or stepping aside",
                    "Holders should keep a strict stop loss",
                    "New money should stay away for now",
                    "Track how the risk factors develop",
                    "Wait for a clearer signal before acting",
                ],
            ),
        };

        let mut lines = vec![format!("{} {heading}", stance.marker())];
        for (i, step) in steps.iter().enumerate() {
            lines.push(format!("  {}. {step}", i + 1));
        }
        lines.push(String::new());
        lines.push("Discipline:".to_string());
        lines.push("  - Combine fundamentals and technicals in every decision".to_string());
        lines.push("  - Keep any single stock under 15% of the portfolio".to_string());
        lines.push("  - Review the position regularly".to_string());
        lines
    }

    fn industry_insight(&self) -> Vec<String> {
        let mut lines = vec![
            "Current state:".to_string(),
            format!("  {}", industry_outlook(self.industry)),
        ];

        if !self.profile.key_metrics.is_empty() {
            lines.push(String::new());
            lines.push("Key drivers:".to_string());
            for (i, metric) in self.profile.key_metrics.iter().take(5).enumerate() {
                lines.push(format!("  {}. {metric}", i + 1));
            }
        }

        if !self.profile.themes.is_empty() {
            lines.push(String::new());
            lines.push("Investment themes:".to_string());
            for (i, theme) in self.profile.themes.iter().take(3).enumerate() {
                lines.push(format!("  {}. {theme}", i + 1));
            }
        }

        if !self.profile.notes.is_empty() {
            lines.push(String::new());
            lines.push("Notes:".to_string());
            for note in self.profile.notes {
                lines.push(format!("  - {note}"));
            }
        }
        lines
    }

    fn investment_logic(&self) -> Vec<String> {
        let a = self.analysis;
        let mut lines = vec![format!("Fundamental case ({}):", a.fundamentals.rating.label())];
        for reason in a.fundamentals.reasons.iter().take(2) {
            lines.push(format!("  - {reason}"));
        }

        lines.push(String::new());
        lines.push(format!("Technical case ({}):", a.technicals.rating.label()));
        if a.technicals.reasons.is_empty() {
            lines.push("  - No clear technical signal".to_string());
        }
        for reason in a.technicals.reasons.iter().take(2) {
            lines.push(format!("  - {reason}"));
        }

        if !self.profile.strength_factors.is_empty() {
            lines.push(String::new());
            lines.push("Industry strengths:".to_string());
            for factor in self.profile.strength_factors.iter().take(3) {
                lines.push(format!("  - {factor}"));
            }
        }

        lines.push(String::new());
        lines.push("Overall:".to_string());
        lines.push(format!("  {}", a.signal.reasoning));

        lines.push(String::new());
        lines.push("Watch next:".to_string());
        for (i, item) in [
            "Next quarterly results",
            "Industry policy changes",
            "Breaks of key technical levels",
            "Macro data releases",
        ]
        .iter()
        .enumerate()
        {
            lines.push(format!("  {}. {item}", i + 1));
        }
        lines
    }
}

const MARKET_RISKS: [&str; 4] = [
    "Macroeconomic swings",
    "Interest rate policy changes",
    "Market liquidity",
    "Geopolitical events",
];

fn industry_outlook(industry: Industry) -> &'static str {
    match industry {
        Industry::Software => {
            "Software rides the digital transformation wave; cloud, AI and SaaS drive growth."
        }
        Industry::Energy => {
            "Energy faces the green transition; legacy and renewable supply coexist and prices swing widely."
        }
        Industry::Financial => {
            "Financials are driven by rate policy and regulation; digitization and compliance are the main trends."
        }
        Industry::Healthcare => {
            "Healthcare benefits from aging populations and innovation but is heavily regulated."
        }
        Industry::Industrial => {
            "Industrials benefit from supply-chain reshoring and automation but remain cyclical."
        }
        Industry::ConsumerStaples => {
            "Staples demand is stable, with input costs and premiumization as the main challenges."
        }
        _ => "The industry follows its own development pattern and cycle.",
    }
}

fn disclaimer(generated_at: DateTime<Utc>) -> Vec<String> {
    vec![
        "Important:".to_string(),
        "1. This report is generated automatically from public data and rule-based models. It is not investment advice.".to_string(),
        format!(
            "2. Data source: Yahoo Finance (plus Alpha Vantage when configured), as of {}.",
            generated_at.format("%Y-%m-%d")
        ),
        "3. Investing carries risk. Decide according to your own objectives and risk tolerance.".to_string(),
        "4. Past performance does not predict future returns.".to_string(),
        "5. Do your own research and consult a professional adviser when needed.".to_string(),
        format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S UTC")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures;
    use crate::engine::IndustryAnalyzer;

    fn report_for(industry: Industry, closes: &[f64]) -> ResearchReport {
        let mut snapshot = fixtures::snapshot("ACME", closes);
        snapshot.fundamentals.revenue_growth = Some(18.0);
        snapshot.fundamentals.operating_margin = Some(24.0);
        snapshot.valuation.trailing_pe = Some(32.0);
        snapshot.valuation.forward_pe = Some(27.0);
        let analysis = IndustryAnalyzer::new(industry).analyze(&snapshot).unwrap();
        ReportGenerator::new().generate(&snapshot, &analysis, industry)
    }

    #[test]
    fn test_nine_sections_in_order() {
        let report = report_for(Industry::Software, &fixtures::ramp(100.0, 80.0, 60));

        assert_eq!(report.sections.len(), 9);
        let kinds: Vec<_> = report.sections.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, SectionKind::all().to_vec());
        assert!(report.sections.iter().all(|s| !s.lines.is_empty()));
        assert!(report.disclaimer[0].starts_with("Important"));
        assert_eq!(report.company_name, "ACME Corp");
    }

    #[test]
    fn test_core_conclusion_scores() {
        let report = report_for(Industry::Software, &fixtures::ramp(100.0, 80.0, 60));
        let conclusion = report.section(SectionKind::CoreConclusion).unwrap();

        assert!(conclusion.lines[0].contains("Recommendation:"));
        assert!(conclusion.lines.iter().any(|l| l.starts_with("Combined score:")));
        assert!(conclusion.lines.iter().any(|l| l.starts_with("  1. ")));
    }

    #[test]
    fn test_insufficient_technicals_short_circuit() {
        let report = report_for(Industry::Software, &[10.0, 10.2, 10.1]);
        let technicals = report.section(SectionKind::Technicals).unwrap();

        assert_eq!(technicals.lines.len(), 3);
        assert!(technicals.lines[1].contains("Not enough price history"));
    }

    #[test]
    fn test_valuation_and_industry_lines() {
        let report = report_for(Industry::ConsumerStaples, &fixtures::ramp(60.0, 62.0, 60));

        let valuation = report.section(SectionKind::Valuation).unwrap();
        assert!(valuation.lines.iter().any(|l| l.contains("P/E (32.0) is high")));
        assert!(valuation.lines.iter().any(|l| l.contains("Forward P/E (27.0)")));

        let insight = report.section(SectionKind::IndustryInsight).unwrap();
        assert!(insight.lines.iter().any(|l| l == "Investment themes:"));
    }

    #[test]
    fn test_risk_level() {
        let report = report_for(Industry::Energy, &fixtures::ramp(60.0, 62.0, 60));
        let risks = report.section(SectionKind::Risks).unwrap();

        // two industry factors + three market baseline
        assert_eq!(risks.lines.last().map(String::as_str), Some("Risk level: High"));
    }
}
