//! Snapshot builders shared by unit tests

use super::models::{
    AnalystView, CompanyProfile, DataQuality, Fundamentals, MarketSnapshot, PriceBar, PriceData,
    Valuation,
};
use chrono::{Duration, TimeZone, Utc};

/// Daily bars with the given closes and a flat volume
pub(crate) fn bars(closes: &[f64]) -> Vec<PriceBar> {
    let start = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            timestamp: start + Duration::days(i as i64),
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 1_000_000.0,
            synthetic: false,
        })
        .collect()
}

/// Full-quality snapshot with no fundamentals filled in
pub(crate) fn snapshot(symbol: &str, closes: &[f64]) -> MarketSnapshot {
    MarketSnapshot {
        symbol: symbol.to_string(),
        company: CompanyProfile {
            symbol: symbol.to_string(),
            name: format!("{symbol} Corp"),
            sector: Some("Technology".to_string()),
            industry: Some("Software - Infrastructure".to_string()),
            currency: "USD".to_string(),
            is_financial: false,
        },
        price: PriceData::from_history(bars(closes)),
        fundamentals: Fundamentals::default(),
        valuation: Valuation::default(),
        analyst: AnalystView::default(),
        financial_metrics: None,
        data_quality: DataQuality::Full,
        synthetic_bars: 0,
        error: None,
        fetched_at: Utc::now(),
        from_cache: false,
    }
}

/// Linear close series from `start` to `end`
pub(crate) fn ramp(start: f64, end: f64, n: usize) -> Vec<f64> {
    let step = (end - start) / (n.saturating_sub(1).max(1)) as f64;
    (0..n).map(|i| start + step * i as f64).collect()
}
