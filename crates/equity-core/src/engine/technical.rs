//! Technical scoring from price position, momentum and volume

use super::result::{DataStatus, IndicatorsUsed, TechnicalRating, TechnicalScore};
use crate::data::MarketSnapshot;
use crate::technical::{MIN_FULL_BARS, TechnicalIndicators};

/// Score the chart picture in half points, clamped to `0..=6`.
///
/// The score rewards pullbacks and oversold readings, so a high score means
/// "potential entry" rather than "strong trend".
pub fn score_technicals(snapshot: &MarketSnapshot, indicators: &TechnicalIndicators) -> TechnicalScore {
    let price = &snapshot.price;
    if !price.latest.has_sufficient_data && price.history.len() < MIN_FULL_BARS {
        tracing::debug!(symbol = %snapshot.symbol, bars = price.history.len(), "Technical score skipped");
        return TechnicalScore::insufficient();
    }

    let mut score = 0.0;
    let mut reasons = Vec::new();

    let current_vs_high = price.stats.current_vs_high;
    if current_vs_high < -30.0 {
        score += 2.0;
        reasons.push(format!("Deep pullback ({:.1}% below the high)", current_vs_high.abs()));
    } else if current_vs_high < -15.0 {
        score += 1.0;
        reasons.push(format!("Moderate pullback ({:.1}% below the high)", current_vs_high.abs()));
    } else if current_vs_high > -5.0 {
        reasons.push(format!("Near the high (only {:.1}% below)", current_vs_high.abs()));
    }

    let rsi = price.technicals.rsi;
    if rsi < 30.0 {
        score += 2.0;
        reasons.push(format!("RSI oversold ({rsi:.1})"));
    } else if rsi < 40.0 {
        score += 1.0;
        reasons.push(format!("RSI weak ({rsi:.1})"));
    } else if rsi > 70.0 {
        score -= 1.0;
        reasons.push(format!("RSI overbought ({rsi:.1})"));
    }

    let current = price.latest.current;
    let (ma20, ma50) = (price.technicals.ma20, price.technicals.ma50);
    if current > 0.0 {
        if current > ma20 && ma20 > ma50 {
            score += 1.0;
            reasons.push("Price above rising moving averages".to_string());
        } else if current < ma20 && ma20 < ma50 {
            score -= 1.0;
            reasons.push("Price below falling moving averages".to_string());
        }
    }

    let volume = price.latest.volume;
    let avg_volume = price.stats.avg_volume;
    let volume_ratio = if volume > 0.0 && avg_volume > 0.0 {
        volume / avg_volume
    } else {
        0.0
    };
    if volume_ratio > 1.5 {
        score += 0.5;
        reasons.push(format!("Volume expanding ({volume_ratio:.1}x)"));
    } else if volume_ratio > 0.0 && volume_ratio < 0.7 {
        reasons.push(format!("Volume drying up ({volume_ratio:.1}x)"));
    }

    let change_pct = price.latest.change_pct;
    if change_pct > 3.0 {
        score += 0.5;
        reasons.push(format!("Strong short-term gain: +{change_pct:.1}%"));
    } else if change_pct < -3.0 {
        reasons.push(format!("Sharp short-term drop: {change_pct:.1}%"));
    }

    if indicators.momentum.oversold {
        score += 1.0;
        reasons.push("Indicators show oversold conditions".to_string());
    }
    if indicators.momentum.overbought {
        score -= 1.0;
        reasons.push("Indicators show overbought conditions".to_string());
    }

    let score = f64::clamp(score, 0.0, TechnicalScore::MAX);

    TechnicalScore {
        score,
        max_score: TechnicalScore::MAX,
        rating: TechnicalRating::from_score(score),
        reasons,
        data_status: DataStatus::Sufficient,
        indicators_used: Some(IndicatorsUsed {
            rsi,
            current_vs_high,
            volume_ratio,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures;
    use crate::technical::IndicatorCalculator;

    fn score(snapshot: &MarketSnapshot) -> TechnicalScore {
        let indicators = IndicatorCalculator::new()
            .compute(snapshot.bars(), false)
            .unwrap();
        score_technicals(snapshot, &indicators)
    }

    #[test]
    fn test_short_history_is_insufficient() {
        let snapshot = fixtures::snapshot("TINY", &[10.0, 10.5, 11.0, 10.8, 11.2]);
        let result = score(&snapshot);

        assert!(result.is_insufficient());
        assert_eq!(result.score, 0.0);
        assert_eq!(result.rating, TechnicalRating::InsufficientData);
        assert!(result.indicators_used.is_none());
    }

    #[test]
    fn test_selloff_scores_as_opportunity() {
        let snapshot = fixtures::snapshot("DROP", &fixtures::ramp(200.0, 120.0, 60));
        let result = score(&snapshot);

        // pullback +2, RSI +2, bearish MAs -1, oversold +1
        assert_eq!(result.score, 4.0);
        assert_eq!(result.rating, TechnicalRating::NeutralBullish);
        assert!(result.reasons.iter().any(|r| r.starts_with("Deep pullback")));
        assert!(result.reasons.iter().any(|r| r == "Price below falling moving averages"));
        let used = result.indicators_used.unwrap();
        assert!((used.current_vs_high + 40.0).abs() < 1e-9);
        assert!((used.volume_ratio - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rally_is_clamped_at_zero() {
        let snapshot = fixtures::snapshot("PUMP", &fixtures::ramp(100.0, 160.0, 60));
        let result = score(&snapshot);

        assert_eq!(result.score, 0.0);
        assert_eq!(result.rating, TechnicalRating::Caution);
        assert!(result.reasons.iter().any(|r| r.starts_with("Near the high")));
        assert!(result.reasons.iter().any(|r| r.starts_with("RSI overbought")));
    }

    #[test]
    fn test_volume_and_change_half_points() {
        let mut snapshot = fixtures::snapshot("VOL", &fixtures::ramp(200.0, 120.0, 60));
        snapshot.price.latest.volume = snapshot.price.stats.avg_volume * 2.0;
        snapshot.price.latest.change_pct = 4.0;

        let result = score(&snapshot);

        assert_eq!(result.score, 5.0);
        assert_eq!(result.rating, TechnicalRating::OversoldOpportunity);
        assert!(result.reasons.iter().any(|r| r == "Volume expanding (2.0x)"));
        assert!(result.reasons.iter().any(|r| r == "Strong short-term gain: +4.0%"));
    }

    #[test]
    fn test_quiet_volume_is_noted_only() {
        let mut snapshot = fixtures::snapshot("QUIET", &fixtures::ramp(200.0, 120.0, 60));
        snapshot.price.latest.volume = snapshot.price.stats.avg_volume * 0.5;
        snapshot.price.latest.change_pct = -4.0;

        let result = score(&snapshot);

        assert_eq!(result.score, 4.0);
        assert!(result.reasons.iter().any(|r| r.starts_with("Volume drying up")));
        assert!(result.reasons.iter().any(|r| r.starts_with("Sharp short-term drop")));
    }
}
