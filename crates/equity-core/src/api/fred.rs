//! Federal Reserve Economic Data (FRED) API client
//!
//! Supplies the macro backdrop shown next to single-stock research: rates,
//! inflation, employment, sentiment and growth.
//!
//! API Key: Free registration at https://fred.stlouisfed.org/docs/api/api_key.html
//! Rate Limit: 120 requests per minute

use crate::error::{ResearchError, Result};
use futures::future::join_all;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

const FRED_BASE_URL: &str = "https://api.stlouisfed.org/fred";

const DEFAULT_RATE_LIMIT: u32 = 120;

/// FRED series IDs used by the macro snapshot
pub mod series {
    /// Federal Funds Effective Rate
    pub const FED_FUNDS_RATE: &str = "FEDFUNDS";
    /// 10-Year Treasury Constant Maturity Rate
    pub const TREASURY_10Y: &str = "DGS10";
    /// 2-Year Treasury Constant Maturity Rate
    pub const TREASURY_2Y: &str = "DGS2";
    /// 10Y-2Y Treasury Spread (Yield Curve)
    pub const YIELD_SPREAD_10Y_2Y: &str = "T10Y2Y";
    /// Unemployment Rate
    pub const UNEMPLOYMENT_RATE: &str = "UNRATE";
    /// Total Nonfarm Payrolls (thousands)
    pub const NONFARM_PAYROLLS: &str = "PAYEMS";
    /// Consumer Price Index (All Urban)
    pub const CPI: &str = "CPIAUCSL";
    /// Core PCE (Fed's preferred inflation measure)
    pub const CORE_PCE: &str = "PCEPILFE";
    /// Real GDP growth, quarterly annualized
    pub const GDP_GROWTH: &str = "A191RL1Q225SBEA";
    /// Consumer Sentiment (U of Michigan)
    pub const CONSUMER_SENTIMENT: &str = "UMCSENT";
    /// VIX Volatility Index
    pub const VIX: &str = "VIXCLS";
}

/// Observation data from FRED series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    /// Date of observation (YYYY-MM-DD)
    pub date: String,
    /// Value (can be "." for missing data)
    pub value: String,
}

impl Observation {
    fn parsed(&self) -> Option<f64> {
        self.value.parse::<f64>().ok()
    }
}

/// Parsed observation with numeric value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedObservation {
    pub date: String,
    pub value: f64,
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterestRates {
    pub fed_funds_rate: Option<f64>,
    pub treasury_10y: Option<f64>,
    pub treasury_2y: Option<f64>,
    /// 10Y minus 2Y, in percentage points
    pub yield_spread: Option<f64>,
    pub yield_curve_inverted: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inflation {
    pub cpi_yoy: Option<f64>,
    pub core_pce_yoy: Option<f64>,
    /// `rising` above 2% CPI, else `stable`
    pub trend: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Employment {
    pub unemployment_rate: Option<f64>,
    /// Month-over-month payroll change, thousands of jobs
    pub payroll_change: Option<f64>,
    /// `tight` below 4% unemployment, else `normal`
    pub labor_market: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketSentiment {
    pub vix: Option<f64>,
    pub consumer_sentiment: Option<f64>,
    /// `fearful`, `greedy` or `neutral`
    pub mood: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Economy {
    pub gdp_growth: Option<f64>,
    /// `low` or `moderate`
    pub recession_risk: String,
}

/// Macro backdrop assembled from several FRED series
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MacroSnapshot {
    pub rates: InterestRates,
    pub inflation: Inflation,
    pub employment: Employment,
    pub sentiment: MarketSentiment,
    pub economy: Economy,
    pub as_of_date: String,
    pub assessment: String,
}

pub fn inflation_trend(cpi_yoy: Option<f64>) -> &'static str {
    match cpi_yoy {
        Some(cpi) if cpi > 2.0 => "rising",
        _ => "stable",
    }
}

pub fn labor_market(unemployment: Option<f64>) -> &'static str {
    match unemployment {
        Some(rate) if rate < 4.0 => "tight",
        _ => "normal",
    }
}

pub fn market_mood(vix: Option<f64>) -> &'static str {
    match vix {
        Some(v) if v > 25.0 => "fearful",
        Some(v) if v < 15.0 => "greedy",
        _ => "neutral",
    }
}

pub fn recession_risk(gdp_growth: Option<f64>, curve_inverted: bool) -> &'static str {
    match gdp_growth {
        Some(g) if g > 1.0 && !curve_inverted => "low",
        _ => "moderate",
    }
}

/// First label whose lower bound `value` reaches; bands run from high to low.
fn band(value: f64, bands: &[(f64, &'static str)], floor: &'static str) -> &'static str {
    bands
        .iter()
        .find(|(min, _)| value >= *min)
        .map_or(floor, |&(_, label)| label)
}

const POLICY_BANDS: [(f64, &str); 2] = [
    (5.0, "restrictive monetary policy"),
    (2.5, "neutral monetary policy"),
];
const INFLATION_BANDS: [(f64, &str); 3] = [
    (4.0, "elevated inflation"),
    (2.5, "above-target inflation"),
    (1.5, "stable inflation near target"),
];
const VIX_BANDS: [(f64, &str); 2] = [
    (30.0, "high market volatility"),
    (20.0, "elevated market uncertainty"),
];

/// One-line summary of the macro backdrop
pub fn generate_assessment(
    fed_funds: Option<f64>,
    yield_curve_inverted: bool,
    inflation: Option<f64>,
    unemployment: Option<f64>,
    vix: Option<f64>,
) -> String {
    let labor = unemployment.map(|rate| match rate {
        r if r < 4.0 => "tight labor market",
        r if r < 5.5 => "healthy labor market",
        _ => "elevated unemployment",
    });

    let factors: Vec<&str> = [
        fed_funds.map(|r| band(r, &POLICY_BANDS, "accommodative monetary policy")),
        yield_curve_inverted.then_some("inverted yield curve (recession signal)"),
        inflation.map(|i| band(i, &INFLATION_BANDS, "low inflation")),
        labor,
        vix.map(|v| band(v, &VIX_BANDS, "low market volatility")),
    ]
    .into_iter()
    .flatten()
    .collect();

    if factors.is_empty() {
        "Insufficient data for assessment".to_string()
    } else {
        format!("Current economic conditions: {}", factors.join("; "))
    }
}

/// Percent change between the newest value and the one `lag` observations back.
///
/// `observations` are newest first, as returned with `sort_order=desc`.
fn percent_change(observations: &[Observation], lag: usize) -> Option<f64> {
    let values: Vec<f64> = observations.iter().filter_map(Observation::parsed).collect();
    let current = *values.first()?;
    let past = *values.get(lag)?;
    (past != 0.0).then(|| (current / past - 1.0) * 100.0)
}

/// FRED API client
pub struct FredClient {
    client: Client,
    api_key: String,
    rate_limiter: SharedRateLimiter,
}

impl FredClient {
    /// Create a new FRED client
    ///
    /// # Arguments
    /// * `api_key` - FRED API key
    /// * `rate_limit` - Requests per minute (default 120)
    pub fn new(api_key: impl Into<String>, rate_limit: Option<u32>, timeout: Duration) -> Result<Self> {
        let quota = Quota::per_minute(
            NonZeroU32::new(rate_limit.unwrap_or(DEFAULT_RATE_LIMIT)).unwrap_or(NonZeroU32::MIN),
        );

        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key: api_key.into(),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    /// Create from an optional key; a missing key is a configuration error.
    pub fn from_key(api_key: Option<&str>, timeout: Duration) -> Result<Self> {
        let key = api_key.filter(|k| !k.is_empty()).ok_or_else(|| {
            ResearchError::ConfigError("FRED_API_KEY environment variable not set".to_string())
        })?;
        Self::new(key, None, timeout)
    }

    /// Get observations for a series, newest first
    pub async fn get_observations(&self, series_id: &str, limit: Option<u32>) -> Result<Vec<Observation>> {
        self.rate_limiter.until_ready().await;

        let limit = limit.map(|n| n.to_string());
        let mut query = vec![
            ("series_id", series_id),
            ("api_key", self.api_key.as_str()),
            ("file_type", "json"),
            ("sort_order", "desc"),
        ];
        if let Some(limit) = &limit {
            query.push(("limit", limit.as_str()));
        }

        tracing::debug!(series = series_id, "FRED request");
        let response = self
            .client
            .get(format!("{FRED_BASE_URL}/series/observations"))
            .query(&query)
            .send()
            .await
            .map_err(|e| ResearchError::FredError(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ResearchError::FredError(format!(
                "HTTP {} for {}",
                response.status(),
                series_id
            )));
        }

        let data: ObservationsResponse = response
            .json()
            .await
            .map_err(|e| ResearchError::FredError(format!("failed to parse response: {}", e)))?;

        Ok(data.observations)
    }

    /// Latest numeric value; daily series may end with "." holidays, so a few are scanned.
    pub async fn get_latest(&self, series_id: &str) -> Result<ParsedObservation> {
        let observations = self.get_observations(series_id, Some(5)).await?;

        observations
            .iter()
            .find_map(|o| {
                o.parsed().map(|value| ParsedObservation {
                    date: o.date.clone(),
                    value,
                })
            })
            .ok_or_else(|| ResearchError::FredError(format!("no observations for {}", series_id)))
    }

    /// Latest values for several series, fetched concurrently.
    ///
    /// Series that fail are logged and left out.
    pub async fn get_latest_batch(&self, series_ids: &[&str]) -> HashMap<String, ParsedObservation> {
        let lookups = series_ids.iter().map(|&id| async move { (id, self.get_latest(id).await) });

        join_all(lookups)
            .await
            .into_iter()
            .filter_map(|(id, result)| match result {
                Ok(observation) => Some((id.to_string(), observation)),
                Err(e) => {
                    tracing::warn!(series = id, error = %e, "Skipping FRED series");
                    None
                }
            })
            .collect()
    }

    /// Year-over-year percent change of a monthly series
    pub async fn get_yoy_change(&self, series_id: &str) -> Result<f64> {
        let observations = self.get_observations(series_id, Some(13)).await?;
        percent_change(&observations, 12).ok_or_else(|| {
            ResearchError::FredError(format!("insufficient data for YoY change of {}", series_id))
        })
    }

    /// Month-over-month change of the newest two observations, in series units
    pub async fn get_latest_change(&self, series_id: &str) -> Result<f64> {
        let observations = self.get_observations(series_id, Some(2)).await?;
        let values: Vec<f64> = observations.iter().filter_map(Observation::parsed).collect();
        match values.as_slice() {
            [latest, previous, ..] => Ok(latest - previous),
            _ => Err(ResearchError::FredError(format!(
                "insufficient data for change of {}",
                series_id
            ))),
        }
    }

    /// Assemble the full macro snapshot
    pub async fn get_macro_snapshot(&self) -> Result<MacroSnapshot> {
        let batch = self
            .get_latest_batch(&[
                series::FED_FUNDS_RATE,
                series::TREASURY_10Y,
                series::TREASURY_2Y,
                series::YIELD_SPREAD_10Y_2Y,
                series::UNEMPLOYMENT_RATE,
                series::CONSUMER_SENTIMENT,
                series::VIX,
                series::GDP_GROWTH,
            ])
            .await;
        let latest = |id: &str| batch.get(id).map(|o| o.value);

        let fed_funds = latest(series::FED_FUNDS_RATE);
        let treasury_10y = latest(series::TREASURY_10Y);
        let treasury_2y = latest(series::TREASURY_2Y);
        let yield_spread = latest(series::YIELD_SPREAD_10Y_2Y).or(match (treasury_10y, treasury_2y) {
            (Some(ten), Some(two)) => Some(ten - two),
            _ => None,
        });
        let inverted = yield_spread.map(|s| s < 0.0).unwrap_or(false);
        let unemployment = latest(series::UNEMPLOYMENT_RATE);
        let vix = latest(series::VIX);
        let gdp_growth = latest(series::GDP_GROWTH);

        let cpi_yoy = self.get_yoy_change(series::CPI).await.ok();
        let core_pce_yoy = self.get_yoy_change(series::CORE_PCE).await.ok();
        let payroll_change = self.get_latest_change(series::NONFARM_PAYROLLS).await.ok();

        if batch.is_empty() && cpi_yoy.is_none() {
            return Err(ResearchError::FredError("no macro series could be fetched".to_string()));
        }

        Ok(MacroSnapshot {
            rates: InterestRates {
                fed_funds_rate: fed_funds,
                treasury_10y,
                treasury_2y,
                yield_spread,
                yield_curve_inverted: inverted,
            },
            inflation: Inflation {
                cpi_yoy,
                core_pce_yoy,
                trend: inflation_trend(cpi_yoy).to_string(),
            },
            employment: Employment {
                unemployment_rate: unemployment,
                payroll_change,
                labor_market: labor_market(unemployment).to_string(),
            },
            sentiment: MarketSentiment {
                vix,
                consumer_sentiment: latest(series::CONSUMER_SENTIMENT),
                mood: market_mood(vix).to_string(),
            },
            economy: Economy {
                gdp_growth,
                recession_risk: recession_risk(gdp_growth, inverted).to_string(),
            },
            as_of_date: chrono::Utc::now().format("%Y-%m-%d").to_string(),
            assessment: generate_assessment(fed_funds, inverted, cpi_yoy, unemployment, vix),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(values: &[&str]) -> Vec<Observation> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Observation {
                date: format!("2025-{:02}-01", 12 - i.min(11)),
                value: v.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_series_constants() {
        assert_eq!(series::FED_FUNDS_RATE, "FEDFUNDS");
        assert_eq!(series::CPI, "CPIAUCSL");
        assert_eq!(series::UNEMPLOYMENT_RATE, "UNRATE");
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let result = FredClient::from_key(None, Duration::from_secs(5));
        assert!(matches!(result, Err(ResearchError::ConfigError(_))));
        assert!(FredClient::from_key(Some("abc"), Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_percent_change_uses_lagged_value() {
        let mut values = vec!["103.0"];
        values.extend(std::iter::repeat_n("101.0", 11));
        values.push("100.0");
        let change = percent_change(&obs(&values), 12).unwrap();
        assert!((change - 3.0).abs() < 1e-9);

        assert!(percent_change(&obs(&["1.0", "."]), 1).is_none());
    }

    #[test]
    fn test_classifications() {
        assert_eq!(market_mood(Some(30.0)), "fearful");
        assert_eq!(market_mood(Some(12.0)), "greedy");
        assert_eq!(market_mood(None), "neutral");
        assert_eq!(labor_market(Some(3.7)), "tight");
        assert_eq!(inflation_trend(Some(3.1)), "rising");
        assert_eq!(recession_risk(Some(2.0), false), "low");
        assert_eq!(recession_risk(Some(2.0), true), "moderate");
    }

    #[test]
    fn test_generate_assessment() {
        let text = generate_assessment(Some(5.3), true, Some(3.0), Some(3.8), Some(14.0));
        assert!(text.contains("restrictive monetary policy"));
        assert!(text.contains("inverted yield curve"));
        assert!(text.contains("tight labor market"));
        assert_eq!(
            generate_assessment(None, false, None, None, None),
            "Insufficient data for assessment"
        );
    }

    #[tokio::test]
    #[ignore] // Requires API key
    async fn test_get_macro_snapshot() {
        let key = std::env::var("FRED_API_KEY").ok();
        let client = FredClient::from_key(key.as_deref(), Duration::from_secs(30)).unwrap();
        let snapshot = client.get_macro_snapshot().await.unwrap();
        assert!(!snapshot.as_of_date.is_empty());
        assert!(!snapshot.assessment.is_empty());
    }
}
