//! Alpha Vantage API client
//!
//! Used to enrich Yahoo data with fields the quote summary often lacks:
//! PEG, price/sales, free cash flow and sell-side ratings.

use crate::data::TickerInfo;
use crate::error::{ResearchError, Result};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

const BASE_URL: &str = "https://www.alphavantage.co/query";

/// Requests per minute on the free tier
const FREE_TIER_RATE: u32 = 5;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Alpha Vantage API client
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    rate_limiter: SharedRateLimiter,
}

/// Company overview; every numeric field arrives as a string and may be `"None"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CompanyOverview {
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub currency: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub market_capitalization: Option<String>,
    #[serde(rename = "PERatio")]
    pub pe_ratio: Option<String>,
    #[serde(rename = "ForwardPE")]
    pub forward_pe: Option<String>,
    #[serde(rename = "PEGRatio")]
    pub peg_ratio: Option<String>,
    #[serde(rename = "PriceToSalesRatioTTM")]
    pub price_to_sales: Option<String>,
    pub price_to_book_ratio: Option<String>,
    pub book_value: Option<String>,
    pub dividend_yield: Option<String>,
    pub dividend_per_share: Option<String>,
    #[serde(rename = "EPS")]
    pub eps: Option<String>,
    pub profit_margin: Option<String>,
    #[serde(rename = "OperatingMarginTTM")]
    pub operating_margin: Option<String>,
    #[serde(rename = "ReturnOnAssetsTTM")]
    pub return_on_assets: Option<String>,
    #[serde(rename = "ReturnOnEquityTTM")]
    pub return_on_equity: Option<String>,
    #[serde(rename = "QuarterlyRevenueGrowthYOY")]
    pub revenue_growth: Option<String>,
    #[serde(rename = "QuarterlyEarningsGrowthYOY")]
    pub earnings_growth: Option<String>,
    pub analyst_target_price: Option<String>,
    pub analyst_rating_strong_buy: Option<String>,
    pub analyst_rating_buy: Option<String>,
    pub analyst_rating_hold: Option<String>,
    pub analyst_rating_sell: Option<String>,
    pub analyst_rating_strong_sell: Option<String>,
}

/// Annual cash flow statement entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowReport {
    pub fiscal_date_ending: Option<String>,
    pub operating_cashflow: Option<String>,
    pub capital_expenditures: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CashFlowResponse {
    #[serde(default)]
    annual_reports: Vec<CashFlowReport>,
}

/// Parse an Alpha Vantage numeric string; `"None"`, `"-"` and blanks are missing.
fn parse_number(raw: &Option<String>) -> Option<f64> {
    let raw = raw.as_deref()?.trim();
    match raw {
        "" | "None" | "-" | "N/A" => None,
        value => value.parse().ok().filter(|v: &f64| v.is_finite()),
    }
}

impl CashFlowReport {
    /// Operating cash flow minus capital expenditures
    pub fn free_cash_flow(&self) -> Option<f64> {
        let operating = parse_number(&self.operating_cashflow)?;
        let capex = parse_number(&self.capital_expenditures).unwrap_or(0.0);
        Some(operating - capex.abs())
    }
}

impl CompanyOverview {
    /// Map the five rating buckets onto a Yahoo-style recommendation key.
    pub fn recommendation_key(&self) -> Option<(String, u32)> {
        let counts = [
            &self.analyst_rating_strong_buy,
            &self.analyst_rating_buy,
            &self.analyst_rating_hold,
            &self.analyst_rating_sell,
            &self.analyst_rating_strong_sell,
        ]
        .map(|c| parse_number(c).unwrap_or(0.0).max(0.0));

        let total: f64 = counts.iter().sum();
        if total <= 0.0 {
            return None;
        }

        let weighted: f64 = counts
            .iter()
            .enumerate()
            .map(|(i, n)| (i as f64 + 1.0) * n)
            .sum::<f64>()
            / total;

        let key = match weighted {
            w if w <= 1.5 => "strong_buy",
            w if w <= 2.5 => "buy",
            w if w <= 3.5 => "hold",
            w if w <= 4.5 => "sell",
            _ => "strong_sell",
        };
        Some((key.to_string(), total as u32))
    }

    /// Convert into provider-neutral ticker info.
    pub fn into_ticker_info(self) -> TickerInfo {
        let payout_ratio = match (
            parse_number(&self.dividend_per_share),
            parse_number(&self.eps),
        ) {
            (Some(dps), Some(eps)) if eps > 0.0 => Some(dps / eps),
            _ => None,
        };
        let recommendation = self.recommendation_key();

        TickerInfo {
            name: self.name.clone().filter(|n| !n.is_empty()),
            sector: self.sector.clone().filter(|s| !s.is_empty() && s != "None"),
            industry: self.industry.clone().filter(|s| !s.is_empty() && s != "None"),
            currency: self.currency.clone(),
            market_cap: parse_number(&self.market_capitalization),
            trailing_pe: parse_number(&self.pe_ratio),
            forward_pe: parse_number(&self.forward_pe),
            peg_ratio: parse_number(&self.peg_ratio),
            price_to_sales: parse_number(&self.price_to_sales),
            price_to_book: parse_number(&self.price_to_book_ratio),
            book_value: parse_number(&self.book_value),
            dividend_yield: parse_number(&self.dividend_yield),
            payout_ratio,
            revenue_growth: parse_number(&self.revenue_growth),
            earnings_growth: parse_number(&self.earnings_growth),
            operating_margins: parse_number(&self.operating_margin),
            profit_margins: parse_number(&self.profit_margin),
            return_on_equity: parse_number(&self.return_on_equity),
            return_on_assets: parse_number(&self.return_on_assets),
            target_mean_price: parse_number(&self.analyst_target_price),
            recommendation_key: recommendation.as_ref().map(|(k, _)| k.clone()),
            analyst_count: recommendation.map(|(_, n)| n),
            ..Default::default()
        }
    }
}

impl AlphaVantageClient {
    /// Create a new Alpha Vantage client with API key and rate limit
    ///
    /// # Arguments
    /// * `api_key` - Alpha Vantage API key
    /// * `rate_limit` - Maximum requests per minute (5 on the free tier)
    pub fn new(api_key: impl Into<String>, rate_limit: u32, timeout: Duration) -> Result<Self> {
        let quota = Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN));
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    /// Create a free-tier client for `api_key`
    pub fn free_tier(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Self::new(api_key, FREE_TIER_RATE, timeout)
    }

    async fn query(&self, function: &str, symbol: &str) -> Result<serde_json::Value> {
        self.rate_limiter.until_ready().await;

        let mut params = HashMap::new();
        params.insert("function", function);
        params.insert("symbol", symbol);
        params.insert("apikey", &self.api_key);

        let response = self.client.get(BASE_URL).query(&params).send().await?;
        if !response.status().is_success() {
            return Err(ResearchError::AlphaVantageError(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let data: serde_json::Value = response.json().await?;
        check_payload(symbol, data)
    }

    /// Get company overview and fundamental data
    pub async fn get_company_overview(&self, symbol: &str) -> Result<CompanyOverview> {
        let data = self.query("OVERVIEW", symbol).await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Latest annual free cash flow
    pub async fn get_free_cash_flow(&self, symbol: &str) -> Result<Option<f64>> {
        let data = self.query("CASH_FLOW", symbol).await?;
        let response: CashFlowResponse = serde_json::from_value(data)?;
        Ok(response
            .annual_reports
            .first()
            .and_then(CashFlowReport::free_cash_flow))
    }

    /// Overview plus cash flow, as ticker info
    pub async fn get_ticker_info(&self, symbol: &str) -> Result<TickerInfo> {
        let mut info = self.get_company_overview(symbol).await?.into_ticker_info();
        match self.get_free_cash_flow(symbol).await {
            Ok(fcf) => info.free_cashflow = fcf,
            Err(e) => tracing::debug!(symbol, "Alpha Vantage cash flow unavailable: {}", e),
        }
        Ok(info)
    }
}

/// Reject error, throttling and empty payloads.
fn check_payload(symbol: &str, data: serde_json::Value) -> Result<serde_json::Value> {
    if let Some(error) = data.get("Error Message") {
        return Err(ResearchError::AlphaVantageError(error.to_string()));
    }

    if data.get("Note").is_some() || data.get("Information").is_some() {
        return Err(ResearchError::RateLimitExceeded {
            provider: "Alpha Vantage".to_string(),
        });
    }

    if data.as_object().map(|o| o.is_empty()).unwrap_or(true) {
        return Err(ResearchError::InvalidSymbol(symbol.to_string()));
    }

    Ok(data)
}
