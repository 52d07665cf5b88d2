//! Yahoo Finance API client

use crate::data::{PriceBar, TickerInfo};
use crate::error::{ResearchError, Result};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::Mutex;
use yahoo_finance_api as yahoo;

/// Yahoo Finance API client
///
/// The connector keeps a session cookie for the quote-summary endpoint, so
/// access to it is serialized.
pub struct YahooFinanceClient {
    connector: Mutex<yahoo::YahooConnector>,
}

/// Latest quote for a symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub adjclose: f64,
}

fn timestamp_of(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
}

/// Start of the window for a Yahoo-style range code (`6mo`, `2y`, ...)
pub fn range_start(range: &str, end: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let days = match range {
        "1d" => 1,
        "5d" => 5,
        "1mo" => 30,
        "3mo" => 90,
        "6mo" => 180,
        "1y" => 365,
        "2y" => 730,
        "5y" => 1825,
        "10y" => 3650,
        "ytd" => {
            return chrono::NaiveDate::from_ymd_opt(end.year(), 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|d| d.and_utc())
                .ok_or_else(|| ResearchError::Other(format!("Invalid year: {}", end.year())));
        }
        "max" => 36500,
        _ => return Err(ResearchError::Other(format!("Invalid range: {}", range))),
    };
    Ok(end - chrono::Duration::days(days))
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new() -> Result<Self> {
        Ok(Self {
            connector: Mutex::new(yahoo::YahooConnector::new()?),
        })
    }

    /// Get the latest quote for a symbol
    pub async fn get_quote(&self, symbol: &str) -> Result<Quote> {
        let connector = self.connector.lock().await;
        let response = connector.get_latest_quotes(symbol, "1d").await?;
        let quote = response.last_quote()?;

        Ok(Quote {
            symbol: symbol.to_string(),
            timestamp: timestamp_of(quote.timestamp as i64),
            open: quote.open,
            high: quote.high,
            low: quote.low,
            close: quote.close,
            volume: quote.volume,
            adjclose: quote.adjclose,
        })
    }

    /// Daily bars between `start` and `end`, oldest first
    pub async fn get_historical_quotes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PriceBar>> {
        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| ResearchError::YahooFinanceError(format!("Invalid start timestamp: {}", e)))?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| ResearchError::YahooFinanceError(format!("Invalid end timestamp: {}", e)))?;

        let connector = self.connector.lock().await;
        let response = connector.get_quote_history(symbol, start_odt, end_odt).await?;
        let quotes = response.quotes()?;

        let mut bars: Vec<PriceBar> = quotes
            .iter()
            .filter(|q| q.close.is_finite() && q.close > 0.0)
            .map(|q| PriceBar {
                timestamp: timestamp_of(q.timestamp as i64),
                open: q.open,
                high: q.high,
                low: q.low,
                close: q.close,
                volume: q.volume as f64,
                synthetic: false,
            })
            .collect();
        bars.sort_by_key(|b| b.timestamp);
        Ok(bars)
    }

    /// Daily bars for a range code such as `6mo` or `2y`
    pub async fn get_historical_range(&self, symbol: &str, range: &str) -> Result<Vec<PriceBar>> {
        let end = Utc::now();
        let start = range_start(range, end)?;
        self.get_historical_quotes(symbol, start, end).await
    }

    /// Company profile, fundamentals and valuation from the quote-summary endpoint
    pub async fn get_ticker_info(&self, symbol: &str) -> Result<TickerInfo> {
        let mut connector = self.connector.lock().await;
        let summary = connector.get_ticker_info(symbol).await?;

        let data = summary
            .quote_summary
            .and_then(|qs| qs.result)
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| ResearchError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "empty quote summary".to_string(),
            })?;

        let info = ticker_info_from_summary(data);
        tracing::debug!(
            symbol,
            name = ?info.name,
            sector = ?info.sector,
            analysts = ?info.analyst_count,
            "Fetched ticker info"
        );
        Ok(info)
    }
}

/// Map one quote-summary result onto [`TickerInfo`].
///
/// Ratios stay as Yahoo reports them (fractions); scaling happens in the fetcher.
pub fn ticker_info_from_summary(data: yahoo::YSummaryData) -> TickerInfo {
    let mut info = TickerInfo::default();

    if let Some(quote_type) = data.quote_type {
        info.name = quote_type.long_name.or(quote_type.short_name);
    }

    if let Some(profile) = data.asset_profile {
        info.sector = profile.sector;
        info.industry = profile.industry;
    }

    if let Some(detail) = data.summary_detail {
        info.trailing_pe = detail.trailing_pe.filter(|pe| pe.is_finite());
        info.forward_pe = detail.forward_pe.filter(|pe| pe.is_finite());
        info.price_to_sales = detail
            .price_to_sales_trailing12months
            .filter(|ps| ps.is_finite());
        info.dividend_yield = detail.dividend_yield;
        info.payout_ratio = detail.payout_ratio;
        info.market_cap = detail.market_cap.map(|c| c as f64);
        info.currency = detail.currency;
    }

    if let Some(financial) = data.financial_data {
        info.regular_market_price = financial.current_price;
        info.return_on_equity = financial.return_on_equity;
        info.return_on_assets = financial.return_on_assets;
        info.gross_margins = financial.gross_margins;
        info.operating_margins = financial.operating_margins;
        info.profit_margins = financial.profit_margins;
        info.debt_to_equity = financial.debt_to_equity;
        info.current_ratio = financial.current_ratio;
        info.revenue_growth = financial.revenue_growth;
        info.earnings_growth = financial.earnings_growth;
        info.free_cashflow = financial.free_cashflow.map(|fcf| fcf as f64);
        info.target_mean_price = financial.target_mean_price;
        info.target_high_price = financial.target_high_price;
        info.target_low_price = financial.target_low_price;
        // "none" means no coverage
        info.recommendation_key = financial
            .recommendation_key
            .filter(|key| !key.is_empty() && key != "none");
        info.analyst_count = financial
            .number_of_analyst_opinions
            .and_then(|n| u32::try_from(n).ok());
    }

    if let Some(stats) = data.default_key_statistics {
        info.book_value = stats.book_value;
        info.price_to_book = stats.price_to_book;
        if info.forward_pe.is_none() {
            info.forward_pe = stats.forward_pe.filter(|pe| pe.is_finite());
        }
    }

    info
}
