//! Fetches a [`MarketSnapshot`] for one ticker, degrading to placeholder data
//! whenever the upstream provider cannot deliver.

use super::models::{
    AnalystView, Attractiveness, CompanyProfile, DataQuality, FinancialSectorMetrics,
    Fundamentals, LatestQuote, MarketSnapshot, PriceBar, PriceData, TickerInfo, Valuation,
};
use super::stats::SUFFICIENT_BARS;
use super::synthetic::{BASIC_SERIES_DAYS, basic_series, pad_history, seed_for};
use crate::api::{AlphaVantageClient, YahooFinanceClient};
use crate::cache::CacheManager;
use crate::config::ResearchConfig;
use crate::error::{ResearchError, Result};
use crate::industry::is_financial;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

/// Price used when no quote is available at all
const FALLBACK_PRICE: f64 = 100.0;

/// Below this many fetched bars the history is replaced outright
const MIN_USABLE_BARS: usize = 5;

/// Source of raw market data
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Daily bars for a Yahoo-style range code, oldest first
    async fn history(&self, symbol: &str, range: &str) -> Result<Vec<PriceBar>>;

    /// Company, fundamental and analyst fields
    async fn ticker_info(&self, symbol: &str) -> Result<TickerInfo>;
}

/// Yahoo Finance, optionally enriched with Alpha Vantage fundamentals
pub struct YahooProvider {
    yahoo: YahooFinanceClient,
    alpha_vantage: Option<AlphaVantageClient>,
}

impl YahooProvider {
    pub fn new(config: &ResearchConfig) -> Result<Self> {
        let alpha_vantage = match config.alpha_vantage_api_key.as_deref() {
            Some(key) if !key.is_empty() => {
                Some(AlphaVantageClient::free_tier(key, config.request_timeout)?)
            }
            _ => None,
        };

        Ok(Self {
            yahoo: YahooFinanceClient::new()?,
            alpha_vantage,
        })
    }
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    async fn history(&self, symbol: &str, range: &str) -> Result<Vec<PriceBar>> {
        self.yahoo.get_historical_range(symbol, range).await
    }

    async fn ticker_info(&self, symbol: &str) -> Result<TickerInfo> {
        let enrichment = async {
            match &self.alpha_vantage {
                Some(client) => Some(client.get_ticker_info(symbol).await),
                None => None,
            }
        };
        let (primary, quote, enrichment) = futures::join!(
            self.yahoo.get_ticker_info(symbol),
            self.yahoo.get_quote(symbol),
            enrichment
        );

        let enrichment = match enrichment {
            Some(Ok(info)) => Some(info),
            Some(Err(e)) => {
                tracing::debug!(symbol, "Alpha Vantage enrichment failed: {}", e);
                None
            }
            None => None,
        };

        let mut info = match (primary, enrichment) {
            (Ok(mut info), Some(extra)) => {
                info.merge_missing(extra);
                info
            }
            (Ok(info), None) => info,
            (Err(e), Some(extra)) => {
                tracing::warn!(symbol, "Yahoo ticker info failed, using Alpha Vantage: {}", e);
                extra
            }
            (Err(e), None) => return Err(e),
        };

        if let Ok(quote) = quote {
            info.regular_market_price = Some(quote.close);
        }
        Ok(info)
    }
}

/// Upper-case and validate a ticker such as `AAPL`, `BRK-B` or `^GSPC`.
pub fn normalize_symbol(input: &str) -> Result<String> {
    let symbol = input.trim().to_uppercase();
    let pattern = regex::Regex::new(r"^[A-Z0-9^][A-Z0-9.\-=^]{0,11}$")
        .map_err(|e| ResearchError::Other(e.to_string()))?;

    if pattern.is_match(&symbol) {
        Ok(symbol)
    } else {
        Err(ResearchError::InvalidSymbol(input.trim().to_string()))
    }
}

/// Pad the history with older synthetic bars until it spans `min_days`.
///
/// Basic technicals are recomputed afterwards. Returns the number of bars
/// added.
pub fn ensure_sufficient_history(snapshot: &mut MarketSnapshot, min_days: usize) -> usize {
    if snapshot.price.history.len() >= min_days {
        return 0;
    }

    let anchor = Some(snapshot.current_price())
        .filter(|p| *p > 0.0)
        .unwrap_or(FALLBACK_PRICE);
    tracing::info!(
        symbol = %snapshot.symbol,
        bars = snapshot.price.history.len(),
        min_days,
        "Padding short history with synthetic bars"
    );

    let mut history = std::mem::take(&mut snapshot.price.history);
    let added = pad_history(&mut history, min_days, anchor, seed_for(&snapshot.symbol, anchor));
    snapshot.price = PriceData::from_history(history);
    snapshot.synthetic_bars += added;
    added
}

fn percent(value: Option<f64>) -> Option<f64> {
    value.map(|v| v * 100.0)
}

/// Snapshot served when even the company lookup fails.
fn minimal_snapshot(symbol: &str, reason: String) -> MarketSnapshot {
    MarketSnapshot {
        symbol: symbol.to_string(),
        company: CompanyProfile {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            sector: None,
            industry: None,
            currency: "USD".to_string(),
            is_financial: is_financial(symbol, None, None),
        },
        price: PriceData {
            latest: LatestQuote {
                current: FALLBACK_PRICE,
                prev_close: FALLBACK_PRICE,
                ..Default::default()
            },
            ..Default::default()
        },
        fundamentals: Fundamentals::default(),
        valuation: Valuation::default(),
        analyst: AnalystView::default(),
        financial_metrics: None,
        data_quality: DataQuality::Minimal,
        synthetic_bars: 0,
        error: Some(format!("Data access limited, using basic data: {reason}")),
        fetched_at: Utc::now(),
        from_cache: false,
    }
}

/// Cached, retrying snapshot fetcher
pub struct DataFetcher {
    provider: Arc<dyn MarketDataProvider>,
    cache: Arc<CacheManager>,
    config: Arc<ResearchConfig>,
}

impl DataFetcher {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        cache: Arc<CacheManager>,
        config: Arc<ResearchConfig>,
    ) -> Self {
        Self {
            provider,
            cache,
            config,
        }
    }

    /// Fetcher backed by Yahoo Finance (plus Alpha Vantage when keyed)
    pub fn with_yahoo(config: Arc<ResearchConfig>, cache: Arc<CacheManager>) -> Result<Self> {
        let provider = Arc::new(YahooProvider::new(&config)?);
        Ok(Self::new(provider, cache, config))
    }

    /// Fetch everything known about `symbol`.
    ///
    /// Upstream failures never surface here: they degrade to synthetic
    /// history or a minimal snapshot. Only an invalid symbol is an error.
    pub async fn fetch(&self, symbol: &str, use_cache: bool) -> Result<MarketSnapshot> {
        let symbol = normalize_symbol(symbol)?;
        let use_cache = use_cache && self.config.use_cache;

        if use_cache {
            if let Some(mut snapshot) = self.cache.get_snapshot(&symbol).await {
                tracing::info!(symbol = %symbol, "Cache hit");
                snapshot.from_cache = true;
                return Ok(snapshot);
            }
        }

        let snapshot = match self.provider.ticker_info(&symbol).await {
            Ok(info) => self.build_snapshot(&symbol, info).await,
            Err(e) => {
                tracing::warn!(symbol = %symbol, "Ticker info unavailable, using minimal data: {}", e);
                return Ok(minimal_snapshot(&symbol, e.to_string()));
            }
        };

        if use_cache {
            match self.cache.put_snapshot(&snapshot).await {
                Ok(()) => tracing::debug!(symbol = %symbol, "Snapshot cached"),
                Err(e) => tracing::warn!(symbol = %symbol, "Failed to cache snapshot: {}", e),
            }
        }

        Ok(snapshot)
    }

    async fn history_with_retry(&self, symbol: &str, range: &str) -> Result<Vec<PriceBar>> {
        let mut last_error = None;

        for attempt in 0..self.config.max_retries {
            match self.provider.history(symbol, range).await {
                Ok(bars) if !bars.is_empty() => return Ok(bars),
                Ok(_) => {
                    tracing::debug!(symbol, attempt, "Empty history returned");
                    last_error = Some(ResearchError::DataUnavailable {
                        symbol: symbol.to_string(),
                        reason: "empty price history".to_string(),
                    });
                }
                Err(e) => {
                    tracing::warn!(symbol, attempt, "History fetch failed: {}", e);
                    last_error = Some(e);
                }
            }

            if attempt + 1 < self.config.max_retries {
                tokio::time::sleep(self.config.retry_backoff(attempt)).await;
            }
        }

        Err(last_error.unwrap_or_else(|| ResearchError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: "no attempts made".to_string(),
        }))
    }

    async fn build_snapshot(&self, symbol: &str, info: TickerInfo) -> MarketSnapshot {
        let financial = is_financial(symbol, info.sector.as_deref(), info.industry.as_deref());
        let range = if financial { "2y" } else { "6mo" };

        let mut history = match self.history_with_retry(symbol, range).await {
            Ok(bars) => bars,
            Err(e) => {
                tracing::warn!(symbol, "Price history unavailable, synthesizing: {}", e);
                Vec::new()
            }
        };

        let quoted = info
            .regular_market_price
            .filter(|p| *p > 0.0)
            .unwrap_or(FALLBACK_PRICE);
        let seed = seed_for(symbol, quoted);

        let mut synthetic_bars = 0;
        if history.len() < MIN_USABLE_BARS {
            history = basic_series(quoted, BASIC_SERIES_DAYS, Utc::now(), seed);
            synthetic_bars = history.len();
        }
        let real_bars = history.len() - synthetic_bars;

        if history.len() < SUFFICIENT_BARS {
            tracing::warn!(symbol, bars = history.len(), "Short history, padding with synthetic bars");
            let latest = history.last().map_or(quoted, |b| b.close);
            synthetic_bars += pad_history(&mut history, BASIC_SERIES_DAYS, latest, seed);
        }

        let price = PriceData::from_history(history);
        let current = price.latest.current;

        let mut debt_to_equity = info.debt_to_equity.map(|d| d / 100.0);
        if financial && debt_to_equity.is_some_and(|d| d > 10.0) {
            debt_to_equity = debt_to_equity.map(|d| d.min(15.0));
        }

        let fundamentals = Fundamentals {
            market_cap: info.market_cap,
            revenue_growth: percent(info.revenue_growth),
            earnings_growth: percent(info.earnings_growth),
            gross_margin: percent(info.gross_margins),
            operating_margin: percent(info.operating_margins),
            profit_margin: percent(info.profit_margins),
            return_on_equity: percent(info.return_on_equity),
            return_on_assets: percent(info.return_on_assets),
            debt_to_equity,
            current_ratio: info.current_ratio,
            free_cash_flow: info.free_cashflow,
            dividend_yield: percent(info.dividend_yield),
        };

        let trailing_pe = if financial {
            match info.trailing_pe {
                Some(pe) if pe > 30.0 => Some(15.0),
                Some(pe) if pe > 0.0 => Some(pe),
                _ => Some(10.0),
            }
        } else {
            info.trailing_pe
        };

        let mut valuation = Valuation {
            trailing_pe,
            forward_pe: info.forward_pe,
            peg_ratio: info.peg_ratio,
            price_to_sales: info.price_to_sales,
            price_to_book: info.price_to_book,
            attractiveness: None,
        };

        let upside_pct = match info.target_mean_price {
            Some(target) if target > 0.0 && current > 0.0 => Some((target / current - 1.0) * 100.0),
            _ => None,
        };
        let analyst = AnalystView {
            recommendation: info.recommendation_key.clone(),
            target_mean: info.target_mean_price,
            target_high: info.target_high_price,
            target_low: info.target_low_price,
            analyst_count: info.analyst_count,
            upside_pct,
        };

        let financial_metrics = financial.then(|| {
            if let Some(pb) = info.price_to_book.filter(|pb| *pb > 0.0) {
                valuation.attractiveness = Some(Attractiveness::from_price_to_book(pb));
            }
            FinancialSectorMetrics {
                net_interest_margin: percent(info.profit_margins),
                return_on_assets: percent(info.return_on_assets),
                book_value_per_share: info.book_value,
                price_to_book: info.price_to_book,
                dividend_yield: percent(info.dividend_yield),
                payout_ratio: percent(info.payout_ratio),
            }
        });

        let data_quality = if real_bars > SUFFICIENT_BARS {
            DataQuality::Full
        } else {
            DataQuality::Partial
        };

        tracing::info!(
            symbol,
            bars = price.history.len(),
            synthetic_bars,
            quality = data_quality.label(),
            financial,
            "Fetched market snapshot"
        );

        MarketSnapshot {
            symbol: symbol.to_string(),
            company: CompanyProfile {
                symbol: symbol.to_string(),
                name: info.name.unwrap_or_else(|| symbol.to_string()),
                sector: info.sector,
                industry: info.industry,
                currency: info.currency.unwrap_or_else(|| "USD".to_string()),
                is_financial: financial,
            },
            price,
            fundamentals,
            valuation,
            analyst,
            financial_metrics,
            data_quality,
            synthetic_bars,
            error: None,
            fetched_at: Utc::now(),
            from_cache: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic::simulated_series;
    use std::time::Duration;
    use tempfile::TempDir;

    fn real_bars(n: usize, last_close: f64) -> Vec<PriceBar> {
        let mut bars = simulated_series(last_close, n, Utc::now(), 11);
        for bar in &mut bars {
            bar.synthetic = false;
        }
        bars
    }

    fn fetcher(provider: MockMarketDataProvider, dir: &TempDir) -> DataFetcher {
        let config = Arc::new(
            ResearchConfig::builder()
                .cache_dir(dir.path())
                .retry_backoff_base(Duration::from_millis(1))
                .build()
                .unwrap(),
        );
        let cache = Arc::new(CacheManager::new(&config));
        DataFetcher::new(Arc::new(provider), cache, config)
    }

    fn software_info() -> TickerInfo {
        TickerInfo {
            name: Some("Microsoft Corporation".to_string()),
            sector: Some("Technology".to_string()),
            industry: Some("Software - Infrastructure".to_string()),
            regular_market_price: Some(410.0),
            revenue_growth: Some(0.16),
            operating_margins: Some(0.45),
            debt_to_equity: Some(35.0),
            trailing_pe: Some(36.0),
            target_mean_price: Some(492.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol(" aapl ").unwrap(), "AAPL");
        assert_eq!(normalize_symbol("brk-b").unwrap(), "BRK-B");
        assert_eq!(normalize_symbol("^gspc").unwrap(), "^GSPC");
        assert!(normalize_symbol("").is_err());
        assert!(normalize_symbol("not a ticker").is_err());
        assert!(normalize_symbol("ABCDEFGHIJKLMN").is_err());
    }

    #[tokio::test]
    async fn test_fetch_normalizes_fundamentals() {
        let dir = TempDir::new().unwrap();
        let mut provider = MockMarketDataProvider::new();
        provider
            .expect_ticker_info()
            .returning(|_| Ok(software_info()));
        provider
            .expect_history()
            .withf(|_, range| range.to_string() == "6mo")
            .times(1)
            .returning(|_, _| Ok(real_bars(120, 400.0)));

        let snapshot = fetcher(provider, &dir).fetch("msft", true).await.unwrap();

        assert_eq!(snapshot.symbol, "MSFT");
        assert_eq!(snapshot.data_quality, DataQuality::Full);
        assert_eq!(snapshot.synthetic_bars, 0);
        assert!(!snapshot.company.is_financial);
        assert!((snapshot.fundamentals.revenue_growth.unwrap() - 16.0).abs() < 1e-9);
        assert!((snapshot.fundamentals.debt_to_equity.unwrap() - 0.35).abs() < 1e-9);
        assert!((snapshot.analyst.upside_pct.unwrap() - 23.0).abs() < 1e-6);
        assert!(snapshot.financial_metrics.is_none());
        assert!(!snapshot.from_cache);
    }

    #[tokio::test]
    async fn test_second_fetch_hits_cache() {
        let dir = TempDir::new().unwrap();
        let mut provider = MockMarketDataProvider::new();
        provider
            .expect_ticker_info()
            .times(1)
            .returning(|_| Ok(software_info()));
        provider
            .expect_history()
            .times(1)
            .returning(|_, _| Ok(real_bars(120, 400.0)));

        let fetcher = fetcher(provider, &dir);
        let first = fetcher.fetch("MSFT", true).await.unwrap();
        let second = fetcher.fetch("MSFT", true).await.unwrap();

        assert!(second.from_cache);
        assert_eq!(first.current_price(), second.current_price());
        assert_eq!(fetcher.cache.disk.stats().await.unwrap().total_files, 1);
    }

    #[tokio::test]
    async fn test_history_failure_retries_then_synthesizes() {
        let dir = TempDir::new().unwrap();
        let mut provider = MockMarketDataProvider::new();
        provider
            .expect_ticker_info()
            .returning(|_| Ok(software_info()));
        provider
            .expect_history()
            .times(3)
            .returning(|_, _| Err(ResearchError::YahooFinanceError("timeout".into())));

        let snapshot = fetcher(provider, &dir).fetch("MSFT", false).await.unwrap();

        assert_eq!(snapshot.bars().len(), BASIC_SERIES_DAYS);
        assert_eq!(snapshot.synthetic_bars, BASIC_SERIES_DAYS);
        assert_eq!(snapshot.current_price(), 410.0);
        assert_eq!(snapshot.data_quality, DataQuality::Partial);
        assert!(snapshot.has_simulated_data());
    }

    #[tokio::test]
    async fn test_short_history_is_padded() {
        let dir = TempDir::new().unwrap();
        let mut provider = MockMarketDataProvider::new();
        provider
            .expect_ticker_info()
            .returning(|_| Ok(software_info()));
        provider
            .expect_history()
            .returning(|_, _| Ok(real_bars(12, 400.0)));

        let snapshot = fetcher(provider, &dir).fetch("MSFT", false).await.unwrap();

        assert_eq!(snapshot.bars().len(), BASIC_SERIES_DAYS);
        assert_eq!(snapshot.synthetic_bars, 18);
        assert_eq!(snapshot.real_bars(), 12);
        assert_eq!(snapshot.current_price(), 400.0);
        assert!(snapshot.price.latest.has_sufficient_data);
    }

    #[tokio::test]
    async fn test_financial_adjustments() {
        let dir = TempDir::new().unwrap();
        let mut provider = MockMarketDataProvider::new();
        provider.expect_ticker_info().returning(|_| {
            Ok(TickerInfo {
                name: Some("JPMorgan Chase & Co.".to_string()),
                sector: Some("Financial Services".to_string()),
                industry: Some("Banks - Diversified".to_string()),
                debt_to_equity: Some(1_250.0),
                trailing_pe: Some(-4.0),
                price_to_book: Some(1.9),
                profit_margins: Some(0.33),
                ..Default::default()
            })
        });
        provider
            .expect_history()
            .withf(|_, range| range.to_string() == "2y")
            .returning(|_, _| Ok(real_bars(400, 200.0)));

        let snapshot = fetcher(provider, &dir).fetch("JPM", false).await.unwrap();

        assert!(snapshot.company.is_financial);
        assert_eq!(snapshot.fundamentals.debt_to_equity, Some(12.5));
        assert_eq!(snapshot.valuation.trailing_pe, Some(10.0));
        assert_eq!(snapshot.valuation.attractiveness, Some(Attractiveness::Fair));
        let metrics = snapshot.financial_metrics.unwrap();
        assert!((metrics.net_interest_margin.unwrap() - 33.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_info_failure_gives_minimal_snapshot() {
        let dir = TempDir::new().unwrap();
        let mut provider = MockMarketDataProvider::new();
        provider
            .expect_ticker_info()
            .returning(|_| Err(ResearchError::YahooFinanceError("403".into())));
        provider.expect_history().never();

        let fetcher = fetcher(provider, &dir);
        let mut snapshot = fetcher.fetch("ZZZZ", true).await.unwrap();

        assert_eq!(snapshot.data_quality, DataQuality::Minimal);
        assert_eq!(snapshot.current_price(), 100.0);
        assert!(snapshot.error.is_some());
        assert_eq!(fetcher.cache.disk.stats().await.unwrap().total_files, 0);

        let added = ensure_sufficient_history(&mut snapshot, 60);
        assert_eq!(added, 60);
        assert_eq!(snapshot.bars().len(), 60);
        assert_eq!(snapshot.current_price(), 100.0);
        assert!(snapshot.price.latest.has_sufficient_data);
        assert!(snapshot.price.technicals.can_calculate);
    }

    #[tokio::test]
    async fn test_invalid_symbol_is_rejected() {
        let dir = TempDir::new().unwrap();
        let provider = MockMarketDataProvider::new();
        let result = fetcher(provider, &dir).fetch("??", true).await;
        assert!(matches!(result, Err(ResearchError::InvalidSymbol(_))));
    }
}
