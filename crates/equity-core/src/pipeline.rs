//! End-to-end research flow shared by the CLI, the REPL and the dashboard

use crate::api::{FredClient, MacroSnapshot};
use crate::backtest::{BacktestReport, DualMomentumBacktester};
use crate::cache::{CacheManager, CacheStats};
use crate::config::ResearchConfig;
use crate::data::{
    AnalystView, DataFetcher, MarketDataProvider, MarketSnapshot, ensure_sufficient_history,
    normalize_symbol,
};
use crate::engine::{AnalysisResult, IndustryAnalyzer};
use crate::error::Result;
use crate::industry::{Industry, detect_industry};
use crate::report::{ReportGenerator, ResearchReport, save_report};
use crate::search::{StockDatabase, StockSearcher};
use crate::technical::{ChartPoint, chart_series};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Per-request switches for [`ResearchPipeline::analyze`]
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub use_cache: bool,
    /// Skip detection and score against this industry
    pub industry: Option<Industry>,
    pub save_report: bool,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            industry: None,
            save_report: true,
        }
    }
}

/// Ticker after normalization and optional auto-correction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSymbol {
    pub symbol: String,
    /// What the user typed, when it was corrected
    pub corrected_from: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResearchOutcome {
    pub symbol: ResolvedSymbol,
    pub industry: Industry,
    pub snapshot: MarketSnapshot,
    pub analysis: AnalysisResult,
    pub report: ResearchReport,
    pub report_path: Option<PathBuf>,
    pub cache_hit: bool,
    pub elapsed: Duration,
}

impl ResearchOutcome {
    pub fn analyst_targets(&self) -> &AnalystView {
        &self.snapshot.analyst
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BacktestOutcome {
    pub symbol: ResolvedSymbol,
    pub company_name: String,
    /// Bars in the tested history that were synthesized
    pub simulated_bars: usize,
    pub report: BacktestReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartOutcome {
    pub symbol: ResolvedSymbol,
    pub simulated_bars: usize,
    pub points: Vec<ChartPoint>,
}

pub struct ResearchPipeline {
    config: Arc<ResearchConfig>,
    cache: Arc<CacheManager>,
    fetcher: DataFetcher,
    searcher: StockSearcher,
    reports: ReportGenerator,
}

impl ResearchPipeline {
    /// Yahoo-backed pipeline with the stock database loaded from disk.
    pub async fn new(config: ResearchConfig) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);
        let cache = Arc::new(CacheManager::new(&config));
        let fetcher = DataFetcher::with_yahoo(Arc::clone(&config), Arc::clone(&cache))?;
        let database = StockDatabase::load(&config.database_path).await;

        Ok(Self::assemble(config, cache, fetcher, database))
    }

    /// Pipeline over an arbitrary data provider and database
    pub fn with_provider(
        config: ResearchConfig,
        provider: Arc<dyn MarketDataProvider>,
        database: StockDatabase,
    ) -> Self {
        let config = Arc::new(config);
        let cache = Arc::new(CacheManager::new(&config));
        let fetcher = DataFetcher::new(provider, Arc::clone(&cache), Arc::clone(&config));
        Self::assemble(config, cache, fetcher, database)
    }

    fn assemble(
        config: Arc<ResearchConfig>,
        cache: Arc<CacheManager>,
        fetcher: DataFetcher,
        database: StockDatabase,
    ) -> Self {
        Self {
            config,
            cache,
            fetcher,
            searcher: StockSearcher::new(database),
            reports: ReportGenerator::new(),
        }
    }

    pub fn config(&self) -> &ResearchConfig {
        &self.config
    }

    pub fn searcher(&self) -> &StockSearcher {
        &self.searcher
    }

    /// Map user input to a ticker.
    ///
    /// Known symbols pass through. Anything else is offered to the fuzzy
    /// search, and a confident match replaces it. Input that is neither a
    /// match nor a well-formed ticker is rejected.
    pub fn resolve_symbol(&self, input: &str) -> Result<ResolvedSymbol> {
        let trimmed = input.trim();
        let normalized = normalize_symbol(trimmed);

        if let Ok(symbol) = &normalized {
            if self.searcher.database().get(symbol).is_some() {
                return Ok(ResolvedSymbol {
                    symbol: symbol.clone(),
                    corrected_from: None,
                });
            }
        }

        if let Some(hit) = self.searcher.auto_correct(trimmed) {
            tracing::info!(input = trimmed, symbol = %hit.stock.symbol, score = hit.score, "Auto-corrected ticker");
            return Ok(ResolvedSymbol {
                symbol: hit.stock.symbol,
                corrected_from: Some(trimmed.to_string()),
            });
        }

        normalized.map(|symbol| ResolvedSymbol {
            symbol,
            corrected_from: None,
        })
    }

    /// Fetch, score and write up one ticker.
    pub async fn analyze(&self, input: &str, options: &AnalyzeOptions) -> Result<ResearchOutcome> {
        let started = Instant::now();
        let symbol = self.resolve_symbol(input)?;
        tracing::info!(symbol = %symbol.symbol, use_cache = options.use_cache, "Starting analysis");

        let mut snapshot = self.fetcher.fetch(&symbol.symbol, options.use_cache).await?;
        let cache_hit = snapshot.from_cache;
        ensure_sufficient_history(&mut snapshot, self.config.min_history_days);

        let industry = options.industry.unwrap_or_else(|| {
            detect_industry(
                &snapshot.symbol,
                snapshot.company.sector.as_deref(),
                snapshot.company.industry.as_deref(),
            )
        });

        let analysis = IndustryAnalyzer::new(industry).analyze(&snapshot)?;
        let report = self.reports.generate(&snapshot, &analysis, industry);

        let report_path = if options.save_report {
            match save_report(&self.config.output_dir, &report).await {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!(symbol = %symbol.symbol, "Failed to save report: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let elapsed = started.elapsed();
        tracing::info!(
            symbol = %symbol.symbol,
            industry = %industry,
            recommendation = %analysis.signal.recommendation,
            cache_hit,
            elapsed_ms = elapsed.as_millis() as u64,
            "Analysis complete"
        );

        Ok(ResearchOutcome {
            symbol,
            industry,
            snapshot,
            analysis,
            report,
            report_path,
            cache_hit,
            elapsed,
        })
    }

    /// Dual momentum backtest over the fetched history.
    pub async fn backtest(&self, input: &str, initial_capital: f64) -> Result<BacktestOutcome> {
        let symbol = self.resolve_symbol(input)?;
        let snapshot = self.fetcher.fetch(&symbol.symbol, true).await?;

        if snapshot.has_simulated_data() {
            tracing::warn!(
                symbol = %symbol.symbol,
                simulated = snapshot.synthetic_bars,
                "Backtesting over partly simulated history"
            );
        }

        let report = DualMomentumBacktester::new().run(snapshot.bars(), initial_capital)?;
        Ok(BacktestOutcome {
            symbol,
            company_name: snapshot.company.name.clone(),
            simulated_bars: snapshot.synthetic_bars,
            report,
        })
    }

    /// Closes with MA20/MA50 overlays for the newest `last_n` bars.
    pub async fn chart(&self, input: &str, last_n: usize) -> Result<ChartOutcome> {
        let symbol = self.resolve_symbol(input)?;
        let mut snapshot = self.fetcher.fetch(&symbol.symbol, true).await?;
        ensure_sufficient_history(&mut snapshot, self.config.min_history_days);

        let points = chart_series(snapshot.bars(), last_n)?;
        Ok(ChartOutcome {
            symbol,
            simulated_bars: snapshot.synthetic_bars,
            points,
        })
    }

    /// Macro dashboard data; requires a FRED key.
    pub async fn macro_snapshot(&self) -> Result<MacroSnapshot> {
        let client = FredClient::from_key(
            self.config.fred_api_key.as_deref(),
            self.config.request_timeout,
        )?;
        client.get_macro_snapshot().await
    }

    /// Remove cached snapshots for one ticker, or all of them.
    pub async fn clear_cache(&self, ticker: Option<&str>) -> Result<usize> {
        let symbol = ticker.map(normalize_symbol).transpose()?;
        self.cache.clear(symbol.as_deref()).await
    }

    pub async fn cache_stats(&self) -> Result<CacheStats> {
        self.cache.disk.stats().await
    }

    /// Trim every ticker's cache files down to the configured count.
    pub async fn cleanup_cache(&self) -> Result<usize> {
        self.cache.disk.cleanup_all().await
    }
}

impl std::fmt::Debug for ResearchPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchPipeline")
            .field("cache_dir", &self.config.cache_dir)
            .field("stocks", &self.searcher.database().len())
            .finish_non_exhaustive()
    }
}
