//! Rule-based equity research
//!
//! This crate turns a ticker into an industry-aware research report. It
//! includes:
//!
//! - Data fetching from Yahoo Finance, optionally enriched by Alpha Vantage,
//!   with synthetic fallback history when upstream data is thin
//! - A two-tier snapshot cache (memory and JSON files on disk)
//! - Technical indicators built on the `ta` crate
//! - Industry profiles with fundamental thresholds and risk factors
//! - Fundamental and technical scoring combined into a recommendation
//! - A nine-section report rendered as text or HTML
//! - Fuzzy ticker search with auto-correction
//! - A dual momentum backtester and a FRED macro snapshot
//!
//! # Example
//!
//! ```rust,ignore
//! use equity_core::{AnalyzeOptions, ResearchConfig, ResearchPipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ResearchConfig::builder().with_env_keys().build()?;
//!     let pipeline = ResearchPipeline::new(config).await?;
//!
//!     let outcome = pipeline.analyze("AAPL", &AnalyzeOptions::default()).await?;
//!     println!("{}", outcome.analysis.summary());
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod backtest;
pub mod cache;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod industry;
pub mod pipeline;
pub mod report;
pub mod search;
pub mod technical;

// Re-export main types for convenience
pub use backtest::{BacktestReport, DualMomentumBacktester, Strategy};
pub use cache::{CacheManager, CacheStats};
pub use config::ResearchConfig;
pub use data::{DataFetcher, MarketSnapshot};
pub use engine::{AnalysisResult, IndustryAnalyzer, Recommendation};
pub use error::{ResearchError, Result};
pub use industry::{Industry, IndustryProfile, detect_industry};
pub use pipeline::{
    AnalyzeOptions, BacktestOutcome, ChartOutcome, ResearchOutcome, ResearchPipeline,
    ResolvedSymbol,
};
pub use report::{FormatterFactory, ReportFormat, ResearchReport};
pub use search::{SearchResult, StockDatabase, StockSearcher};
