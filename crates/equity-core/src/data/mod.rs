//! Market data: types, history summaries, placeholder synthesis and fetching

mod fetcher;
#[cfg(test)]
pub(crate) mod fixtures;
mod models;
mod stats;
pub mod synthetic;

pub use fetcher::{
    DataFetcher, MarketDataProvider, YahooProvider, ensure_sufficient_history, normalize_symbol,
};
#[cfg(test)]
pub use fetcher::MockMarketDataProvider;
pub use models::{
    AnalystView, Attractiveness, BasicTechnicals, CompanyProfile, DataQuality,
    FinancialSectorMetrics, Fundamentals, LatestQuote, MarketSnapshot, PriceBar, PriceData,
    PriceStats, TickerInfo, Valuation,
};
pub use stats::{SUFFICIENT_BARS, mean, pct_returns, sample_std, trailing_mean, wilder_rsi};
