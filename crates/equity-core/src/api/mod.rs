//! API clients for market and macro data providers

pub mod alpha_vantage;
pub mod fred;
pub mod yahoo;

pub use alpha_vantage::{AlphaVantageClient, CompanyOverview};
pub use fred::{FredClient, MacroSnapshot, series as fred_series};
pub use yahoo::YahooFinanceClient;
