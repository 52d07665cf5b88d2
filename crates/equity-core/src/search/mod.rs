//! Stock lookup by symbol, company name or misspelling

mod database;
mod matcher;
mod similarity;

pub use database::{StockCategory, StockDatabase, StockEntry, categorize, search_terms};
pub use matcher::{AUTO_CORRECT_THRESHOLD, MatchType, SearchResult, StockSearcher};
pub use similarity::{close_matches, ratio};
