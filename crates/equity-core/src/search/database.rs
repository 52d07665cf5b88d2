//! Ticker/name database backing the fuzzy search

use crate::error::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

const DATABASE_VERSION: &str = "2.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockCategory {
    Technology,
    Financial,
    Healthcare,
    Consumer,
    Industrial,
    Energy,
    Communication,
    RealEstate,
    Utilities,
    #[serde(other)]
    Other,
}

impl StockCategory {
    pub fn code(self) -> &'static str {
        match self {
            Self::Technology => "technology",
            Self::Financial => "financial",
            Self::Healthcare => "healthcare",
            Self::Consumer => "consumer",
            Self::Industrial => "industrial",
            Self::Energy => "energy",
            Self::Communication => "communication",
            Self::RealEstate => "real_estate",
            Self::Utilities => "utilities",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for StockCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for StockCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        CATEGORY_KEYWORDS
            .iter()
            .map(|(category, _)| *category)
            .chain(std::iter::once(Self::Other))
            .find(|c| c.code() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockEntry {
    pub symbol: String,
    pub name: String,
    pub category: StockCategory,
    #[serde(default)]
    pub search_terms: Vec<String>,
    /// Hand-written corrections keep their category on rebuild
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_correction: bool,
}

impl StockEntry {
    pub fn new(symbol: &str, name: &str, category: StockCategory) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            category,
            search_terms: search_terms(symbol, name),
            is_correction: false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct DatabaseFile {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    last_updated: Option<String>,
    #[serde(default)]
    categories: BTreeMap<StockCategory, usize>,
    stocks: Vec<StockEntry>,
}

/// In-memory stock list
#[derive(Debug, Clone)]
pub struct StockDatabase {
    stocks: Vec<StockEntry>,
}

impl StockDatabase {
    /// Build from entries, generating search terms where missing.
    pub fn from_entries(mut stocks: Vec<StockEntry>) -> Self {
        for stock in &mut stocks {
            if stock.search_terms.is_empty() {
                stock.search_terms = search_terms(&stock.symbol, &stock.name);
            }
        }
        Self { stocks }
    }

    /// Small built-in list used when no database file is available
    pub fn builtin() -> Self {
        use StockCategory as C;
        let stocks = [
            ("AAPL", "Apple Inc.", C::Technology),
            ("MSFT", "Microsoft Corporation", C::Technology),
            ("GOOGL", "Alphabet Inc. (Google)", C::Technology),
            ("AMZN", "Amazon.com Inc.", C::Technology),
            ("META", "Meta Platforms Inc.", C::Technology),
            ("NVDA", "NVIDIA Corporation", C::Technology),
            ("TSLA", "Tesla Inc.", C::Technology),
            ("JPM", "JPMorgan Chase & Co.", C::Financial),
            ("FISV", "Fiserv Inc.", C::Financial),
            ("CMCSA", "Comcast Corporation", C::Communication),
            ("XOM", "Exxon Mobil Corporation", C::Energy),
            ("JNJ", "Johnson & Johnson", C::Healthcare),
            ("WMT", "Walmart Inc.", C::Consumer),
        ]
        .into_iter()
        .map(|(symbol, name, category)| StockEntry::new(symbol, name, category))
        .collect();
        Self { stocks }
    }

    /// Load a JSON database, falling back to [`builtin`](Self::builtin) when
    /// the file is missing or unreadable.
    pub async fn load(path: &Path) -> Self {
        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(path = %path.display(), "Stock database unavailable, using built-in list: {}", e);
                return Self::builtin();
            }
        };

        match serde_json::from_slice::<DatabaseFile>(&raw) {
            Ok(file) if !file.stocks.is_empty() => {
                tracing::info!(path = %path.display(), stocks = file.stocks.len(), "Stock database loaded");
                Self::from_entries(file.stocks)
            }
            Ok(_) => {
                tracing::warn!(path = %path.display(), "Stock database is empty, using built-in list");
                Self::builtin()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "Stock database is corrupt, using built-in list: {}", e);
                Self::builtin()
            }
        }
    }

    /// Write the database with version, timestamp and category counts.
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = DatabaseFile {
            version: Some(DATABASE_VERSION.to_string()),
            last_updated: Some(Utc::now().to_rfc3339()),
            categories: self.category_counts(),
            stocks: self.stocks.clone(),
        };
        tokio::fs::write(path, serde_json::to_vec_pretty(&file)?).await?;
        tracing::info!(path = %path.display(), stocks = self.stocks.len(), "Stock database saved");
        Ok(())
    }

    /// Re-derive every category from names and symbols, skipping corrections.
    ///
    /// Returns how many entries changed.
    pub fn recategorize(&mut self) -> usize {
        let mut changed = 0;
        for stock in self.stocks.iter_mut().filter(|s| !s.is_correction) {
            let category = categorize(&stock.symbol, &stock.name);
            if category != stock.category {
                stock.category = category;
                changed += 1;
            }
        }
        changed
    }

    pub fn stocks(&self) -> &[StockEntry] {
        &self.stocks
    }

    pub fn len(&self) -> usize {
        self.stocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty()
    }

    pub fn get(&self, symbol: &str) -> Option<&StockEntry> {
        self.stocks
            .iter()
            .find(|s| s.symbol.eq_ignore_ascii_case(symbol))
    }

    pub fn category_counts(&self) -> BTreeMap<StockCategory, usize> {
        let mut counts = BTreeMap::new();
        for stock in &self.stocks {
            *counts.entry(stock.category).or_insert(0) += 1;
        }
        counts
    }
}

const CATEGORY_KEYWORDS: &[(StockCategory, &[&str])] = &[
    (
        StockCategory::Technology,
        &[
            "tech", "software", "hardware", "semiconductor", "internet", "cloud", "digital",
            "data", "network", "cyber", "comput", "electronic", "platform", "systems",
            "solution", "analytics", "intelligence", "ai", "machine learning", "mobile", "web",
            "online", "ecommerce", "social media", "gaming", "streaming", "media",
            "entertainment", "content",
        ],
    ),
    (
        StockCategory::Financial,
        &[
            "bank", "financial", "finance", "insurance", "credit", "capital", "payment",
            "investment", "asset", "wealth", "broker", "exchange", "trading", "card", "money",
            "lending", "mortgage", "loan", "fund", "trust", "holding", "group", "partners",
            "advisors",
        ],
    ),
    (
        StockCategory::Healthcare,
        &[
            "health", "medical", "pharma", "biotech", "care", "diagnostic", "therapeutic",
            "surgical", "hospital", "clinic", "laboratory", "medicine", "drug", "vaccine",
            "treatment", "therapy", "device", "imaging", "scan", "patient", "doctor", "nurse",
            "wellness", "fitness",
        ],
    ),
    (
        StockCategory::Consumer,
        &[
            "retail", "store", "shop", "market", "mall", "consumer", "goods", "product", "brand",
            "apparel", "clothing", "shoe", "footwear", "fashion", "luxury", "food", "beverage",
            "drink", "restaurant", "cafe", "hotel", "travel", "tourism", "leisure", "auto", "car",
            "vehicle", "motor", "home", "house", "furniture", "appliance", "garden", "pet",
            "animal",
        ],
    ),
    (
        StockCategory::Industrial,
        &[
            "industrial", "manufactur", "factory", "plant", "machinery", "equipment", "tool",
            "machine", "engineering", "construction", "build", "contractor", "defense",
            "aerospace", "aviation", "aircraft", "marine", "naval", "ship", "boat", "rail",
            "transport", "logistics", "shipping", "delivery", "mining", "metal", "steel",
            "aluminum", "copper", "chemical", "paint", "coating", "material", "composite",
        ],
    ),
    (
        StockCategory::Energy,
        &[
            "energy", "power", "electric", "utility", "gas", "oil", "petroleum", "fuel",
            "diesel", "gasoline", "renewable", "solar", "wind", "hydro", "nuclear", "coal",
            "mineral", "resource", "exploration", "drilling", "pipeline", "transmission",
            "distribution", "grid", "generation", "facility", "refinery",
        ],
    ),
    (
        StockCategory::Communication,
        &[
            "communication", "telecom", "telephone", "phone", "wireless", "cellular",
            "broadband", "cable", "fiber", "satellite", "broadcast", "television", "tv",
            "radio", "newspaper", "magazine", "publishing", "advertising", "marketing",
            "public relations", "agency", "studio",
        ],
    ),
    (
        StockCategory::RealEstate,
        &[
            "real estate", "property", "estate", "reit", "development", "developer", "builder",
            "management", "manager", "leasing", "rental", "apartment", "condo", "office",
            "commercial", "warehouse", "storage", "shopping center", "retail center", "resort",
            "hospitality", "lodging", "accommodation",
        ],
    ),
    (
        StockCategory::Utilities,
        &[
            "utilities", "water", "waste", "sewage", "sanitation", "environmental", "clean",
            "green", "sustainable", "geothermal",
        ],
    ),
];

const SYMBOL_CATEGORIES: &[(StockCategory, &[&str])] = &[
    (
        StockCategory::Technology,
        &[
            "aapl", "msft", "googl", "amzn", "meta", "nvda", "tsla", "intc", "amd", "adbe", "crm",
            "csco", "orcl", "ibm", "qcom", "txn", "avgo",
        ],
    ),
    (
        StockCategory::Financial,
        &[
            "jpm", "bac", "wfc", "c", "gs", "ms", "schw", "blk", "axp", "v", "ma", "fisv", "fis",
            "brk.b",
        ],
    ),
    (
        StockCategory::Healthcare,
        &[
            "jnj", "pfe", "mrk", "abt", "tmo", "unh", "lly", "amgn", "gild", "bmy", "isrg",
        ],
    ),
    (
        StockCategory::Consumer,
        &[
            "wmt", "pg", "ko", "pep", "mcd", "sbux", "nke", "dis", "cost", "hd", "low", "tgt",
        ],
    ),
];

/// Classify a stock by name keywords first, then by well-known symbols.
///
/// Keyword groups are checked in a fixed order and the first hit wins, so a
/// name like "NextEra Energy" lands in energy before utilities is tried.
pub fn categorize(symbol: &str, name: &str) -> StockCategory {
    let name = name.to_lowercase();
    let symbol = symbol.to_lowercase();

    if let Some((category, _)) = CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| name.contains(k)))
    {
        return *category;
    }

    if symbol.ends_with(".b") {
        return StockCategory::Financial;
    }

    SYMBOL_CATEGORIES
        .iter()
        .find(|(_, symbols)| symbols.contains(&symbol.as_str()))
        .map_or(StockCategory::Other, |(category, _)| *category)
}

const COMMON_MISTAKES: &[(&str, &[&str])] = &[
    ("fiserv", &["fiserw", "fiserb", "fiserve"]),
    ("google", &["goog", "googel", "gogle"]),
    ("microsoft", &["msft", "micro soft"]),
    ("apple", &["aapl"]),
    ("comcast", &["cmcst", "cmcsa"]),
    ("facebook", &["fb", "meta"]),
];

/// Lower-cased lookup terms: symbol, name, a 0→o/1→i variant of the symbol
/// and known misspellings of the name.
pub fn search_terms(symbol: &str, name: &str) -> Vec<String> {
    let symbol = symbol.to_lowercase();
    let name = name.to_lowercase();

    let mut terms = BTreeSet::new();
    terms.insert(symbol.replace('0', "o").replace('1', "i"));
    for (correct, mistakes) in COMMON_MISTAKES {
        if name.contains(correct) {
            terms.extend(mistakes.iter().map(|m| (*m).to_string()));
        }
    }
    terms.insert(symbol);
    terms.insert(name);
    terms.into_iter().collect()
}
