//! Industry detection from sector/industry strings and well-known tickers

use super::Industry;

/// Substring table, checked in order against the sector and then the industry.
const SECTOR_MAP: &[(&str, Industry)] = &[
    ("technology", Industry::Software),
    ("technology services", Industry::Software),
    ("electronic technology", Industry::Software),
    ("software", Industry::Software),
    ("internet", Industry::Software),
    ("energy", Industry::Energy),
    ("energy minerals", Industry::Energy),
    ("oil & gas", Industry::Energy),
    ("oil & gas production", Industry::Energy),
    ("pipelines", Industry::Energy),
    ("financial services", Industry::Financial),
    ("finance", Industry::Financial),
    ("banking", Industry::Financial),
    ("investment", Industry::Financial),
    ("credit services", Industry::Financial),
    ("insurance", Industry::Financial),
    ("insurance companies", Industry::Financial),
    ("healthcare", Industry::Healthcare),
    ("health technology", Industry::Healthcare),
    ("pharmaceuticals", Industry::Healthcare),
    ("biotechnology", Industry::Healthcare),
    ("medical", Industry::Healthcare),
    ("industrials", Industry::Industrial),
    ("industrial services", Industry::Industrial),
    ("manufacturing", Industry::Industrial),
    ("machinery", Industry::Industrial),
    ("engineering & construction", Industry::Industrial),
    ("aerospace & defense", Industry::Industrial),
    ("transportation", Industry::Industrial),
    ("consumer defensive", Industry::ConsumerStaples),
    ("consumer staples", Industry::ConsumerStaples),
    ("consumer products", Industry::ConsumerStaples),
    ("beverages", Industry::ConsumerStaples),
    ("food & staples retailing", Industry::ConsumerStaples),
    ("food products", Industry::ConsumerStaples),
    ("consumer cyclical", Industry::ConsumerDiscretionary),
    ("consumer discretionary", Industry::ConsumerDiscretionary),
    ("retail", Industry::ConsumerDiscretionary),
    ("automobiles", Industry::ConsumerDiscretionary),
    ("apparel", Industry::ConsumerDiscretionary),
    ("entertainment", Industry::ConsumerDiscretionary),
    ("utilities", Industry::Utilities),
    ("communication services", Industry::Communication),
    ("telecommunications", Industry::Communication),
    ("real estate", Industry::RealEstate),
    ("reit", Industry::RealEstate),
    ("basic materials", Industry::Materials),
    ("materials", Industry::Materials),
    ("chemicals", Industry::Materials),
    ("metals & mining", Industry::Materials),
];

/// Keyword groups matched against the industry string after the table misses.
const INDUSTRY_KEYWORDS: &[(&[&str], Industry)] = &[
    (
        &["bank", "credit", "insurance", "financial", "asset", "capital"],
        Industry::Financial,
    ),
    (
        &["oil", "gas", "energy", "petroleum", "drilling", "exploration"],
        Industry::Energy,
    ),
    (
        &["medical", "pharma", "health", "biotech", "drug", "healthcare"],
        Industry::Healthcare,
    ),
    (
        &["manufactur", "industrial", "machine", "engineering", "construction"],
        Industry::Industrial,
    ),
    (
        &["beverage", "food", "consumer", "staples", "retail", "product"],
        Industry::ConsumerStaples,
    ),
];

const TICKER_MAP: &[(&str, Industry)] = &[
    ("KO", Industry::ConsumerStaples),
    ("PEP", Industry::ConsumerStaples),
    ("PG", Industry::ConsumerStaples),
    ("UL", Industry::ConsumerStaples),
    ("WMT", Industry::ConsumerStaples),
    ("COST", Industry::ConsumerStaples),
    ("MCD", Industry::ConsumerStaples),
    ("SBUX", Industry::ConsumerStaples),
    ("JPM", Industry::Financial),
    ("BAC", Industry::Financial),
    ("WFC", Industry::Financial),
    ("C", Industry::Financial),
    ("GS", Industry::Financial),
    ("MS", Industry::Financial),
    ("SCHW", Industry::Financial),
    ("BLK", Industry::Financial),
    ("AXP", Industry::Financial),
    ("PYPL", Industry::Financial),
    ("V", Industry::Financial),
    ("MA", Industry::Financial),
    ("XOM", Industry::Energy),
    ("CVX", Industry::Energy),
    ("COP", Industry::Energy),
    ("SLB", Industry::Energy),
    ("EOG", Industry::Energy),
    ("MPC", Industry::Energy),
    ("PSX", Industry::Energy),
    ("VLO", Industry::Energy),
    ("OXY", Industry::Energy),
    ("JNJ", Industry::Healthcare),
    ("PFE", Industry::Healthcare),
    ("MRK", Industry::Healthcare),
    ("ABT", Industry::Healthcare),
    ("TMO", Industry::Healthcare),
    ("DHR", Industry::Healthcare),
    ("LLY", Industry::Healthcare),
    ("UNH", Industry::Healthcare),
    ("AMGN", Industry::Healthcare),
    ("CAT", Industry::Industrial),
    ("GE", Industry::Industrial),
    ("HON", Industry::Industrial),
    ("BA", Industry::Industrial),
    ("MMM", Industry::Industrial),
    ("DE", Industry::Industrial),
    ("LMT", Industry::Industrial),
    ("RTX", Industry::Industrial),
    ("AAPL", Industry::Software),
    ("MSFT", Industry::Software),
    ("GOOGL", Industry::Software),
    ("META", Industry::Software),
    ("NVDA", Industry::Software),
    ("ADBE", Industry::Software),
    ("ORCL", Industry::Software),
    ("CRM", Industry::Software),
    ("INTC", Industry::Software),
    ("AMD", Industry::Software),
    ("TSM", Industry::Software),
    ("IBM", Industry::Software),
    ("AMZN", Industry::ConsumerDiscretionary),
    ("TSLA", Industry::ConsumerDiscretionary),
    ("NKE", Industry::ConsumerDiscretionary),
    ("HD", Industry::ConsumerDiscretionary),
    ("T", Industry::Communication),
    ("VZ", Industry::Communication),
    ("NEE", Industry::Utilities),
    ("DUK", Industry::Utilities),
    ("AMT", Industry::RealEstate),
    ("PLD", Industry::RealEstate),
    ("LIN", Industry::Materials),
    ("APD", Industry::Materials),
];

const FINANCIAL_KEYWORDS: &[&str] = &[
    "bank",
    "financial",
    "insurance",
    "credit",
    "capital",
    "investment",
];

const FINANCIAL_TICKERS: &[&str] = &["JPM", "BAC", "WFC", "C", "GS", "MS", "SCHW", "BLK", "AXP"];

/// Pick the industry profile for a company.
///
/// Sector/industry strings are used only when a sector is present. Otherwise,
/// or when nothing matches, a ticker table decides, with software as the last
/// resort.
pub fn detect_industry(symbol: &str, sector: Option<&str>, industry: Option<&str>) -> Industry {
    let sector = sector.map(str::to_lowercase).unwrap_or_default();
    let industry = industry.map(str::to_lowercase).unwrap_or_default();

    if !sector.is_empty() && sector != "n/a" {
        if let Some(found) = match_table(&sector).or_else(|| match_table(&industry)) {
            return found;
        }

        for (keywords, found) in INDUSTRY_KEYWORDS {
            if keywords.iter().any(|k| industry.contains(k)) {
                return *found;
            }
        }
    }

    let symbol = symbol.trim().to_uppercase();
    TICKER_MAP
        .iter()
        .find(|(ticker, _)| *ticker == symbol)
        .map_or(Industry::Software, |(_, found)| *found)
}

fn match_table(text: &str) -> Option<Industry> {
    if text.is_empty() {
        return None;
    }
    SECTOR_MAP
        .iter()
        .find(|(key, _)| text.contains(key))
        .map(|(_, industry)| *industry)
}

/// Whether a company should get financial-sector treatment in the fetcher
pub fn is_financial(symbol: &str, sector: Option<&str>, industry: Option<&str>) -> bool {
    let sector = sector.map(str::to_lowercase).unwrap_or_default();
    let industry = industry.map(str::to_lowercase).unwrap_or_default();

    FINANCIAL_KEYWORDS
        .iter()
        .any(|k| sector.contains(k) || industry.contains(k))
        || FINANCIAL_TICKERS.contains(&symbol.trim().to_uppercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sector_beats_ticker_table() {
        assert_eq!(
            detect_industry("XYZ", Some("Energy"), Some("Oil & Gas Integrated")),
            Industry::Energy
        );
        assert_eq!(
            detect_industry("KO", Some("Consumer Defensive"), Some("Beverages—Non-Alcoholic")),
            Industry::ConsumerStaples
        );
        assert_eq!(
            detect_industry("JPM", Some("Financial Services"), Some("Banks—Diversified")),
            Industry::Financial
        );
    }

    #[test]
    fn test_industry_string_used_when_sector_unmatched() {
        assert_eq!(
            detect_industry("XYZ", Some("Conglomerates"), Some("Specialty Chemicals")),
            Industry::Materials
        );
    }

    #[test]
    fn test_keyword_groups() {
        assert_eq!(
            detect_industry("XYZ", Some("Other"), Some("Regional Bank Holding")),
            Industry::Financial
        );
        assert_eq!(
            detect_industry("XYZ", Some("Other"), Some("Contract Drilling")),
            Industry::Energy
        );
    }

    #[test]
    fn test_ticker_fallback() {
        assert_eq!(detect_industry("pep", None, None), Industry::ConsumerStaples);
        assert_eq!(detect_industry("TSLA", Some(""), None), Industry::ConsumerDiscretionary);
        assert_eq!(detect_industry("NEE", Some("N/A"), Some("N/A")), Industry::Utilities);
    }

    #[test]
    fn test_default_is_software() {
        assert_eq!(detect_industry("ZZZZ", None, None), Industry::Software);
        assert_eq!(
            detect_industry("ZZZZ", Some("Mystery"), Some("Unknown")),
            Industry::Software
        );
    }

    #[test]
    fn test_is_financial() {
        assert!(is_financial("GS", None, None));
        assert!(is_financial("XYZ", Some("Financial Services"), None));
        assert!(is_financial("XYZ", None, Some("Insurance—Life")));
        assert!(!is_financial("AAPL", Some("Technology"), Some("Consumer Electronics")));
    }
}
