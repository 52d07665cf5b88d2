//! Tiered fuzzy search over the stock database

use super::database::{StockCategory, StockDatabase, StockEntry};
use super::similarity::{close_matches, ratio};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use serde::Serialize;
use std::collections::HashMap;

/// Minimum score for [`StockSearcher::auto_correct`] to accept a match
pub const AUTO_CORRECT_THRESHOLD: f64 = 0.6;

const POPULAR_SYMBOLS: [&str; 10] = [
    "AAPL", "MSFT", "GOOGL", "AMZN", "META", "NVDA", "TSLA", "JPM", "FISV", "CMCSA",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    ExactSymbol,
    ExactName,
    PartialName,
    SearchTerm,
    FuzzyMatch,
    Subsequence,
}

impl MatchType {
    pub fn label(self) -> &'static str {
        match self {
            Self::ExactSymbol => "exact symbol",
            Self::ExactName => "exact name",
            Self::PartialName => "name",
            Self::SearchTerm => "alias",
            Self::FuzzyMatch => "fuzzy",
            Self::Subsequence => "subsequence",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    #[serde(flatten)]
    pub stock: StockEntry,
    pub match_type: MatchType,
    pub score: f64,
}

impl SearchResult {
    /// `"SYM - Name"`
    pub fn suggestion(&self) -> String {
        format!("{} - {}", self.stock.symbol, self.stock.name)
    }
}

/// Best score per database index; a stock keeps its strongest match.
#[derive(Default)]
struct Hits(HashMap<usize, (MatchType, f64)>);

impl Hits {
    fn record(&mut self, index: usize, match_type: MatchType, score: f64) {
        let entry = self.0.entry(index).or_insert((match_type, score));
        if score > entry.1 {
            *entry = (match_type, score);
        }
    }

    fn contains(&self, index: usize) -> bool {
        self.0.contains_key(&index)
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}

pub struct StockSearcher {
    database: StockDatabase,
    matcher: SkimMatcherV2,
}

impl StockSearcher {
    pub fn new(database: StockDatabase) -> Self {
        Self {
            database,
            matcher: SkimMatcherV2::default(),
        }
    }

    pub fn database(&self) -> &StockDatabase {
        &self.database
    }

    /// Find up to `max_results` stocks for a free-text query.
    ///
    /// An exact symbol hit short-circuits with score 1.0. Otherwise exact
    /// names, name containment, search terms and close matches
    /// are tried in turn, with a subsequence pass as the last resort.
    pub fn find(&self, query: &str, max_results: usize) -> Vec<SearchResult> {
        let query = query.trim().to_lowercase();
        if query.chars().count() < 2 || max_results == 0 {
            return Vec::new();
        }

        let stocks = self.database.stocks();
        if let Some(stock) = stocks.iter().find(|s| s.symbol.to_lowercase() == query) {
            return vec![SearchResult {
                stock: stock.clone(),
                match_type: MatchType::ExactSymbol,
                score: 1.0,
            }];
        }

        let mut hits = Hits::default();

        for (i, stock) in stocks.iter().enumerate() {
            let name = stock.name.to_lowercase();
            if name == query {
                hits.record(i, MatchType::ExactName, 0.95);
            }
            if name.contains(&query) {
                let similarity = ratio(&query, &name);
                if similarity > 0.3 {
                    hits.record(i, MatchType::PartialName, similarity * 0.8);
                }
            }
            for term in &stock.search_terms {
                if term.contains(&query) || query.contains(term.as_str()) {
                    let similarity = ratio(&query, term);
                    if similarity > 0.5 {
                        hits.record(i, MatchType::SearchTerm, similarity * 0.7);
                    }
                }
            }
        }

        if hits.len() < max_results {
            self.close_match_pass(&query, max_results, &mut hits);
        }
        if hits.len() < max_results {
            self.subsequence_pass(&query, &mut hits);
        }

        let mut results: Vec<SearchResult> = hits
            .0
            .into_iter()
            .map(|(i, (match_type, score))| SearchResult {
                stock: stocks[i].clone(),
                match_type,
                score,
            })
            .collect();
        results.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.stock.symbol.cmp(&b.stock.symbol))
        });
        results.truncate(max_results);
        results
    }

    fn close_match_pass(&self, query: &str, max_results: usize, hits: &mut Hits) {
        // Candidates keep database order; a term shared by several stocks
        // belongs to the last one that lists it
        let mut candidates: Vec<String> = Vec::new();
        let mut owner: HashMap<String, usize> = HashMap::new();
        for (i, stock) in self.database.stocks().iter().enumerate() {
            let terms = [stock.symbol.to_lowercase(), stock.name.to_lowercase()]
                .into_iter()
                .chain(stock.search_terms.iter().cloned());
            for term in terms {
                owner.insert(term.clone(), i);
                candidates.push(term);
            }
        }

        let matches = close_matches(
            query,
            candidates.iter().map(String::as_str),
            max_results * 2,
            0.3,
        );
        for (candidate, _) in matches {
            let Some(&i) = owner.get(candidate) else {
                continue;
            };
            if !hits.contains(i) {
                hits.record(i, MatchType::FuzzyMatch, ratio(query, candidate) * 0.6);
            }
        }
    }

    fn subsequence_pass(&self, query: &str, hits: &mut Hits) {
        let Some(perfect) = self.matcher.fuzzy_match(query, query).filter(|s| *s > 0) else {
            return;
        };

        for (i, stock) in self.database.stocks().iter().enumerate() {
            if hits.contains(i) {
                continue;
            }
            let best = [stock.symbol.to_lowercase(), stock.name.to_lowercase()]
                .iter()
                .filter_map(|choice| self.matcher.fuzzy_match(choice, query))
                .max();
            if let Some(score) = best.filter(|s| *s > 0) {
                let normalized = (score as f64 / perfect as f64).min(1.0);
                hits.record(i, MatchType::Subsequence, normalized * 0.5);
            }
        }
    }

    /// Best match when it is confident enough to replace the user's input.
    pub fn auto_correct(&self, query: &str) -> Option<SearchResult> {
        self.find(query, 1)
            .into_iter()
            .next()
            .filter(|r| r.score >= AUTO_CORRECT_THRESHOLD)
    }

    pub fn suggestions(&self, query: &str, max_suggestions: usize) -> Vec<String> {
        self.find(query, max_suggestions)
            .iter()
            .map(SearchResult::suggestion)
            .collect()
    }

    pub fn by_category(&self, category: StockCategory) -> Vec<&StockEntry> {
        self.database
            .stocks()
            .iter()
            .filter(|s| s.category == category)
            .collect()
    }

    /// Well-known tickers present in the database, in a fixed order
    pub fn popular(&self) -> Vec<&StockEntry> {
        POPULAR_SYMBOLS
            .iter()
            .filter_map(|symbol| self.database.get(symbol))
            .collect()
    }

    pub fn categories(&self) -> Vec<(StockCategory, usize)> {
        let mut counts: Vec<_> = self.database.category_counts().into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn searcher() -> StockSearcher {
        StockSearcher::new(StockDatabase::builtin())
    }

    #[test]
    fn test_exact_symbol_short_circuits() {
        let results = searcher().find("  msft ", 5);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].stock.symbol, "MSFT");
        assert_eq!(results[0].match_type, MatchType::ExactSymbol);
        assert_eq!(results[0].score, 1.0);
    }

    #[test]
    fn test_short_query_returns_nothing() {
        assert!(searcher().find("a", 5).is_empty());
        assert!(searcher().find("", 5).is_empty());
    }

    #[test]
    fn test_exact_name_wins() {
        let results = searcher().find("Johnson & Johnson", 5);
        assert_eq!(results[0].stock.symbol, "JNJ");
        assert_eq!(results[0].match_type, MatchType::ExactName);
        assert!((results[0].score - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_misspelling_via_search_terms() {
        let best = searcher().auto_correct("fiserw").unwrap();
        assert_eq!(best.stock.symbol, "FISV");
        // term "fiserw" is an exact alias: ratio 1.0 * 0.7
        assert!((best.score - 0.7).abs() < 1e-9);
        assert_eq!(best.match_type, MatchType::SearchTerm);
    }

    #[test]
    fn test_partial_name() {
        let results = searcher().find("tesla", 3);
        assert_eq!(results[0].stock.symbol, "TSLA");
        // "tesla" in "tesla inc.": ratio 10/15 * 0.8
        assert!((results[0].score - (10.0 / 15.0) * 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_auto_correct_rejects_weak_matches() {
        assert!(searcher().auto_correct("qqqqzz").is_none());
    }

    #[test]
    fn test_suggestions_format_and_order() {
        let suggestions = searcher().suggestions("micro", 3);
        assert_eq!(suggestions[0], "MSFT - Microsoft Corporation");
        assert!(suggestions.len() <= 3);
    }

    #[test]
    fn test_shared_term_belongs_to_last_stock() {
        let entry = |symbol: &str, name: &str| StockEntry {
            symbol: symbol.to_string(),
            name: name.to_string(),
            category: StockCategory::Technology,
            search_terms: vec!["zebrafoo".to_string()],
            is_correction: false,
        };
        let s = StockSearcher::new(StockDatabase::from_entries(vec![
            entry("QQ1", "Qqq One"),
            entry("QQ2", "Qqq Two"),
        ]));

        let results = s.find("zebrafox", 5);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].stock.symbol, "QQ2");
        assert_eq!(results[0].match_type, MatchType::FuzzyMatch);
    }

    #[test]
    fn test_categories_and_popular() {
        let s = searcher();
        assert_eq!(s.popular().len(), 10);
        assert_eq!(s.popular()[0].symbol, "AAPL");
        assert_eq!(s.by_category(StockCategory::Financial).len(), 2);
        assert_eq!(s.categories()[0], (StockCategory::Technology, 7));
    }

    #[test]
    fn test_results_are_unique_and_sorted() {
        let results = searcher().find("corporation", 10);
        let mut symbols: Vec<_> = results.iter().map(|r| r.stock.symbol.clone()).collect();
        symbols.sort();
        symbols.dedup();
        assert_eq!(symbols.len(), results.len());
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }
}
