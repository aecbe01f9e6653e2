//! Lookup page parser
//!
//! This module turns a lookup results page into:
//! - The total match count the service reports for the search term
//! - The ticker symbols listed in the page's results table
//!
//! Parsing never fails hard. A page without a readable count is reported as
//! an error to the caller, which treats the term as having no matches.

use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

/// Ticker symbol as listed by the lookup service
pub type Symbol = String;

/// Text that precedes the match count, e.g. `Stocks (1,234)`
const COUNT_MARKER: &str = "Stocks (";

/// Results table and its symbol cells
const RESULTS_TABLE: &str = r#"table[class~="W(100%)"]"#;
const SYMBOL_CELL: &str = r#"td[aria-label="Symbol"]"#;

/// Extracted information from a lookup page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// Total number of matches reported for the search term
    pub count: u64,

    /// Symbols listed on this page
    pub symbols: HashSet<Symbol>,
}

/// Parses a lookup page, failing if the match count cannot be read
///
/// # Example
///
/// ```
/// use ticker_sweep::crawler::try_parse_lookup_page;
///
/// let html = r#"<html><body><span>Stocks (2)</span>
///   <table class="W(100%)"><tr><td aria-label="Symbol">AAPL</td></tr>
///   <tr><td aria-label="Symbol">AA</td></tr></table></body></html>"#;
/// let page = try_parse_lookup_page(html).unwrap();
/// assert_eq!(page.count, 2);
/// assert!(page.symbols.contains("AAPL"));
/// ```
pub fn try_parse_lookup_page(body: &str) -> Result<ParsedPage, String> {
    let count = extract_count(body)?;
    let symbols = extract_symbols(body);
    Ok(ParsedPage { count, symbols })
}

/// Parses a lookup page, yielding an empty page on any malformed input
pub fn parse_lookup_page(body: &str) -> ParsedPage {
    try_parse_lookup_page(body).unwrap_or_default()
}

/// Reads the match count that follows the `Stocks (` marker
///
/// Thousands separators are accepted (`Stocks (15,000)`).
pub fn extract_count(body: &str) -> Result<u64, String> {
    let start = body
        .find(COUNT_MARKER)
        .map(|idx| idx + COUNT_MARKER.len())
        .ok_or_else(|| "count marker not found".to_string())?;

    let rest = &body[start..];
    let end = rest
        .find(')')
        .ok_or_else(|| "unterminated count".to_string())?;

    let digits: String = rest[..end]
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();

    digits
        .parse::<u64>()
        .map_err(|e| format!("invalid count '{}': {}", &rest[..end], e))
}

/// Extracts the symbols from the first results table on the page
///
/// Each row contributes the trimmed text of its symbol cell; rows without one,
/// and cells that are empty after trimming, are skipped.
pub fn extract_symbols(body: &str) -> HashSet<Symbol> {
    let document = Html::parse_document(body);
    let mut symbols = HashSet::new();

    let (Ok(table_selector), Ok(row_selector), Ok(cell_selector)) = (
        Selector::parse(RESULTS_TABLE),
        Selector::parse("tr"),
        Selector::parse(SYMBOL_CELL),
    ) else {
        return symbols;
    };

    let Some(table) = document.select(&table_selector).next() else {
        return symbols;
    };

    for row in table.select(&row_selector) {
        if let Some(symbol) = row.select(&cell_selector).next().and_then(cell_text) {
            symbols.insert(symbol);
        }
    }

    symbols
}

fn cell_text(cell: ElementRef<'_>) -> Option<Symbol> {
    let text = cell.text().collect::<String>();
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
