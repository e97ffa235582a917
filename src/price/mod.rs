//! Price extraction and aggregate statistics.
//!
//! Pulls currency-tagged numeric substrings out of page text with a fixed,
//! ordered list of regex patterns, then derives numeric aggregates used for
//! price-based filtering and ranking.

use std::sync::LazyLock;

use regex::Regex;

/// Price patterns, applied in order; matches are concatenated in pattern-list
/// order and duplicates are kept (the raw match list is informational).
static PRICE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // $19.99 / $19
        r"\$\s?\d+(?:\.\d{1,2})?",
        // 19.99$
        r"\d+(?:\.\d{1,2})?\s?\$",
        // 19.99 USD / 19 EUR
        r"\d+(?:\.\d{1,2})?\s?(?:USD|EUR|GBP|CAD|AUD|JPY|INR)\b",
        // USD 19.99 / EUR 19
        r"\b(?:USD|EUR|GBP|CAD|AUD|JPY|INR)\s?\d+(?:\.\d{1,2})?",
        // price: $19.99 / cost: 19.99
        r"(?i)(?:price|cost)\s*:?\s*\$?\d+(?:\.\d{1,2})?",
    ]
    .into_iter()
    .filter_map(|pattern| match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            log::error!("Invalid price regex '{}': {}", pattern, e);
            None
        }
    })
    .collect()
});

/// Leading numeric token inside a matched price substring.
static NUMERIC_TOKEN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").ok());

/// Extracts raw price substrings from page text.
///
/// All non-overlapping matches of every pattern, in pattern-list order,
/// duplicates preserved. Empty text yields an empty list.
pub fn extract_prices(raw_text: &str) -> Vec<String> {
    if raw_text.is_empty() {
        return Vec::new();
    }
    let mut prices = Vec::new();
    for re in PRICE_PATTERNS.iter() {
        for m in re.find_iter(raw_text) {
            prices.push(m.as_str().to_string());
        }
    }
    prices
}

/// Parses one matched price substring to a float.
///
/// Strips currency symbols and labels, then extracts the leading numeric
/// token. Returns `None` for unparseable entries ("$,", bare "USD") instead
/// of erroring.
pub fn parse_price(raw: &str) -> Option<f64> {
    let re = NUMERIC_TOKEN.as_ref()?;
    let token = re.find(raw)?;
    token.as_str().parse::<f64>().ok()
}

/// Parses every extractable numeric value from a raw price list, skipping
/// malformed entries.
pub fn parse_prices(raw_prices: &[String]) -> Vec<f64> {
    raw_prices.iter().filter_map(|p| parse_price(p)).collect()
}

/// Aggregate statistics over parsed prices. All fields default to 0 when the
/// parsed list is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceStats {
    pub min: f64,
    pub max: f64,
    pub average: f64,
    pub count: usize,
}

/// Computes aggregates over a parsed price list.
pub fn price_stats(parsed: &[f64]) -> PriceStats {
    if parsed.is_empty() {
        return PriceStats::default();
    }
    let mut min = f64::MAX;
    let mut max = f64::MIN;
    let mut sum = 0.0;
    for &p in parsed {
        min = min.min(p);
        max = max.max(p);
        sum += p;
    }
    PriceStats {
        min,
        max,
        average: sum / parsed.len() as f64,
        count: parsed.len(),
    }
}

/// Number of parsed prices at or below a threshold.
pub fn count_below(parsed: &[f64], threshold: f64) -> usize {
    parsed.iter().filter(|&&p| p <= threshold).count()
}

/// True iff any parsed price is at or below the threshold.
pub fn has_low_price(parsed: &[f64], threshold: f64) -> bool {
    parsed.iter().any(|&p| p <= threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_yields_empty_list() {
        assert!(extract_prices("").is_empty());
    }

    #[test]
    fn test_dollar_prefix_forms() {
        let prices = extract_prices("now only $19.99, was $25");
        assert!(prices.contains(&"$19.99".to_string()));
        assert!(prices.contains(&"$25".to_string()));
    }

    #[test]
    fn test_currency_code_forms() {
        let prices = extract_prices("ships for 12.50 USD or EUR 11");
        assert!(prices.iter().any(|p| p.contains("12.50 USD")));
        assert!(prices.iter().any(|p| p.contains("EUR 11")));
    }

    #[test]
    fn test_labeled_forms() {
        let prices = extract_prices("Price: $9.99 and cost: 15");
        assert!(prices.iter().any(|p| p.to_lowercase().starts_with("price")));
        assert!(prices.iter().any(|p| p.to_lowercase().starts_with("cost")));
    }

    #[test]
    fn test_duplicates_are_kept() {
        let prices = extract_prices("$5.00 here and $5.00 there");
        let fives = prices.iter().filter(|p| *p == "$5.00").count();
        assert_eq!(fives, 2);
    }

    #[test]
    fn test_parse_price_strips_symbols() {
        assert_eq!(parse_price("$19.99"), Some(19.99));
        assert_eq!(parse_price("12.50 USD"), Some(12.5));
        assert_eq!(parse_price("EUR 11"), Some(11.0));
        assert_eq!(parse_price("price: $9.99"), Some(9.99));
    }

    #[test]
    fn test_parse_price_skips_malformed() {
        assert_eq!(parse_price("$,"), None);
        assert_eq!(parse_price("USD"), None);
        assert_eq!(parse_price(""), None);
    }

    #[test]
    fn test_stats_default_to_zero_on_all_malformed() {
        let raw = vec!["$,".to_string(), "USD".to_string()];
        let parsed = parse_prices(&raw);
        assert!(parsed.is_empty());
        let stats = price_stats(&parsed);
        assert_eq!(stats, PriceStats::default());
        assert_eq!(stats.average, 0.0);
    }

    #[test]
    fn test_stats_aggregates() {
        let parsed = vec![10.0, 20.0, 30.0];
        let stats = price_stats(&parsed);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 30.0);
        assert_eq!(stats.average, 20.0);
        assert_eq!(stats.count, 3);
    }

    #[test]
    fn test_low_price_predicate() {
        let parsed = vec![15.0, 42.0];
        assert!(has_low_price(&parsed, 15.0));
        assert!(!has_low_price(&parsed, 10.0));
        assert_eq!(count_below(&parsed, 20.0), 1);
    }
}
