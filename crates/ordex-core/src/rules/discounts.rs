//! Discount-line aggregation.
//!
//! Scans raw (pre-normalization) message text for discount lines and
//! sums the matched amounts. The pattern tables are static
//! configuration, loaded once at process start.

use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::debug;

use super::money::parse_price;

lazy_static! {
    /// Vendor-agnostic credit line: minus sign, currency marker, amount.
    static ref CREDIT_LINE: Regex = Regex::new(r"-\s?CDN\$\s?[\d,]+\.\d{2}").unwrap();

    /// Vendor-named promotion lines, each carrying its own amount.
    static ref PROMOTION_LINES: Vec<(&'static str, Regex)> = vec![
        (
            "bundle",
            Regex::new(r"(?i)\d+\s+for\s+\$\s?[\d,]+\.\d{2}[^\n]*").unwrap(),
        ),
        (
            "membership",
            Regex::new(r"(?i)(?:prime|membership)\s+savings[^\n]*[\d,]+\.\d{2}").unwrap(),
        ),
        (
            "gift",
            Regex::new(r"(?i)gift\s+discount[^\n]*[\d,]+\.\d{2}").unwrap(),
        ),
        (
            "deal_of_the_day",
            Regex::new(r"(?i)deal\s+of\s+the\s+day[^\n]*[\d,]+\.\d{2}").unwrap(),
        ),
    ];
}

/// Sum all discount lines found in the raw message text.
///
/// Duplicate identical matches are counted once; lines whose amount
/// cannot be parsed contribute zero rather than failing the fragment.
pub fn aggregate_discount(raw_text: &str) -> Decimal {
    let mut matched: BTreeSet<String> = BTreeSet::new();

    for m in CREDIT_LINE.find_iter(raw_text) {
        matched.insert(m.as_str().to_string());
    }
    for (kind, pattern) in PROMOTION_LINES.iter() {
        for m in pattern.find_iter(raw_text) {
            if matched.insert(m.as_str().to_string()) {
                debug!("matched {} discount line: {}", kind, m.as_str());
            }
        }
    }

    matched
        .iter()
        .map(|line| parse_price(line).unwrap_or(Decimal::ZERO))
        .sum()
}
