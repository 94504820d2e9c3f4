//! Common regex patterns for order-mail extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Encoding artifacts
    pub static ref SOFT_WRAP: Regex = Regex::new(r"=\r?\n").unwrap();

    pub static ref HEX_ESCAPE: Regex = Regex::new(r"=([0-9A-Fa-f]{2})").unwrap();

    pub static ref NUMERIC_ENTITY: Regex = Regex::new(r"&#(x?)([0-9A-Fa-f]{1,6});").unwrap();

    pub static ref MULTI_SPACE: Regex = Regex::new(r"\s{2,}").unwrap();

    pub static ref TAG: Regex = Regex::new(r"(?s)<[^>]*>").unwrap();

    // Money and quantity
    pub static ref PRICE: Regex = Regex::new(
        r"(\d{1,3}(?:,\d{3})*)\.(\d{2})"
    ).unwrap();

    pub static ref QUANTITY_MARKER: Regex = Regex::new(r"(\d+)\s?[xX]\b").unwrap();

    pub static ref DIGIT_RUN: Regex = Regex::new(r"\d+").unwrap();

    // HTML fragments (the bodies are mangled enough that a DOM parser
    // would reject them; non-greedy captures match the templates)
    pub static ref TD_CELL: Regex = Regex::new(r"(?s)<td[^>]*>(.*?)</td>").unwrap();

    pub static ref ANCHOR: Regex = Regex::new(r"(?s)<a[^>]*>(.*?)</a>").unwrap();

    pub static ref PARAGRAPH: Regex = Regex::new(r"(?s)<p[^>]*>(.*?)</p>").unwrap();

    pub static ref STRONG: Regex = Regex::new(r"(?s)<strong[^>]*>(.*?)</strong>").unwrap();

    // Vendor templates
    pub static ref MARKETPLACE_ORDER_NUMBER: Regex = Regex::new(
        r"Order\s*#?\s*(\d+-\d+-\d+)"
    ).unwrap();

    pub static ref CURRENCY_PRICE: Regex = Regex::new(r"CDN\$\s*\d[\d,]*\.\d{2}").unwrap();

    pub static ref SOLD_BY: Regex = Regex::new(r"Sold by [^<\n]*").unwrap();

    pub static ref EBGAMES_ORDER_NUMBER: Regex = Regex::new(r"\b(\d{2,})\b").unwrap();

    pub static ref LEGO_ORDER_NUMBER: Regex = Regex::new(r"\b(T\d\S*)").unwrap();

    pub static ref LEGO_NAME_CELL: Regex = Regex::new(
        r"(?s)<td[^>]*padT15[^>]*>(.*?)</td>"
    ).unwrap();

    pub static ref LEGO_VALUE_CELL: Regex = Regex::new(
        r"(?s)<td[^>]*w50pc[^>]*>(.*?)</td>"
    ).unwrap();

    pub static ref WORD: Regex = Regex::new(r"[\w.'\-]+").unwrap();
}
