//! Date parsing for mail headers and vendor body templates.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::ExtractError;

/// Parse a mail `Date:` header (RFC 2822, with or without the weekday
/// prefix).
pub fn parse_header_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(date) = DateTime::parse_from_rfc2822(s) {
        return Some(date.naive_local());
    }
    DateTime::parse_from_str(s, "%d %b %Y %H:%M:%S %z")
        .ok()
        .map(|date| date.naive_local())
}

/// Parse the PDF invoice's `Order Date:` line, e.g.
/// `Order Date: 05-Mar-2019 10:21:30 AM (PST)`.
pub fn parse_invoice_datetime(s: &str) -> Result<NaiveDateTime, ExtractError> {
    let value = s
        .trim()
        .trim_start_matches("Order Date:")
        .trim();
    // Drop the trailing "(PST)"-style zone annotation.
    let value = match value.find('(') {
        Some(pos) => value[..pos].trim(),
        None => value,
    };
    NaiveDateTime::parse_from_str(value, "%d-%b-%Y %I:%M:%S %p")
        .map_err(|_| ExtractError::UnparseableDate(s.trim().to_string()))
}

/// Parse a long-form order date, e.g. `May 5, 2019`.
pub fn parse_long_date(s: &str) -> Result<NaiveDateTime, ExtractError> {
    NaiveDate::parse_from_str(s.trim(), "%B %d, %Y")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| ExtractError::UnparseableDate(s.trim().to_string()))
}
