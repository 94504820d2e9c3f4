//! Text normalization for vendor message bodies.
//!
//! Vendor notifications arrive soft-wrapped, hex-escaped, and full of
//! markup entities. Every function here is total: when no pattern
//! matches, the input comes back unchanged.

use std::borrow::Cow;

use crate::rules::patterns::{HEX_ESCAPE, MULTI_SPACE, NUMERIC_ENTITY, SOFT_WRAP, TAG};

/// Remove soft line-wrap continuations: a line-ending `=` followed by
/// a line break marks a split encoded line; the pair collapses.
pub fn unwrap_soft_breaks(text: &str) -> String {
    SOFT_WRAP.replace_all(text, "").into_owned()
}

/// Decode `=XX` hex escapes (e.g. `=2E` -> `.`, `=20` -> space) back
/// to their character. Non-printable escapes are left as-is.
pub fn decode_hex_escapes(text: &str) -> String {
    HEX_ESCAPE
        .replace_all(text, |caps: &regex::Captures| {
            match u8::from_str_radix(&caps[1], 16) {
                Ok(byte @ 0x20..=0x7e) => (byte as char).to_string(),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Decode HTML/XML character entities, both named and numeric.
pub fn decode_entities(text: &str) -> String {
    let named = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&");

    match NUMERIC_ENTITY.replace_all(&named, |caps: &regex::Captures| {
        let radix = if caps[1].is_empty() { 10 } else { 16 };
        u32::from_str_radix(&caps[2], radix)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    }) {
        Cow::Borrowed(_) => named,
        Cow::Owned(decoded) => decoded,
    }
}

/// Collapse runs of two or more whitespace characters to one space.
///
/// Callers that rely on double-space column separators must split
/// before collapsing; see the marketplace cell splitter.
pub fn collapse_whitespace(text: &str) -> String {
    MULTI_SPACE.replace_all(text, " ").trim().to_string()
}

/// Remove `<...>` markup spans.
pub fn strip_tags(text: &str) -> String {
    TAG.replace_all(text, "").into_owned()
}

/// Full normalization pipeline used by the extractors: soft-wrap
/// removal, hex escapes, entities, then whitespace collapsing.
pub fn normalize(text: &str) -> String {
    collapse_whitespace(&decode_entities(&decode_hex_escapes(&unwrap_soft_breaks(text))))
}
