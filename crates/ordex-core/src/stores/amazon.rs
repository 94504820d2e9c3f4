//! Marketplace-table vendor (Amazon.ca shipment notices).
//!
//! Item descriptions live in table cells that sometimes bundle several
//! products in one cell, separated by double spaces. Prices are
//! rendered separately in `<strong>` elements and zipped with the
//! items in document order.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::models::order::fallback_date;
use crate::models::{Item, Order, RawMessage, Store};
use crate::rules::discounts::aggregate_discount;
use crate::rules::money::{parse_price, parse_quantity};
use crate::rules::patterns::{
    ANCHOR, CURRENCY_PRICE, MARKETPLACE_ORDER_NUMBER, MULTI_SPACE, QUANTITY_MARKER, SOLD_BY,
    STRONG, TD_CELL,
};
use crate::text;

use super::{sender_matches, StoreExtractor};

/// The vendor's feed occasionally renders a literal quantity of zero;
/// historically those lines are ten-packs. Kept for behavioral
/// compatibility with the templates seen in production; do not
/// generalize to other vendors.
const ZERO_QUANTITY_FALLBACK: u32 = 10;

/// Marketplace-table extraction strategy.
pub struct AmazonExtractor {
    sender: String,
}

impl AmazonExtractor {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
        }
    }
}

impl StoreExtractor for AmazonExtractor {
    fn store(&self) -> Store {
        Store::AmazonCa
    }

    fn matches(&self, msg: &RawMessage) -> bool {
        sender_matches(msg, &self.sender)
    }

    fn extract(&self, msg: &RawMessage) -> Option<Order> {
        let body = &msg.body;

        let id = match MARKETPLACE_ORDER_NUMBER.captures(body) {
            Some(caps) => caps[1].to_string(),
            None => {
                debug!("marketplace message without an order number, skipping");
                return None;
            }
        };

        let mut names: Vec<(String, u32)> = Vec::new();
        for caps in TD_CELL.captures_iter(body) {
            let cell = &caps[1];
            if !cell.contains("Sold") {
                continue;
            }
            // The description is inside the product link when present.
            let cell_text = ANCHOR
                .captures(cell)
                .map(|a| a[1].to_string())
                .unwrap_or_else(|| text::strip_tags(cell));
            if cell_text.trim().len() <= 5 {
                continue;
            }
            split_cell(&cell_text, &mut names);
        }

        let prices: Vec<Decimal> = STRONG
            .captures_iter(body)
            .filter(|caps| caps[1].contains("CDN"))
            .filter_map(|caps| parse_price(&caps[1]).ok())
            .collect();

        let mut items = Vec::new();
        for ((name, quantity), total) in names.into_iter().zip(prices) {
            let quantity = if quantity == 0 {
                warn!("zero quantity for {:?}, assuming {}", name, ZERO_QUANTITY_FALLBACK);
                ZERO_QUANTITY_FALLBACK
            } else {
                quantity
            };
            items.push(Item::from_total(name, total, quantity, &id));
        }

        let purchased_at = msg.date.unwrap_or_else(fallback_date);
        let mut order = Order::new(id, purchased_at, Store::AmazonCa);
        order.items = items;
        order.discount = aggregate_discount(body);
        Some(order)
    }
}

/// Split one table cell into line items.
///
/// A cell holding several products separates them with double spaces,
/// and the first sub-segment then carries a `Nx` marker. Otherwise
/// the whole cell is one item with an embedded quantity marker.
fn split_cell(cell: &str, out: &mut Vec<(String, u32)>) {
    let cleaned = text::decode_hex_escapes(&text::unwrap_soft_breaks(cell)).replace('\n', "");
    let cleaned = CURRENCY_PRICE.replace_all(&cleaned, "");
    // Column gaps must survive as exactly two spaces for the split.
    let cleaned = MULTI_SPACE.replace_all(&cleaned, "  ");

    let segments: Vec<&str> = cleaned
        .split("  ")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if segments.len() > 1 && QUANTITY_MARKER.is_match(segments[0]) {
        for segment in segments {
            if segment.starts_with("Sold") {
                continue;
            }
            let Some(caps) = QUANTITY_MARKER.captures(segment) else {
                continue;
            };
            let quantity: u32 = caps[1].parse().unwrap_or(1);
            let name = clean_name(&QUANTITY_MARKER.replace(segment, ""));
            push_unique(out, name, quantity);
        }
    } else {
        let joined = segments.join(" ");
        let quantity = parse_quantity(&joined);
        let name = clean_name(&QUANTITY_MARKER.replace(&joined, ""));
        push_unique(out, name, quantity);
    }
}

fn clean_name(raw: &str) -> String {
    let name = SOLD_BY.replace_all(raw, "");
    let name = text::strip_tags(&name);
    text::collapse_whitespace(&text::decode_entities(&name))
}

/// Append unless an item with the same space-stripped name exists.
fn push_unique(out: &mut Vec<(String, u32)>, name: String, quantity: u32) {
    if name.is_empty() {
        return;
    }
    let key = name.replace(' ', "");
    if out.iter().any(|(existing, _)| existing.replace(' ', "") == key) {
        return;
    }
    out.push((name, quantity));
}
