//! Templated-table vendor, class-attribute variant (LEGO Shop order
//! confirmations).
//!
//! The template marks semantic roles with CSS classes rather than
//! column positions: product names sit in `padT15` cells, while a
//! parallel run of `w50pc` cells alternates quantity and price values
//! for each product.

use rust_decimal::Decimal;
use tracing::debug;

use crate::models::order::fallback_date;
use crate::models::{Item, Order, RawMessage, Store};
use crate::rules::discounts::aggregate_discount;
use crate::rules::money::parse_price;
use crate::rules::patterns::{
    DIGIT_RUN, LEGO_NAME_CELL, LEGO_ORDER_NUMBER, LEGO_VALUE_CELL, TD_CELL, WORD,
};
use crate::text;

use super::{sender_matches, StoreExtractor};

/// Class-attribute templated-table extraction strategy.
pub struct LegoExtractor {
    sender: String,
}

impl LegoExtractor {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
        }
    }
}

impl StoreExtractor for LegoExtractor {
    fn store(&self) -> Store {
        Store::LegoCa
    }

    fn matches(&self, msg: &RawMessage) -> bool {
        sender_matches(msg, &self.sender) && msg.body.contains("Order Confirmation")
    }

    fn extract(&self, msg: &RawMessage) -> Option<Order> {
        let body = &msg.body;

        let id = find_order_number(body)?;

        let names: Vec<String> = LEGO_NAME_CELL
            .captures_iter(body)
            .map(|caps| clean_name(&caps[1]))
            .filter(|name| !name.is_empty())
            .collect();

        // Value cells alternate: a quantity cell announces itself with
        // a "Qty" label, anything else parseable is the line total.
        let mut quantities: Vec<u32> = Vec::new();
        let mut prices: Vec<Decimal> = Vec::new();
        for caps in LEGO_VALUE_CELL.captures_iter(body) {
            let cell = text::normalize(&caps[1]);
            if cell.contains("Qty") {
                if let Some(m) = DIGIT_RUN.find(&cell) {
                    quantities.push(m.as_str().parse().unwrap_or(1));
                }
            } else if let Ok(price) = parse_price(&text::decode_hex_escapes(&cell)) {
                prices.push(price);
            }
        }

        let mut order = Order::new(&id, msg.date.unwrap_or_else(fallback_date), Store::LegoCa);
        for ((name, quantity), total) in names.into_iter().zip(quantities).zip(prices) {
            order.items.push(Item::from_total(name, total, quantity, &id));
        }
        order.discount = aggregate_discount(body);
        Some(order)
    }
}

/// The order number is a `T`-prefixed token inside the cell labeled
/// `Order Number`.
fn find_order_number(body: &str) -> Option<String> {
    for caps in TD_CELL.captures_iter(body) {
        let cell = text::normalize(&caps[1]);
        if !cell.contains("Order Number") {
            continue;
        }
        if let Some(caps) = LEGO_ORDER_NUMBER.captures(&cell) {
            return Some(caps[1].to_string());
        }
    }
    debug!("confirmation message without an order number, skipping");
    None
}

/// Rebuild a display name from the word tokens of a mangled cell.
fn clean_name(raw: &str) -> String {
    let decoded = text::decode_entities(&text::decode_hex_escapes(&text::unwrap_soft_breaks(raw)));
    let stripped = text::strip_tags(&decoded);
    WORD.find_iter(&stripped)
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn confirmation_body(items: &[(&str, &str, &str)]) -> String {
        let mut body = String::from(
            "<h1>Order Confirmation</h1>\
             <table><tr><td>Order Number: T29510412345</td></tr></table>",
        );
        for (name, qty, price) in items {
            body.push_str(&format!(
                "<td class=\"padT15\">{}</td>\
                 <td class=\"w50pc\">Qty: {}</td>\
                 <td class=\"w50pc\">{}</td>",
                name, qty, price
            ));
        }
        body
    }

    fn extract(body: String) -> Option<Order> {
        let extractor = LegoExtractor::new("legoshop@e.lego.com");
        let msg = RawMessage::new("legoshop@e.lego.com", "Thanks for your order", body);
        extractor.extract(&msg)
    }

    #[test]
    fn test_class_marked_cells() {
        let body = confirmation_body(&[
            ("Millennium Falcon", "1", "169.99"),
            ("Brick Separator", "2", "5.98"),
        ]);
        let order = extract(body).unwrap();
        assert_eq!(order.id, "T29510412345");
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].name, "Millennium Falcon");
        assert_eq!(order.items[1].quantity, 2);
        assert_eq!(
            order.items[1].unit_price,
            Decimal::from_str("2.99").unwrap()
        );
    }

    #[test]
    fn test_name_rebuilt_from_word_tokens() {
        let body = confirmation_body(&[("Fire=\r\n Station <span>60320</span>", "1", "99.99")]);
        let order = extract(body).unwrap();
        assert_eq!(order.items[0].name, "Fire Station 60320");
    }

    #[test]
    fn test_missing_order_number_discards_fragment() {
        let body = "<h1>Order Confirmation</h1><td class=\"padT15\">Set</td>".to_string();
        assert!(extract(body).is_none());
    }

    #[test]
    fn test_confirmation_gate() {
        let extractor = LegoExtractor::new("legoshop@e.lego.com");
        let promo = RawMessage::new("legoshop@e.lego.com", "New sets", "Big sale this week");
        assert!(!extractor.matches(&promo));
    }
}
