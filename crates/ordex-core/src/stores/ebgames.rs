//! Templated-table vendor, position-based variant (EB Games shipment
//! notices).
//!
//! Item rows repeat as five-column groups with a fixed field order:
//! SKU, name, platform, quantity, price. Positions are load-bearing;
//! the table renders no reliable header labels.

use tracing::debug;

use crate::models::order::fallback_date;
use crate::models::{Item, Order, RawMessage, Store};
use crate::rules::discounts::aggregate_discount;
use crate::rules::money::parse_price;
use crate::rules::patterns::{EBGAMES_ORDER_NUMBER, PARAGRAPH, TD_CELL};
use crate::text;

use super::{sender_matches, StoreExtractor};

/// Columns per item row group.
const ROW_WIDTH: usize = 5;

/// Position-based templated-table extraction strategy.
pub struct EbGamesExtractor {
    sender: String,
}

impl EbGamesExtractor {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
        }
    }
}

impl StoreExtractor for EbGamesExtractor {
    fn store(&self) -> Store {
        Store::EbGames
    }

    fn matches(&self, msg: &RawMessage) -> bool {
        sender_matches(msg, &self.sender) && msg.subject.contains("Shipment")
    }

    fn extract(&self, msg: &RawMessage) -> Option<Order> {
        let body = &msg.body;

        let id = find_order_number(body)?;

        let cells: Vec<String> = TD_CELL
            .captures_iter(body)
            .map(|caps| text::normalize(&caps[1]))
            .collect();

        let mut order = Order::new(&id, msg.date.unwrap_or_else(fallback_date), Store::EbGames);

        // First row group is the header; the rest are items.
        for row in cells.chunks_exact(ROW_WIDTH).skip(1) {
            let name = row[1].clone();
            if name.is_empty() {
                continue;
            }
            let quantity: u32 = row[3].trim().parse().unwrap_or(1);
            let total = match parse_price(&row[4]) {
                Ok(total) => total,
                Err(_) => {
                    debug!("unparseable price cell {:?}, dropping row", row[4]);
                    continue;
                }
            };
            order.items.push(Item::from_total(name, total, quantity, &id));
        }

        order.discount = aggregate_discount(body);
        Some(order)
    }
}

/// The order number hides in a paragraph of the form
/// `Order number ... | 123456 ...`, mangled by the encoding.
fn find_order_number(body: &str) -> Option<String> {
    for caps in PARAGRAPH.captures_iter(body) {
        let paragraph = text::normalize(&caps[1]);
        if !paragraph.contains("Order number") {
            continue;
        }
        if let Some(caps) = EBGAMES_ORDER_NUMBER.captures(&paragraph) {
            return Some(caps[1].to_string());
        }
    }
    debug!("templated-table message without an order number, skipping");
    None
}
