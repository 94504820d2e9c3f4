//! Tabular report rows for export.
//!
//! Merged orders flatten to one row per line item so the output drops
//! straight into a spreadsheet.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::Order;

/// One exported line item. The field order is the column order the
/// export consumers expect.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRow {
    pub date: NaiveDateTime,
    pub order_id: String,
    pub item_name: String,
    pub total_price: Decimal,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub discount: Decimal,
}

/// Flatten merged orders into rows, preserving order and item order.
/// The order-level discount repeats on each of its rows.
pub fn flatten(orders: &[Order]) -> Vec<OrderRow> {
    let mut rows = Vec::new();
    for order in orders {
        for item in &order.items {
            rows.push(OrderRow {
                date: order.purchased_at,
                order_id: order.id.clone(),
                item_name: item.name.clone(),
                total_price: item.total_price(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                discount: order.discount,
            });
        }
    }
    rows
}
