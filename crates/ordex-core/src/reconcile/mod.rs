//! Fragment reconciliation.
//!
//! One purchase surfaces as several notifications (confirmation,
//! shipment splits, invoice attachments), each yielding a partial
//! order fragment. The reconciler folds fragments for the same
//! `(order id, store)` pair into one canonical order, pairing line
//! items by name and summing their quantities and totals.

pub mod similarity;

pub use similarity::similarity;

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{Item, Order, Store};

/// Name-ratio threshold at or above which two line items are
/// considered the same product.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.90;

/// Accumulates order fragments and produces merged orders.
pub struct Reconciler {
    threshold: f64,
    groups: HashMap<(String, Store), Order>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_SIMILARITY_THRESHOLD)
    }

    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold,
            groups: HashMap::new(),
        }
    }

    /// Fold one fragment into its group.
    pub fn add(&mut self, fragment: Order) {
        let key = (fragment.id.clone(), fragment.store);
        match self.groups.get_mut(&key) {
            Some(existing) => {
                debug!("merging fragment into order {} ({})", key.0, key.1.label());
                merge_into(existing, fragment, self.threshold);
            }
            None => {
                self.groups.insert(key, fragment);
            }
        }
    }

    /// Number of distinct orders accumulated so far.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Consume the reconciler, returning merged orders sorted by
    /// purchase time (oldest first, id as tiebreak).
    pub fn finish(self) -> Vec<Order> {
        let mut orders: Vec<Order> = self.groups.into_values().collect();
        orders.sort_by(|a, b| {
            a.purchased_at
                .cmp(&b.purchased_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        orders
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

/// Merge `incoming` into `existing` in place.
///
/// The earliest purchase time wins (a confirmation predates its
/// shipment notices), and the first fragment's discount is kept;
/// later fragments repeat the same promotion lines.
fn merge_into(existing: &mut Order, incoming: Order, threshold: f64) {
    if incoming.purchased_at < existing.purchased_at {
        existing.purchased_at = incoming.purchased_at;
    }

    for item in incoming.items {
        match find_match(&existing.items, &item.name, threshold) {
            Some(idx) => combine_items(&mut existing.items[idx], &item),
            None => existing.items.push(item),
        }
    }
}

/// Index of the existing item the named item should merge with, if
/// any: an exact match on the normalized name, or the first name
/// whose similarity ratio clears the threshold.
fn find_match(items: &[Item], name: &str, threshold: f64) -> Option<usize> {
    let needle = normalize_name(name);
    if let Some(idx) = items
        .iter()
        .position(|item| normalize_name(&item.name) == needle)
    {
        return Some(idx);
    }
    items
        .iter()
        .position(|item| similarity(&normalize_name(&item.name), &needle) >= threshold)
}

/// Case- and whitespace-insensitive name key.
fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Sum quantities and totals, then recompute the unit price.
fn combine_items(existing: &mut Item, incoming: &Item) {
    let total = existing.total_price() + incoming.total_price();
    existing.quantity += incoming.quantity;
    existing.unit_price = if existing.quantity == 0 {
        total
    } else {
        (total / Decimal::from(existing.quantity)).round_dp(2)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::fallback_date;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn order_with(id: &str, items: Vec<Item>) -> Order {
        let mut order = Order::new(id, fallback_date(), Store::AmazonCa);
        order.items = items;
        order
    }

    #[test]
    fn test_distinct_orders_stay_apart() {
        let mut reconciler = Reconciler::new();
        reconciler.add(order_with("A-1", vec![]));
        reconciler.add(order_with("A-2", vec![]));
        assert_eq!(reconciler.len(), 2);
    }

    #[test]
    fn test_same_id_different_store_stays_apart() {
        let mut reconciler = Reconciler::new();
        let mut a = order_with("100", vec![]);
        a.store = Store::AmazonCa;
        let mut b = order_with("100", vec![]);
        b.store = Store::Walmart;
        reconciler.add(a);
        reconciler.add(b);
        assert_eq!(reconciler.len(), 2);
    }

    #[test]
    fn test_quantities_and_totals_sum() {
        let mut reconciler = Reconciler::new();
        reconciler.add(order_with(
            "A-1",
            vec![Item::from_total("Blue Pen", dec("4.00"), 2, "A-1")],
        ));
        reconciler.add(order_with(
            "A-1",
            vec![Item::from_total("Blue Pen", dec("2.00"), 1, "A-1")],
        ));
        let orders = reconciler.finish();
        assert_eq!(orders.len(), 1);
        let item = &orders[0].items[0];
        assert_eq!(item.quantity, 3);
        assert_eq!(item.total_price(), dec("6.00"));
        assert_eq!(item.unit_price, dec("2.00"));
    }

    #[test]
    fn test_near_duplicate_names_merge() {
        let mut reconciler = Reconciler::new();
        reconciler.add(order_with(
            "A-1",
            vec![Item::from_total(
                "Crayola Crayons 24 Count Assorted Colors",
                dec("7.94"),
                2,
                "A-1",
            )],
        ));
        reconciler.add(order_with(
            "A-1",
            vec![Item::from_total(
                "Crayola Crayons 24 Count Assorted Color",
                dec("3.97"),
                1,
                "A-1",
            )],
        ));
        let orders = reconciler.finish();
        assert_eq!(orders[0].items.len(), 1);
        assert_eq!(orders[0].items[0].quantity, 3);
    }

    #[test]
    fn test_case_and_whitespace_insensitive_pairing() {
        let mut reconciler = Reconciler::new();
        reconciler.add(order_with(
            "A-1",
            vec![Item::from_total("Blue  Pen", dec("2.00"), 1, "A-1")],
        ));
        reconciler.add(order_with(
            "A-1",
            vec![Item::from_total("blue pen", dec("2.00"), 1, "A-1")],
        ));
        let orders = reconciler.finish();
        assert_eq!(orders[0].items.len(), 1);
        assert_eq!(orders[0].items[0].quantity, 2);
    }

    #[test]
    fn test_dissimilar_names_stay_separate() {
        let mut reconciler = Reconciler::new();
        reconciler.add(order_with(
            "A-1",
            vec![Item::from_total("Blue Pen", dec("2.00"), 1, "A-1")],
        ));
        reconciler.add(order_with(
            "A-1",
            vec![Item::from_total("Red Notebook", dec("5.00"), 1, "A-1")],
        ));
        let orders = reconciler.finish();
        assert_eq!(orders[0].items.len(), 2);
    }

    #[test]
    fn test_earliest_purchase_time_wins() {
        let early = NaiveDate::from_ymd_opt(2019, 3, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let late = NaiveDate::from_ymd_opt(2019, 3, 5)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let mut reconciler = Reconciler::new();
        let mut a = order_with("A-1", vec![]);
        a.purchased_at = late;
        let mut b = order_with("A-1", vec![]);
        b.purchased_at = early;
        reconciler.add(a);
        reconciler.add(b);
        assert_eq!(reconciler.finish()[0].purchased_at, early);
    }

    #[test]
    fn test_first_discount_kept() {
        let mut reconciler = Reconciler::new();
        let mut a = order_with("A-1", vec![]);
        a.discount = dec("3.00");
        let mut b = order_with("A-1", vec![]);
        b.discount = dec("3.00");
        reconciler.add(a);
        reconciler.add(b);
        assert_eq!(reconciler.finish()[0].discount, dec("3.00"));
    }

    #[test]
    fn test_finish_sorted_by_purchase_time() {
        let d1 = NaiveDate::from_ymd_opt(2019, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let d2 = NaiveDate::from_ymd_opt(2019, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mut reconciler = Reconciler::new();
        let mut a = order_with("B-2", vec![]);
        a.purchased_at = d1;
        let mut b = order_with("A-1", vec![]);
        b.purchased_at = d2;
        reconciler.add(a);
        reconciler.add(b);
        let orders = reconciler.finish();
        let ids: Vec<&str> = orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["A-1", "B-2"]);
    }
}
