//! Order and line-item data models.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Closed set of supported vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Store {
    AmazonCa,
    BestBuyCa,
    EbGames,
    LegoCa,
    Walmart,
}

impl Store {
    /// All supported stores, in processing order.
    pub fn all() -> [Store; 5] {
        [
            Store::AmazonCa,
            Store::BestBuyCa,
            Store::EbGames,
            Store::LegoCa,
            Store::Walmart,
        ]
    }

    /// Default notification sender address for this store.
    pub fn sender(&self) -> &'static str {
        match self {
            Store::AmazonCa => "shipment-tracking@amazon.ca",
            Store::BestBuyCa => "noreply@bestbuy.ca",
            Store::EbGames => "help@ebgames.ca",
            Store::LegoCa => "legoshop@e.lego.com",
            Store::Walmart => "noreply@walmart.ca",
        }
    }

    /// Key used to address this store in config files and on the
    /// command line. Matches the serialized form.
    pub fn key(&self) -> &'static str {
        match self {
            Store::AmazonCa => "amazon_ca",
            Store::BestBuyCa => "best_buy_ca",
            Store::EbGames => "eb_games",
            Store::LegoCa => "lego_ca",
            Store::Walmart => "walmart",
        }
    }

    /// Inverse of [`Store::key`].
    pub fn from_key(key: &str) -> Option<Store> {
        Store::all().into_iter().find(|store| store.key() == key)
    }

    /// Human-readable store name for reports.
    pub fn label(&self) -> &'static str {
        match self {
            Store::AmazonCa => "Amazon.ca",
            Store::BestBuyCa => "BestBuy.ca",
            Store::EbGames => "EB Games",
            Store::LegoCa => "LEGO Shop",
            Store::Walmart => "Walmart.ca",
        }
    }
}

/// One purchase, either a single-message fragment or a merged
/// canonical order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Vendor-issued order number; the merge key. Never empty for a
    /// retained fragment.
    pub id: String,

    /// Purchase/shipment timestamp, from the message body or the
    /// mail date header.
    pub purchased_at: NaiveDateTime,

    /// Issuing store. Merging never changes this.
    pub store: Store,

    /// Line items in extraction order.
    pub items: Vec<Item>,

    /// Total discount applied to the order.
    pub discount: Decimal,
}

impl Order {
    /// Create an order fragment with an empty cart.
    pub fn new(id: impl Into<String>, purchased_at: NaiveDateTime, store: Store) -> Self {
        Self {
            id: id.into(),
            purchased_at,
            store,
            items: Vec::new(),
            discount: Decimal::ZERO,
        }
    }

    /// Number of line items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all line totals, before discount.
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(Item::total_price).sum()
    }
}

/// One line in an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Product description, entity-decoded, markup and price
    /// substrings stripped.
    pub name: String,

    /// Price per unit, rounded to 2 decimal places.
    pub unit_price: Decimal,

    /// Units purchased. At least 1 after extraction fallbacks.
    pub quantity: u32,

    /// Owning order number. A back-reference, not an ownership link.
    pub order_id: String,
}

impl Item {
    /// Create an item from a line total.
    ///
    /// The unit price is `total / quantity`; when the quantity is zero
    /// the total is kept as the unit price rather than dividing.
    pub fn from_total(
        name: impl Into<String>,
        total: Decimal,
        quantity: u32,
        order_id: impl Into<String>,
    ) -> Self {
        let unit_price = if quantity == 0 {
            total.round_dp(2)
        } else {
            (total / Decimal::from(quantity)).round_dp(2)
        };
        Self {
            name: name.into(),
            unit_price,
            quantity,
            order_id: order_id.into(),
        }
    }

    /// Line total: unit price times quantity.
    pub fn total_price(&self) -> Decimal {
        (self.unit_price * Decimal::from(self.quantity)).round_dp(2)
    }
}

/// Fallback purchase timestamp when neither the body nor the date
/// header carries one.
pub fn fallback_date() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1970, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_item_unit_price_from_total() {
        let item = Item::from_total("Widget", Decimal::from_str("10.00").unwrap(), 4, "ORD-1");
        assert_eq!(item.unit_price, Decimal::from_str("2.50").unwrap());
        assert_eq!(item.total_price(), Decimal::from_str("10.00").unwrap());
    }

    #[test]
    fn test_item_zero_quantity_keeps_total() {
        let item = Item::from_total("Widget", Decimal::from_str("9.99").unwrap(), 0, "ORD-1");
        assert_eq!(item.unit_price, Decimal::from_str("9.99").unwrap());
    }

    #[test]
    fn test_order_subtotal() {
        let mut order = Order::new("ORD-1", fallback_date(), Store::Walmart);
        order
            .items
            .push(Item::from_total("A", Decimal::from_str("4.00").unwrap(), 2, "ORD-1"));
        order
            .items
            .push(Item::from_total("B", Decimal::from_str("2.00").unwrap(), 1, "ORD-1"));
        assert_eq!(order.subtotal(), Decimal::from_str("6.00").unwrap());
        assert_eq!(order.len(), 2);
    }

    #[test]
    fn test_store_senders() {
        assert_eq!(Store::AmazonCa.sender(), "shipment-tracking@amazon.ca");
        assert_eq!(Store::all().len(), 5);
    }

    #[test]
    fn test_store_key_roundtrip() {
        for store in Store::all() {
            assert_eq!(Store::from_key(store.key()), Some(store));
        }
        assert_eq!(Store::from_key("sears"), None);
    }
}
