//! Structured-tag vendor (Walmart order confirmations).
//!
//! Unlike the table-scraping vendors, this template embeds order data
//! in custom elements (`<ordernumber>`, `<itemname>`, ...), so the
//! body streams through an XML reader configured to tolerate the
//! surrounding HTML instead of a battery of regexes.

use quick_xml::events::Event;
use quick_xml::Reader;
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::order::fallback_date;
use crate::models::{Item, Order, RawMessage, Store};
use crate::rules::dates::parse_long_date;
use crate::rules::money::parse_price;

use super::{sender_matches, StoreExtractor};

/// Structured-tag extraction strategy.
pub struct WalmartExtractor {
    sender: String,
}

/// Values accumulated while streaming one message body.
#[derive(Debug, Default)]
struct TagValues {
    order_number: Option<String>,
    order_date: Option<String>,
    names: Vec<String>,
    quantities: Vec<u32>,
    prices: Vec<Decimal>,
}

impl WalmartExtractor {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
        }
    }
}

impl StoreExtractor for WalmartExtractor {
    fn store(&self) -> Store {
        Store::Walmart
    }

    fn matches(&self, msg: &RawMessage) -> bool {
        sender_matches(msg, &self.sender) && msg.subject.to_lowercase().contains("shipped")
    }

    fn extract(&self, msg: &RawMessage) -> Option<Order> {
        let values = collect_tag_values(&msg.body);

        let id = match values.order_number {
            Some(id) => id,
            None => {
                debug!("structured-tag message without an order number, skipping");
                return None;
            }
        };

        let purchased_at = values
            .order_date
            .as_deref()
            .and_then(|raw| parse_long_date(raw).ok())
            .or(msg.date)
            .unwrap_or_else(fallback_date);

        let mut order = Order::new(&id, purchased_at, Store::Walmart);
        // The <price> element carries the per-unit price, not the line
        // total.
        for ((name, quantity), unit_price) in values
            .names
            .into_iter()
            .zip(values.quantities)
            .zip(values.prices)
        {
            order.items.push(Item {
                name,
                unit_price,
                quantity,
                order_id: id.clone(),
            });
        }
        Some(order)
    }
}

/// Stream the body and pick out the order-bearing elements in
/// document order.
fn collect_tag_values(body: &str) -> TagValues {
    let mut reader = Reader::from_str(body);
    let config = reader.config_mut();
    config.trim_text(true);
    // Email HTML is full of unclosed tags; keep streaming past them.
    config.check_end_names = false;

    let mut values = TagValues::default();
    let mut current: Option<Vec<u8>> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name().as_ref().to_ascii_lowercase();
                current = match name.as_slice() {
                    b"ordernumber" | b"orderdate" | b"itemname" | b"quantity" | b"price" => {
                        Some(name)
                    }
                    _ => None,
                };
            }
            Ok(Event::Text(t)) => {
                let Some(tag) = current.as_deref() else {
                    continue;
                };
                let Ok(content) = t.unescape() else {
                    continue;
                };
                let content = content.trim();
                if content.is_empty() {
                    continue;
                }
                match tag {
                    b"ordernumber" if values.order_number.is_none() => {
                        values.order_number = Some(content.to_string());
                    }
                    b"orderdate" if values.order_date.is_none() => {
                        values.order_date = Some(content.to_string());
                    }
                    b"itemname" => values.names.push(content.to_string()),
                    // Quantities render as decimals ("1.0").
                    b"quantity" => values
                        .quantities
                        .push(content.parse::<f64>().map(|q| q as u32).unwrap_or(1)),
                    b"price" => {
                        if let Ok(price) = parse_price(content) {
                            values.prices.push(price);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Eof) => break,
            Err(e) => {
                debug!("stopping tag scan on malformed markup: {}", e);
                break;
            }
            _ => {}
        }
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn confirmation_body() -> String {
        "<html><body>\
         <ordernumber>3577104964318</ordernumber>\
         <orderdate>April 17, 2019</orderdate>\
         <itemname>Crayola Crayons</itemname>\
         <quantity>2.0</quantity>\
         <price>$7.94</price>\
         <itemname>Glue Stick</itemname>\
         <quantity>1.0</quantity>\
         <price>$1.97</price>\
         </body></html>"
            .to_string()
    }

    fn extract(body: String) -> Option<Order> {
        let extractor = WalmartExtractor::new("noreply@walmart.ca");
        let msg = RawMessage::new("noreply@walmart.ca", "Your order has shipped", body);
        extractor.extract(&msg)
    }

    #[test]
    fn test_structured_tags() {
        let order = extract(confirmation_body()).unwrap();
        assert_eq!(order.id, "3577104964318");
        assert_eq!(
            order.purchased_at.date(),
            NaiveDate::from_ymd_opt(2019, 4, 17).unwrap()
        );
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].name, "Crayola Crayons");
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(
            order.items[0].unit_price,
            Decimal::from_str("7.94").unwrap()
        );
    }

    #[test]
    fn test_price_tag_is_per_unit() {
        let body = "<ordernumber>1</ordernumber>\
                    <itemname>Crayons</itemname>\
                    <quantity>2.0</quantity>\
                    <price>$7.94</price>"
            .to_string();
        let order = extract(body).unwrap();
        assert_eq!(
            order.items[0].unit_price,
            Decimal::from_str("7.94").unwrap()
        );
        assert_eq!(
            order.items[0].total_price(),
            Decimal::from_str("15.88").unwrap()
        );
    }

    #[test]
    fn test_subject_gates_routing() {
        let extractor = WalmartExtractor::new("noreply@walmart.ca");
        let shipped = RawMessage::new("noreply@walmart.ca", "Your order has shipped", "");
        assert!(extractor.matches(&shipped));
        let promo = RawMessage::new("noreply@walmart.ca", "Weekly flyer", "");
        assert!(!extractor.matches(&promo));
    }

    #[test]
    fn test_decimal_quantity_coerced() {
        let values = collect_tag_values("<quantity>3.0</quantity>");
        assert_eq!(values.quantities, vec![3]);
    }

    #[test]
    fn test_unparseable_quantity_defaults_to_one() {
        let values = collect_tag_values("<quantity>a few</quantity>");
        assert_eq!(values.quantities, vec![1]);
    }

    #[test]
    fn test_missing_order_number_discards_fragment() {
        let body = "<itemname>Thing</itemname><quantity>1.0</quantity><price>$1.00</price>";
        assert!(extract(body.to_string()).is_none());
    }

    #[test]
    fn test_tolerates_unclosed_html() {
        let body = format!("<br><p>Hi there{}", confirmation_body());
        let order = extract(body).unwrap();
        assert_eq!(order.items.len(), 2);
    }
}
