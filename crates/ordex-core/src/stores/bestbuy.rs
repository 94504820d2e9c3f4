//! PDF-invoice vendor (Best Buy shipment notices).
//!
//! The order data lives in PDF attachments, not the message body.
//! Converted attachment text renders as a flat sequence of labeled
//! spans; values are recognized by the label immediately preceding
//! them.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::ExtractError;
use crate::models::order::fallback_date;
use crate::models::{Item, Order, RawMessage, Store};
use crate::pdf::PdfConverter;
use crate::rules::dates::parse_invoice_datetime;
use crate::rules::discounts::aggregate_discount;
use crate::rules::money::parse_price;
use crate::rules::patterns::DIGIT_RUN;
use crate::text;

use super::{sender_matches, StoreExtractor};

/// Boilerplate labels that must never become item names.
const EXCLUDED_LABELS: [&str; 3] = ["Product Description", "Payment Information", "Serial Number"];

/// Field labels that terminate a description block.
const FIELD_LABELS: [&str; 4] = ["Order Number", "Order Date", "Qty", "Total"];

/// PDF-invoice extraction strategy.
pub struct BestBuyExtractor {
    sender: String,
}

/// Fields recovered from one converted attachment.
#[derive(Debug, Default)]
struct InvoiceFields {
    order_number: Option<String>,
    order_date: Option<NaiveDateTime>,
    names: Vec<String>,
    quantities: Vec<u32>,
    prices: Vec<Decimal>,
    discount: Decimal,
}

impl BestBuyExtractor {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
        }
    }

    /// Convert one attachment into its labeled spans.
    fn convert_attachment(&self, name: &str, data: &[u8]) -> Result<Vec<String>, ExtractError> {
        let conversion_error = |reason: String| ExtractError::AttachmentConversion {
            name: name.to_string(),
            reason,
        };
        let mut converter = PdfConverter::new();
        converter
            .load(data)
            .map_err(|e| conversion_error(e.to_string()))?;
        converter
            .extract_spans()
            .map_err(|e| conversion_error(e.to_string()))
    }
}

impl StoreExtractor for BestBuyExtractor {
    fn store(&self) -> Store {
        Store::BestBuyCa
    }

    fn matches(&self, msg: &RawMessage) -> bool {
        sender_matches(msg, &self.sender) && msg.subject.to_lowercase().contains("ship")
    }

    fn extract(&self, msg: &RawMessage) -> Option<Order> {
        if msg.attachments.is_empty() {
            debug!("invoice message without attachments, skipping");
            return None;
        }

        // A multi-page shipment arrives as several attachments of one
        // logical invoice; concatenate their fields.
        let mut merged = InvoiceFields::default();
        for (name, data) in &msg.attachments {
            let spans = match self.convert_attachment(name, data) {
                Ok(spans) => spans,
                Err(e) => {
                    // Other attachments of the same message still count.
                    warn!("{}", e);
                    continue;
                }
            };
            let fields = parse_invoice_spans(&spans);
            if merged.order_number.is_none() {
                merged.order_number = fields.order_number;
            }
            if merged.order_date.is_none() {
                merged.order_date = fields.order_date;
            }
            merged.names.extend(fields.names);
            merged.quantities.extend(fields.quantities);
            merged.prices.extend(fields.prices);
            merged.discount += fields.discount;
        }

        let id = match merged.order_number {
            Some(id) => id,
            None => {
                debug!("no order number recovered from attachments");
                return None;
            }
        };

        let purchased_at = merged
            .order_date
            .or(msg.date)
            .unwrap_or_else(fallback_date);

        let mut order = Order::new(&id, purchased_at, Store::BestBuyCa);
        for ((name, quantity), total) in merged
            .names
            .into_iter()
            .zip(merged.quantities)
            .zip(merged.prices)
        {
            order.items.push(Item::from_total(name, total, quantity, &id));
        }
        order.discount = merged.discount;
        Some(order)
    }
}

/// Walk the labeled spans of one converted invoice.
fn parse_invoice_spans(spans: &[String]) -> InvoiceFields {
    let mut fields = InvoiceFields::default();
    fields.discount = aggregate_discount(&spans.join("\n"));

    let mut awaiting_description = false;
    let mut prev = "";
    for span in spans.iter().map(String::as_str) {
        if span.starts_with("Product Description") {
            awaiting_description = true;
        } else if awaiting_description {
            // Only the first non-label line after the label is the
            // canonical name; boilerplate labels end the block empty.
            awaiting_description = false;
            if !is_label(span) {
                fields.names.push(text::decode_entities(span));
            }
        }

        if span.starts_with("Order Date") {
            if let Ok(date) = parse_invoice_datetime(span) {
                fields.order_date = Some(date);
            }
        } else if prev.starts_with("Order Number") && fields.order_number.is_none() {
            if let Some(m) = DIGIT_RUN.find(span) {
                fields.order_number = Some(m.as_str().to_string());
            }
        } else if prev.starts_with("Qty") {
            for m in DIGIT_RUN.find_iter(span) {
                if let Ok(qty) = m.as_str().parse() {
                    fields.quantities.push(qty);
                }
            }
        } else if prev == "Total" {
            if let Ok(price) = parse_price(span) {
                fields.prices.push(price);
            }
        }

        prev = span;
    }

    fields
}

fn is_label(span: &str) -> bool {
    EXCLUDED_LABELS
        .iter()
        .chain(FIELD_LABELS.iter())
        .any(|label| span.starts_with(label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    /// The span shape `PdfConverter::extract_spans` produces.
    fn spans(converted: &str) -> Vec<String> {
        converted
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_invoice_spans() {
        let converted = "\
Order Number
1042337751
Order Date: 05-Mar-2019 10:21:30 AM (PST)
Product Description
Steam Link
Qty
1
Total
24.99
";
        let fields = parse_invoice_spans(&spans(converted));
        assert_eq!(fields.order_number.as_deref(), Some("1042337751"));
        assert_eq!(fields.names, vec!["Steam Link".to_string()]);
        assert_eq!(fields.quantities, vec![1]);
        assert_eq!(fields.prices, vec![Decimal::from_str("24.99").unwrap()]);
        assert!(fields.order_date.is_some());
    }

    #[test]
    fn test_boilerplate_labels_yield_no_items() {
        let converted = "\
Order Number
1042337751
Product Description
Payment Information
Serial Number
";
        let fields = parse_invoice_spans(&spans(converted));
        assert!(fields.names.is_empty());
    }

    #[test]
    fn test_unconvertible_attachment_error_names_file() {
        let extractor = BestBuyExtractor::new("noreply@bestbuy.ca");
        let err = extractor
            .convert_attachment("invoice.pdf", b"not really a pdf")
            .unwrap_err();
        assert!(matches!(
            err,
            ExtractError::AttachmentConversion { ref name, .. } if name == "invoice.pdf"
        ));
    }

    #[test]
    fn test_no_attachments_is_skipped() {
        let extractor = BestBuyExtractor::new("noreply@bestbuy.ca");
        let msg = RawMessage::new("noreply@bestbuy.ca", "Your order has shipped", "body");
        assert!(extractor.extract(&msg).is_none());
    }

    #[test]
    fn test_unconvertible_attachment_is_skipped() {
        let extractor = BestBuyExtractor::new("noreply@bestbuy.ca");
        let msg = RawMessage::new("noreply@bestbuy.ca", "Your order has shipped", "body")
            .with_attachment("invoice.pdf", b"not really a pdf".to_vec());
        // Conversion fails for the only attachment; no fragment.
        assert!(extractor.extract(&msg).is_none());
    }

    #[test]
    fn test_subject_routing() {
        let extractor = BestBuyExtractor::new("noreply@bestbuy.ca");
        let shipped = RawMessage::new("noreply@bestbuy.ca", "Your order has shipped", "");
        assert!(extractor.matches(&shipped));
        let promo = RawMessage::new("noreply@bestbuy.ca", "Weekly deals", "");
        assert!(!extractor.matches(&promo));
    }
}
