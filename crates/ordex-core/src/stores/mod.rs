//! Vendor extraction strategies.
//!
//! One strategy per store, all implementing the same contract: raw
//! message (plus attachments) in, zero or one order fragment out. An
//! extractor never fails hard on malformed input; unparseable fields
//! fall back per field, and a fragment without an order identifier is
//! dropped entirely.

mod amazon;
mod bestbuy;
mod ebgames;
mod lego;
mod walmart;

pub use amazon::AmazonExtractor;
pub use bestbuy::BestBuyExtractor;
pub use ebgames::EbGamesExtractor;
pub use lego::LegoExtractor;
pub use walmart::WalmartExtractor;

use tracing::debug;

use crate::models::config::OrdexConfig;
use crate::models::{Order, RawMessage, Store};

/// Capability interface for per-vendor extraction.
pub trait StoreExtractor: Send + Sync {
    /// The store this strategy handles.
    fn store(&self) -> Store;

    /// Routing rule: does this message belong to this strategy?
    /// Matches on sender address and, for some vendors, the subject.
    fn matches(&self, msg: &RawMessage) -> bool;

    /// Extract an order fragment from the message. `None` means the
    /// message carried no recoverable order (missing order id,
    /// unusable attachments, wrong notification subtype).
    fn extract(&self, msg: &RawMessage) -> Option<Order>;
}

/// Routing table mapping sender addresses to strategies.
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn StoreExtractor>>,
}

impl ExtractorRegistry {
    /// Registry with every store enabled and default sender addresses.
    pub fn new() -> Self {
        Self::from_config(&OrdexConfig::default())
    }

    /// Registry honoring the config's enabled stores and sender
    /// overrides.
    pub fn from_config(config: &OrdexConfig) -> Self {
        let mut extractors: Vec<Box<dyn StoreExtractor>> = Vec::new();
        for store in Store::all() {
            if !config.mailbox.enabled_stores.contains(&store) {
                continue;
            }
            let sender = config.mailbox.sender_for(store).to_string();
            extractors.push(match store {
                Store::AmazonCa => Box::new(AmazonExtractor::new(sender)),
                Store::BestBuyCa => Box::new(BestBuyExtractor::new(sender)),
                Store::EbGames => Box::new(EbGamesExtractor::new(sender)),
                Store::LegoCa => Box::new(LegoExtractor::new(sender)),
                Store::Walmart => Box::new(WalmartExtractor::new(sender)),
            });
        }
        Self { extractors }
    }

    /// Find the strategy whose routing rule matches the message.
    pub fn route(&self, msg: &RawMessage) -> Option<&dyn StoreExtractor> {
        self.extractors
            .iter()
            .map(Box::as_ref)
            .find(|extractor| extractor.matches(msg))
    }

    /// Route and extract. A message no strategy recognizes is a
    /// recognition miss, not an error.
    pub fn extract(&self, msg: &RawMessage) -> Option<Order> {
        let extractor = match self.route(msg) {
            Some(extractor) => extractor,
            None => {
                debug!("no strategy matched sender {:?}", msg.sender);
                return None;
            }
        };
        debug!("routing message to {}", extractor.store().label());
        extractor.extract(msg)
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Sender-address match: the configured address appearing anywhere in
/// the header value tolerates display-name wrappers.
fn sender_matches(msg: &RawMessage, sender: &str) -> bool {
    !sender.is_empty() && msg.sender.contains(sender)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_sender_is_recognition_miss() {
        let registry = ExtractorRegistry::new();
        let msg = RawMessage::new("spam@example.com", "Your order", "body");
        assert!(registry.route(&msg).is_none());
        assert!(registry.extract(&msg).is_none());
    }

    #[test]
    fn test_routes_by_sender() {
        let registry = ExtractorRegistry::new();
        let msg = RawMessage::new("shipment-tracking@amazon.ca", "Shipped", "body");
        let extractor = registry.route(&msg).unwrap();
        assert_eq!(extractor.store(), Store::AmazonCa);
    }

    #[test]
    fn test_subject_gates_shipment_vendors() {
        let registry = ExtractorRegistry::new();
        // EB Games messages route only for shipment notices.
        let notice = RawMessage::new("help@ebgames.ca", "Shipment Confirmation", "body");
        assert!(registry.route(&notice).is_some());
        let return_notice = RawMessage::new("help@ebgames.ca", "Return processed", "body");
        assert!(registry.route(&return_notice).is_none());
    }

    #[test]
    fn test_disabled_store_not_routed() {
        let mut config = OrdexConfig::default();
        config.mailbox.enabled_stores.retain(|s| *s != Store::AmazonCa);
        let registry = ExtractorRegistry::from_config(&config);
        let msg = RawMessage::new("shipment-tracking@amazon.ca", "Shipped", "body");
        assert!(registry.route(&msg).is_none());
    }
}
