//! Data models: orders, items, raw messages, configuration.

pub mod config;
pub mod message;
pub mod order;

pub use config::OrdexConfig;
pub use message::RawMessage;
pub use order::{Item, Order, Store};
