//! Configuration structures for the extraction pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::OrdexError;

use super::order::Store;

/// Main configuration for the ordex pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrdexConfig {
    /// Mailbox/routing configuration.
    pub mailbox: MailboxConfig,

    /// Extraction and reconciliation configuration.
    pub extraction: ExtractionConfig,

    /// Export configuration.
    pub export: ExportConfig,
}

impl Default for OrdexConfig {
    fn default() -> Self {
        Self {
            mailbox: MailboxConfig::default(),
            extraction: ExtractionConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

/// Routing configuration for the mailbox collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailboxConfig {
    /// Stores to process.
    pub enabled_stores: Vec<Store>,

    /// Per-store sender address overrides. Stores without an entry use
    /// their built-in notification address.
    pub senders: BTreeMap<Store, String>,

    /// How far back the mailbox collaborator searches, in days.
    pub search_window_days: u32,
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            enabled_stores: Store::all().to_vec(),
            senders: BTreeMap::new(),
            search_window_days: 31,
        }
    }
}

impl MailboxConfig {
    /// Sender address routed to the given store.
    pub fn sender_for(&self, store: Store) -> &str {
        self.senders
            .get(&store)
            .map(String::as_str)
            .unwrap_or_else(|| store.sender())
    }
}

/// Extraction and reconciliation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Similarity ratio at or above which two item names are the same
    /// line.
    pub similarity_threshold: f64,

    /// Currency marker expected in price and discount lines.
    pub currency_marker: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.90,
            currency_marker: "CDN$".to_string(),
        }
    }
}

/// Export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Default output format ("csv" or "json").
    pub default_format: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_format: "csv".to_string(),
        }
    }
}

/// Settings addressable by dotted key from the command line.
pub const SETTING_KEYS: [&str; 4] = [
    "mailbox.search_window_days",
    "extraction.similarity_threshold",
    "extraction.currency_marker",
    "export.default_format",
];

impl OrdexConfig {
    /// Read one setting as display text.
    ///
    /// Per-store sender overrides are addressed as
    /// `mailbox.senders.<store key>`; reading one falls back to the
    /// store's built-in address.
    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(store_key) = key.strip_prefix("mailbox.senders.") {
            let store = Store::from_key(store_key)?;
            return Some(self.mailbox.sender_for(store).to_string());
        }
        match key {
            "mailbox.search_window_days" => Some(self.mailbox.search_window_days.to_string()),
            "extraction.similarity_threshold" => {
                Some(self.extraction.similarity_threshold.to_string())
            }
            "extraction.currency_marker" => Some(self.extraction.currency_marker.clone()),
            "export.default_format" => Some(self.export.default_format.clone()),
            _ => None,
        }
    }

    /// Update one setting from command-line text, validating the value
    /// against what the key can hold.
    pub fn set(&mut self, key: &str, value: &str) -> crate::error::Result<()> {
        if let Some(store_key) = key.strip_prefix("mailbox.senders.") {
            let store = Store::from_key(store_key)
                .ok_or_else(|| OrdexError::Config(format!("unknown store: {}", store_key)))?;
            self.mailbox.senders.insert(store, value.to_string());
            return Ok(());
        }
        match key {
            "mailbox.search_window_days" => {
                self.mailbox.search_window_days = value
                    .parse()
                    .map_err(|_| OrdexError::Config(format!("{} expects a day count", key)))?;
            }
            "extraction.similarity_threshold" => {
                let threshold: f64 = value
                    .parse()
                    .map_err(|_| OrdexError::Config(format!("{} expects a ratio", key)))?;
                if !(0.0..=1.0).contains(&threshold) {
                    return Err(OrdexError::Config(format!(
                        "{} must be between 0 and 1",
                        key
                    )));
                }
                self.extraction.similarity_threshold = threshold;
            }
            "extraction.currency_marker" => {
                self.extraction.currency_marker = value.to_string();
            }
            "export.default_format" => {
                let format = value.to_lowercase();
                if format != "csv" && format != "json" {
                    return Err(OrdexError::Config(format!(
                        "{} must be \"csv\" or \"json\"",
                        key
                    )));
                }
                self.export.default_format = format;
            }
            _ => {
                return Err(OrdexError::Config(format!(
                    "unknown configuration key: {}",
                    key
                )));
            }
        }
        Ok(())
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}
