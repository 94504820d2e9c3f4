//! Core library for order-mail extraction and reconciliation.
//!
//! This crate provides:
//! - Text normalization for quoted-printable and HTML-mangled bodies
//! - Per-vendor extraction strategies (tables, PDF invoices, tagged
//!   markup) behind a common routing interface
//! - PDF attachment conversion (text and span extraction)
//! - Reconciliation of notification fragments into canonical orders
//! - Flat report rows for export

pub mod error;
pub mod models;
pub mod pdf;
pub mod reconcile;
pub mod report;
pub mod rules;
pub mod stores;
pub mod text;

pub use error::{ExtractError, OrdexError, PdfError, Result};
pub use models::{Item, Order, OrdexConfig, RawMessage, Store};
pub use pdf::PdfConverter;
pub use reconcile::{Reconciler, DEFAULT_SIMILARITY_THRESHOLD};
pub use report::{flatten, OrderRow};
pub use stores::{ExtractorRegistry, StoreExtractor};
