//! PDF attachment conversion.

mod converter;

pub use converter::PdfConverter;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;
