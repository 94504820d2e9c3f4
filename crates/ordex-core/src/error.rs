//! Error types for the ordex-core library.

use thiserror::Error;

/// Main error type for the ordex library.
#[derive(Error, Debug)]
pub enum OrdexError {
    /// PDF attachment processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Order extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF attachment conversion.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF data.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from the PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Conversion produced no usable text.
    #[error("PDF conversion yielded no text")]
    NoText,
}

/// Errors related to order field extraction.
///
/// Most extraction failures are resolved locally (quantity falls back
/// to 1, discount lines to 0, fragments without an order id to `None`
/// rather than an error), so these surface only at the few seams where
/// the caller needs to distinguish the failure.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// No decimal price pattern found in the text.
    #[error("no price found in text")]
    NoPriceFound,

    /// A date string could not be parsed.
    #[error("failed to parse date: {0}")]
    UnparseableDate(String),

    /// An attachment could not be converted to text.
    #[error("attachment conversion failed for {name}: {reason}")]
    AttachmentConversion { name: String, reason: String },
}

/// Result type for the ordex library.
pub type Result<T> = std::result::Result<T, OrdexError>;
