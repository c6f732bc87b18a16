//! PDF Core - PDF drawing extraction and font metrics
//!
//! This crate provides functionality for:
//! - Opening PDF documents and resolving page MediaBoxes
//! - Reading stroked and filled paths from page content streams
//! - Extracting a canonical rule-line layout from a PDF page
//! - Reading vertical font metrics from TrueType fonts
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{extract_layout_from_pdf, PdfDocument};
//! use layout::Tolerances;
//!
//! let doc = PdfDocument::open("reference.pdf")?;
//! let layout = extract_layout_from_pdf(&doc, 1, &Tolerances::default())?;
//! println!("{}", serde_json::to_string_pretty(&layout)?);
//! ```

mod document;
pub mod drawing;
mod font;

pub use document::{PageDrawing, PdfDocument};
pub use drawing::{read_drawings, DrawingReader, Matrix};
pub use font::FontData;

use layout::{LayoutDocument, Tolerances};
use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    OpenError(String),

    #[error("Failed to parse font: {0}")]
    FontParseError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("PDF parsing error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Extract the canonical rule-line layout of a PDF page (1-indexed)
///
/// The page is treated as a two-page spread split at half its width.
pub fn extract_layout_from_pdf(
    doc: &PdfDocument,
    page: usize,
    tolerances: &Tolerances,
) -> Result<LayoutDocument> {
    let drawing = doc.drawing(page)?;
    log::info!(
        "page {page}: {} drawing ops on a {}x{} page",
        drawing.ops.len(),
        drawing.width,
        drawing.height
    );
    Ok(layout::extract_layout(
        &drawing.ops,
        drawing.width,
        drawing.height,
        tolerances,
    ))
}
