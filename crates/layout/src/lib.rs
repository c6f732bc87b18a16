//! Layout - rule-line extraction and label anchoring
//!
//! This crate provides:
//! - Segment extraction from a drawing command stream (with style inheritance)
//! - Axis classification, page splitting and coordinate transformation
//! - Interval merging into canonical rule lines
//! - Position clustering and nearest-line anchors for labels
//! - Baseline verification against font metrics
//!
//! # Example
//!
//! ```ignore
//! use layout::{extract_layout, build_text_anchors, Tolerances};
//!
//! let tolerances = Tolerances::load("line_extraction_config.json")?;
//! let doc = extract_layout(&ops, 1190.55, 841.89, &tolerances);
//! let anchors = build_text_anchors(&texts, &doc.page1_lines, &tolerances)?;
//! ```

pub mod align;
pub mod anchor;
pub mod classify;
pub mod cluster;
mod config;
pub mod merge;
pub mod parser;
pub mod pipeline;
mod schema;
pub mod segment;
pub mod split;
pub mod transform;

pub use align::{
    analyze_pages, expected_baseline, AlignmentReport, AlignmentRules, BoundsConfig, FontMetrics,
    FontMetricsProvider, LabelRule, ManualBlockConfig, ManualBlockLines, ManualBlockReport,
    ManualTitle, ReportEntry, StackedBlock, StackedBlockReport, StackedLine, Status, VAlign,
};
pub use anchor::{
    build_anchor_set, build_text_anchors, resolve_texts_from_anchors, AnchorSet, ResolvedText,
};
pub use config::Tolerances;
pub use parser::{parse_anchor_set, parse_layout, parse_rules};
pub use pipeline::extract_layout;
pub use schema::*;
pub use segment::{extract_segments, DrawingOp};

use thiserror::Error;

/// Errors that can occur during layout processing
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("No line positions found on the {0} axis")]
    NoLinePosition(Axis),

    #[error("Failed to parse layout data: {0}")]
    ParseError(String),

    #[error("Invalid extraction config: {0}")]
    ConfigError(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for layout operations
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Round a value to a fixed number of decimal places
pub fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    (value * factor).round() / factor
}
