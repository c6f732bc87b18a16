//! Nearest-line anchors for label positions
//!
//! Absolute label coordinates break whenever the reference geometry shifts
//! slightly. An anchor stores the nearest clustered vertical and horizontal
//! line positions plus the offset from them. Resolution re-snaps the stored
//! line positions to the nearest lines of the (possibly regenerated) line
//! set and re-applies the offset.

use crate::cluster::{clustered_positions, nearest_position};
use crate::{
    round_to, AnchorLines, Axis, CanonicalLine, LayoutDocument, LayoutError, Offset, Point, Result,
    TextAnchor, TextPosition, Tolerances,
};
use serde::{Deserialize, Serialize};

/// Anchor document format version
pub const FORMAT_VERSION: &str = "v1";

/// The only anchoring strategy
pub const ANCHOR_STRATEGY: &str = "nearest_line";

const ANCHOR_DIGITS: u32 = 3;

/// A label position recovered from an anchor
pub type ResolvedText = TextPosition;

/// Clustered line positions of one page
#[derive(Debug, Clone, PartialEq)]
pub struct LineGrid {
    /// X positions of vertical lines
    pub vertical: Vec<f64>,
    /// Y positions of horizontal lines
    pub horizontal: Vec<f64>,
}

impl LineGrid {
    /// Cluster the line positions of a page
    pub fn from_lines(lines: &[CanonicalLine], tolerances: &Tolerances) -> Self {
        Self {
            vertical: clustered_positions(lines, Axis::Vertical, tolerances),
            horizontal: clustered_positions(lines, Axis::Horizontal, tolerances),
        }
    }

    /// Nearest vertical and horizontal line to a point
    pub fn snap(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let x_line = nearest_position(x, &self.vertical)
            .ok_or(LayoutError::NoLinePosition(Axis::Vertical))?;
        let y_line = nearest_position(y, &self.horizontal)
            .ok_or(LayoutError::NoLinePosition(Axis::Horizontal))?;
        Ok((x_line, y_line))
    }

    /// Express a label position relative to its nearest lines
    pub fn encode(&self, text: &TextPosition) -> Result<TextAnchor> {
        let (x_line, y_line) = self.snap(text.x, text.y)?;

        Ok(TextAnchor {
            text: text.text.clone(),
            font_size: text.font_size,
            align: text.align,
            anchor: AnchorLines {
                x_line: round_to(x_line, ANCHOR_DIGITS),
                y_line: round_to(y_line, ANCHOR_DIGITS),
            },
            offset: Offset {
                dx: round_to(text.x - x_line, ANCHOR_DIGITS),
                dy: round_to(text.y - y_line, ANCHOR_DIGITS),
            },
            reference_position: Point {
                x: text.x,
                y: text.y,
            },
        })
    }

    /// Recover an absolute label position from an anchor
    pub fn resolve(&self, anchor: &TextAnchor) -> Result<ResolvedText> {
        let (x_line, y_line) = self.snap(anchor.anchor.x_line, anchor.anchor.y_line)?;

        Ok(TextPosition {
            text: anchor.text.clone(),
            x: round_to(x_line + anchor.offset.dx, ANCHOR_DIGITS),
            y: round_to(y_line + anchor.offset.dy, ANCHOR_DIGITS),
            font_size: anchor.font_size,
            align: anchor.align,
        })
    }
}

/// Build anchors for every label of a page
///
/// Fails with [`LayoutError::NoLinePosition`] when the page has no vertical
/// or no horizontal line to anchor to.
pub fn build_text_anchors(
    texts: &[TextPosition],
    lines: &[CanonicalLine],
    tolerances: &Tolerances,
) -> Result<Vec<TextAnchor>> {
    let grid = LineGrid::from_lines(lines, tolerances);
    texts.iter().map(|text| grid.encode(text)).collect()
}

/// Resolve anchors against a page's current line list
pub fn resolve_texts_from_anchors(
    anchors: &[TextAnchor],
    lines: &[CanonicalLine],
    tolerances: &Tolerances,
) -> Result<Vec<ResolvedText>> {
    let grid = LineGrid::from_lines(lines, tolerances);
    anchors.iter().map(|anchor| grid.resolve(anchor)).collect()
}

/// Anchor artifact for both pages of a layout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnchorSet {
    pub format_version: String,

    /// Layout the anchors were built from
    #[serde(default)]
    pub source_layout: String,

    pub anchor_strategy: String,

    pub cluster_tolerance_pt: f64,

    #[serde(default)]
    pub page1_texts: Vec<TextAnchor>,

    #[serde(default)]
    pub page2_texts: Vec<TextAnchor>,
}

impl AnchorSet {
    /// Resolve both pages against a layout, returning `(page1, page2)` labels
    ///
    /// The cluster tolerance recorded in the set is used, so resolution
    /// clusters lines the same way encoding did.
    pub fn resolve(
        &self,
        layout: &LayoutDocument,
        tolerances: &Tolerances,
    ) -> Result<(Vec<ResolvedText>, Vec<ResolvedText>)> {
        let tolerances = Tolerances {
            cluster_tolerance_pt: self.cluster_tolerance_pt,
            ..tolerances.clone()
        };
        let page1 = resolve_texts_from_anchors(&self.page1_texts, &layout.page1_lines, &tolerances)?;
        let page2 = resolve_texts_from_anchors(&self.page2_texts, &layout.page2_lines, &tolerances)?;
        Ok((page1, page2))
    }
}

/// Build the anchor artifact for a layout carrying absolute labels
pub fn build_anchor_set(
    layout: &LayoutDocument,
    source_layout: &str,
    tolerances: &Tolerances,
) -> Result<AnchorSet> {
    let page1_texts = build_text_anchors(&layout.page1_texts, &layout.page1_lines, tolerances)?;
    let page2_texts = build_text_anchors(&layout.page2_texts, &layout.page2_lines, tolerances)?;

    log::debug!(
        "built {} + {} anchors from {source_layout}",
        page1_texts.len(),
        page2_texts.len()
    );

    Ok(AnchorSet {
        format_version: FORMAT_VERSION.to_string(),
        source_layout: source_layout.to_string(),
        anchor_strategy: ANCHOR_STRATEGY.to_string(),
        cluster_tolerance_pt: tolerances.cluster_tolerance_pt,
        page1_texts,
        page2_texts,
    })
}
