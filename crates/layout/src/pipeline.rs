//! End-to-end rule-line extraction
//!
//! `ops -> segments -> classified -> split -> per-page transform -> merge`.
//! After the split each page is built by [`build_page`] from its own
//! segments only.

use crate::classify::{classify, Classified};
use crate::merge::merge_lines;
use crate::segment::{extract_segments, DrawingOp};
use crate::split::split_pages;
use crate::transform::PageFrame;
use crate::{round_to, CanonicalLine, LayoutDocument, Tolerances};

const PAGE_SIZE_DIGITS: u32 = 2;

/// Transform and merge the segments of one logical page
pub fn build_page(page: Classified, frame: PageFrame, tolerances: &Tolerances) -> Vec<CanonicalLine> {
    merge_lines(&frame.apply(&page), tolerances)
}

/// Extract the canonical line layout of a two-page spread
///
/// The source page is split at half its width. Labels are left empty.
pub fn extract_layout(
    ops: &[DrawingOp],
    page_width: f64,
    page_height: f64,
    tolerances: &Tolerances,
) -> LayoutDocument {
    let split_x = page_width / 2.0;
    let segments = extract_segments(ops);
    let classified = classify(&segments, tolerances);
    let split = split_pages(&classified, split_x, tolerances);

    let page1_lines = build_page(split.left, PageFrame::left(page_height), tolerances);
    let page2_lines = build_page(
        split.right,
        PageFrame::right(page_height, split_x),
        tolerances,
    );

    log::debug!(
        "layout: {} lines on page 1, {} lines on page 2",
        page1_lines.len(),
        page2_lines.len()
    );

    LayoutDocument {
        source_page_size_pt: [
            round_to(page_width, PAGE_SIZE_DIGITS),
            round_to(page_height, PAGE_SIZE_DIGITS),
        ],
        split_x_pt: round_to(split_x, PAGE_SIZE_DIGITS),
        page1_lines,
        page2_lines,
        page1_texts: Vec::new(),
        page2_texts: Vec::new(),
    }
}
