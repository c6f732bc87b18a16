//! Interval merging of collinear segments into canonical lines
//!
//! A rule line is often drawn as several overlapping or abutting strokes
//! (double borders, table cells sharing an edge). Segments on the same
//! fixed coordinate with exactly the same style are merged into their
//! minimal interval cover. Segments with different styles are never merged.

use crate::classify::{Classified, ClassifiedSegment};
use crate::{round_to, Axis, CanonicalLine, DrawingStyle, LineCap, LineJoin, Tolerances};
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::collections::BTreeMap;

type KeyF64 = OrderedFloat<f64>;

/// Exact-match grouping key: orientation, rounded fixed coordinate and style
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct GroupKey {
    axis: Axis,
    fixed: KeyF64,
    width: KeyF64,
    dash_pattern: Vec<KeyF64>,
    dash_phase: KeyF64,
    cap: LineCap,
    join: LineJoin,
    color: [KeyF64; 3],
}

impl GroupKey {
    fn new(segment: &ClassifiedSegment, tolerances: &Tolerances) -> Self {
        let style = &segment.style;
        Self {
            axis: segment.axis,
            fixed: OrderedFloat(round_to(segment.fixed, tolerances.coordinate_key_digits)),
            width: OrderedFloat(round_to(style.width, tolerances.line_width_round_digits)),
            dash_pattern: style.dash_pattern.iter().copied().map(OrderedFloat).collect(),
            dash_phase: OrderedFloat(style.dash_phase),
            cap: style.cap,
            join: style.join,
            color: style.color.to_array().map(OrderedFloat),
        }
    }

    fn style(&self) -> DrawingStyle {
        DrawingStyle {
            width: self.width.0,
            dash_pattern: self.dash_pattern.iter().map(|d| d.0).collect(),
            dash_phase: self.dash_phase.0,
            cap: self.cap,
            join: self.join,
            color: self.color.map(|c| c.0).into(),
        }
    }
}

/// Merge sorted-or-not intervals whose gap is at most `tolerance`
///
/// Returns the minimal cover, ordered by start.
pub fn merge_intervals(intervals: &[(f64, f64)], tolerance: f64) -> Vec<(f64, f64)> {
    let mut sorted = intervals.to_vec();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

    let mut merged: Vec<(f64, f64)> = Vec::with_capacity(sorted.len());
    for (start, end) in sorted {
        match merged.last_mut() {
            Some(last) if start <= last.1 + tolerance => {
                last.1 = last.1.max(end);
            }
            _ => merged.push((start, end)),
        }
    }
    merged
}

/// Total order used for the final per-page line list
fn compare_lines(a: &CanonicalLine, b: &CanonicalLine) -> Ordering {
    a.y0.total_cmp(&b.y0)
        .then(a.x0.total_cmp(&b.x0))
        .then(a.y1.total_cmp(&b.y1))
        .then(a.x1.total_cmp(&b.x1))
        .then(a.style.width.total_cmp(&b.style.width))
        .then_with(|| {
            let da = a.style.dash_pattern.iter().copied().map(OrderedFloat);
            let db = b.style.dash_pattern.iter().copied().map(OrderedFloat);
            da.cmp(db)
        })
        .then(a.style.dash_phase.total_cmp(&b.style.dash_phase))
        .then(a.style.cap.cmp(&b.style.cap))
        .then(a.style.join.cmp(&b.style.join))
        .then_with(|| {
            let ca = a.style.color.to_array().map(OrderedFloat);
            let cb = b.style.color.to_array().map(OrderedFloat);
            ca.cmp(&cb)
        })
}

/// Merge a page's page-local segments into its canonical line list
///
/// Coordinates are rounded to `position_round_digits`, widths to
/// `line_width_round_digits`, and the list is sorted by `(y0, x0, y1, x1)`.
/// The result does not depend on the input order.
pub fn merge_lines(page: &Classified, tolerances: &Tolerances) -> Vec<CanonicalLine> {
    let mut grouped: BTreeMap<GroupKey, Vec<(f64, f64)>> = BTreeMap::new();
    for segment in page.horizontal.iter().chain(&page.vertical) {
        grouped
            .entry(GroupKey::new(segment, tolerances))
            .or_default()
            .push((segment.start, segment.end));
    }

    let digits = tolerances.position_round_digits;
    let mut lines = Vec::new();
    for (key, intervals) in &grouped {
        let style = key.style();
        let fixed = round_to(key.fixed.0, digits);
        for (start, end) in merge_intervals(intervals, tolerances.merge_tolerance_pt) {
            let (start, end) = (round_to(start, digits), round_to(end, digits));
            let (x0, y0, x1, y1) = match key.axis {
                Axis::Horizontal => (start, fixed, end, fixed),
                Axis::Vertical => (fixed, start, fixed, end),
            };
            lines.push(CanonicalLine {
                x0,
                y0,
                x1,
                y1,
                style: style.clone(),
            });
        }
    }

    lines.sort_by(compare_lines);
    log::debug!(
        "merged {} segments into {} canonical lines",
        page.horizontal.len() + page.vertical.len(),
        lines.len()
    );
    lines
}
