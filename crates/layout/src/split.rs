//! Assignment of classified segments to left and right logical pages
//!
//! Segments are never clipped. A segment within `split_tolerance_pt` of the
//! split on both sides lands on both pages; one crossing the split by more
//! than the tolerance lands on neither.

use crate::classify::{Classified, ClassifiedSegment};
use crate::{Axis, Tolerances};

/// Classified segments of the two logical pages
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageSplit {
    pub left: Classified,
    pub right: Classified,
}

/// Whether a segment belongs to the left page
pub fn is_left(segment: &ClassifiedSegment, split_x: f64, tolerance: f64) -> bool {
    match segment.axis {
        Axis::Horizontal => segment.end <= split_x + tolerance,
        Axis::Vertical => segment.fixed <= split_x + tolerance,
    }
}

/// Whether a segment belongs to the right page
pub fn is_right(segment: &ClassifiedSegment, split_x: f64, tolerance: f64) -> bool {
    match segment.axis {
        Axis::Horizontal => segment.start >= split_x - tolerance,
        Axis::Vertical => segment.fixed >= split_x - tolerance,
    }
}

fn select(
    segments: &[ClassifiedSegment],
    keep: impl Fn(&ClassifiedSegment) -> bool,
) -> Vec<ClassifiedSegment> {
    segments.iter().filter(|s| keep(s)).cloned().collect()
}

/// Split classified segments at `split_x`
pub fn split_pages(classified: &Classified, split_x: f64, tolerances: &Tolerances) -> PageSplit {
    let tol = tolerances.split_tolerance_pt;
    let left = |s: &ClassifiedSegment| is_left(s, split_x, tol);
    let right = |s: &ClassifiedSegment| is_right(s, split_x, tol);

    let split = PageSplit {
        left: Classified {
            horizontal: select(&classified.horizontal, left),
            vertical: select(&classified.vertical, left),
        },
        right: Classified {
            horizontal: select(&classified.horizontal, right),
            vertical: select(&classified.vertical, right),
        },
    };

    log::debug!(
        "split at x={split_x}: left {}h/{}v, right {}h/{}v",
        split.left.horizontal.len(),
        split.left.vertical.len(),
        split.right.horizontal.len(),
        split.right.vertical.len()
    );
    split
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DrawingStyle;

    fn horizontal(start: f64, end: f64) -> ClassifiedSegment {
        ClassifiedSegment {
            axis: Axis::Horizontal,
            fixed: 50.0,
            start,
            end,
            style: DrawingStyle::default(),
        }
    }

    fn vertical(x: f64) -> ClassifiedSegment {
        ClassifiedSegment {
            axis: Axis::Vertical,
            fixed: x,
            start: 0.0,
            end: 100.0,
            style: DrawingStyle::default(),
        }
    }

    #[test]
    fn test_left_only() {
        let s = horizontal(90.0, 99.0);
        assert!(is_left(&s, 100.0, 0.5));
        assert!(!is_right(&s, 100.0, 0.5));
    }

    #[test]
    fn test_straddling_segment_lands_on_both_pages() {
        let tolerances = Tolerances {
            split_tolerance_pt: 0.5,
            ..Tolerances::default()
        };
        let classified = Classified {
            horizontal: vec![horizontal(99.0, 101.0)],
            vertical: Vec::new(),
        };

        let split = split_pages(&classified, 100.0, &tolerances);
        assert_eq!(split.left.horizontal.len(), 1);
        assert_eq!(split.right.horizontal.len(), 1);
        // unclipped on both sides
        assert_eq!(split.left.horizontal[0].end, 101.0);
        assert_eq!(split.right.horizontal[0].start, 99.0);
    }

    #[test]
    fn test_wide_segment_lands_on_neither_page() {
        let classified = Classified {
            horizontal: vec![horizontal(10.0, 190.0)],
            vertical: Vec::new(),
        };

        let split = split_pages(&classified, 100.0, &Tolerances::default());
        assert!(split.left.horizontal.is_empty());
        assert!(split.right.horizontal.is_empty());
    }

    #[test]
    fn test_vertical_on_split_line() {
        let classified = Classified {
            horizontal: Vec::new(),
            vertical: vec![vertical(100.3), vertical(40.0), vertical(160.0)],
        };

        let split = split_pages(&classified, 100.0, &Tolerances::default());
        let left: Vec<f64> = split.left.vertical.iter().map(|s| s.fixed).collect();
        let right: Vec<f64> = split.right.vertical.iter().map(|s| s.fixed).collect();
        assert_eq!(left, vec![100.3, 40.0]);
        assert_eq!(right, vec![100.3, 160.0]);
    }
}
