//! Axis classification of raw segments

use crate::segment::Segment;
use crate::{Axis, DrawingStyle, Tolerances};

/// An axis-aligned segment reduced to a fixed coordinate and an interval
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedSegment {
    pub axis: Axis,
    /// Y for horizontal segments, x for vertical ones
    pub fixed: f64,
    /// Interval start on the other axis (`start <= end`)
    pub start: f64,
    pub end: f64,
    pub style: DrawingStyle,
}

impl ClassifiedSegment {
    /// Classify a single segment, `None` when it is diagonal, too short or
    /// not finite
    pub fn from_segment(segment: &Segment, tolerances: &Tolerances) -> Option<Self> {
        let dx = (segment.x0 - segment.x1).abs();
        let dy = (segment.y0 - segment.y1).abs();
        let axis_tol = tolerances.line_detection_tolerance_pt;
        let min_len = tolerances.minimum_line_length_pt;

        if dy <= axis_tol && dx > min_len {
            Some(Self {
                axis: Axis::Horizontal,
                fixed: segment.y0,
                start: segment.x0.min(segment.x1),
                end: segment.x0.max(segment.x1),
                style: segment.style.clone(),
            })
        } else if dx <= axis_tol && dy > min_len {
            Some(Self {
                axis: Axis::Vertical,
                fixed: segment.x0,
                start: segment.y0.min(segment.y1),
                end: segment.y0.max(segment.y1),
                style: segment.style.clone(),
            })
        } else {
            None
        }
    }
}

/// Horizontal and vertical families of a segment list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classified {
    pub horizontal: Vec<ClassifiedSegment>,
    pub vertical: Vec<ClassifiedSegment>,
}

/// Split segments into horizontal and vertical families, dropping the rest
pub fn classify(segments: &[Segment], tolerances: &Tolerances) -> Classified {
    let mut out = Classified::default();

    for classified in segments
        .iter()
        .filter_map(|s| ClassifiedSegment::from_segment(s, tolerances))
    {
        match classified.axis {
            Axis::Horizontal => out.horizontal.push(classified),
            Axis::Vertical => out.vertical.push(classified),
        }
    }

    log::debug!(
        "classified {} horizontal and {} vertical of {} segments",
        out.horizontal.len(),
        out.vertical.len(),
        segments.len()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(x0: f64, y0: f64, x1: f64, y1: f64) -> Segment {
        Segment::new(x0, y0, x1, y1, DrawingStyle::default())
    }

    #[test]
    fn test_horizontal_normalizes_interval() {
        let c = ClassifiedSegment::from_segment(&seg(50.0, 10.0, 20.0, 10.05), &Tolerances::default())
            .unwrap();
        assert_eq!(c.axis, Axis::Horizontal);
        assert_eq!(c.fixed, 10.0);
        assert_eq!((c.start, c.end), (20.0, 50.0));
    }

    #[test]
    fn test_vertical() {
        let c = ClassifiedSegment::from_segment(&seg(7.0, 90.0, 7.0, 30.0), &Tolerances::default())
            .unwrap();
        assert_eq!(c.axis, Axis::Vertical);
        assert_eq!(c.fixed, 7.0);
        assert_eq!((c.start, c.end), (30.0, 90.0));
    }

    #[test]
    fn test_tolerance_boundary_is_inclusive() {
        let tolerances = Tolerances {
            line_detection_tolerance_pt: 0.5,
            ..Tolerances::default()
        };
        let c = ClassifiedSegment::from_segment(&seg(0.0, 0.0, 10.0, 0.5), &tolerances);
        assert_eq!(c.map(|c| c.axis), Some(Axis::Horizontal));
    }

    #[test]
    fn test_drops_diagonal_short_and_nan() {
        let tolerances = Tolerances::default();
        let segments = [
            seg(0.0, 0.0, 10.0, 10.0),
            seg(0.0, 0.0, 0.5, 0.0),
            seg(0.0, 0.0, 0.0, 0.0),
            seg(f64::NAN, 0.0, 10.0, 0.0),
        ];

        let classified = classify(&segments, &tolerances);
        assert!(classified.horizontal.is_empty());
        assert!(classified.vertical.is_empty());
    }

    #[test]
    fn test_partition_is_disjoint() {
        let tolerances = Tolerances::default();
        let mut segments = Vec::new();
        for i in 0..20 {
            let d = i as f64 * 0.07;
            segments.push(seg(0.0, 0.0, d, 5.0 - d));
            segments.push(seg(3.0, 3.0, 3.0 + d, 3.0));
            segments.push(seg(3.0, 3.0, 3.0, 3.0 + d));
        }

        for s in &segments {
            let dx = (s.x0 - s.x1).abs();
            let dy = (s.y0 - s.y1).abs();
            let h = dy <= tolerances.line_detection_tolerance_pt
                && dx > tolerances.minimum_line_length_pt;
            let v = dx <= tolerances.line_detection_tolerance_pt
                && dy > tolerances.minimum_line_length_pt;
            assert!(!(h && v));
        }

        let classified = classify(&segments, &tolerances);
        let total = classified.horizontal.len() + classified.vertical.len();
        assert!(total <= segments.len());
        assert!(classified.horizontal.iter().all(|c| c.axis == Axis::Horizontal));
        assert!(classified.vertical.iter().all(|c| c.axis == Axis::Vertical));
    }
}
