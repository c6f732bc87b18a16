//! Drawing command stream to raw segments
//!
//! Drawing commands carry partially specified styles. A field missing on a
//! command continues the value of the previous command (graphics-state
//! inheritance); before any command has set it, [`DrawingStyle::default`]
//! applies. The current style is threaded through a fold over the command
//! list rather than held in shared state.

use crate::{DrawingStyle, PartialStyle, Point};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle, `(x0, y0)` is the top-left corner in the source frame
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

/// A single vector drawing primitive in source coordinates
/// (top-left origin, y increasing downward)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum DrawingOp {
    /// Straight line between two points
    Line {
        p1: Point,
        p2: Point,
        #[serde(default)]
        style: PartialStyle,
    },
    /// Rectangle outline
    Rect {
        bounds: Rect,
        #[serde(default)]
        style: PartialStyle,
    },
}

impl DrawingOp {
    /// Style fields specified on this command
    pub fn style(&self) -> &PartialStyle {
        match self {
            DrawingOp::Line { style, .. } | DrawingOp::Rect { style, .. } => style,
        }
    }

    /// Expand the command into segments drawn with `style`
    ///
    /// A rectangle yields its top, right, bottom and left edges in that order.
    fn segments(&self, style: &DrawingStyle) -> Vec<Segment> {
        match self {
            DrawingOp::Line { p1, p2, .. } => {
                vec![Segment::new(p1.x, p1.y, p2.x, p2.y, style.clone())]
            }
            DrawingOp::Rect { bounds: r, .. } => vec![
                Segment::new(r.x0, r.y0, r.x1, r.y0, style.clone()),
                Segment::new(r.x1, r.y0, r.x1, r.y1, style.clone()),
                Segment::new(r.x1, r.y1, r.x0, r.y1, style.clone()),
                Segment::new(r.x0, r.y1, r.x0, r.y0, style.clone()),
            ],
        }
    }
}

/// A raw two-point segment with its resolved style
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub style: DrawingStyle,
}

impl Segment {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64, style: DrawingStyle) -> Self {
        Self {
            x0,
            y0,
            x1,
            y1,
            style,
        }
    }
}

/// Expand a drawing command stream into raw segments
///
/// Never fails. Degenerate or non-finite geometry is passed through for the
/// classifier to drop.
pub fn extract_segments(ops: &[DrawingOp]) -> Vec<Segment> {
    let (_, segments) = ops.iter().fold(
        (DrawingStyle::default(), Vec::with_capacity(ops.len())),
        |(current, mut segments), op| {
            let style = current.inherit(op.style());
            segments.extend(op.segments(&style));
            (style, segments)
        },
    );

    log::debug!(
        "extracted {} segments from {} drawing ops",
        segments.len(),
        ops.len()
    );
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, LineCap, LineJoin};
    use pretty_assertions::assert_eq;

    fn line(x0: f64, y0: f64, x1: f64, y1: f64, style: PartialStyle) -> DrawingOp {
        DrawingOp::Line {
            p1: Point { x: x0, y: y0 },
            p2: Point { x: x1, y: y1 },
            style,
        }
    }

    #[test]
    fn test_defaults_without_style() {
        let segments = extract_segments(&[line(1.0, 2.0, 3.0, 4.0, PartialStyle::default())]);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].style, DrawingStyle::default());
        assert_eq!(
            (segments[0].x0, segments[0].y0, segments[0].x1, segments[0].y1),
            (1.0, 2.0, 3.0, 4.0)
        );
    }

    #[test]
    fn test_rect_edge_order() {
        let ops = [DrawingOp::Rect {
            bounds: Rect {
                x0: 0.0,
                y0: 0.0,
                x1: 2.0,
                y1: 1.0,
            },
            style: PartialStyle::default(),
        }];

        let coords: Vec<_> = extract_segments(&ops)
            .iter()
            .map(|s| (s.x0, s.y0, s.x1, s.y1))
            .collect();

        assert_eq!(
            coords,
            vec![
                (0.0, 0.0, 2.0, 0.0),
                (2.0, 0.0, 2.0, 1.0),
                (2.0, 1.0, 0.0, 1.0),
                (0.0, 1.0, 0.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_style_fields_inherit_from_previous_op() {
        let first = PartialStyle {
            cap: Some(LineCap::Square),
            join: Some(LineJoin::Round),
            dash_pattern: Some(vec![3.0, 3.0]),
            dash_phase: Some(1.0),
            ..PartialStyle::default()
        };
        let second = PartialStyle {
            width: Some(0.5),
            color: Some(Color::rgb(0.1, 0.2, 0.3)),
            ..PartialStyle::default()
        };
        let third = PartialStyle {
            cap: Some(LineCap::Butt),
            ..PartialStyle::default()
        };

        let segments = extract_segments(&[
            line(0.0, 0.0, 10.0, 0.0, first),
            line(0.0, 5.0, 10.0, 5.0, second),
            line(0.0, 9.0, 10.0, 9.0, third),
        ]);

        assert_eq!(segments[0].style.width, 1.0);
        assert_eq!(segments[0].style.cap, LineCap::Square);

        assert_eq!(segments[1].style.width, 0.5);
        assert_eq!(segments[1].style.cap, LineCap::Square);
        assert_eq!(segments[1].style.join, LineJoin::Round);
        assert_eq!(segments[1].style.dash_pattern, vec![3.0, 3.0]);

        assert_eq!(segments[2].style.cap, LineCap::Butt);
        assert_eq!(segments[2].style.width, 0.5);
        assert_eq!(segments[2].style.color, Color::rgb(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_rect_edges_share_style() {
        let ops = [DrawingOp::Rect {
            bounds: Rect {
                x0: 0.0,
                y0: 0.0,
                x1: 5.0,
                y1: 5.0,
            },
            style: PartialStyle {
                width: Some(2.0),
                ..PartialStyle::default()
            },
        }];

        let segments = extract_segments(&ops);
        assert!(segments.iter().all(|s| s.style.width == 2.0));
    }

    #[test]
    fn test_nan_geometry_passes_through() {
        let segments = extract_segments(&[line(f64::NAN, 0.0, 1.0, 0.0, PartialStyle::default())]);
        assert_eq!(segments.len(), 1);
        assert!(segments[0].x0.is_nan());
    }

    #[test]
    fn test_drawing_op_json() {
        let op: DrawingOp = serde_json::from_str(
            r#"{ "op": "line", "p1": { "x": 0, "y": 0 }, "p2": { "x": 10, "y": 0 },
                 "style": { "cap": 1 } }"#,
        )
        .unwrap();

        assert_eq!(op.style().cap, Some(LineCap::Round));
        assert_eq!(op.style().width, None);
    }
}
