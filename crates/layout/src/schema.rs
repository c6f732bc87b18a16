//! Layout JSON schema types

use serde::{Deserialize, Serialize};
use std::fmt;

/// RGB stroke color
///
/// Serialized as a `[r, g, b]` array with components in 0.0 - 1.0.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Color {
    /// Red component (0.0 - 1.0)
    pub r: f64,
    /// Green component (0.0 - 1.0)
    pub g: f64,
    /// Blue component (0.0 - 1.0)
    pub b: f64,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Create a gray level color (0.0 = black, 1.0 = white)
    pub fn gray(level: f64) -> Self {
        Self::rgb(level, level, level)
    }

    /// Black color
    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    /// Components as an array
    pub fn to_array(self) -> [f64; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

impl From<[f64; 3]> for Color {
    fn from(c: [f64; 3]) -> Self {
        Self::rgb(c[0], c[1], c[2])
    }
}

impl From<Color> for [f64; 3] {
    fn from(c: Color) -> Self {
        c.to_array()
    }
}

/// Stroke line cap, serialized as its PDF integer code
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

impl TryFrom<u8> for LineCap {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Butt),
            1 => Ok(Self::Round),
            2 => Ok(Self::Square),
            other => Err(format!("invalid line cap: {other}")),
        }
    }
}

impl From<LineCap> for u8 {
    fn from(cap: LineCap) -> Self {
        match cap {
            LineCap::Butt => 0,
            LineCap::Round => 1,
            LineCap::Square => 2,
        }
    }
}

/// Stroke line join, serialized as its PDF integer code
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

impl TryFrom<u8> for LineJoin {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Miter),
            1 => Ok(Self::Round),
            2 => Ok(Self::Bevel),
            other => Err(format!("invalid line join: {other}")),
        }
    }
}

impl From<LineJoin> for u8 {
    fn from(join: LineJoin) -> Self {
        match join {
            LineJoin::Miter => 0,
            LineJoin::Round => 1,
            LineJoin::Bevel => 2,
        }
    }
}

/// Full drawing style of a stroke
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrawingStyle {
    /// Stroke width in points
    pub width: f64,

    /// Dash lengths (empty = solid)
    #[serde(default)]
    pub dash_pattern: Vec<f64>,

    /// Dash phase
    #[serde(default)]
    pub dash_phase: f64,

    /// Line cap
    #[serde(default)]
    pub cap: LineCap,

    /// Line join
    #[serde(default)]
    pub join: LineJoin,

    /// Stroke color
    #[serde(default)]
    pub color: Color,
}

impl Default for DrawingStyle {
    fn default() -> Self {
        Self {
            width: 1.0,
            dash_pattern: Vec::new(),
            dash_phase: 0.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            color: Color::black(),
        }
    }
}

impl DrawingStyle {
    /// Resolve a partially specified style against this one
    ///
    /// Every field missing from `partial` keeps the value of `self`.
    pub fn inherit(&self, partial: &PartialStyle) -> DrawingStyle {
        DrawingStyle {
            width: partial.width.unwrap_or(self.width),
            dash_pattern: partial
                .dash_pattern
                .clone()
                .unwrap_or_else(|| self.dash_pattern.clone()),
            dash_phase: partial.dash_phase.unwrap_or(self.dash_phase),
            cap: partial.cap.unwrap_or(self.cap),
            join: partial.join.unwrap_or(self.join),
            color: partial.color.unwrap_or(self.color),
        }
    }
}

/// Drawing style with optional fields, as found on a drawing command
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PartialStyle {
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub dash_pattern: Option<Vec<f64>>,
    #[serde(default)]
    pub dash_phase: Option<f64>,
    #[serde(default)]
    pub cap: Option<LineCap>,
    #[serde(default)]
    pub join: Option<LineJoin>,
    #[serde(default)]
    pub color: Option<Color>,
}

/// Orientation of a rule line
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Horizontal => f.write_str("horizontal"),
            Axis::Vertical => f.write_str("vertical"),
        }
    }
}

/// A merged rule line in page-local coordinates (bottom-left origin, y up)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CanonicalLine {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,

    /// Stroke style
    #[serde(flatten)]
    pub style: DrawingStyle,
}

impl CanonicalLine {
    /// Orientation of the line, `None` when it is neither axis-aligned
    /// nor longer than `tolerance` on exactly one axis
    pub fn axis(&self, tolerance: f64) -> Option<Axis> {
        let vertical = (self.x0 - self.x1).abs() <= tolerance;
        let horizontal = (self.y0 - self.y1).abs() <= tolerance;
        match (horizontal, vertical) {
            (true, false) => Some(Axis::Horizontal),
            (false, true) => Some(Axis::Vertical),
            _ => None,
        }
    }
}

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// A point in page coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A label placed at an absolute position
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextPosition {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    #[serde(default)]
    pub align: Align,
}

/// Nearest clustered line coordinates of an anchor
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AnchorLines {
    /// X of the nearest vertical line
    pub x_line: f64,
    /// Y of the nearest horizontal line
    pub y_line: f64,
}

/// Offset of a label from its anchor lines
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Offset {
    pub dx: f64,
    pub dy: f64,
}

/// A label position expressed relative to its nearest rule lines
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextAnchor {
    pub text: String,
    pub font_size: f64,
    #[serde(default)]
    pub align: Align,
    pub anchor: AnchorLines,
    pub offset: Offset,
    /// Absolute position the anchor was built from (not used when resolving)
    pub reference_position: Point,
}

/// Canonical layout data extracted from a reference document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayoutDocument {
    /// Source page size `[width, height]` in points
    pub source_page_size_pt: [f64; 2],

    /// X coordinate splitting the source page into two logical pages
    pub split_x_pt: f64,

    pub page1_lines: Vec<CanonicalLine>,
    pub page2_lines: Vec<CanonicalLine>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub page1_texts: Vec<TextPosition>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub page2_texts: Vec<TextPosition>,
}

impl LayoutDocument {
    /// Lines of a logical page (1 or 2)
    pub fn lines(&self, page: usize) -> &[CanonicalLine] {
        match page {
            1 => &self.page1_lines,
            2 => &self.page2_lines,
            _ => &[],
        }
    }

    /// Absolute labels of a logical page (1 or 2)
    pub fn texts(&self, page: usize) -> &[TextPosition] {
        match page {
            1 => &self.page1_texts,
            2 => &self.page2_texts,
            _ => &[],
        }
    }
}
