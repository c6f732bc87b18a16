//! Vector drawing extraction from page content streams
//!
//! Interprets the path construction, path painting and stroke-state
//! operators of a content stream and emits [`DrawingOp`]s in the top-left,
//! y-down frame of the page's MediaBox. Form XObjects painted with `Do`
//! are interpreted in place when the page resources are available. Text,
//! images and clipping are ignored; curves only move the current point.

use crate::{PdfError, Result};
use layout::segment::Rect;
use layout::{Color, DrawingOp, DrawingStyle, LineCap, LineJoin, PartialStyle, Point};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream};

/// Maximum nesting of form XObjects
const MAX_FORM_DEPTH: usize = 16;

/// Affine transform `[a b c d e f]` as used by the `cm` operator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Matrix {
    pub fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    /// `self` applied first, then `other`
    pub fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Uniform scale factor applied to stroke widths
    fn width_scale(&self) -> f64 {
        (self.a * self.d - self.b * self.c).abs().sqrt()
    }

    /// Whether axis-aligned rectangles stay axis-aligned
    fn preserves_axes(&self) -> bool {
        (self.b == 0.0 && self.c == 0.0) || (self.a == 0.0 && self.d == 0.0)
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

/// Graphics state saved and restored by `q` / `Q`
#[derive(Debug, Clone, Default)]
struct GraphicsState {
    ctm: Matrix,
    style: DrawingStyle,
}

/// Style fields set by an operator somewhere in the stream so far
#[derive(Debug, Clone, Copy, Default)]
struct Explicit {
    width: bool,
    dash: bool,
    cap: bool,
    join: bool,
    color: bool,
}

/// A device-space path element awaiting a painting operator
#[derive(Debug, Clone, Copy)]
enum PathItem {
    Line((f64, f64), (f64, f64)),
    /// Rectangle from `re`; corners in drawing order
    Rect([(f64, f64); 4], bool),
}

/// Content stream interpreter collecting drawing ops for one page
#[derive(Debug)]
pub struct DrawingReader {
    /// `[llx, lly, urx, ury]`
    media_box: [f64; 4],
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    explicit: Explicit,
    path: Vec<PathItem>,
    current: Option<(f64, f64)>,
    subpath_start: Option<(f64, f64)>,
    ops: Vec<DrawingOp>,
}

fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

fn numbers(operation: &Operation, count: usize) -> Option<Vec<f64>> {
    if operation.operands.len() < count {
        return None;
    }
    operation.operands[..count].iter().map(number).collect()
}

fn deref<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Form XObject `name` of a resource dictionary; images and unknown names give `None`
fn form_xobject<'a>(doc: &'a Document, resources: &'a Dictionary, name: &[u8]) -> Option<&'a Stream> {
    let xobjects = deref(doc, resources.get(b"XObject").ok()?)?.as_dict().ok()?;
    let stream = deref(doc, xobjects.get(name).ok()?)?.as_stream().ok()?;
    let subtype = stream.dict.get(b"Subtype").ok()?.as_name().ok()?;
    (subtype == b"Form").then_some(stream)
}

fn form_matrix(doc: &Document, form: &Stream) -> Matrix {
    let values: Option<Vec<f64>> = form
        .dict
        .get(b"Matrix")
        .ok()
        .and_then(|m| deref(doc, m))
        .and_then(|m| m.as_array().ok())
        .and_then(|array| array.iter().map(number).collect());
    match values.as_deref() {
        Some(&[a, b, c, d, e, f]) => Matrix { a, b, c, d, e, f },
        _ => Matrix::identity(),
    }
}

fn decode(content: &[u8]) -> Result<Content> {
    Content::decode(content).map_err(|e| PdfError::ParseError(format!("content stream: {e}")))
}

fn cmyk_to_rgb(c: f64, m: f64, y: f64, k: f64) -> Color {
    Color::rgb((1.0 - c) * (1.0 - k), (1.0 - m) * (1.0 - k), (1.0 - y) * (1.0 - k))
}

impl DrawingReader {
    /// Create a reader for a page with the given MediaBox
    pub fn new(media_box: [f64; 4]) -> Self {
        Self {
            media_box,
            state: GraphicsState::default(),
            stack: Vec::new(),
            explicit: Explicit::default(),
            path: Vec::new(),
            current: None,
            subpath_start: None,
            ops: Vec::new(),
        }
    }

    /// Page width and height from the MediaBox
    pub fn page_size(&self) -> (f64, f64) {
        let [llx, lly, urx, ury] = self.media_box;
        ((urx - llx).abs(), (ury - lly).abs())
    }

    /// Decode a raw content stream and interpret every operation
    ///
    /// Without resources, `Do` has nothing to resolve and is skipped.
    pub fn read(&mut self, content: &[u8]) -> Result<()> {
        for operation in &decode(content)?.operations {
            self.process(operation);
        }
        Ok(())
    }

    /// Decode a page content stream, following the form XObjects of `resources`
    pub fn read_page(
        &mut self,
        doc: &Document,
        content: &[u8],
        resources: Option<&Dictionary>,
    ) -> Result<()> {
        self.read_nested(doc, content, resources, 0)
    }

    fn read_nested<'a>(
        &mut self,
        doc: &'a Document,
        content: &[u8],
        resources: Option<&'a Dictionary>,
        depth: usize,
    ) -> Result<()> {
        for operation in &decode(content)?.operations {
            match (operation.operator.as_str(), resources) {
                ("Do", Some(resources)) => self.paint_form(doc, operation, resources, depth),
                _ => self.process(operation),
            }
        }
        Ok(())
    }

    /// Interpret a form XObject under its `/Matrix` and the current state
    ///
    /// The graphics state and stack depth are restored afterwards, as if the
    /// form were wrapped in `q ... Q`.
    fn paint_form<'a>(
        &mut self,
        doc: &'a Document,
        operation: &Operation,
        resources: &'a Dictionary,
        depth: usize,
    ) {
        let Some(name) = operation.operands.first().and_then(|o| o.as_name().ok()) else {
            log::warn!("Do without an XObject name");
            return;
        };
        let Some(form) = form_xobject(doc, resources, name) else {
            log::trace!("skipping XObject {}", String::from_utf8_lossy(name));
            return;
        };
        if depth >= MAX_FORM_DEPTH {
            log::warn!("form XObjects nested deeper than {MAX_FORM_DEPTH}, skipping");
            return;
        }

        let content = form
            .decompressed_content()
            .unwrap_or_else(|_| form.content.clone());
        let form_resources = form
            .dict
            .get(b"Resources")
            .ok()
            .and_then(|r| deref(doc, r))
            .and_then(|r| r.as_dict().ok())
            .unwrap_or(resources);

        let saved = self.state.clone();
        let stack_depth = self.stack.len();
        self.state.ctm = form_matrix(doc, form).then(&self.state.ctm);

        if let Err(e) = self.read_nested(doc, &content, Some(form_resources), depth + 1) {
            log::warn!("form XObject {}: {e}", String::from_utf8_lossy(name));
        }

        if self.stack.len() != stack_depth {
            log::warn!("unbalanced q/Q in form XObject {}", String::from_utf8_lossy(name));
            self.stack.truncate(stack_depth);
        }
        self.state = saved;
    }

    /// Interpret a single operation
    pub fn process(&mut self, operation: &Operation) {
        let handled = match operation.operator.as_str() {
            "q" => {
                self.stack.push(self.state.clone());
                Some(())
            }
            "Q" => {
                match self.stack.pop() {
                    Some(state) => self.state = state,
                    None => log::warn!("unbalanced Q in content stream"),
                }
                Some(())
            }
            "cm" => numbers(operation, 6).map(|m| {
                let matrix = Matrix {
                    a: m[0],
                    b: m[1],
                    c: m[2],
                    d: m[3],
                    e: m[4],
                    f: m[5],
                };
                self.state.ctm = matrix.then(&self.state.ctm);
            }),
            "w" => numbers(operation, 1).map(|w| {
                self.state.style.width = w[0];
                self.explicit.width = true;
            }),
            "J" => numbers(operation, 1).map(|v| {
                self.state.style.cap = LineCap::try_from(v[0] as u8).unwrap_or_default();
                self.explicit.cap = true;
            }),
            "j" => numbers(operation, 1).map(|v| {
                self.state.style.join = LineJoin::try_from(v[0] as u8).unwrap_or_default();
                self.explicit.join = true;
            }),
            "d" => self.set_dash(operation),
            "G" => numbers(operation, 1).map(|v| self.set_color(Color::gray(v[0]))),
            "RG" => numbers(operation, 3).map(|v| self.set_color(Color::rgb(v[0], v[1], v[2]))),
            "K" => numbers(operation, 4).map(|v| self.set_color(cmyk_to_rgb(v[0], v[1], v[2], v[3]))),
            "m" => numbers(operation, 2).map(|p| {
                let point = self.state.ctm.apply(p[0], p[1]);
                self.current = Some(point);
                self.subpath_start = Some(point);
            }),
            "l" => numbers(operation, 2).map(|p| {
                let point = self.state.ctm.apply(p[0], p[1]);
                if let Some(from) = self.current {
                    self.path.push(PathItem::Line(from, point));
                }
                self.current = Some(point);
            }),
            "c" => numbers(operation, 6).map(|p| self.current = Some(self.state.ctm.apply(p[4], p[5]))),
            "v" | "y" => {
                numbers(operation, 4).map(|p| self.current = Some(self.state.ctm.apply(p[2], p[3])))
            }
            "re" => numbers(operation, 4).map(|r| {
                let ctm = self.state.ctm;
                let corners = [
                    ctm.apply(r[0], r[1]),
                    ctm.apply(r[0] + r[2], r[1]),
                    ctm.apply(r[0] + r[2], r[1] + r[3]),
                    ctm.apply(r[0], r[1] + r[3]),
                ];
                self.path.push(PathItem::Rect(corners, ctm.preserves_axes()));
                self.current = Some(corners[0]);
                self.subpath_start = Some(corners[0]);
            }),
            "h" => {
                self.close_subpath();
                Some(())
            }
            "S" | "B" | "B*" => {
                self.paint(true);
                Some(())
            }
            "f" | "F" | "f*" => {
                self.paint(false);
                Some(())
            }
            "s" | "b" | "b*" => {
                self.close_subpath();
                self.paint(true);
                Some(())
            }
            "n" => {
                self.clear_path();
                Some(())
            }
            other => {
                log::trace!("ignoring content stream operator {other}");
                Some(())
            }
        };

        if handled.is_none() {
            log::warn!(
                "operator {} has missing or non-numeric operands",
                operation.operator
            );
        }
    }

    /// Drawing ops collected so far
    pub fn finish(self) -> Vec<DrawingOp> {
        if !self.stack.is_empty() {
            log::warn!("{} unclosed q in content stream", self.stack.len());
        }
        log::debug!("read {} drawing ops", self.ops.len());
        self.ops
    }

    fn set_dash(&mut self, operation: &Operation) -> Option<()> {
        let array = operation.operands.first()?.as_array().ok()?;
        let pattern: Option<Vec<f64>> = array.iter().map(number).collect();
        let phase = operation.operands.get(1).and_then(number).unwrap_or(0.0);
        self.state.style.dash_pattern = pattern?;
        self.state.style.dash_phase = phase;
        self.explicit.dash = true;
        Some(())
    }

    fn set_color(&mut self, color: Color) {
        self.state.style.color = color;
        self.explicit.color = true;
    }

    fn close_subpath(&mut self) {
        if let (Some(from), Some(start)) = (self.current, self.subpath_start) {
            if from != start {
                self.path.push(PathItem::Line(from, start));
            }
            self.current = Some(start);
        }
    }

    fn clear_path(&mut self) {
        self.path.clear();
        self.current = None;
        self.subpath_start = None;
    }

    /// Device space to the top-left page frame
    fn to_page(&self, (x, y): (f64, f64)) -> Point {
        Point {
            x: x - self.media_box[0],
            y: self.media_box[3] - y,
        }
    }

    /// Style of ops painted now, limited to fields set by the stream
    ///
    /// Fill-only paths are not stroked and always carry a solid black 1pt
    /// style; their cap and join keep inheriting.
    fn current_style(&self, stroked: bool) -> PartialStyle {
        if !stroked {
            return PartialStyle {
                width: Some(1.0),
                dash_pattern: Some(Vec::new()),
                dash_phase: Some(0.0),
                cap: None,
                join: None,
                color: Some(Color::black()),
            };
        }

        let style = &self.state.style;
        let scale = self.state.ctm.width_scale();
        let explicit = self.explicit;
        PartialStyle {
            width: (explicit.width || scale != 1.0).then_some(style.width * scale),
            dash_pattern: explicit.dash.then(|| style.dash_pattern.clone()),
            dash_phase: explicit.dash.then_some(style.dash_phase),
            cap: explicit.cap.then_some(style.cap),
            join: explicit.join.then_some(style.join),
            color: explicit.color.then_some(style.color),
        }
    }

    fn paint(&mut self, stroked: bool) {
        let style = self.current_style(stroked);
        // A width emitted once is inherited by later ops, so keep emitting it
        if stroked && style.width.is_some() {
            self.explicit.width = true;
        }
        let mut painted = Vec::with_capacity(self.path.len());

        for item in &self.path {
            match *item {
                PathItem::Line(p1, p2) => painted.push(DrawingOp::Line {
                    p1: self.to_page(p1),
                    p2: self.to_page(p2),
                    style: style.clone(),
                }),
                PathItem::Rect(corners, true) => {
                    let points = corners.map(|c| self.to_page(c));
                    let xs = points.map(|p| p.x);
                    let ys = points.map(|p| p.y);
                    painted.push(DrawingOp::Rect {
                        bounds: Rect {
                            x0: xs.iter().copied().fold(f64::INFINITY, f64::min),
                            y0: ys.iter().copied().fold(f64::INFINITY, f64::min),
                            x1: xs.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                            y1: ys.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                        },
                        style: style.clone(),
                    });
                }
                PathItem::Rect(corners, false) => {
                    for i in 0..4 {
                        painted.push(DrawingOp::Line {
                            p1: self.to_page(corners[i]),
                            p2: self.to_page(corners[(i + 1) % 4]),
                            style: style.clone(),
                        });
                    }
                }
            }
        }

        self.ops.extend(painted);
        self.clear_path();
    }
}

/// Read the drawing ops of a decoded content stream
pub fn read_drawings(content: &[u8], media_box: [f64; 4]) -> Result<Vec<DrawingOp>> {
    let mut reader = DrawingReader::new(media_box);
    reader.read(content)?;
    Ok(reader.finish())
}
