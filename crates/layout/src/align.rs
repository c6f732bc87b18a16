//! Baseline verification of labels against their bounding rule lines
//!
//! Each absolute label is checked against the pair of horizontal lines
//! enclosing it (or an explicit bounding box from the rules) using font
//! metrics. Verification never fails; problems are reported as statuses.

use crate::cluster::{nearest_bounds, nearest_left, unique_positions};
use crate::{round_to, Align, Axis, CanonicalLine, LayoutDocument, TextPosition, Tolerances};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

const REPORT_DIGITS: u32 = 3;

/// Vertical font metrics scaled to a font size
///
/// `descent` is zero or negative.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FontMetrics {
    pub ascent: f64,
    pub descent: f64,
    pub height: f64,
}

impl FontMetrics {
    /// Metrics from ascent and descent, with `height = ascent - descent`
    pub fn new(ascent: f64, descent: f64) -> Self {
        Self {
            ascent,
            descent,
            height: ascent - descent,
        }
    }
}

/// Source of font metrics for a given size
pub trait FontMetricsProvider {
    fn metrics(&self, font_size: f64) -> FontMetrics;

    /// Advance width of `text` in points, `None` without glyph widths
    fn text_width(&self, _text: &str, _font_size: f64) -> Option<f64> {
        None
    }
}

impl FontMetricsProvider for FontMetrics {
    /// Treat the metrics as those of a 1pt font and scale them
    fn metrics(&self, font_size: f64) -> FontMetrics {
        FontMetrics {
            ascent: self.ascent * font_size,
            descent: self.descent * font_size,
            height: self.height * font_size,
        }
    }
}

/// Vertical alignment policy of a label inside its cell
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VAlign {
    #[default]
    Baseline,
    Center,
    Top,
    Bottom,
}

/// Verification outcome of a label
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Ok,
    NeedsReview,
    NeedsMargin,
    Baseline,
    Manual,
}

/// Expected baseline of a label between `bottom` and `top`
///
/// Returns `None` for the `baseline` policy or when either bound is missing.
pub fn expected_baseline(
    valign: VAlign,
    bottom: Option<f64>,
    top: Option<f64>,
    metrics: &FontMetrics,
    margin_top: f64,
    margin_bottom: f64,
) -> Option<f64> {
    let (bottom, top) = (bottom?, top?);
    match valign {
        VAlign::Center => Some((bottom + top) / 2.0 - (metrics.ascent + metrics.descent) / 2.0),
        VAlign::Top => Some(top - metrics.ascent - margin_top),
        VAlign::Bottom => Some(bottom - metrics.descent + margin_bottom),
        VAlign::Baseline => None,
    }
}

/// Alignment applied to labels without their own rule
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RuleDefaults {
    pub align: Align,
    pub valign: VAlign,
}

/// Per-label alignment rule, matched by label text
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LabelRule {
    pub text: String,
    pub align: Option<Align>,
    pub valign: Option<VAlign>,
    /// Tolerance override for this label
    pub allow_delta_pt: Option<f64>,
    pub manual: bool,
    /// Key into [`AlignmentRules::bounds`]
    pub bounds: Option<String>,
    pub margin_top: Option<f64>,
    pub margin_bottom: Option<f64>,
}

/// Explicit bounding box `[x0, y0, x1, y1]` in page-local coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BoundsConfig {
    pub bbox_pt: [f64; 4],
}

impl BoundsConfig {
    fn bottom_top(&self) -> (f64, f64) {
        (self.bbox_pt[1], self.bbox_pt[3])
    }

    fn x0(&self) -> f64 {
        self.bbox_pt[0]
    }

    fn x1(&self) -> f64 {
        self.bbox_pt[2]
    }
}

/// A block of labels stacked at a fixed line height below a top line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StackedBlock {
    pub name: String,

    /// Logical page, 1 or 2
    #[serde(default = "default_page")]
    pub page: usize,

    /// Label texts from top to bottom; the first one seeds the block
    pub lines: Vec<String>,

    /// Baseline step between lines; 0 leaves the block unchecked
    #[serde(default)]
    pub line_height: f64,

    #[serde(default)]
    pub margin_top: f64,

    /// Key into [`AlignmentRules::bounds`]; the nearest line above the
    /// first label is used when absent
    #[serde(default)]
    pub bounds: Option<String>,
}

fn default_page() -> usize {
    1
}

/// Which labels of a manual bounding box form its block and title
///
/// Without `lines`, the block is every manual left/bottom label of the box.
/// Without `title`, the first manual center/center label is the title.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ManualBlockConfig {
    /// Logical page, 1 or 2
    pub page: usize,
    pub lines: Option<Vec<String>>,
    pub title: Option<String>,
}

impl Default for ManualBlockConfig {
    fn default() -> Self {
        Self {
            page: default_page(),
            lines: None,
            title: None,
        }
    }
}

/// Alignment rule document
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AlignmentRules {
    pub defaults: RuleDefaults,
    pub labels: Vec<LabelRule>,
    pub bounds: BTreeMap<String, BoundsConfig>,
    pub tolerance_pt: Option<f64>,
    pub stacked_blocks: Vec<StackedBlock>,
    /// Per bounds key layout of manually placed labels
    pub manual_blocks: BTreeMap<String, ManualBlockConfig>,
}

impl AlignmentRules {
    /// First rule for every label text
    fn label_index(&self) -> HashMap<&str, &LabelRule> {
        let mut index = HashMap::new();
        for rule in &self.labels {
            index.entry(rule.text.as_str()).or_insert(rule);
        }
        index
    }

    /// Manual label rules grouped by their bounds key
    fn manual_by_bounds(&self) -> BTreeMap<&str, Vec<&LabelRule>> {
        let mut grouped: BTreeMap<&str, Vec<&LabelRule>> = BTreeMap::new();
        for rule in self.labels.iter().filter(|r| r.manual) {
            if let Some(key) = rule.bounds.as_deref().filter(|k| !k.is_empty()) {
                grouped.entry(key).or_default().push(rule);
            }
        }
        grouped
    }
}

/// Bounding lines used for a label
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoundsInfo {
    pub bottom: Option<f64>,
    pub top: Option<f64>,
    /// Bounds key, or `nearest_lines`
    pub source: String,
}

/// Measured margins of a label
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Margins {
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub bottom: Option<f64>,
}

/// Verification result of one label
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportEntry {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub align: Align,
    pub valign: VAlign,
    pub status: Status,
    pub bounds: BoundsInfo,
    pub expected_y: Option<f64>,
    pub delta: Option<f64>,
    pub metrics: FontMetrics,
    pub tolerance_pt: f64,
    pub margins: Margins,
}

/// Verification result of one line of a stacked block
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StackedLine {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub expected_y: Option<f64>,
    pub delta: Option<f64>,
    pub status: Status,
    pub margin_left: Option<f64>,
}

/// Verification result of a stacked block
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StackedBlockReport {
    pub name: String,
    pub page: usize,
    pub top: Option<f64>,
    pub line_height: f64,
    pub lines: Vec<StackedLine>,

    /// First listed label, when it is absent from the layout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_first: Option<String>,
}

/// Measured extent of the line block of a manual bounding box
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManualBlockLines {
    /// Label texts from the lowest baseline up
    pub lines: Vec<String>,
    pub font_size: f64,
    /// Mean gap between consecutive baselines
    pub line_height: f64,
    pub baseline_min: f64,
    pub baseline_max: f64,
    pub text_top: f64,
    pub text_bottom: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub metrics: FontMetrics,
}

/// Placement of the title of a manual bounding box
///
/// The title is expected centered vertically in the space above the line
/// block and horizontally in the box.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManualTitle {
    pub text: String,
    pub font_size: f64,
    pub baseline: f64,
    pub expected_baseline: f64,
    pub delta_baseline: f64,
    pub text_width: Option<f64>,
    pub expected_center_x: f64,
    pub delta_center_x: Option<f64>,
    pub metrics: FontMetrics,
}

/// Measurements of the labels inside one manual bounding box
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManualBlockReport {
    pub page: usize,
    pub bbox_pt: [f64; 4],
    pub block: Option<ManualBlockLines>,
    pub title: Option<ManualTitle>,
}

/// Alignment report of a layout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlignmentReport {
    pub tolerance_pt: f64,

    /// Entries keyed by `page1` / `page2`
    pub pages: BTreeMap<String, Vec<ReportEntry>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stacked_blocks: Vec<StackedBlockReport>,

    /// Keyed by bounds key
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub manual_blocks: BTreeMap<String, ManualBlockReport>,
}

/// Horizontal and vertical line positions of one page
struct PageLines {
    horizontal: Vec<f64>,
    vertical: Vec<f64>,
}

impl PageLines {
    fn new(lines: &[CanonicalLine], tolerances: &Tolerances) -> Self {
        Self {
            horizontal: unique_positions(lines, Axis::Horizontal, tolerances),
            vertical: unique_positions(lines, Axis::Vertical, tolerances),
        }
    }
}

fn analyze_entry(
    text: &TextPosition,
    rule: Option<&LabelRule>,
    rules: &AlignmentRules,
    page: &PageLines,
    fonts: &dyn FontMetricsProvider,
    tolerance: f64,
) -> ReportEntry {
    let align = rule.and_then(|r| r.align).unwrap_or(rules.defaults.align);
    let valign = rule.and_then(|r| r.valign).unwrap_or(rules.defaults.valign);
    let tolerance = rule.and_then(|r| r.allow_delta_pt).unwrap_or(tolerance);
    let manual = rule.is_some_and(|r| r.manual);
    let bounds_key = rule.and_then(|r| r.bounds.as_deref());

    let (bottom, top) = match bounds_key.and_then(|key| rules.bounds.get(key)) {
        Some(bounds) => {
            let (bottom, top) = bounds.bottom_top();
            (Some(bottom), Some(top))
        }
        None => nearest_bounds(text.y, &page.horizontal),
    };

    let metrics = fonts.metrics(text.font_size);
    let expected_y = expected_baseline(
        valign,
        bottom,
        top,
        &metrics,
        rule.and_then(|r| r.margin_top).unwrap_or(0.0),
        rule.and_then(|r| r.margin_bottom).unwrap_or(0.0),
    );
    let delta = expected_y.map(|expected| text.y - expected);

    let mut margins = Margins {
        left: nearest_left(text.x, &page.vertical).map(|left| text.x - left),
        ..Margins::default()
    };

    let status = match (valign, expected_y) {
        (VAlign::Center, Some(expected)) if (text.y - expected).abs() <= tolerance => Status::Ok,
        (VAlign::Center, Some(_)) => Status::NeedsReview,
        (VAlign::Top, Some(_)) => {
            margins.top = top.map(|top| top - (text.y + metrics.ascent));
            Status::NeedsMargin
        }
        (VAlign::Bottom, Some(_)) => {
            margins.bottom = bottom.map(|bottom| (text.y + metrics.descent) - bottom);
            Status::NeedsMargin
        }
        _ => Status::Baseline,
    };
    let status = if manual { Status::Manual } else { status };

    ReportEntry {
        text: text.text.clone(),
        x: text.x,
        y: text.y,
        font_size: text.font_size,
        align,
        valign,
        status,
        bounds: BoundsInfo {
            bottom,
            top,
            source: bounds_key.unwrap_or("nearest_lines").to_string(),
        },
        expected_y,
        delta,
        metrics,
        tolerance_pt: tolerance,
        margins,
    }
}

/// Labels of a page by text; the first occurrence wins
fn text_lookup(texts: &[TextPosition]) -> HashMap<&str, &TextPosition> {
    texts.iter().rev().map(|t| (t.text.as_str(), t)).collect()
}

fn analyze_stacked_block(
    block: &StackedBlock,
    layout: &LayoutDocument,
    rules: &AlignmentRules,
    fonts: &dyn FontMetricsProvider,
    tolerances: &Tolerances,
    tolerance: f64,
) -> StackedBlockReport {
    let mut report = StackedBlockReport {
        name: block.name.clone(),
        page: block.page,
        top: None,
        line_height: block.line_height,
        lines: Vec::new(),
        missing_first: None,
    };

    let lookup = text_lookup(layout.texts(block.page));
    let Some(first_text) = block.lines.first() else {
        return report;
    };
    let Some(first) = lookup.get(first_text.as_str()) else {
        log::debug!("stacked block {}: first label {first_text} not found", block.name);
        report.missing_first = Some(first_text.clone());
        return report;
    };

    let lines = layout.lines(block.page);
    let horizontal = unique_positions(lines, Axis::Horizontal, tolerances);
    let vertical = unique_positions(lines, Axis::Vertical, tolerances);

    report.top = match block.bounds.as_deref().and_then(|key| rules.bounds.get(key)) {
        Some(bounds) => Some(bounds.bottom_top().1),
        None => nearest_bounds(first.y, &horizontal).1,
    };
    let ascent = fonts.metrics(first.font_size).ascent;
    let expected_first = report.top.map(|top| top - ascent - block.margin_top);

    report.lines = block
        .lines
        .iter()
        .enumerate()
        .filter_map(|(i, line)| {
            let label = lookup.get(line.as_str())?;
            let expected_y = expected_first
                .filter(|_| block.line_height != 0.0)
                .map(|first| first - i as f64 * block.line_height);
            let delta = expected_y.map(|expected| round_to(label.y - expected, REPORT_DIGITS));
            let status = match delta {
                Some(delta) if delta.abs() > tolerance => Status::NeedsReview,
                _ => Status::Ok,
            };
            Some(StackedLine {
                text: label.text.clone(),
                x: label.x,
                y: label.y,
                expected_y: expected_y.map(|y| round_to(y, REPORT_DIGITS)),
                delta,
                status,
                margin_left: nearest_left(label.x, &vertical).map(|left| label.x - left),
            })
        })
        .collect();

    report
}

fn measure_block_lines(
    labels: &[&TextPosition],
    bounds: &BoundsConfig,
    fonts: &dyn FontMetricsProvider,
) -> Option<ManualBlockLines> {
    let mut labels = labels.to_vec();
    labels.sort_by(|a, b| a.y.total_cmp(&b.y));
    let (lowest, highest) = (labels.first()?, labels.last()?);

    let baselines: Vec<f64> = labels.iter().map(|label| label.y).collect();
    let gaps: Vec<f64> = baselines.windows(2).map(|pair| pair[1] - pair[0]).collect();
    let line_height = if gaps.is_empty() {
        0.0
    } else {
        gaps.iter().sum::<f64>() / gaps.len() as f64
    };

    let font_size = lowest.font_size;
    let metrics = fonts.metrics(font_size);
    let (bottom, top) = bounds.bottom_top();
    let text_top = round_to(highest.y + metrics.ascent, REPORT_DIGITS);
    let text_bottom = round_to(lowest.y + metrics.descent, REPORT_DIGITS);
    let left = labels.iter().map(|label| label.x).fold(f64::INFINITY, f64::min);

    Some(ManualBlockLines {
        lines: labels.iter().map(|label| label.text.clone()).collect(),
        font_size,
        line_height: round_to(line_height, REPORT_DIGITS),
        baseline_min: lowest.y,
        baseline_max: highest.y,
        text_top,
        text_bottom,
        margin_top: round_to(top - text_top, REPORT_DIGITS),
        margin_bottom: round_to(text_bottom - bottom, REPORT_DIGITS),
        margin_left: round_to(left - bounds.x0(), REPORT_DIGITS),
        metrics,
    })
}

fn measure_title(
    title: &TextPosition,
    block_top: f64,
    bounds: &BoundsConfig,
    fonts: &dyn FontMetricsProvider,
) -> ManualTitle {
    let metrics = fonts.metrics(title.font_size);
    let remaining_center = (bounds.bottom_top().1 + block_top) / 2.0;
    let expected = remaining_center - (metrics.ascent + metrics.descent) / 2.0;

    let center_x = (bounds.x0() + bounds.x1()) / 2.0;
    let text_width = fonts.text_width(&title.text, title.font_size);

    ManualTitle {
        text: title.text.clone(),
        font_size: title.font_size,
        baseline: title.y,
        expected_baseline: round_to(expected, REPORT_DIGITS),
        delta_baseline: round_to(title.y - expected, REPORT_DIGITS),
        text_width: text_width.map(|w| round_to(w, REPORT_DIGITS)),
        expected_center_x: round_to(center_x, REPORT_DIGITS),
        delta_center_x: text_width.map(|w| round_to(title.x + w / 2.0 - center_x, REPORT_DIGITS)),
        metrics,
    }
}

/// Measure the line block and title of every manual bounding box
///
/// Only boxes referenced by a manual label rule or configured under
/// `manual_blocks` and present in `bounds` are measured; nothing is measured
/// when no label is manual.
fn analyze_manual_blocks(
    layout: &LayoutDocument,
    rules: &AlignmentRules,
    fonts: &dyn FontMetricsProvider,
) -> BTreeMap<String, ManualBlockReport> {
    let manual = rules.manual_by_bounds();
    if manual.is_empty() {
        return BTreeMap::new();
    }

    let keys: BTreeSet<&str> = manual
        .keys()
        .copied()
        .chain(rules.manual_blocks.keys().map(String::as_str))
        .collect();

    let mut reports = BTreeMap::new();
    for key in keys {
        let Some(bounds) = rules.bounds.get(key) else {
            log::debug!("manual block {key} has no bounding box");
            continue;
        };
        let config = rules.manual_blocks.get(key).cloned().unwrap_or_default();
        let block_rules = manual.get(key).map(Vec::as_slice).unwrap_or_default();
        let lookup = text_lookup(layout.texts(config.page));
        let find = |text: &str| lookup.get(text).copied();

        let block_labels: Vec<&TextPosition> = match &config.lines {
            Some(lines) => lines.iter().filter_map(|text| find(text)).collect(),
            None => block_rules
                .iter()
                .filter(|r| r.align == Some(Align::Left) && r.valign == Some(VAlign::Bottom))
                .filter_map(|r| find(&r.text))
                .collect(),
        };
        let block = measure_block_lines(&block_labels, bounds, fonts);

        let title = config
            .title
            .as_deref()
            .and_then(find)
            .or_else(|| {
                block_rules
                    .iter()
                    .filter(|r| r.align == Some(Align::Center) && r.valign == Some(VAlign::Center))
                    .find_map(|r| find(&r.text))
            })
            .map(|title| {
                let block_top = block.as_ref().map_or(bounds.bottom_top().0, |b| b.text_top);
                measure_title(title, block_top, bounds, fonts)
            });

        reports.insert(
            key.to_string(),
            ManualBlockReport {
                page: config.page,
                bbox_pt: bounds.bbox_pt,
                block,
                title,
            },
        );
    }
    reports
}

/// Verify every absolute label of both pages
///
/// Pages without labels or without lines are omitted from the report. The
/// rules' `tolerance_pt`, when present, overrides
/// `tolerances.alignment_tolerance_pt`.
pub fn analyze_pages(
    layout: &LayoutDocument,
    rules: &AlignmentRules,
    fonts: &dyn FontMetricsProvider,
    tolerances: &Tolerances,
) -> AlignmentReport {
    let tolerance = rules.tolerance_pt.unwrap_or(tolerances.alignment_tolerance_pt);
    let index = rules.label_index();

    let mut pages = BTreeMap::new();
    for page in [1, 2] {
        let (texts, lines) = (layout.texts(page), layout.lines(page));
        if texts.is_empty() || lines.is_empty() {
            continue;
        }

        let page_lines = PageLines::new(lines, tolerances);
        let entries: Vec<ReportEntry> = texts
            .iter()
            .map(|text| {
                let rule = index.get(text.text.as_str()).copied();
                analyze_entry(text, rule, rules, &page_lines, fonts, tolerance)
            })
            .collect();

        log::debug!(
            "page{page}: {} labels, {} need review",
            entries.len(),
            entries
                .iter()
                .filter(|e| e.status == Status::NeedsReview)
                .count()
        );
        pages.insert(format!("page{page}"), entries);
    }

    let stacked_blocks = rules
        .stacked_blocks
        .iter()
        .map(|block| analyze_stacked_block(block, layout, rules, fonts, tolerances, tolerance))
        .collect();

    AlignmentReport {
        tolerance_pt: tolerance,
        pages,
        stacked_blocks,
        manual_blocks: analyze_manual_blocks(layout, rules, fonts),
    }
}
