//! TrueType font metrics and advance widths

use crate::{PdfError, Result};
use layout::{FontMetrics, FontMetricsProvider};
use std::path::Path;

/// Metrics of a parsed TrueType font
#[derive(Clone, PartialEq)]
pub struct FontData {
    /// Font name/identifier
    pub name: String,
    /// Font file bytes, reparsed for glyph advances
    ttf_data: Vec<u8>,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
}

impl std::fmt::Debug for FontData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontData")
            .field("name", &self.name)
            .field("units_per_em", &self.units_per_em)
            .field("ascender", &self.ascender)
            .field("descender", &self.descender)
            .finish_non_exhaustive()
    }
}

impl FontData {
    /// Create font data from TTF bytes
    ///
    /// # Arguments
    /// * `name` - Font identifier
    /// * `ttf_data` - TrueType font file bytes
    pub fn from_ttf(name: &str, ttf_data: &[u8]) -> Result<Self> {
        let face = ttf_parser::Face::parse(ttf_data, 0)
            .map_err(|e| PdfError::FontParseError(format!("{name}: {e:?}")))?;

        let font = Self {
            name: name.to_string(),
            ttf_data: ttf_data.to_vec(),
            units_per_em: face.units_per_em(),
            ascender: face.ascender(),
            descender: face.descender(),
        };
        log::debug!(
            "loaded font {name}: upem={} ascender={} descender={}",
            font.units_per_em,
            font.ascender,
            font.descender
        );
        Ok(font)
    }

    /// Load a TrueType font file, named after its file stem
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_ttf(&name, &data)
    }

    /// Points per font unit at a font size
    fn scale(&self, font_size: f64) -> f64 {
        font_size / f64::from(self.units_per_em.max(1))
    }

    /// Ascent, descent and height in points for a font size
    pub fn metrics(&self, font_size: f64) -> FontMetrics {
        let scale = self.scale(font_size);
        FontMetrics::new(
            f64::from(self.ascender) * scale,
            f64::from(self.descender) * scale,
        )
    }

    /// Sum of horizontal glyph advances in font units
    ///
    /// Characters without a glyph contribute nothing.
    fn advance_units(&self, text: &str) -> Option<u32> {
        let face = ttf_parser::Face::parse(&self.ttf_data, 0).ok()?;
        Some(
            text.chars()
                .filter_map(|c| {
                    let glyph_id = face.glyph_index(c)?;
                    face.glyph_hor_advance(glyph_id)
                })
                .map(u32::from)
                .sum(),
        )
    }

    /// Advance width of `text` in points
    pub fn text_width(&self, text: &str, font_size: f64) -> Option<f64> {
        self.advance_units(text)
            .map(|units| f64::from(units) * self.scale(font_size))
    }
}

impl FontMetricsProvider for FontData {
    fn metrics(&self, font_size: f64) -> FontMetrics {
        FontData::metrics(self, font_size)
    }

    fn text_width(&self, text: &str, font_size: f64) -> Option<f64> {
        FontData::text_width(self, text, font_size)
    }
}
