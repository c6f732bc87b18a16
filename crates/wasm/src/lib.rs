//! WASM bindings for rulegrid
//!
//! This crate provides JavaScript-friendly API for:
//! - Extracting the canonical line layout of a reference PDF
//! - Building and resolving nearest-line label anchors
//! - Verifying label baselines against their bounding lines
//!
//! Documents cross the boundary as JSON strings.
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import init, { extractLayout, buildAnchors, resolveAnchors, verifyAlignment } from 'rulegrid-wasm';
//!
//! await init();
//!
//! const layout = extractLayout(pdfBytes);
//! const anchors = buildAnchors(layoutWithTexts);
//! const resolved = resolveAnchors(anchors, extractLayout(newPdfBytes));
//! const report = JSON.parse(verifyAlignment(resolved, rulesJson, fontBytes));
//! ```

use layout::{
    analyze_pages, build_anchor_set, parse_anchor_set, parse_layout, parse_rules, Tolerances,
};
use pdf_core::{extract_layout_from_pdf, FontData, PdfDocument};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Source name recorded in anchor sets built from the browser
const BROWSER_SOURCE: &str = "browser";

// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string_pretty(value).map_err(js_error)
}

fn tolerances(config_json: Option<String>) -> Result<Tolerances, JsValue> {
    match config_json {
        Some(json) => Tolerances::from_json(&json).map_err(js_error),
        None => Ok(Tolerances::default()),
    }
}

/// Default extraction tolerances
///
/// @returns Tolerances object
#[wasm_bindgen(js_name = defaultTolerances)]
pub fn default_tolerances() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&Tolerances::default()).map_err(JsValue::from)
}

/// Extract the canonical line layout from the first page of a PDF
///
/// @param pdfBytes - PDF file bytes (Uint8Array)
/// @param configJson - Optional tolerances JSON
/// @returns Layout JSON string
#[wasm_bindgen(js_name = extractLayout)]
pub fn extract_layout(pdf_bytes: &[u8], config_json: Option<String>) -> Result<String, JsValue> {
    let tolerances = tolerances(config_json)?;
    let doc = PdfDocument::open_from_bytes(pdf_bytes).map_err(js_error)?;
    let layout = extract_layout_from_pdf(&doc, 1, &tolerances).map_err(js_error)?;
    to_json(&layout)
}

/// Build an anchor set from a layout carrying absolute labels
///
/// @param layoutJson - Layout JSON with page1_texts / page2_texts
/// @param tol - Optional cluster tolerance in points
/// @returns Anchor set JSON string
#[wasm_bindgen(js_name = buildAnchors)]
pub fn build_anchors(layout_json: &str, tol: Option<f64>) -> Result<String, JsValue> {
    let doc = parse_layout(layout_json).map_err(js_error)?;
    let defaults = Tolerances::default();
    let tolerances = Tolerances {
        cluster_tolerance_pt: tol.unwrap_or(defaults.cluster_tolerance_pt),
        ..defaults
    };
    let set = build_anchor_set(&doc, BROWSER_SOURCE, &tolerances).map_err(js_error)?;
    to_json(&set)
}

/// Resolve an anchor set against the lines of a layout
///
/// @param anchorsJson - Anchor set JSON
/// @param layoutJson - Layout JSON providing the current lines
/// @returns Layout JSON string with page1_texts / page2_texts filled in
#[wasm_bindgen(js_name = resolveAnchors)]
pub fn resolve_anchors(anchors_json: &str, layout_json: &str) -> Result<String, JsValue> {
    let set = parse_anchor_set(anchors_json).map_err(js_error)?;
    let mut doc = parse_layout(layout_json).map_err(js_error)?;
    let (page1, page2) = set
        .resolve(&doc, &Tolerances::default())
        .map_err(js_error)?;
    doc.page1_texts = page1;
    doc.page2_texts = page2;
    to_json(&doc)
}

/// Verify label baselines against their bounding lines
///
/// @param layoutJson - Layout JSON carrying absolute labels
/// @param rulesJson - Alignment rules JSON
/// @param fontBytes - TTF file bytes (Uint8Array)
/// @param tol - Optional center alignment tolerance in points
/// @returns Alignment report JSON string
#[wasm_bindgen(js_name = verifyAlignment)]
pub fn verify_alignment(
    layout_json: &str,
    rules_json: &str,
    font_bytes: &[u8],
    tol: Option<f64>,
) -> Result<String, JsValue> {
    let doc = parse_layout(layout_json).map_err(js_error)?;
    let mut rules = parse_rules(rules_json).map_err(js_error)?;
    if tol.is_some() {
        rules.tolerance_pt = tol;
    }
    let font = FontData::from_ttf("font", font_bytes).map_err(js_error)?;

    let report = analyze_pages(&doc, &rules, &font, &Tolerances::default());
    to_json(&report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;
    use wasm_bindgen_test::*;

    const LAYOUT: &str = r#"{
        "source_page_size_pt": [800.0, 400.0],
        "split_x_pt": 400.0,
        "page1_lines": [
            {"x0": 10.0, "y0": 50.0, "x1": 300.0, "y1": 50.0, "width": 1.0},
            {"x0": 10.0, "y0": 80.0, "x1": 300.0, "y1": 80.0, "width": 1.0},
            {"x0": 10.0, "y0": 20.0, "x1": 10.0, "y1": 300.0, "width": 1.0}
        ],
        "page2_lines": [],
        "page1_texts": [
            {"text": "Name", "x": 13.0, "y": 55.0, "font_size": 10.0}
        ]
    }"#;

    fn one_page_pdf(content: &str) -> Vec<u8> {
        let mut doc = lopdf::Document::new();
        let pages_id = doc.new_object_id();
        let contents_id = doc.add_object(lopdf::Stream::new(
            dictionary! {},
            content.as_bytes().to_vec(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                lopdf::Object::Integer(0),
                lopdf::Object::Integer(0),
                lopdf::Object::Integer(800),
                lopdf::Object::Integer(400),
            ],
            "Contents" => contents_id,
        });
        doc.objects.insert(
            pages_id,
            lopdf::Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => 1i64,
                "Kids" => vec![lopdf::Object::Reference(page_id)],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[wasm_bindgen_test]
    fn test_extract_layout() {
        let pdf = one_page_pdf("50 100 200 100 re S 450 300 m 750 300 l S");
        let json = extract_layout(&pdf, None).unwrap();
        let layout = parse_layout(&json).unwrap();

        assert_eq!(layout.split_x_pt, 400.0);
        assert_eq!(layout.page1_lines.len(), 4);
        assert_eq!(layout.page2_lines.len(), 1);
    }

    #[wasm_bindgen_test]
    fn test_anchor_round_trip() {
        let anchors = build_anchors(LAYOUT, None).unwrap();
        let set = parse_anchor_set(&anchors).unwrap();
        assert_eq!(set.source_layout, BROWSER_SOURCE);
        assert_eq!(set.page1_texts.len(), 1);

        let resolved = parse_layout(&resolve_anchors(&anchors, LAYOUT).unwrap()).unwrap();
        assert_eq!(resolved.page1_texts[0].text, "Name");
        assert!((resolved.page1_texts[0].x - 13.0).abs() < 1e-9);
        assert!((resolved.page1_texts[0].y - 55.0).abs() < 1e-9);
    }

    #[wasm_bindgen_test]
    fn test_build_anchors_with_tolerance() {
        let anchors = build_anchors(LAYOUT, Some(0.5)).unwrap();
        let set = parse_anchor_set(&anchors).unwrap();
        assert_eq!(set.cluster_tolerance_pt, 0.5);
    }
}
