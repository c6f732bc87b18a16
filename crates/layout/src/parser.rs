//! Layout, anchor and rule JSON parsing

use crate::{AlignmentRules, AnchorSet, LayoutDocument, LayoutError, Result};
use serde::de::DeserializeOwned;

fn parse<T: DeserializeOwned>(json: &str, what: &str) -> Result<T> {
    serde_json::from_str(json).map_err(|e| LayoutError::ParseError(format!("{what}: {e}")))
}

/// Parse a layout document from JSON string
pub fn parse_layout(json: &str) -> Result<LayoutDocument> {
    parse(json, "layout")
}

/// Parse an anchor set from JSON string
pub fn parse_anchor_set(json: &str) -> Result<AnchorSet> {
    let set: AnchorSet = parse(json, "anchor set")?;
    if set.format_version != crate::anchor::FORMAT_VERSION {
        log::warn!(
            "anchor set format {} differs from {}",
            set.format_version,
            crate::anchor::FORMAT_VERSION
        );
    }
    Ok(set)
}

/// Parse alignment rules from JSON string
pub fn parse_rules(json: &str) -> Result<AlignmentRules> {
    parse(json, "alignment rules")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, LineCap};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_layout() {
        let json = r#"{
            "source_page_size_pt": [1190.55, 841.89],
            "split_x_pt": 595.28,
            "page1_lines": [
                { "x0": 10, "y0": 20, "x1": 110, "y1": 20, "width": 0.5,
                  "dash_pattern": [], "dash_phase": 0, "cap": 2, "join": 0,
                  "color": [0.5, 0.5, 0.5] }
            ],
            "page2_lines": []
        }"#;

        let doc = parse_layout(json).unwrap();
        assert_eq!(doc.page1_lines.len(), 1);
        assert_eq!(doc.page1_lines[0].style.cap, LineCap::Square);
        assert_eq!(doc.page1_lines[0].style.color, Color::gray(0.5));
        assert!(doc.page1_texts.is_empty());
    }

    #[test]
    fn test_parse_layout_invalid() {
        let err = parse_layout(r#"{ "split_x_pt": 1 }"#).unwrap_err();
        assert!(matches!(err, LayoutError::ParseError(msg) if msg.starts_with("layout:")));
    }

    #[test]
    fn test_parse_layout_invalid_cap() {
        let json = r#"{
            "source_page_size_pt": [100, 100], "split_x_pt": 50,
            "page1_lines": [{ "x0": 0, "y0": 0, "x1": 1, "y1": 0, "width": 1, "cap": 7 }],
            "page2_lines": []
        }"#;
        assert!(parse_layout(json).is_err());
    }

    #[test]
    fn test_parse_rules_defaults() {
        let rules = parse_rules("{}").unwrap();
        assert_eq!(rules, AlignmentRules::default());
    }

    #[test]
    fn test_parse_anchor_set() {
        let json = r#"{
            "format_version": "v1",
            "anchor_strategy": "nearest_line",
            "cluster_tolerance_pt": 0.2,
            "page1_texts": [{
                "text": "name", "font_size": 10, "align": "center",
                "anchor": { "x_line": 10, "y_line": 50 },
                "offset": { "dx": 2.5, "dy": 3.2 },
                "reference_position": { "x": 12.5, "y": 53.2 }
            }]
        }"#;

        let set = parse_anchor_set(json).unwrap();
        assert_eq!(set.page1_texts.len(), 1);
        assert!(set.page2_texts.is_empty());
        assert_eq!(set.source_layout, "");
    }
}
