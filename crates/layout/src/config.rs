//! Extraction tolerances

use crate::{LayoutError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Every tolerance and rounding precision used by the pipeline
///
/// Missing keys in a JSON config fall back to the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Tolerances {
    /// Maximum deviation on the fixed axis for a segment to count as axis-aligned
    pub line_detection_tolerance_pt: f64,

    /// Segments must be strictly longer than this on their varying axis
    pub minimum_line_length_pt: f64,

    /// Slack around the split coordinate when assigning pages
    pub split_tolerance_pt: f64,

    /// Maximum gap between intervals that still merge into one line
    pub merge_tolerance_pt: f64,

    /// Maximum gap between line positions grouped into one cluster
    pub cluster_tolerance_pt: f64,

    /// Maximum endpoint deviation for a canonical line to count as
    /// horizontal or vertical when collecting line positions
    pub orientation_tolerance_pt: f64,

    /// Allowed deviation of a centered label from its expected baseline
    pub alignment_tolerance_pt: f64,

    /// Decimal places kept on output coordinates
    pub position_round_digits: u32,

    /// Decimal places kept on output stroke widths
    pub line_width_round_digits: u32,

    /// Decimal places of the fixed coordinate used to group collinear segments
    pub coordinate_key_digits: u32,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            line_detection_tolerance_pt: 0.1,
            minimum_line_length_pt: 0.5,
            split_tolerance_pt: 0.5,
            merge_tolerance_pt: 1.2,
            cluster_tolerance_pt: 0.2,
            orientation_tolerance_pt: 0.01,
            alignment_tolerance_pt: 1.0,
            position_round_digits: 3,
            line_width_round_digits: 3,
            coordinate_key_digits: 2,
        }
    }
}

impl Tolerances {
    /// Parse tolerances from a JSON object
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(LayoutError::ConfigError(
                "extraction config must be a JSON object".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(|e| LayoutError::ConfigError(e.to_string()))
    }

    /// Load tolerances from a JSON file, using defaults when the file is absent
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!(
                "extraction config {} not found, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json).map_err(|e| match e {
            LayoutError::ConfigError(msg) => {
                LayoutError::ConfigError(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Tolerances::from_json(r#"{ "merge_tolerance_pt": 2.5 }"#).unwrap();
        assert_eq!(config.merge_tolerance_pt, 2.5);
        assert_eq!(config.split_tolerance_pt, 0.5);
        assert_eq!(config.position_round_digits, 3);
    }

    #[test]
    fn test_non_object_config_rejected() {
        let err = Tolerances::from_json("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, LayoutError::ConfigError(_)));
    }

    #[test]
    fn test_invalid_field_type_rejected() {
        let err = Tolerances::from_json(r#"{ "position_round_digits": "three" }"#).unwrap_err();
        assert!(matches!(err, LayoutError::ConfigError(_)));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = Tolerances::load("/nonexistent/line_extraction_config.json").unwrap();
        assert_eq!(config, Tolerances::default());
    }
}
