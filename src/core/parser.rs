//! Point list parser for data-layer JSON
//!
//! Accepts an array of point records. Anything else, or any element that
//! is not a valid record, rejects the whole list.

use serde::Deserialize;
use serde_json::Value;
use tracing::trace;

use super::error::ClusterError;
use super::point::PointInput;

/// Parse a JSON document holding an array of points
pub fn parse_points_json(msg: &str) -> Result<Vec<PointInput>, ClusterError> {
    trace!(len = msg.len(), "Parsing point list");

    let json: Value = serde_json::from_str(msg)
        .map_err(|e| ClusterError::invalid_input(format!("malformed JSON: {e}")))?;
    parse_points(&json)
}

/// Parse an already-decoded JSON value holding an array of points
pub fn parse_points(json: &Value) -> Result<Vec<PointInput>, ClusterError> {
    let items = json.as_array().ok_or_else(|| {
        ClusterError::invalid_input(format!("expected an array of points, got {}", kind_of(json)))
    })?;

    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            PointInput::deserialize(item)
                .map_err(|e| ClusterError::invalid_input(format!("point {idx}: {e}")))
        })
        .collect()
}

fn kind_of(json: &Value) -> &'static str {
    match json {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::point::PointCategory;

    #[test]
    fn test_parse_point_list() {
        let msg = r#"[
            {"id": "spring", "position": {"x": 1.0, "y": 0.0, "z": 2.0}, "type": "water"},
            {"position": {"x": 3.0, "y": 0.0, "z": 4.0}, "type": "danger", "metadata": {"note": "rockfall"}}
        ]"#;

        let points = parse_points_json(msg).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].id.as_deref(), Some("spring"));
        assert_eq!(points[0].category, PointCategory::Water);
        assert!(points[1].id.is_none());
        assert_eq!(points[1].metadata.as_ref().unwrap()["note"], "rockfall");
    }

    #[test]
    fn test_empty_list_is_valid() {
        assert!(parse_points_json("[]").unwrap().is_empty());
    }

    #[test]
    fn test_non_sequence_rejected() {
        for msg in [r#"{"points": []}"#, "null", "42", r#""danger""#] {
            let err = parse_points_json(msg).unwrap_err();
            assert!(matches!(err, ClusterError::InvalidInput { .. }), "{msg} should be rejected");
        }
    }

    #[test]
    fn test_bad_element_rejects_whole_list() {
        let msg = r#"[
            {"position": {"x": 1.0, "y": 0.0, "z": 2.0}},
            {"type": "water"}
        ]"#;
        let err = parse_points_json(msg).unwrap_err();
        assert!(err.to_string().contains("point 1"));
    }

    #[test]
    fn test_malformed_json() {
        assert!(parse_points_json("[{").is_err());
    }
}
