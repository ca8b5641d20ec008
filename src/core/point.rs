//! Point-of-interest types
//!
//! - PointCategory: closed category set plus an open `Other` fallback
//! - PointId: cheap-to-clone stable identity
//! - PointInput: record as supplied by the data layer
//! - Point: record plus derived fields (priority, screen position, camera distance)

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::geometry::{ScreenPos, WorldPos};

// ============================================================================
// PointCategory
// ============================================================================

/// Category label of a point of interest.
///
/// Labels are matched case-insensitively; anything unrecognised is kept
/// verbatim in `Other` so it still takes part in dominant-type resolution.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PointCategory {
    Danger,
    Warning,
    Water,
    Food,
    Shelter,
    Viewpoint,
    Parking,
    #[default]
    Info,
    Other(String),
}

impl PointCategory {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Danger => "danger",
            Self::Warning => "warning",
            Self::Water => "water",
            Self::Food => "food",
            Self::Shelter => "shelter",
            Self::Viewpoint => "viewpoint",
            Self::Parking => "parking",
            Self::Info => "info",
            Self::Other(label) => label,
        }
    }

    /// Priority of this category when it is not one of the configured priority types
    pub fn base_priority(&self) -> u32 {
        match self {
            Self::Danger => 4,
            Self::Warning => 3,
            Self::Water | Self::Shelter => 2,
            Self::Food | Self::Viewpoint | Self::Parking | Self::Info | Self::Other(_) => 1,
        }
    }
}

impl From<&str> for PointCategory {
    fn from(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "danger" => Self::Danger,
            "warning" => Self::Warning,
            "water" => Self::Water,
            "food" => Self::Food,
            "shelter" => Self::Shelter,
            "viewpoint" => Self::Viewpoint,
            "parking" => Self::Parking,
            "info" => Self::Info,
            _ => Self::Other(label.to_string()),
        }
    }
}

impl From<String> for PointCategory {
    fn from(label: String) -> Self {
        Self::from(label.as_str())
    }
}

impl From<PointCategory> for String {
    fn from(category: PointCategory) -> Self {
        match category {
            PointCategory::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for PointCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// PointId
// ============================================================================

/// Stable point identity. Shared by the point and every cache key it appears in.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointId(Arc<str>);

impl PointId {
    pub fn new(id: &str) -> Self {
        Self(Arc::from(id))
    }

    /// Identity for a point supplied without one, derived from its position in the input
    pub fn synthesized(index: usize) -> Self {
        Self(Arc::from(format!("point_{index}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for PointId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

// ============================================================================
// PointInput - caller-supplied record
// ============================================================================

/// A point of interest as supplied by the data layer.
#[derive(Clone, Debug, Deserialize)]
pub struct PointInput {
    /// Optional caller identity; strings and numbers are accepted
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: Option<String>,
    pub position: WorldPos,
    #[serde(rename = "type", default)]
    pub category: PointCategory,
    /// Opaque payload carried through untouched for the presentation layer
    #[serde(default)]
    pub metadata: Option<Value>,
}

impl PointInput {
    pub fn new(position: WorldPos, category: impl Into<PointCategory>) -> Self {
        Self {
            id: None,
            position,
            category: category.into(),
            metadata: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

// ============================================================================
// Point - record plus derived fields
// ============================================================================

/// A point of interest owned by the engine.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    pub id: PointId,
    pub position: WorldPos,
    #[serde(rename = "type")]
    pub category: PointCategory,
    /// Derived from `category` when the point set is supplied
    pub priority: u32,
    /// Set by the last recomputation; `None` until the point has been projected
    pub screen_position: Option<ScreenPos>,
    pub distance_to_camera: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl Point {
    pub(crate) fn from_input(input: PointInput, index: usize, priority: u32) -> Self {
        let id = match input.id {
            Some(id) => PointId::new(&id),
            None => PointId::synthesized(index),
        };
        Self {
            id,
            position: input.position,
            category: input.category,
            priority,
            screen_position: None,
            distance_to_camera: None,
            metadata: input.metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parsing() {
        assert_eq!(PointCategory::from("Danger"), PointCategory::Danger);
        assert_eq!(PointCategory::from(" water "), PointCategory::Water);
        assert_eq!(
            PointCategory::from("campfire"),
            PointCategory::Other("campfire".to_string())
        );
        assert_eq!(String::from(PointCategory::Other("x".into())), "x");
        assert_eq!(PointCategory::Shelter.to_string(), "shelter");
    }

    #[test]
    fn test_input_deserialization() {
        let input: PointInput = serde_json::from_str(
            r#"{"id": 17, "position": {"x": 1, "y": 2, "z": 3}, "type": "danger", "metadata": {"name": "cliff"}}"#,
        )
        .unwrap();
        assert_eq!(input.id.as_deref(), Some("17"));
        assert_eq!(input.position, WorldPos::new(1.0, 2.0, 3.0));
        assert_eq!(input.category, PointCategory::Danger);
        assert!(input.metadata.is_some());

        // Missing id and type fall back to synthesized identity and Info
        let input: PointInput =
            serde_json::from_str(r#"{"position": {"x": 0, "y": 0, "z": 0}}"#).unwrap();
        assert!(input.id.is_none());
        assert_eq!(input.category, PointCategory::Info);
    }

    #[test]
    fn test_synthesized_id() {
        let point = Point::from_input(PointInput::new(WorldPos::ZERO, "info"), 4, 1);
        assert_eq!(point.id.as_str(), "point_4");

        let point = Point::from_input(PointInput::new(WorldPos::ZERO, "info").with_id("trailhead"), 4, 1);
        assert_eq!(point.id.as_str(), "trailhead");
    }

    #[test]
    fn test_point_serializes_type_field() {
        let point = Point::from_input(PointInput::new(WorldPos::ZERO, "food"), 0, 1);
        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json["type"], "food");
        assert_eq!(json["id"], "point_0");
        assert!(json["screenPosition"].is_null());
        assert!(json.get("metadata").is_none());
    }
}
