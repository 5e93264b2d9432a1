use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Id prefix of records fabricated at resolution time
pub const SYNTHESIZED_ID_PREFIX: &str = "dynamic-";

/// Hotspot placement over the source image, in percent of width/height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Position {
    /// Horizontal offset, 0 = left edge, 100 = right edge
    pub x: f32,
    /// Vertical offset, 0 = top edge, 100 = bottom edge
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x: x.clamp(0.0, 100.0),
            y: y.clamp(0.0, 100.0),
        }
    }
}

/// Internal part of an object, shown as a labeled hotspot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRecord {
    /// Unique within the parent record only
    pub id: String,
    pub name: String,
    pub description: String,
    pub position: Position,
}

impl ComponentRecord {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        (x, y): (f32, f32),
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            position: Position::new(x, y),
        }
    }
}

/// A presentable object description, either from the static catalog or
/// synthesized for an unrecognized label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Display order
    pub components: Vec<ComponentRecord>,
}

impl CatalogRecord {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        components: Vec<ComponentRecord>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            components,
        }
    }

    pub fn is_synthesized(&self) -> bool {
        self.id.starts_with(SYNTHESIZED_ID_PREFIX)
    }
}
