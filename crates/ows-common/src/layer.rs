//! Layer definitions for OGC web services.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Metadata, Projection};

/// Kind of data a layer holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerType {
    #[default]
    Point,
    Line,
    Polygon,
    Raster,
    Annotation,
    Query,
    Circle,
}

impl fmt::Display for LayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LayerType::Point => "point",
            LayerType::Line => "line",
            LayerType::Polygon => "polygon",
            LayerType::Raster => "raster",
            LayerType::Annotation => "annotation",
            LayerType::Query => "query",
            LayerType::Circle => "circle",
        };
        write!(f, "{}", name)
    }
}

/// A layer of a map configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Layer {
    /// Layer name, unique within its map once names have been resolved
    #[serde(default)]
    pub name: Option<String>,

    #[serde(rename = "type", default)]
    pub layer_type: LayerType,

    /// Group shared with sibling layers
    #[serde(default)]
    pub group: Option<String>,

    /// Data source reference, relative to the map's shape path
    #[serde(default)]
    pub data: Option<String>,

    #[serde(default)]
    pub projection: Projection,

    #[serde(default)]
    pub metadata: Metadata,
}

impl Layer {
    pub fn new(name: impl Into<String>, layer_type: LayerType) -> Self {
        Self {
            name: Some(name.into()),
            layer_type,
            ..Default::default()
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key, value);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_raster(&self) -> bool {
        self.layer_type == LayerType::Raster
    }

    /// Check group membership (exact, case-sensitive match).
    pub fn in_group(&self, group: &str) -> bool {
        self.group.as_deref() == Some(group)
    }
}
