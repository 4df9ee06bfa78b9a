//! Map configuration: the service-wide metadata plus its ordered layers.

use serde::{Deserialize, Serialize};

use crate::{BoundingBox, Layer, Metadata, Projection};

/// A map configuration as loaded at startup.
///
/// Layer order is significant: it is the order of the capabilities
/// document and the order in which group metadata is searched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub extent: Option<BoundingBox>,

    #[serde(default)]
    pub projection: Projection,

    /// Base directory for layer data references
    #[serde(default)]
    pub shape_path: Option<String>,

    /// Service-wide ("web") metadata
    #[serde(default, alias = "metadata")]
    pub web_metadata: Metadata,

    #[serde(default)]
    pub layers: Vec<Layer>,
}

impl MapConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn with_web_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.web_metadata.insert(key, value);
        self
    }

    /// Layers belonging to the given group, in declaration order.
    pub fn group_layers<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a Layer> + 'a {
        self.layers.iter().filter(move |l| l.in_group(group))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LayerType;

    #[test]
    fn test_group_layers_in_order() {
        let map = MapConfig::new("test")
            .with_layer(Layer::new("roads", LayerType::Line).with_group("transport"))
            .with_layer(Layer::new("lakes", LayerType::Polygon))
            .with_layer(Layer::new("rail", LayerType::Line).with_group("transport"))
            .with_layer(Layer::new("dem", LayerType::Raster).with_group("terrain"));

        let names: Vec<_> = map
            .group_layers("transport")
            .filter_map(|l| l.name())
            .collect();
        assert_eq!(names, vec!["roads", "rail"]);
        assert!(map.group_layers("Transport").next().is_none());
    }

    #[test]
    fn test_deserialize_yaml() {
        let yaml = r#"
name: demo
projection: "EPSG:4326"
metadata:
  wms_title: Demo
layers:
  - name: roads
    type: line
    group: transport
    data: roads.geojson
    metadata:
      wms_extent: "0 0 10 10"
  - type: raster
"#;
        let map: MapConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(map.web_metadata.get("wms_title"), Some("Demo"));
        assert!(map.projection.is_geographic());
        assert_eq!(map.layers.len(), 2);
        assert_eq!(map.layers[0].layer_type, LayerType::Line);
        assert_eq!(map.layers[0].metadata.get("wms_extent"), Some("0 0 10 10"));
        assert!(map.layers[1].name.is_none());
        assert!(map.layers[1].is_raster());
    }
}
