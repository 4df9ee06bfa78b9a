//! GeoJSON-backed layer data.

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use ows_common::{BoundingBox, Layer, OwsError, OwsResult};
use ows_protocol::DataSource;

/// Reads a layer's `data` file as GeoJSON, relative to the map's shape path.
#[derive(Debug, Default)]
pub struct GeoJsonSource {
    shape_path: Option<PathBuf>,
    document: Option<Value>,
}

impl GeoJsonSource {
    pub fn new(shape_path: Option<&str>) -> Self {
        Self {
            shape_path: shape_path.map(PathBuf::from),
            document: None,
        }
    }

    fn resolve(&self, data: &str) -> PathBuf {
        match &self.shape_path {
            Some(base) if Path::new(data).is_relative() => base.join(data),
            _ => PathBuf::from(data),
        }
    }
}

impl DataSource for GeoJsonSource {
    fn open(&mut self, layer: &Layer) -> OwsResult<()> {
        let name = layer.name().unwrap_or_default();
        let data = layer.data.as_deref().ok_or_else(|| {
            OwsError::DataSource(format!("Layer '{}' has no data reference", name))
        })?;

        let path = self.resolve(data);
        let contents = fs::read_to_string(&path).map_err(|e| {
            OwsError::DataSource(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let document = serde_json::from_str(&contents).map_err(|e| {
            OwsError::DataSource(format!("Invalid GeoJSON in {}: {}", path.display(), e))
        })?;

        debug!(layer = name, path = %path.display(), "Opened GeoJSON source");
        self.document = Some(document);
        Ok(())
    }

    fn extent(&mut self, layer: &Layer) -> OwsResult<BoundingBox> {
        let document = self
            .document
            .as_ref()
            .ok_or_else(|| OwsError::DataSource("Data source is not open".to_string()))?;

        let mut bounds: Option<BoundingBox> = None;
        collect_bounds(document, &mut bounds);
        bounds.ok_or_else(|| {
            OwsError::DataSource(format!(
                "Layer '{}' has no coordinates",
                layer.name().unwrap_or_default()
            ))
        })
    }

    fn close(&mut self, _layer: &Layer) {
        self.document = None;
    }
}

/// Grow `bounds` by every position found under a `coordinates` member.
fn collect_bounds(value: &Value, bounds: &mut Option<BoundingBox>) {
    match value {
        Value::Object(map) => {
            if let Some(coords) = map.get("coordinates") {
                collect_positions(coords, bounds);
            }
            for (key, child) in map {
                if key != "coordinates" {
                    collect_bounds(child, bounds);
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|v| collect_bounds(v, bounds)),
        _ => {}
    }
}

fn collect_positions(value: &Value, bounds: &mut Option<BoundingBox>) {
    let Value::Array(items) = value else {
        return;
    };

    // A position is an array of numbers: [x, y, ...]
    if let (Some(x), Some(y)) = (
        items.first().and_then(Value::as_f64),
        items.get(1).and_then(Value::as_f64),
    ) {
        bounds
            .get_or_insert_with(|| BoundingBox::from_point(x, y))
            .include(x, y);
        return;
    }

    items.iter().for_each(|v| collect_positions(v, bounds));
}

#[cfg(test)]
mod tests {
    use super::*;
    use ows_common::LayerType;

    const ROADS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {},
             "geometry": {"type": "LineString", "coordinates": [[-3.5, 40.0], [2.0, 48.5]]}},
            {"type": "Feature", "properties": {},
             "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [10, 0], [10, 5], [0, 0]]]}}
        ]
    }"#;

    #[test]
    fn test_extent_covers_all_geometries() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("roads.geojson"), ROADS).unwrap();

        let layer = Layer::new("roads", LayerType::Line).with_data("roads.geojson");
        let mut source = GeoJsonSource::new(dir.path().to_str());
        source.open(&layer).unwrap();
        let ext = source.extent(&layer).unwrap();
        source.close(&layer);

        assert_eq!(ext, BoundingBox::new(-3.5, 0.0, 10.0, 48.5));
        assert!(source.extent(&layer).is_err());
    }

    #[test]
    fn test_missing_file_is_data_source_error() {
        let layer = Layer::new("roads", LayerType::Line).with_data("nope.geojson");
        let mut source = GeoJsonSource::new(Some("/nonexistent"));
        assert!(matches!(source.open(&layer), Err(OwsError::DataSource(_))));
    }

    #[test]
    fn test_layer_without_data() {
        let layer = Layer::new("roads", LayerType::Line);
        let mut source = GeoJsonSource::default();
        assert!(source.open(&layer).is_err());
    }
}
