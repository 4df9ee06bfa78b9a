//! Map configuration loader.
//!
//! Reads the YAML map file, resolves relative data paths and makes layer
//! names unique before the configuration is shared with request handlers.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use ows_common::MapConfig;
use ows_protocol::make_all_layers_unique;

/// Load a map configuration from a YAML file.
pub fn load_map_config(path: &Path) -> Result<MapConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read map config {}", path.display()))?;

    let mut map = parse_map_config(&contents)
        .with_context(|| format!("Invalid map config {}", path.display()))?;

    // Relative shape paths are taken from the config file's directory
    if let Some(dir) = path.parent() {
        let shape_path = match map.shape_path.as_deref() {
            Some(p) if Path::new(p).is_relative() => Some(dir.join(p)),
            Some(_) => None,
            None => Some(dir.to_path_buf()),
        };
        if let Some(p) = shape_path {
            map.shape_path = Some(p.to_string_lossy().into_owned());
        }
    }

    info!(
        map = %map.name,
        layers = map.layers.len(),
        shape_path = ?map.shape_path,
        "Loaded map configuration"
    );
    Ok(map)
}

/// Parse a YAML map configuration and make its layer names unique.
pub fn parse_map_config(yaml: &str) -> Result<MapConfig> {
    let mut map: MapConfig = serde_yaml::from_str(yaml).context("Failed to parse YAML")?;

    if map.extent.is_none() {
        warn!(map = %map.name, "Map has no extent; root layer bounding boxes are omitted");
    }

    make_all_layers_unique(&mut map).context("Failed to resolve layer names")?;
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_renames_duplicates() {
        let yaml = r#"
name: demo
layers:
  - name: roads
    type: line
  - name: ROADS
    type: line
"#;
        let map = parse_map_config(yaml).unwrap();
        let names: Vec<_> = map.layers.iter().filter_map(|l| l.name()).collect();
        assert_eq!(names, vec!["roads_01", "ROADS_02"]);
    }

    #[test]
    fn test_unnamed_layer_rejected() {
        let yaml = "name: demo\nlayers:\n  - type: polygon\n";
        let err = parse_map_config(yaml).unwrap_err();
        assert!(format!("{:#}", err).contains("missing a name"));
    }

    #[test]
    fn test_relative_shape_path_resolved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.yaml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "name: demo\nshape_path: data\nlayers: []").unwrap();

        let map = load_map_config(&path).unwrap();
        assert_eq!(
            map.shape_path.as_deref().map(Path::new),
            Some(dir.path().join("data").as_path())
        );
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = load_map_config(Path::new("/nonexistent/map.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/map.yaml"));
    }
}
