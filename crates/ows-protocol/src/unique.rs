//! Layer name uniqueness.

use std::fmt::Write;

use ows_common::{Layer, MapConfig, OwsError, OwsResult};
use tracing::debug;

/// Give every layer of the map a unique name.
///
/// Layers sharing a name (case-insensitive) are renamed in declaration
/// order: later duplicates get `_02`, `_03`, ... and the first occurrence
/// gets `_01`. A suffix that would clash with another existing layer name
/// is skipped.
///
/// Fails when any layer has no name. Intended to run once after loading a
/// configuration, before requests are served.
pub fn make_all_layers_unique(map: &mut MapConfig) -> OwsResult<()> {
    if map.layers.iter().any(|l| l.name.is_none()) {
        return Err(OwsError::Config(
            "At least one layer is missing a name in map file.".to_string(),
        ));
    }

    let layers = &mut map.layers;
    for i in 0..layers.len() {
        let base = layer_name(&layers[i]).to_string();
        let mut count = 1;

        for j in (i + 1)..layers.len() {
            if !layer_name(&layers[j]).eq_ignore_ascii_case(&base) {
                continue;
            }
            count = rename_layer(layers, j, count + 1)?;
        }

        if count > 1 {
            rename_layer(layers, i, 1)?;
        }
    }

    Ok(())
}

fn layer_name(layer: &Layer) -> &str {
    layer.name.as_deref().unwrap_or_default()
}

/// Append `_NN` to a layer's own name, starting at `counter` and moving on
/// past suffixes already taken. Returns the counter used.
fn rename_layer(layers: &mut [Layer], index: usize, mut counter: u32) -> OwsResult<u32> {
    let base = layer_name(&layers[index]);
    loop {
        let candidate = suffixed(base, counter)?;
        let taken = layers
            .iter()
            .enumerate()
            .any(|(k, l)| k != index && layer_name(l).eq_ignore_ascii_case(&candidate));

        if !taken {
            debug!(from = base, to = %candidate, "Renaming duplicate layer");
            layers[index].name = Some(candidate);
            return Ok(counter);
        }
        counter += 1;
    }
}

fn suffixed(base: &str, counter: u32) -> OwsResult<String> {
    let mut name = String::new();
    name.try_reserve_exact(base.len() + 4)?;
    write!(name, "{}_{:02}", base, counter)?;
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ows_common::LayerType;

    fn map_with(names: &[&str]) -> MapConfig {
        names.iter().fold(MapConfig::new("test"), |map, n| {
            map.with_layer(Layer::new(*n, LayerType::Polygon))
        })
    }

    fn names(map: &MapConfig) -> Vec<&str> {
        map.layers.iter().filter_map(|l| l.name()).collect()
    }

    #[test]
    fn test_renames_duplicates_case_insensitively() {
        let mut map = map_with(&["A", "a", "B", "A"]);
        make_all_layers_unique(&mut map).unwrap();
        assert_eq!(names(&map), vec!["A_01", "a_02", "B", "A_03"]);
    }

    #[test]
    fn test_unique_names_untouched() {
        let mut map = map_with(&["roads", "rivers"]);
        make_all_layers_unique(&mut map).unwrap();
        assert_eq!(names(&map), vec!["roads", "rivers"]);
    }

    #[test]
    fn test_skips_taken_suffix() {
        let mut map = map_with(&["A", "A", "A_02"]);
        make_all_layers_unique(&mut map).unwrap();
        assert_eq!(names(&map), vec!["A_01", "A_03", "A_02"]);
    }

    #[test]
    fn test_missing_name_is_config_error() {
        let mut map = map_with(&["A"]);
        map.layers.push(Layer::default());
        let err = make_all_layers_unique(&mut map).unwrap_err();
        assert!(matches!(err, OwsError::Config(_)));
        assert_eq!(names(&map), vec!["A"]);
    }
}
