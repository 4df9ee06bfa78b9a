//! Layer extent resolution.

use ows_common::{BoundingBox, Layer, OwsError, OwsResult};
use tracing::debug;

/// Access to the data behind a layer.
pub trait DataSource {
    /// Open the layer's data for reading.
    fn open(&mut self, layer: &Layer) -> OwsResult<()>;

    /// Native extent of an opened layer.
    fn extent(&mut self, layer: &Layer) -> OwsResult<BoundingBox>;

    /// Release whatever `open` acquired.
    fn close(&mut self, layer: &Layer);
}

/// A data source with nothing behind it; every open fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDataSource;

impl DataSource for NoDataSource {
    fn open(&mut self, layer: &Layer) -> OwsResult<()> {
        Err(OwsError::DataSource(format!(
            "No data source available for layer '{}'",
            layer.name().unwrap_or_default()
        )))
    }

    fn extent(&mut self, _layer: &Layer) -> OwsResult<BoundingBox> {
        Err(OwsError::DataSource("Data source is not open".to_string()))
    }

    fn close(&mut self, _layer: &Layer) {}
}

/// Extent of a layer.
///
/// Tries the `wms_extent` then `wfs_extent` metadata (four numbers). Without
/// metadata, raster layers fail and other layers ask their data source,
/// which is closed again whether or not the query succeeds.
pub fn get_layer_extent(layer: &Layer, source: &mut dyn DataSource) -> OwsResult<BoundingBox> {
    if let Some(value) = layer.metadata.get_first(&["wms_extent", "wfs_extent"]) {
        return BoundingBox::from_extent_string(value);
    }

    if layer.is_raster() {
        return Err(OwsError::DataSource(format!(
            "No extent metadata for raster layer '{}'",
            layer.name().unwrap_or_default()
        )));
    }

    source.open(layer)?;
    let extent = source.extent(layer);
    source.close(layer);

    debug!(layer = layer.name(), ok = extent.is_ok(), "Queried data source extent");
    extent
}

#[cfg(test)]
mod tests {
    use super::*;
    use ows_common::LayerType;

    #[derive(Default)]
    struct Recording {
        opened: usize,
        closed: usize,
        fail_extent: bool,
    }

    impl DataSource for Recording {
        fn open(&mut self, _layer: &Layer) -> OwsResult<()> {
            self.opened += 1;
            Ok(())
        }

        fn extent(&mut self, _layer: &Layer) -> OwsResult<BoundingBox> {
            if self.fail_extent {
                Err(OwsError::DataSource("broken".to_string()))
            } else {
                Ok(BoundingBox::new(-1.0, -2.0, 3.0, 4.0))
            }
        }

        fn close(&mut self, _layer: &Layer) {
            self.closed += 1;
        }
    }

    #[test]
    fn test_metadata_extent() {
        let layer = Layer::new("a", LayerType::Line).with_metadata("wms_extent", "1 2 3 4");
        let mut source = Recording::default();
        let ext = get_layer_extent(&layer, &mut source).unwrap();
        assert_eq!(ext, BoundingBox::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(source.opened, 0);
    }

    #[test]
    fn test_wfs_extent_fallback() {
        let layer = Layer::new("a", LayerType::Line).with_metadata("wfs_extent", "5 6 7 8");
        let ext = get_layer_extent(&layer, &mut NoDataSource).unwrap();
        assert_eq!(ext, BoundingBox::new(5.0, 6.0, 7.0, 8.0));
    }

    #[test]
    fn test_bad_token_count_is_protocol_error() {
        let layer = Layer::new("a", LayerType::Line).with_metadata("wms_extent", "1 2 3");
        let err = get_layer_extent(&layer, &mut NoDataSource).unwrap_err();
        assert!(matches!(err, OwsError::Protocol(_)));
    }

    #[test]
    fn test_raster_never_opens_source() {
        let layer = Layer::new("dem", LayerType::Raster);
        let mut source = Recording::default();
        assert!(get_layer_extent(&layer, &mut source).is_err());
        assert_eq!(source.opened, 0);
    }

    #[test]
    fn test_source_closed_on_both_paths() {
        let layer = Layer::new("a", LayerType::Point);

        let mut source = Recording::default();
        let ext = get_layer_extent(&layer, &mut source).unwrap();
        assert_eq!(ext.max_y, 4.0);
        assert_eq!((source.opened, source.closed), (1, 1));

        let mut source = Recording {
            fail_extent: true,
            ..Default::default()
        };
        assert!(get_layer_extent(&layer, &mut source).is_err());
        assert_eq!((source.opened, source.closed), (1, 1));
    }
}
