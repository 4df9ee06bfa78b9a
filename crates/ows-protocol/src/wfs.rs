//! WFS 1.0.0 handler.

use std::fmt::Write;

use ows_common::{Layer, MapConfig, OwsError, OwsResult};
use tracing::{debug, warn};

use crate::bbox::{print_latlon_bounding_box, resolve_srs};
use crate::dispatch::{DispatchContext, DispatchStatus, ServiceHandler};
use crate::exceptions::error_response;
use crate::extent::{get_layer_extent, DataSource};
use crate::html::encode_html_entities;
use crate::online_resource::get_online_resource;
use crate::print::{
    print_encoded_metadata, print_encoded_metadata_list, print_encoded_param, MissingAction,
};
use crate::request::{OwsRequest, OwsResponse};

/// Web Feature Service handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct WfsHandler;

impl WfsHandler {
    pub fn recognizes(request: &OwsRequest) -> bool {
        request
            .service()
            .is_some_and(|s| s.eq_ignore_ascii_case("WFS"))
    }
}

impl ServiceHandler for WfsHandler {
    fn name(&self) -> &'static str {
        "WFS"
    }

    fn try_handle(
        &self,
        ctx: &mut DispatchContext<'_>,
        request: &OwsRequest,
        response: &mut OwsResponse,
    ) -> DispatchStatus {
        if !Self::recognizes(request) {
            return DispatchStatus::NotRecognized;
        }

        let result = match request.request() {
            Some(r) if r.eq_ignore_ascii_case("GetCapabilities") => capabilities_document(ctx),
            Some(other) => Err(OwsError::Protocol(format!(
                "Invalid WFS request: {}",
                other
            ))),
            None => Err(OwsError::Protocol(
                "Missing REQUEST parameter in WFS request.".to_string(),
            )),
        };

        match result {
            Ok(body) => {
                response.content_type = "text/xml".to_string();
                response.body = body;
                DispatchStatus::Success
            }
            Err(err) => {
                warn!(error = %err, "WFS request failed");
                *response = error_response("WFS", &err);
                DispatchStatus::Failure
            }
        }
    }
}

/// Build the WFS 1.0.0 capabilities document. Raster layers are not
/// feature types and are left out.
pub fn capabilities_document(ctx: &mut DispatchContext<'_>) -> OwsResult<String> {
    let map: &MapConfig = ctx.map;
    let web = &map.web_metadata;
    let online_resource =
        encode_html_entities(&get_online_resource(map, "wfs_onlineresource", ctx.request_context)?)?;
    let map_name = (!map.name.is_empty()).then_some(map.name.as_str());

    let mut xml = String::new();
    xml.push_str("<?xml version='1.0' encoding=\"UTF-8\" ?>\n");
    xml.push_str(
        "<WFS_Capabilities version=\"1.0.0\" updateSequence=\"0\" \
         xmlns=\"http://www.opengis.net/wfs\" \
         xmlns:ogc=\"http://www.opengis.net/ogc\" \
         xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" \
         xsi:schemaLocation=\"http://www.opengis.net/wfs http://schemas.opengis.net/wfs/1.0.0/WFS-capabilities.xsd\">\n\n",
    );

    // Service
    xml.push_str("<Service>\n");
    xml.push_str("  <Name>MapServer WFS</Name>\n");
    print_encoded_metadata(
        &mut xml,
        web,
        "wfs_title",
        MissingAction::Warn,
        "  <Title>{}</Title>\n",
        map_name,
    )?;
    print_encoded_metadata(
        &mut xml,
        web,
        "wfs_abstract",
        MissingAction::Silent,
        "  <Abstract>{}</Abstract>\n",
        None,
    )?;
    print_encoded_metadata_list(
        &mut xml,
        web,
        "wfs_keywordlist",
        Some("  <Keywords>\n"),
        Some("  </Keywords>\n"),
        "    {}\n",
    )?;
    writeln!(xml, "  <OnlineResource>{}</OnlineResource>", online_resource)?;
    print_encoded_metadata(
        &mut xml,
        web,
        "wfs_fees",
        MissingAction::Silent,
        "  <Fees>{}</Fees>\n",
        None,
    )?;
    print_encoded_metadata(
        &mut xml,
        web,
        "wfs_accessconstraints",
        MissingAction::Silent,
        "  <AccessConstraints>{}</AccessConstraints>\n",
        None,
    )?;
    xml.push_str("</Service>\n\n");

    // Capability
    xml.push_str("<Capability>\n");
    xml.push_str("  <Request>\n");
    xml.push_str("    <GetCapabilities>\n");
    xml.push_str("      <DCPType>\n        <HTTP>\n");
    writeln!(xml, "          <Get onlineResource=\"{}\" />", online_resource)?;
    xml.push_str("        </HTTP>\n      </DCPType>\n");
    xml.push_str("    </GetCapabilities>\n");
    xml.push_str("  </Request>\n");
    xml.push_str("</Capability>\n\n");

    // Feature types
    xml.push_str("<FeatureTypeList>\n");
    xml.push_str("  <Operations>\n    <Query/>\n  </Operations>\n");
    for layer in map.layers.iter().filter(|l| !l.is_raster()) {
        write_feature_type(&mut xml, map, &mut *ctx.data_source, layer)?;
    }
    xml.push_str("</FeatureTypeList>\n\n");
    xml.push_str("</WFS_Capabilities>\n");

    debug!(bytes = xml.len(), "Built WFS capabilities");
    Ok(xml)
}

fn write_feature_type(
    xml: &mut String,
    map: &MapConfig,
    source: &mut dyn DataSource,
    layer: &Layer,
) -> OwsResult<()> {
    let md = &layer.metadata;
    let projection = if layer.projection.is_defined() {
        layer.projection
    } else {
        map.projection
    };

    xml.push_str("  <FeatureType>\n");
    print_encoded_param(
        xml,
        "name",
        layer.name(),
        MissingAction::Warn,
        "    <Name>{}</Name>\n",
        None,
    )?;
    print_encoded_metadata(
        xml,
        md,
        "wfs_title",
        MissingAction::Warn,
        "    <Title>{}</Title>\n",
        layer.name(),
    )?;
    print_encoded_metadata(
        xml,
        md,
        "wfs_abstract",
        MissingAction::Silent,
        "    <Abstract>{}</Abstract>\n",
        None,
    )?;
    print_encoded_metadata_list(
        xml,
        md,
        "wfs_keywordlist",
        Some("    <Keywords>\n"),
        Some("    </Keywords>\n"),
        "      {}\n",
    )?;

    // WFS 1.0.0 allows a single SRS per feature type.
    let srs = resolve_srs(&projection, md);
    print_encoded_param(
        xml,
        "wfs_srs",
        srs.as_deref(),
        MissingAction::Warn,
        "    <SRS>{}</SRS>\n",
        None,
    )?;

    let latlon = get_layer_extent(layer, source).and_then(|extent| {
        let mut out = String::new();
        print_latlon_bounding_box(&mut out, "    ", &extent, &projection)?;
        Ok(out)
    });
    match latlon {
        Ok(out) => xml.push_str(&out),
        Err(err) => {
            debug!(layer = layer.name(), error = %err, "No extent for feature type");
            xml.push_str(
                "    <!-- WARNING: Optional LatLongBoundingBox could not be established for this layer -->\n",
            );
        }
    }

    xml.push_str("  </FeatureType>\n");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extent::NoDataSource;
    use crate::online_resource::RequestContext;
    use ows_common::LayerType;

    fn handle(map: &MapConfig, request: &OwsRequest) -> (DispatchStatus, OwsResponse) {
        let request_context = RequestContext::default();
        let mut source = NoDataSource;
        let mut ctx = DispatchContext {
            map,
            request_context: &request_context,
            data_source: &mut source,
        };
        let mut response = OwsResponse::new();
        let status = WfsHandler.try_handle(&mut ctx, request, &mut response);
        (status, response)
    }

    #[test]
    fn test_raster_layers_excluded() {
        let map = MapConfig::new("demo")
            .with_web_metadata("wfs_onlineresource", "http://example.com/wfs")
            .with_layer(Layer::new("roads", LayerType::Line))
            .with_layer(Layer::new("dem", LayerType::Raster));
        let request = OwsRequest::new()
            .with_param("SERVICE", "WFS")
            .with_param("REQUEST", "GetCapabilities");

        let (status, response) = handle(&map, &request);
        assert_eq!(status, DispatchStatus::Success);
        assert!(response.body.contains("<Name>roads</Name>"));
        assert!(!response.body.contains("<Name>dem</Name>"));
        assert!(response
            .body
            .contains("<OnlineResource>http://example.com/wfs?</OnlineResource>"));
    }

    #[test]
    fn test_missing_online_resource_fails() {
        let map = MapConfig::new("demo");
        let request = OwsRequest::new()
            .with_param("SERVICE", "WFS")
            .with_param("REQUEST", "GetCapabilities");

        let (status, response) = handle(&map, &request);
        assert_eq!(status, DispatchStatus::Failure);
        assert!(response.body.contains("wfs_onlineresource"));
    }
}
