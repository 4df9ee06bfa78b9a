//! WMS 1.1.1 handler.
//!
//! Serves GetCapabilities; other operations are answered with an exception
//! report.

use std::fmt::Write;

use ows_common::{BoundingBox, Layer, MapConfig, Metadata, OwsError, OwsResult, Projection};
use tracing::{debug, warn};

use crate::bbox::{print_bounding_box, print_latlon_bounding_box, resolve_srs};
use crate::dispatch::{DispatchContext, DispatchStatus, ServiceHandler};
use crate::exceptions::error_response;
use crate::extent::{get_layer_extent, DataSource};
use crate::html::encode_html_entities;
use crate::online_resource::get_online_resource;
use crate::print::{
    print_encoded_group_metadata, print_encoded_metadata, print_encoded_metadata_list,
    print_encoded_param, MissingAction,
};
use crate::request::{OwsRequest, OwsResponse};

/// Content type of WMS 1.1.1 capabilities documents.
pub const CAPABILITIES_FORMAT: &str = "application/vnd.ogc.wms_xml";

const XLINK: &str = "http://www.w3.org/1999/xlink";

/// Web Map Service handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct WmsHandler;

impl WmsHandler {
    /// A request is WMS when SERVICE=WMS or it carries the pre-1.0 WMTVER
    /// parameter.
    pub fn recognizes(request: &OwsRequest) -> bool {
        request
            .service()
            .is_some_and(|s| s.eq_ignore_ascii_case("WMS"))
            || request.contains("WMTVER")
    }
}

impl ServiceHandler for WmsHandler {
    fn name(&self) -> &'static str {
        "WMS"
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
            Some(r)
                if r.eq_ignore_ascii_case("GetCapabilities")
                    || r.eq_ignore_ascii_case("capabilities") =>
            {
                capabilities_document(ctx)
            }
            Some(other) => Err(OwsError::Protocol(format!(
                "Incomplete or unsupported WMS request: {}",
                other
            ))),
            None => Err(OwsError::Protocol(
                "Missing REQUEST parameter in WMS request.".to_string(),
            )),
        };

        match result {
            Ok(body) => {
                response.content_type = CAPABILITIES_FORMAT.to_string();
                response.body = body;
                DispatchStatus::Success
            }
            Err(err) => {
                warn!(error = %err, "WMS request failed");
                *response = error_response("WMS", &err);
                DispatchStatus::Failure
            }
        }
    }
}

/// Build the WMS 1.1.1 capabilities document for the map.
pub fn capabilities_document(ctx: &mut DispatchContext<'_>) -> OwsResult<String> {
    let map: &MapConfig = ctx.map;
    let web = &map.web_metadata;
    let online_resource = get_online_resource(map, "wms_onlineresource", ctx.request_context)?;
    let encoded_resource = encode_html_entities(&online_resource)?;
    let map_name = (!map.name.is_empty()).then_some(map.name.as_str());

    let mut xml = String::new();
    xml.push_str("<?xml version='1.0' encoding=\"UTF-8\" standalone=\"no\" ?>\n");
    xml.push_str(
        "<!DOCTYPE WMT_MS_Capabilities SYSTEM \"http://schemas.opengis.net/wms/1.1.1/WMS_MS_Capabilities.dtd\">\n",
    );
    xml.push_str("<WMT_MS_Capabilities version=\"1.1.1\">\n\n");

    // Service
    xml.push_str("<Service>\n");
    xml.push_str("  <Name>OGC:WMS</Name>\n");
    print_encoded_metadata(
        &mut xml,
        web,
        "wms_title",
        MissingAction::Warn,
        "  <Title>{}</Title>\n",
        map_name,
    )?;
    print_encoded_metadata(
        &mut xml,
        web,
        "wms_abstract",
        MissingAction::Silent,
        "  <Abstract>{}</Abstract>\n",
        None,
    )?;
    print_encoded_metadata_list(
        &mut xml,
        web,
        "wms_keywordlist",
        Some("  <KeywordList>\n"),
        Some("  </KeywordList>\n"),
        "    <Keyword>{}</Keyword>\n",
    )?;
    print_encoded_metadata(
        &mut xml,
        web,
        "wms_service_onlineresource",
        MissingAction::Silent,
        &format!("  <OnlineResource xmlns:xlink=\"{}\" xlink:href=\"{{}}\"/>\n", XLINK),
        Some(online_resource.as_str()),
    )?;
    write_contact_information(&mut xml, map)?;
    print_encoded_metadata(
        &mut xml,
        web,
        "wms_fees",
        MissingAction::Silent,
        "  <Fees>{}</Fees>\n",
        None,
    )?;
    print_encoded_metadata(
        &mut xml,
        web,
        "wms_accessconstraints",
        MissingAction::Silent,
        "  <AccessConstraints>{}</AccessConstraints>\n",
        None,
    )?;
    xml.push_str("</Service>\n\n");

    // Capability
    xml.push_str("<Capability>\n");
    xml.push_str("  <Request>\n");
    xml.push_str("    <GetCapabilities>\n");
    writeln!(xml, "      <Format>{}</Format>", CAPABILITIES_FORMAT)?;
    xml.push_str("      <DCPType>\n        <HTTP>\n");
    writeln!(
        xml,
        "          <Get><OnlineResource xmlns:xlink=\"{}\" xlink:href=\"{}\"/></Get>",
        XLINK, encoded_resource
    )?;
    xml.push_str("        </HTTP>\n      </DCPType>\n");
    xml.push_str("    </GetCapabilities>\n");
    xml.push_str("  </Request>\n");
    xml.push_str("  <Exception>\n");
    xml.push_str("    <Format>application/vnd.ogc.se_xml</Format>\n");
    xml.push_str("  </Exception>\n");

    // Root layer
    xml.push_str("  <Layer>\n");
    print_encoded_param(
        &mut xml,
        "name",
        map_name,
        MissingAction::Warn,
        "    <Name>{}</Name>\n",
        None,
    )?;
    print_encoded_metadata(
        &mut xml,
        web,
        "wms_title",
        MissingAction::Warn,
        "    <Title>{}</Title>\n",
        map_name,
    )?;
    let root_srs = web
        .get("wms_srs")
        .map(str::to_string)
        .or_else(|| map.projection.code.map(|c| c.to_string()));
    print_encoded_param(
        &mut xml,
        "wms_srs",
        root_srs.as_deref(),
        MissingAction::Warn,
        "    <SRS>{}</SRS>\n",
        None,
    )?;
    if let Some(extent) = &map.extent {
        write_extent_boxes(&mut xml, "    ", extent, &map.projection, web)?;
    }

    let mut emitted_groups: Vec<&str> = Vec::new();
    for layer in &map.layers {
        match layer.group.as_deref() {
            None => write_layer(&mut xml, map, &mut *ctx.data_source, layer, "    ")?,
            Some(group) if !emitted_groups.contains(&group) => {
                emitted_groups.push(group);
                write_group(&mut xml, map, &mut *ctx.data_source, group, "    ")?;
            }
            Some(_) => {}
        }
    }

    xml.push_str("  </Layer>\n");
    xml.push_str("</Capability>\n");
    xml.push_str("</WMT_MS_Capabilities>\n");

    debug!(layers = map.layers.len(), bytes = xml.len(), "Built WMS capabilities");
    Ok(xml)
}

fn write_contact_information(xml: &mut String, map: &MapConfig) -> OwsResult<()> {
    let web = &map.web_metadata;
    let keys = [
        "wms_contactperson",
        "wms_contactorganization",
        "wms_contactposition",
        "wms_contactvoicetelephone",
        "wms_contactelectronicmailaddress",
    ];
    if !keys.iter().any(|k| web.contains(k)) {
        return Ok(());
    }

    xml.push_str("  <ContactInformation>\n");
    if web.contains("wms_contactperson") || web.contains("wms_contactorganization") {
        xml.push_str("    <ContactPersonPrimary>\n");
        print_encoded_metadata(
            xml,
            web,
            "wms_contactperson",
            MissingAction::Warn,
            "      <ContactPerson>{}</ContactPerson>\n",
            None,
        )?;
        print_encoded_metadata(
            xml,
            web,
            "wms_contactorganization",
            MissingAction::Warn,
            "      <ContactOrganization>{}</ContactOrganization>\n",
            None,
        )?;
        xml.push_str("    </ContactPersonPrimary>\n");
    }
    print_encoded_metadata(
        xml,
        web,
        "wms_contactposition",
        MissingAction::Silent,
        "    <ContactPosition>{}</ContactPosition>\n",
        None,
    )?;
    print_encoded_metadata(
        xml,
        web,
        "wms_contactvoicetelephone",
        MissingAction::Silent,
        "    <ContactVoiceTelephone>{}</ContactVoiceTelephone>\n",
        None,
    )?;
    print_encoded_metadata(
        xml,
        web,
        "wms_contactelectronicmailaddress",
        MissingAction::Silent,
        "    <ContactElectronicMailAddress>{}</ContactElectronicMailAddress>\n",
        None,
    )?;
    xml.push_str("  </ContactInformation>\n");
    Ok(())
}

fn write_group(
    xml: &mut String,
    map: &MapConfig,
    source: &mut dyn DataSource,
    group: &str,
    indent: &str,
) -> OwsResult<()> {
    writeln!(xml, "{}<Layer>", indent)?;
    writeln!(xml, "{}  <Name>{}</Name>", indent, encode_html_entities(group)?)?;
    print_encoded_group_metadata(
        xml,
        map,
        group,
        "wms_group_title",
        MissingAction::Warn,
        &format!("{}  <Title>{{}}</Title>\n", indent),
        Some(group),
    )?;
    print_encoded_group_metadata(
        xml,
        map,
        group,
        "wms_group_abstract",
        MissingAction::Silent,
        &format!("{}  <Abstract>{{}}</Abstract>\n", indent),
        None,
    )?;

    let inner = format!("{}  ", indent);
    for layer in map.group_layers(group) {
        write_layer(xml, map, source, layer, &inner)?;
    }
    writeln!(xml, "{}</Layer>", indent)?;
    Ok(())
}

fn write_layer(
    xml: &mut String,
    map: &MapConfig,
    source: &mut dyn DataSource,
    layer: &Layer,
    indent: &str,
) -> OwsResult<()> {
    let inner = format!("{}  ", indent);
    let md = &layer.metadata;

    writeln!(xml, "{}<Layer queryable=\"0\" opaque=\"0\" cascaded=\"0\">", indent)?;
    print_encoded_param(
        xml,
        "name",
        layer.name(),
        MissingAction::Warn,
        &format!("{}<Name>{{}}</Name>\n", inner),
        None,
    )?;
    print_encoded_metadata(
        xml,
        md,
        "wms_title",
        MissingAction::Warn,
        &format!("{}<Title>{{}}</Title>\n", inner),
        layer.name(),
    )?;
    print_encoded_metadata(
        xml,
        md,
        "wms_abstract",
        MissingAction::Silent,
        &format!("{}<Abstract>{{}}</Abstract>\n", inner),
        None,
    )?;
    print_encoded_metadata_list(
        xml,
        md,
        "wms_keywordlist",
        Some(&format!("{}<KeywordList>\n", inner)),
        Some(&format!("{}</KeywordList>\n", inner)),
        &format!("{}  <Keyword>{{}}</Keyword>\n", inner),
    )?;

    let projection = if layer.projection.is_defined() {
        layer.projection
    } else {
        map.projection
    };
    let srs = resolve_srs(&projection, md);
    print_encoded_param(
        xml,
        "wms_srs",
        srs.as_deref(),
        MissingAction::Silent,
        &format!("{}<SRS>{{}}</SRS>\n", inner),
        None,
    )?;

    match get_layer_extent(layer, source) {
        Ok(extent) => write_extent_boxes(xml, &inner, &extent, &projection, md)?,
        Err(err) => {
            debug!(layer = layer.name(), error = %err, "No extent for layer");
            writeln!(
                xml,
                "{}<!-- WARNING: Optional LatLonBoundingBox could not be established for this layer. -->",
                inner
            )?;
        }
    }

    writeln!(xml, "{}</Layer>", indent)?;
    Ok(())
}

/// Write the geographic and native boxes of an extent.
///
/// A failed reprojection replaces only the `LatLonBoundingBox` with a
/// warning comment; the native box needs none and is always written.
fn write_extent_boxes(
    xml: &mut String,
    tab: &str,
    extent: &BoundingBox,
    projection: &Projection,
    metadata: &Metadata,
) -> OwsResult<()> {
    let mut latlon = String::new();
    match print_latlon_bounding_box(&mut latlon, tab, extent, projection) {
        Ok(()) => xml.push_str(&latlon),
        Err(err) => {
            warn!(error = %err, "Geographic extent unavailable");
            writeln!(
                xml,
                "{}<!-- WARNING: Mandatory LatLonBoundingBox could not be established for this context. -->",
                tab
            )?;
        }
    }
    print_bounding_box(xml, tab, extent, projection, metadata)?;
    Ok(())
}
