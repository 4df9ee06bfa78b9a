//! Bounding-box markup.

use std::fmt::Write;

use ows_common::{BoundingBox, Metadata, OwsResult, Projection};

/// Format a number like C's `%g`: six significant digits, trailing zeros
/// stripped, exponent notation for very large or small magnitudes.
pub fn format_g(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let scientific = format!("{:.5e}", value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if !(-4..6).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            strip_trailing_zeros(mantissa),
            sign,
            exponent.abs()
        )
    } else {
        let decimals = (5 - exponent) as usize;
        strip_trailing_zeros(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn strip_trailing_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Write a `LatLonBoundingBox` element, reprojecting the extent to
/// geographic coordinates when its projection is not geographic already.
pub fn print_latlon_bounding_box<W: Write>(
    out: &mut W,
    tab: &str,
    extent: &BoundingBox,
    projection: &Projection,
) -> OwsResult<()> {
    let ext = projection.project_rect(extent, &Projection::geographic())?;

    writeln!(
        out,
        "{}<LatLonBoundingBox minx=\"{}\" miny=\"{}\" maxx=\"{}\" maxy=\"{}\" />",
        tab,
        format_g(ext.min_x),
        format_g(ext.min_y),
        format_g(ext.max_x),
        format_g(ext.max_y)
    )?;
    Ok(())
}

/// Identifier of the first SRS advertised in metadata, else the projection's.
pub fn resolve_srs(projection: &Projection, metadata: &Metadata) -> Option<String> {
    metadata
        .get_first(&["wms_srs", "wfs_srs"])
        .and_then(|v| v.split_whitespace().next())
        .map(str::to_string)
        .or_else(|| projection.code.map(|c| c.to_string()))
}

/// Write a `BoundingBox` element labelled with its SRS.
///
/// Nothing is written when no SRS can be resolved. Resolution attributes are
/// added when both axes are configured; each axis prefers the `wms_` key
/// over the `wfs_` one on its own. Returns whether anything was written.
pub fn print_bounding_box<W: Write>(
    out: &mut W,
    tab: &str,
    extent: &BoundingBox,
    projection: &Projection,
    metadata: &Metadata,
) -> OwsResult<bool> {
    let Some(srs) = resolve_srs(projection, metadata) else {
        return Ok(false);
    };

    write!(
        out,
        "{tab}<BoundingBox SRS=\"{srs}\"\n{tab}            minx=\"{}\" miny=\"{}\" maxx=\"{}\" maxy=\"{}\"",
        format_g(extent.min_x),
        format_g(extent.min_y),
        format_g(extent.max_x),
        format_g(extent.max_y),
    )?;

    let resx = metadata.get_first(&["wms_resx", "wfs_resx"]);
    let resy = metadata.get_first(&["wms_resy", "wfs_resy"]);
    if let (Some(resx), Some(resy)) = (resx, resy) {
        write!(out, "\n{tab}            resx=\"{resx}\" resy=\"{resy}\"")?;
    }

    out.write_str(" />\n")?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ows_common::CrsCode;

    #[test]
    fn test_format_g() {
        assert_eq!(format_g(0.0), "0");
        assert_eq!(format_g(1.0), "1");
        assert_eq!(format_g(-180.0), "-180");
        assert_eq!(format_g(0.5), "0.5");
        assert_eq!(format_g(123456.0), "123456");
        assert_eq!(format_g(1234567.0), "1.23457e+06");
        assert_eq!(format_g(0.0001), "0.0001");
        assert_eq!(format_g(0.00001), "1e-05");
        assert_eq!(format_g(3.14159265), "3.14159");
        assert_eq!(format_g(-20037508.34), "-2.00375e+07");
        assert_eq!(format_g(999999.9), "1e+06");
    }

    #[test]
    fn test_latlon_box_geographic_passthrough() {
        let mut out = String::new();
        let ext = BoundingBox::new(-10.0, 40.5, 5.0, 55.0);
        print_latlon_bounding_box(&mut out, "  ", &ext, &Projection::new(CrsCode::Epsg4326))
            .unwrap();
        assert_eq!(
            out,
            "  <LatLonBoundingBox minx=\"-10\" miny=\"40.5\" maxx=\"5\" maxy=\"55\" />\n"
        );
    }

    #[test]
    fn test_latlon_box_from_mercator() {
        let mut out = String::new();
        let ext = BoundingBox::new(-20037508.342789244, 0.0, 0.0, 0.0);
        print_latlon_bounding_box(&mut out, "", &ext, &Projection::new(CrsCode::Epsg3857))
            .unwrap();
        assert!(out.contains("minx=\"-180\""), "{}", out);
        assert!(out.contains("maxx=\"0\""), "{}", out);
    }

    #[test]
    fn test_bounding_box_with_resolution() {
        let md: Metadata = [
            ("wms_srs", "EPSG:4326 EPSG:3857"),
            ("wms_resx", "0.1"),
            ("wfs_resy", "0.2"),
        ]
        .into_iter()
        .collect();
        let mut out = String::new();
        let written = print_bounding_box(
            &mut out,
            "  ",
            &BoundingBox::new(0.0, 1.0, 2.0, 3.0),
            &Projection::default(),
            &md,
        )
        .unwrap();
        assert!(written);
        let pad = " ".repeat(14);
        assert_eq!(
            out,
            format!(
                "  <BoundingBox SRS=\"EPSG:4326\"\n{pad}minx=\"0\" miny=\"1\" maxx=\"2\" maxy=\"3\"\n{pad}resx=\"0.1\" resy=\"0.2\" />\n"
            )
        );
    }

    #[test]
    fn test_bounding_box_needs_srs() {
        let mut out = String::new();
        let written = print_bounding_box(
            &mut out,
            "",
            &BoundingBox::new(0.0, 0.0, 1.0, 1.0),
            &Projection::default(),
            &Metadata::new(),
        )
        .unwrap();
        assert!(!written);
        assert!(out.is_empty());
    }

    #[test]
    fn test_bounding_box_one_axis_resolution_omitted() {
        let md: Metadata = [("wms_resx", "0.1")].into_iter().collect();
        let mut out = String::new();
        print_bounding_box(
            &mut out,
            "",
            &BoundingBox::new(0.0, 0.0, 1.0, 1.0),
            &Projection::new(CrsCode::Epsg3857),
            &md,
        )
        .unwrap();
        assert!(out.starts_with("<BoundingBox SRS=\"EPSG:3857\""));
        assert!(!out.contains("resx"));
    }
}
