//! HTTP-level tests for the OWS API router.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use ows_api::build_router;
use ows_api::config::load_map_config;
use ows_api::state::AppState;

const MAP_YAML: &str = r#"
name: demo
projection: "EPSG:4326"
extent:
  min_x: -10.0
  min_y: 35.0
  max_x: 20.0
  max_y: 60.0
metadata:
  wms_title: Demo map
  wms_srs: "EPSG:4326"
  wfs_title: Demo features
layers:
  - name: roads
    type: line
    data: roads.geojson
  - name: roads
    type: line
    data: roads.geojson
    metadata:
      wms_title: Secondary roads
  - name: relief
    type: raster
    metadata:
      wms_extent: "-10 35 20 60"
"#;

const ROADS_GEOJSON: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "properties": {"name": "A1"},
     "geometry": {"type": "LineString", "coordinates": [[2.25, 48.5], [4.75, 50.75]]}}
  ]
}"#;

fn setup() -> (TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("map.yaml"), MAP_YAML).unwrap();
    fs::write(dir.path().join("roads.geojson"), ROADS_GEOJSON).unwrap();

    let map = load_map_config(&dir.path().join("map.yaml")).unwrap();
    let state = Arc::new(AppState::new(map, 8080));
    let handle = PrometheusBuilder::new().build_recorder().handle();
    (dir, build_router(state, handle))
}

async fn get(router: Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .uri(uri)
        .header(header::HOST, "localhost:8080")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

// ============================================================================
// WMS
// ============================================================================

#[tokio::test]
async fn test_wms_capabilities() {
    let (_dir, router) = setup();
    let (status, body) = get(router, "/ows?SERVICE=WMS&REQUEST=GetCapabilities").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<WMT_MS_Capabilities version=\"1.1.1\">"));
    assert!(body.contains("xlink:href=\"http://localhost:8080/ows?\""));

    // Duplicate names were resolved at load time
    assert!(body.contains("<Name>roads_01</Name>"));
    assert!(body.contains("<Name>roads_02</Name>"));
    assert!(body.contains("<Title>Secondary roads</Title>"));

    // Extent read from the GeoJSON file
    assert!(body.contains(
        "<LatLonBoundingBox minx=\"2.25\" miny=\"48.5\" maxx=\"4.75\" maxy=\"50.75\" />"
    ));
    // Raster layer extent from metadata
    assert!(body.contains("<LatLonBoundingBox minx=\"-10\" miny=\"35\" maxx=\"20\" maxy=\"60\" />"));
}

#[tokio::test]
async fn test_wms_unsupported_request() {
    let (_dir, router) = setup();
    let (status, body) = get(router, "/ows?SERVICE=WMS&REQUEST=GetMap").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("ServiceExceptionReport"));
}

// ============================================================================
// WFS
// ============================================================================

#[tokio::test]
async fn test_wfs_capabilities_without_online_resource() {
    let (_dir, router) = setup();
    let (status, body) = get(router, "/ows?service=WFS&request=GetCapabilities").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<OnlineResource>http://localhost:8080/ows?</OnlineResource>"));
    assert!(body.contains("<Title>Demo features</Title>"));
    assert!(!body.contains("<Name>relief</Name>"));
}

// ============================================================================
// Fallthrough, health, metrics
// ============================================================================

#[tokio::test]
async fn test_unrecognized_service() {
    let (_dir, router) = setup();
    let (status, body) = get(router, "/ows?SERVICE=WCS&REQUEST=GetCapabilities").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("No OGC service recognized"));
}

#[tokio::test]
async fn test_health() {
    let (_dir, router) = setup();
    let (status, body) = get(router, "/health").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["layers"], 3);
    assert_eq!(json["services"], serde_json::json!(["WMS", "WFS"]));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (_dir, router) = setup();
    let (status, _) = get(router, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
}
