//! HTTP request handlers.
//!
//! - `/ows`: every OGC request, routed through the dispatcher
//! - `/health`: liveness and request counters
//! - `/metrics`: Prometheus exposition

use axum::{
    extract::{Extension, Query},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, instrument};

use ows_protocol::exceptions::{wms_exception, WMS_EXCEPTION_FORMAT};
use ows_protocol::{DispatchContext, DispatchStatus, OwsRequest, OwsResponse, RequestContext};

use crate::datasource::GeoJsonSource;
use crate::state::AppState;

// ============================================================================
// OGC endpoint
// ============================================================================

/// GET /ows - dispatch a KVP request to the WMS or WFS handler
#[instrument(skip(state, params, headers), fields(path = %uri.path()))]
pub async fn ows_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    let request_context = request_context(&headers, uri.path(), state.listen_port);
    let request = OwsRequest::from(params);

    // Extent lookups read files; keep them off the async workers
    let task_state = state.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut source = GeoJsonSource::new(task_state.map.shape_path.as_deref());
        let mut ctx = DispatchContext {
            map: &task_state.map,
            request_context: &request_context,
            data_source: &mut source,
        };
        let mut response = OwsResponse::new();
        let status = task_state
            .dispatcher
            .dispatch(&mut ctx, &request, &mut response);
        (status, response)
    })
    .await;

    let (status, response) = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, "Dispatch task failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response();
        }
    };

    state.metrics.record_dispatch(response.service, status);
    debug!(service = ?response.service, status = status.as_str(), "Dispatched");

    match status {
        DispatchStatus::NotRecognized => not_recognized(),
        DispatchStatus::Success | DispatchStatus::Failure => ows_response(response),
    }
}

/// Ambient request description, as a CGI gateway would provide it.
pub fn request_context(headers: &HeaderMap, path: &str, listen_port: u16) -> RequestContext {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");

    let (server_name, server_port) = match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => {
            (name.to_string(), port.to_string())
        }
        _ => (host.to_string(), listen_port.to_string()),
    };

    let mut ctx = RequestContext::new(server_name, server_port, path);
    let forwarded_https = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|p| p.eq_ignore_ascii_case("https"));
    if forwarded_https {
        ctx = ctx.with_https("on");
    }
    ctx
}

fn ows_response(response: OwsResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, response.content_type)],
        response.body,
    )
        .into_response()
}

fn not_recognized() -> Response {
    let body = wms_exception(
        "InvalidRequest",
        "No OGC service recognized: SERVICE must be WMS or WFS.",
    );
    (
        StatusCode::BAD_REQUEST,
        [(header::CONTENT_TYPE, WMS_EXCEPTION_FORMAT)],
        body,
    )
        .into_response()
}

// ============================================================================
// Health and metrics
// ============================================================================

/// GET /health - liveness with a summary of the loaded map
pub async fn health_handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "map": state.map.name,
        "layers": state.map.layers.len(),
        "services": state.dispatcher.handler_names(),
        "metrics": state.metrics.snapshot(),
    }))
}

/// GET /metrics - Prometheus metrics endpoint
pub async fn metrics_handler(Extension(handle): Extension<PrometheusHandle>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_context_from_host_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("maps.example.com:8443"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));

        let ctx = request_context(&headers, "/ows", 8080);
        assert_eq!(ctx.server_name.as_deref(), Some("maps.example.com"));
        assert_eq!(ctx.server_port.as_deref(), Some("8443"));
        assert_eq!(ctx.script_name.as_deref(), Some("/ows"));
        assert_eq!(ctx.https.as_deref(), Some("on"));
    }

    #[test]
    fn test_context_defaults_to_listen_port() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("maps.example.com"));

        let ctx = request_context(&headers, "/ows", 9000);
        assert_eq!(ctx.server_port.as_deref(), Some("9000"));
        assert!(ctx.https.is_none());
    }
}
