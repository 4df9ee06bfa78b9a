//! Online resource (service base URL) resolution.

use ows_common::{MapConfig, OwsError, OwsResult};
use tracing::debug;

/// Ambient description of the current request, as a CGI gateway
/// exposes it through `SERVER_NAME`, `SERVER_PORT`, `SCRIPT_NAME` and `HTTPS`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub server_name: Option<String>,
    pub server_port: Option<String>,
    pub script_name: Option<String>,
    pub https: Option<String>,
}

impl RequestContext {
    pub fn new(
        server_name: impl Into<String>,
        server_port: impl Into<String>,
        script_name: impl Into<String>,
    ) -> Self {
        Self {
            server_name: Some(server_name.into()),
            server_port: Some(server_port.into()),
            script_name: Some(script_name.into()),
            https: None,
        }
    }

    pub fn with_https(mut self, https: impl Into<String>) -> Self {
        self.https = Some(https.into());
        self
    }

    /// Read the CGI variables from the process environment.
    pub fn from_env() -> Self {
        Self {
            server_name: std::env::var("SERVER_NAME").ok(),
            server_port: std::env::var("SERVER_PORT").ok(),
            script_name: std::env::var("SCRIPT_NAME").ok(),
            https: std::env::var("HTTPS").ok(),
        }
    }

    fn is_secure(&self) -> bool {
        self.https
            .as_deref()
            .is_some_and(|v| v.eq_ignore_ascii_case("on"))
            || self
                .server_port
                .as_deref()
                .and_then(|p| p.trim().parse::<u16>().ok())
                == Some(443)
    }
}

/// Base URL clients use to re-invoke the service, ending in `?` or `&`.
///
/// The web metadata entry `metadata_name` wins when present. Otherwise the
/// URL is built from the request context as `scheme://host:port/script?`.
pub fn get_online_resource(
    map: &MapConfig,
    metadata_name: &str,
    ctx: &RequestContext,
) -> OwsResult<String> {
    if let Some(value) = map.web_metadata.get(metadata_name) {
        let mut url = String::new();
        url.try_reserve_exact(value.len() + 1)?;
        url.push_str(value);

        if url.contains('?') {
            if !url.ends_with('?') && !url.ends_with('&') {
                url.push('&');
            }
        } else {
            url.push('?');
        }
        return Ok(url);
    }

    match (&ctx.server_name, &ctx.server_port, &ctx.script_name) {
        (Some(host), Some(port), Some(script)) => {
            let scheme = if ctx.is_secure() { "https" } else { "http" };
            let mut url = String::new();
            url.try_reserve_exact(scheme.len() + host.len() + port.len() + script.len() + 5)?;
            url.push_str(scheme);
            url.push_str("://");
            url.push_str(host);
            url.push(':');
            url.push_str(port);
            url.push_str(script);
            url.push('?');
            debug!(url = %url, "Online resource built from request context");
            Ok(url)
        }
        _ => Err(OwsError::Config(format!(
            "Impossible to establish server URL. Please set \"{}\" metadata.",
            metadata_name
        ))),
    }
}
