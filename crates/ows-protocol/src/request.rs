//! Key-value-pair requests and the responses built for them.

/// A decoded KVP request.
///
/// Parameter names compare case-insensitively; values are kept verbatim.
/// When a name repeats, the first occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwsRequest {
    params: Vec<(String, String)>,
}

impl OwsRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Value of the SERVICE parameter.
    pub fn service(&self) -> Option<&str> {
        self.get("SERVICE")
    }

    /// Value of the REQUEST parameter.
    pub fn request(&self) -> Option<&str> {
        self.get("REQUEST")
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl From<Vec<(String, String)>> for OwsRequest {
    fn from(params: Vec<(String, String)>) -> Self {
        Self { params }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for OwsRequest {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Response document produced by a protocol handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwsResponse {
    pub content_type: String,
    pub body: String,
    /// HTTP status to answer with
    pub status: u16,
    /// Name of the handler that recognized the request, if any
    pub service: Option<&'static str>,
}

impl Default for OwsResponse {
    fn default() -> Self {
        Self {
            content_type: "text/xml".to_string(),
            body: String::new(),
            status: 200,
            service: None,
        }
    }
}

impl OwsResponse {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_names_ignore_case() {
        let req: OwsRequest = [("service", "WMS"), ("Request", "GetCapabilities")]
            .into_iter()
            .collect();
        assert_eq!(req.service(), Some("WMS"));
        assert_eq!(req.request(), Some("GetCapabilities"));
        assert!(req.contains("SERVICE"));
        assert!(!req.contains("WMTVER"));
    }

    #[test]
    fn test_first_occurrence_wins() {
        let req = OwsRequest::new()
            .with_param("LAYERS", "a")
            .with_param("layers", "b");
        assert_eq!(req.get("Layers"), Some("a"));
    }
}
