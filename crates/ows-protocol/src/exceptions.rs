//! OGC service exception reports.

use ows_common::OwsError;

use crate::html::encode_html_entities;
use crate::request::OwsResponse;

/// Content type of WMS 1.1.1 exception reports.
pub const WMS_EXCEPTION_FORMAT: &str = "application/vnd.ogc.se_xml";

/// WMS 1.1.1 `ServiceExceptionReport` document.
pub fn wms_exception(code: &str, message: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="no" ?>
<!DOCTYPE ServiceExceptionReport SYSTEM "http://schemas.opengis.net/wms/1.1.1/exception_1_1_1.dtd">
<ServiceExceptionReport version="1.1.1">
<ServiceException code="{}">
{}
</ServiceException>
</ServiceExceptionReport>
"#,
        code,
        escape(message)
    )
}

/// WFS 1.0.0 `ServiceExceptionReport` document.
pub fn wfs_exception(code: &str, locator: &str, message: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" ?>
<ServiceExceptionReport version="1.2.0" xmlns="http://www.opengis.net/ogc" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://www.opengis.net/ogc http://schemas.opengis.net/wfs/1.0.0/OGC-exception.xsd">
  <ServiceException code="{}" locator="{}">
    {}
  </ServiceException>
</ServiceExceptionReport>
"#,
        code,
        escape(locator),
        escape(message)
    )
}

/// Exception response for an error raised while serving a request.
pub fn error_response(service: &str, err: &OwsError) -> OwsResponse {
    let message = err.to_string();
    let body = if service.eq_ignore_ascii_case("WFS") {
        wfs_exception(err.exception_code(), "mapserv", &message)
    } else {
        wms_exception(err.exception_code(), &message)
    };
    OwsResponse {
        content_type: WMS_EXCEPTION_FORMAT.to_string(),
        body,
        status: err.http_status_code(),
        service: None,
    }
}

// Exception reports are the last resort; an encoding failure there falls
// back to the raw text.
fn escape(text: &str) -> String {
    encode_html_entities(text).unwrap_or_else(|_| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wms_exception_escapes_message() {
        let xml = wms_exception("InvalidParameterValue", "bad <value>");
        assert!(xml.contains(r#"<ServiceException code="InvalidParameterValue">"#));
        assert!(xml.contains("bad &lt;value&gt;"));
    }

    #[test]
    fn test_error_response_picks_format() {
        let err = OwsError::Protocol("Wrong number of arguments for EXTENT metadata.".into());
        let wfs = error_response("wfs", &err);
        assert!(wfs.body.contains("xmlns=\"http://www.opengis.net/ogc\""));
        assert!(wfs.body.contains("InvalidParameterValue"));
        assert_eq!(wfs.status, 400);

        let wms = error_response("WMS", &err);
        assert!(wms.body.contains("<ServiceExceptionReport version=\"1.1.1\">"));
    }
}
