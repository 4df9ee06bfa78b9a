//! Request routing across protocol handlers.

use ows_common::MapConfig;
use tracing::{debug, error};

use crate::extent::DataSource;
use crate::online_resource::RequestContext;
use crate::request::{OwsRequest, OwsResponse};

/// Outcome of offering a request to a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStatus {
    /// The handler recognized the request and served it
    Success,
    /// The handler recognized the request but serving it failed
    Failure,
    /// The handler does not deal with this kind of request
    NotRecognized,
}

impl DispatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchStatus::Success => "success",
            DispatchStatus::Failure => "failure",
            DispatchStatus::NotRecognized => "not_recognized",
        }
    }
}

/// Everything a handler needs besides the request itself.
pub struct DispatchContext<'a> {
    pub map: &'a MapConfig,
    pub request_context: &'a RequestContext,
    pub data_source: &'a mut dyn DataSource,
}

/// A protocol implementation the dispatcher can offer requests to.
pub trait ServiceHandler: Send + Sync {
    /// Short service name, e.g. "WMS".
    fn name(&self) -> &'static str;

    /// Serve the request if it belongs to this protocol.
    ///
    /// On `Success` and `Failure` the handler has written a response body.
    fn try_handle(
        &self,
        ctx: &mut DispatchContext<'_>,
        request: &OwsRequest,
        response: &mut OwsResponse,
    ) -> DispatchStatus;
}

/// Offers each request to its handlers in registration order.
pub struct OwsDispatcher {
    handlers: Vec<Box<dyn ServiceHandler>>,
}

impl Default for OwsDispatcher {
    /// Dispatcher with the compiled-in handlers: WMS, then WFS.
    fn default() -> Self {
        #[allow(unused_mut)]
        let mut dispatcher = Self::empty();
        #[cfg(feature = "wms")]
        {
            dispatcher = dispatcher.with_handler(crate::wms::WmsHandler);
        }
        #[cfg(feature = "wfs")]
        {
            dispatcher = dispatcher.with_handler(crate::wfs::WfsHandler);
        }
        dispatcher
    }
}

impl OwsDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatcher with no handlers at all.
    pub fn empty() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn with_handler(mut self, handler: impl ServiceHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// Route a request.
    ///
    /// The first handler that recognizes the request decides the outcome and
    /// is recorded in `response.service`. `NotRecognized` leaves the response
    /// untouched so the caller can fall back to its own handling.
    pub fn dispatch(
        &self,
        ctx: &mut DispatchContext<'_>,
        request: &OwsRequest,
        response: &mut OwsResponse,
    ) -> DispatchStatus {
        for handler in &self.handlers {
            match handler.try_handle(ctx, request, response) {
                DispatchStatus::NotRecognized => {
                    debug!(handler = handler.name(), "Request not recognized");
                }
                status => {
                    if status == DispatchStatus::Failure {
                        error!(handler = handler.name(), "Request handling failed");
                    }
                    response.service = Some(handler.name());
                    return status;
                }
            }
        }
        DispatchStatus::NotRecognized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extent::NoDataSource;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Fixed {
        name: &'static str,
        status: DispatchStatus,
        calls: Arc<AtomicUsize>,
    }

    impl ServiceHandler for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }

        fn try_handle(
            &self,
            _ctx: &mut DispatchContext<'_>,
            _request: &OwsRequest,
            response: &mut OwsResponse,
        ) -> DispatchStatus {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.status != DispatchStatus::NotRecognized {
                response.body = self.name.to_string();
            }
            self.status
        }
    }

    fn fixed(name: &'static str, status: DispatchStatus) -> (Fixed, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Fixed {
                name,
                status,
                calls: calls.clone(),
            },
            calls,
        )
    }

    fn run(dispatcher: &OwsDispatcher) -> (DispatchStatus, OwsResponse) {
        let map = MapConfig::new("test");
        let request_context = RequestContext::default();
        let mut source = NoDataSource;
        let mut ctx = DispatchContext {
            map: &map,
            request_context: &request_context,
            data_source: &mut source,
        };
        let mut response = OwsResponse::new();
        let status = dispatcher.dispatch(&mut ctx, &OwsRequest::new(), &mut response);
        (status, response)
    }

    #[test]
    fn test_nothing_recognized() {
        let (a, _) = fixed("A", DispatchStatus::NotRecognized);
        let (b, _) = fixed("B", DispatchStatus::NotRecognized);
        let dispatcher = OwsDispatcher::empty().with_handler(a).with_handler(b);
        let (status, response) = run(&dispatcher);
        assert_eq!(status, DispatchStatus::NotRecognized);
        assert!(response.service.is_none());
        assert!(response.body.is_empty());
    }

    #[test]
    fn test_second_handler_failure_wins() {
        let (a, a_calls) = fixed("WMS", DispatchStatus::NotRecognized);
        let (b, b_calls) = fixed("WFS", DispatchStatus::Failure);
        let dispatcher = OwsDispatcher::empty().with_handler(a).with_handler(b);
        let (status, response) = run(&dispatcher);
        assert_eq!(status, DispatchStatus::Failure);
        assert_eq!(response.service, Some("WFS"));
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_first_recognizing_handler_stops_search() {
        let (a, _) = fixed("WMS", DispatchStatus::Success);
        let (b, b_calls) = fixed("WFS", DispatchStatus::Success);
        let dispatcher = OwsDispatcher::empty().with_handler(a).with_handler(b);
        let (status, response) = run(&dispatcher);
        assert_eq!(status, DispatchStatus::Success);
        assert_eq!(response.body, "WMS");
        assert_eq!(b_calls.load(Ordering::SeqCst), 0);
    }

    #[cfg(all(feature = "wms", feature = "wfs"))]
    #[test]
    fn test_default_order() {
        assert_eq!(OwsDispatcher::default().handler_names(), vec!["WMS", "WFS"]);
    }
}
