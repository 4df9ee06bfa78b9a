//! Request metrics.

use metrics::counter;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use ows_protocol::DispatchStatus;

/// Counts dispatch outcomes, both in-process and through the `metrics`
/// recorder (exported as `ows_requests_total{service,status}`).
#[derive(Debug)]
pub struct MetricsCollector {
    pub requests: AtomicU64,
    pub failures: AtomicU64,
    pub unrecognized: AtomicU64,
    start_time: Instant,
}

/// Point-in-time view for the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub failures: u64,
    pub unrecognized: u64,
    pub uptime_secs: u64,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            requests: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            unrecognized: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record the outcome of one dispatched request.
    pub fn record_dispatch(&self, service: Option<&'static str>, status: DispatchStatus) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        match status {
            DispatchStatus::Failure => {
                self.failures.fetch_add(1, Ordering::Relaxed);
            }
            DispatchStatus::NotRecognized => {
                self.unrecognized.fetch_add(1, Ordering::Relaxed);
            }
            DispatchStatus::Success => {}
        }

        counter!(
            "ows_requests_total",
            "service" => service.unwrap_or("none"),
            "status" => status.as_str()
        )
        .increment(1);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            unrecognized: self.unrecognized.load(Ordering::Relaxed),
            uptime_secs: self.start_time.elapsed().as_secs(),
        }
    }
}
