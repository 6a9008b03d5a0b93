//! Tracing spans and timing for outgoing requests.

use std::time::{Duration, Instant};
use tracing::field::Empty;
use tracing::{debug_span, Span};

/// Create a span for one outgoing HTTP request.
///
/// Only the method and URL are recorded; headers are never attached since
/// they may carry an authorization value.
pub fn request_span(method: &str, url: &str) -> Span {
    debug_span!(
        "http_request",
        method = %method,
        url = %url,
        status = Empty,
        elapsed_ms = Empty
    )
}

/// Record the response status on the current span.
pub fn record_status(status: u16) {
    Span::current().record("status", status);
}

/// Measures one round trip and records it on the current span.
#[derive(Debug)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start timing now.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Time since `start`.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Record `elapsed_ms` on the current span and return the duration.
    pub fn finish(self) -> Duration {
        let elapsed = self.elapsed();
        let millis = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        Span::current().record("elapsed_ms", millis);
        tracing::trace!(elapsed_ms = millis, "round trip finished");
        elapsed
    }
}
