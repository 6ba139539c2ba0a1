//! Request instrumentation: wraps a [`Handler`] and records one counter
//! increment, one latency observation and one log line per request.
//!
//! Instrumentation is off the critical path. Metric and log failures are
//! reported as `warn` events and dropped; the wrapped response is returned
//! as-is.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures_util::FutureExt;

use crate::error::Result;
use crate::handler::{Handler, Request, Response};
use crate::log::{LogFields, StructuredLogger};
use crate::metrics::MetricRegistry;

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

/// Log message for a completed request.
pub const REQUEST_HANDLED: &str = "request_handled";

/// Status label for a body that faulted or panicked instead of responding.
pub const UNHANDLED_STATUS: &str = "unhandled";

/// Registry with the two request metrics declared.
pub fn http_registry(latency_buckets: &[f64]) -> Result<MetricRegistry> {
    Ok(MetricRegistry::builder()
        .counter(HTTP_REQUESTS_TOTAL, "Total HTTP requests", &["method", "path", "status"])?
        .histogram(
            HTTP_REQUEST_DURATION_SECONDS,
            "Request latency in seconds",
            &["path"],
            latency_buckets,
        )?
        .build())
}

/// Handler decorator that measures and records every call.
///
/// `route` is the declared route path used as the `path` label, so label
/// cardinality follows the route table rather than raw request URIs.
pub struct InstrumentedHandler<H> {
    inner: H,
    route: String,
    registry: Arc<MetricRegistry>,
    logger: StructuredLogger,
}

impl<H: Handler> InstrumentedHandler<H> {
    pub fn new(route: impl Into<String>, inner: H, registry: Arc<MetricRegistry>) -> Self {
        Self {
            inner,
            route: route.into(),
            registry,
            logger: StructuredLogger::new(),
        }
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    fn record(&self, method: &str, status: &str, elapsed: Duration) {
        if let Err(e) = self
            .registry
            .increment_counter(HTTP_REQUESTS_TOTAL, &[method, &self.route, status])
        {
            tracing::warn!(code = e.code().as_str(), error = %e, "request counter update failed");
        }

        if let Err(e) = self.registry.observe_histogram(
            HTTP_REQUEST_DURATION_SECONDS,
            &[&self.route],
            elapsed.as_secs_f64(),
        ) {
            tracing::warn!(code = e.code().as_str(), error = %e, "request latency update failed");
        }

        let latency_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.logger
            .emit(REQUEST_HANDLED, &LogFields::request(&self.route, status, latency_ms));
    }
}

/// Wrap `handler` so every call through it is measured under `route`.
pub fn instrument<H: Handler>(
    route: impl Into<String>,
    handler: H,
    registry: Arc<MetricRegistry>,
) -> InstrumentedHandler<H> {
    InstrumentedHandler::new(route, handler, registry)
}

#[async_trait]
impl<H: Handler> Handler for InstrumentedHandler<H> {
    async fn call(&self, req: Request) -> Result<Response> {
        let method = req.method.clone();
        let start = Instant::now();

        let outcome = AssertUnwindSafe(self.inner.call(req)).catch_unwind().await;
        let elapsed = start.elapsed();

        let (response, status) = match outcome {
            Ok(Ok(resp)) => {
                let status = resp.status.to_string();
                (resp, status)
            }
            Ok(Err(e)) => {
                tracing::warn!(path = %self.route, code = e.code().as_str(), error = %e, "handler fault");
                (internal_error(), UNHANDLED_STATUS.to_string())
            }
            Err(_) => {
                tracing::error!(path = %self.route, "handler panicked");
                (internal_error(), UNHANDLED_STATUS.to_string())
            }
        };

        // A panic raised while recording must not replace the response.
        let _ = std::panic::catch_unwind(AssertUnwindSafe(|| self.record(&method, &status, elapsed)));

        Ok(response)
    }
}

fn internal_error() -> Response {
    Response::new(500, "internal server error\n")
}
