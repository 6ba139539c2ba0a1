//! reqscope core: request instrumentation primitives.
//!
//! This crate holds the metric registry and its text exposition, the
//! structured log line format, and the handler decorator that binds both to
//! arbitrary route bodies. It carries no HTTP framework dependency so the
//! same pieces can sit behind any transport.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Instrumentation
//! must never take a request down with it, so every fallible path surfaces
//! as `ReqScopeError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod handler;
pub mod instrument;
pub mod log;
pub mod metrics;

/// Shared result type.
pub use error::{ErrorCode, ReqScopeError, Result};
pub use handler::{handler_fn, FnHandler, Handler, Request, Response};
pub use instrument::{http_registry, instrument, InstrumentedHandler};
pub use metrics::MetricRegistry;
