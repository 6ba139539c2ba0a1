//! Structured request logging on top of `tracing`.
//!
//! Events are rendered by [`LogLineFormat`]; [`StructuredLogger`] is the
//! request-path entry point that emits one `info` event per completed request.

pub mod format;
pub mod level;

pub use format::{LogFields, LogLineFormat, LogRecord, MISSING};
pub use level::LogLevel;

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Target used for per-request events.
pub const REQUEST_TARGET: &str = "reqscope::request";

/// Emits request log lines. Never fails: a missing field is rendered as `-`,
/// and writer errors stay inside the subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredLogger;

impl StructuredLogger {
    pub fn new() -> Self {
        Self
    }

    pub fn emit(&self, message: &str, fields: &LogFields) {
        tracing::info!(
            target: REQUEST_TARGET,
            path = fields.path.as_deref(),
            status = fields.status.as_deref(),
            latency_ms = fields.latency_ms.as_deref(),
            "{}",
            message
        );
    }
}

/// Build the process subscriber: level filter, line format, and the given writer.
pub fn subscriber<W>(level: LogLevel, make_writer: W) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::default().add_directive(level.level_filter().into()))
        .event_format(LogLineFormat::default())
        .with_writer(make_writer)
        .finish()
}
