//! Line format for every event written by the service.
//!
//! `<timestamp> level=<LEVEL> msg=<message> path=<path> status=<status> latency_ms=<latency_ms>`
//! followed by any other event fields as `key=value`. The three request
//! fields are always present; a missing one renders as `-`.

use std::fmt::{self, Write as _};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Placeholder for a field the event did not carry.
pub const MISSING: &str = "-";

/// The recognized request fields. Any of them may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFields {
    pub path: Option<String>,
    pub status: Option<String>,
    pub latency_ms: Option<String>,
}

impl LogFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// All three fields of a completed request.
    pub fn request(path: &str, status: &str, latency_ms: u64) -> Self {
        Self::new().path(path).status(status).latency_ms(latency_ms)
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn status(mut self, status: impl fmt::Display) -> Self {
        self.status = Some(status.to_string());
        self
    }

    pub fn latency_ms(mut self, ms: u64) -> Self {
        self.latency_ms = Some(ms.to_string());
        self
    }
}

/// One formatted log entry.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: String,
    pub level: Level,
    pub message: String,
    pub fields: LogFields,
    pub extra: Vec<(String, String)>,
}

impl LogRecord {
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(128);
        let _ = write!(
            out,
            "{} level={} msg={} path={} status={} latency_ms={}",
            self.timestamp,
            self.level,
            value(&self.message),
            or_missing(&self.fields.path),
            or_missing(&self.fields.status),
            or_missing(&self.fields.latency_ms),
        );
        for (k, v) in &self.extra {
            let _ = write!(out, " {}={}", k, value(v));
        }
        out
    }
}

fn or_missing(v: &Option<String>) -> String {
    match v {
        Some(v) => value(v),
        None => MISSING.to_string(),
    }
}

/// Bare when unambiguous, quoted otherwise (logfmt).
fn value(v: &str) -> String {
    if v.is_empty() || v.chars().any(|c| c.is_whitespace() || c == '"' || c == '=') {
        format!("{v:?}")
    } else {
        v.to_string()
    }
}

/// Collects event fields into the fixed field set plus extras.
#[derive(Default)]
struct FieldCollector {
    message: Option<String>,
    fields: LogFields,
    extra: Vec<(String, String)>,
}

impl FieldCollector {
    fn put(&mut self, field: &Field, v: String) {
        match field.name() {
            "message" => self.message = Some(v),
            "path" => self.fields.path = Some(v),
            "status" => self.fields.status = Some(v),
            "latency_ms" => self.fields.latency_ms = Some(v),
            other => self.extra.push((other.to_string(), v)),
        }
    }
}

impl Visit for FieldCollector {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, format!("{value:?}"));
    }
}

/// `tracing-subscriber` event formatter producing the line format above.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogLineFormat {
    timer: SystemTime,
}

impl<S, N> FormatEvent<S, N> for LogLineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut timestamp = String::new();
        if self.timer.format_time(&mut Writer::new(&mut timestamp)).is_err() {
            timestamp = MISSING.to_string();
        }

        let mut collector = FieldCollector::default();
        event.record(&mut collector);

        let record = LogRecord {
            timestamp,
            level: *event.metadata().level(),
            message: collector.message.unwrap_or_else(|| MISSING.to_string()),
            fields: collector.fields,
            extra: collector.extra,
        };
        writeln!(writer, "{}", record.render())
    }
}
