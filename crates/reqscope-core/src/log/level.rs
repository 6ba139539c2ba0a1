use std::fmt;
use std::str::FromStr;

use tracing_subscriber::filter::LevelFilter;

use crate::error::{ReqScopeError, Result};

/// Minimum severity written to the log stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Lower-case canonical name.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    pub fn level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }

    /// Pick the effective level: an environment value wins over the configured one.
    /// An unrecognized environment value is an error, never a silent fallback.
    pub fn resolve(env_value: Option<&str>, configured: LogLevel) -> Result<LogLevel> {
        match env_value {
            Some(v) => v.parse(),
            None => Ok(configured),
        }
    }
}

impl FromStr for LogLevel {
    type Err = ReqScopeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            // `critical` has no separate tracing level.
            "error" | "critical" => Ok(LogLevel::Error),
            _ => Err(ReqScopeError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
