use std::net::SocketAddr;

use reqscope_core::error::{ReqScopeError, Result};
use reqscope_core::log::LogLevel;
use reqscope_core::metrics::{validate_bounds, DEFAULT_LATENCY_BUCKETS};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub logging: LoggingSection,

    #[serde(default)]
    pub metrics: MetricsSection,

    #[serde(default)]
    pub demo: DemoSection,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            logging: LoggingSection::default(),
            metrics: MetricsSection::default(),
            demo: DemoSection::default(),
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ReqScopeError::InvalidConfig(format!(
                "unsupported config version {}",
                self.version
            )));
        }
        self.server.listen_addr()?;
        self.logging
            .level()
            .map_err(|e| ReqScopeError::InvalidConfig(format!("logging.level: {e}")))?;
        self.metrics.validate()?;
        self.demo.validate()?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self { listen: default_listen() }
    }
}

impl ServerSection {
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            ReqScopeError::InvalidConfig(format!("server.listen {:?} is not a socket address: {e}", self.listen))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self { level: default_level() }
    }
}

impl LoggingSection {
    pub fn level(&self) -> Result<LogLevel> {
        self.level.parse()
    }
}

fn default_level() -> String {
    "info".into()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Histogram upper bounds in seconds; fixed for the process lifetime.
    #[serde(default = "default_latency_buckets")]
    pub latency_buckets: Vec<f64>,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self { latency_buckets: default_latency_buckets() }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        validate_bounds(&self.latency_buckets)
            .map_err(|e| ReqScopeError::InvalidConfig(format!("metrics.latency_buckets: {e}")))
    }
}

fn default_latency_buckets() -> Vec<f64> {
    DEFAULT_LATENCY_BUCKETS.to_vec()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DemoSection {
    /// `/work` duration when `ms` is not given.
    #[serde(default = "default_work_ms")]
    pub default_work_ms: u64,

    /// Largest `ms` accepted by `/work`.
    #[serde(default = "default_max_work_ms")]
    pub max_work_ms: u64,
}

impl Default for DemoSection {
    fn default() -> Self {
        Self {
            default_work_ms: default_work_ms(),
            max_work_ms: default_max_work_ms(),
        }
    }
}

impl DemoSection {
    pub fn validate(&self) -> Result<()> {
        if self.default_work_ms > self.max_work_ms {
            return Err(ReqScopeError::InvalidConfig(
                "demo.default_work_ms must not exceed demo.max_work_ms".into(),
            ));
        }
        Ok(())
    }
}

fn default_work_ms() -> u64 {
    100
}
fn default_max_work_ms() -> u64 {
    10_000
}
