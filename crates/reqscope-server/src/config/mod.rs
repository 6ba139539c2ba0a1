//! Service config loader (strict parsing).
//!
//! The YAML file is optional: `REQSCOPE_CONFIG` names it, otherwise built-in
//! defaults apply. `LOG_LEVEL` overrides `logging.level`.

pub mod schema;

use std::env::{self, VarError};
use std::fs;

use reqscope_core::error::{ReqScopeError, Result};
use reqscope_core::log::LogLevel;

pub use schema::{DemoSection, LoggingSection, MetricsSection, ServerSection, ServiceConfig};

pub const CONFIG_PATH_ENV: &str = "REQSCOPE_CONFIG";
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

pub fn load_from_file(path: &str) -> Result<ServiceConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| ReqScopeError::InvalidConfig(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ServiceConfig> {
    let cfg: ServiceConfig = serde_yaml::from_str(s)
        .map_err(|e| ReqScopeError::InvalidConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load from `REQSCOPE_CONFIG` if set, defaults otherwise.
pub fn load_from_env() -> Result<ServiceConfig> {
    match env::var(CONFIG_PATH_ENV) {
        Ok(path) => load_from_file(&path),
        Err(VarError::NotPresent) => {
            let cfg = ServiceConfig::default();
            cfg.validate()?;
            Ok(cfg)
        }
        Err(VarError::NotUnicode(_)) => Err(ReqScopeError::InvalidConfig(format!(
            "{CONFIG_PATH_ENV} is not valid unicode"
        ))),
    }
}

/// Effective log level from `LOG_LEVEL` (if set) or the config file.
pub fn resolve_log_level(cfg: &ServiceConfig, env_value: Option<&str>) -> Result<LogLevel> {
    LogLevel::resolve(env_value, cfg.logging.level()?)
}

/// Read `LOG_LEVEL` from the process environment.
pub fn log_level_from_env(cfg: &ServiceConfig) -> Result<LogLevel> {
    match env::var(LOG_LEVEL_ENV) {
        Ok(v) => resolve_log_level(cfg, Some(&v)),
        Err(VarError::NotPresent) => resolve_log_level(cfg, None),
        Err(VarError::NotUnicode(raw)) => Err(ReqScopeError::InvalidLogLevel(
            raw.to_string_lossy().into_owned(),
        )),
    }
}
