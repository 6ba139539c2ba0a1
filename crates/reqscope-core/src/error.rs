//! Shared error type across reqscope crates.

use thiserror::Error;

/// Stable machine-readable error codes (used in log fields and tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Metric name was never declared.
    UnknownMetric,
    /// Label tuple does not match the declared label keys.
    LabelMismatch,
    /// Metric name declared twice.
    DuplicateMetric,
    /// Histogram bucket bounds are unusable.
    InvalidBuckets,
    /// Observed value is NaN or negative.
    InvalidObservation,
    /// A series lock was poisoned by a panicking writer.
    Poisoned,
    /// Unrecognized log level name.
    InvalidLogLevel,
    /// Configuration failed to parse or validate.
    InvalidConfig,
    /// Request input rejected by a handler body.
    BadRequest,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::UnknownMetric => "UNKNOWN_METRIC",
            ErrorCode::LabelMismatch => "LABEL_MISMATCH",
            ErrorCode::DuplicateMetric => "DUPLICATE_METRIC",
            ErrorCode::InvalidBuckets => "INVALID_BUCKETS",
            ErrorCode::InvalidObservation => "INVALID_OBSERVATION",
            ErrorCode::Poisoned => "POISONED",
            ErrorCode::InvalidLogLevel => "INVALID_LOG_LEVEL",
            ErrorCode::InvalidConfig => "INVALID_CONFIG",
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ReqScopeError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum ReqScopeError {
    #[error("unknown metric: {0}")]
    UnknownMetric(String),
    #[error("metric {metric} expects {expected} label values, got {got}")]
    LabelMismatch {
        metric: String,
        expected: usize,
        got: usize,
    },
    #[error("metric already declared: {0}")]
    DuplicateMetric(String),
    #[error("invalid buckets: {0}")]
    InvalidBuckets(String),
    #[error("invalid observation for {metric}: {value}")]
    InvalidObservation { metric: String, value: f64 },
    #[error("series lock poisoned: {0}")]
    Poisoned(String),
    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl ReqScopeError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            ReqScopeError::UnknownMetric(_) => ErrorCode::UnknownMetric,
            ReqScopeError::LabelMismatch { .. } => ErrorCode::LabelMismatch,
            ReqScopeError::DuplicateMetric(_) => ErrorCode::DuplicateMetric,
            ReqScopeError::InvalidBuckets(_) => ErrorCode::InvalidBuckets,
            ReqScopeError::InvalidObservation { .. } => ErrorCode::InvalidObservation,
            ReqScopeError::Poisoned(_) => ErrorCode::Poisoned,
            ReqScopeError::InvalidLogLevel(_) => ErrorCode::InvalidLogLevel,
            ReqScopeError::InvalidConfig(_) => ErrorCode::InvalidConfig,
            ReqScopeError::BadRequest(_) => ErrorCode::BadRequest,
            ReqScopeError::Internal(_) => ErrorCode::Internal,
        }
    }
}
