//! In-process metrics registry with Prometheus text exposition.
//!
//! Counters and histograms are keyed by ordered label-value tuples. Series are
//! created lazily on first use and rendered in declaration order, then in the
//! order their label combination was first seen.

pub mod counter;
pub mod exposition;
pub mod histogram;
pub mod registry;

pub use counter::CounterVec;
pub use histogram::{validate_bounds, HistogramSnapshot, HistogramVec, DEFAULT_LATENCY_BUCKETS};
pub use registry::{MetricFamily, MetricRegistry, MetricRegistryBuilder};
