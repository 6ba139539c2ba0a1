use std::collections::HashMap;

use crate::error::{ReqScopeError, Result};

use super::counter::CounterVec;
use super::exposition::is_valid_name;
use super::histogram::{HistogramSnapshot, HistogramVec};

/// One declared metric.
pub enum MetricFamily {
    Counter(CounterVec),
    Histogram(HistogramVec),
}

impl MetricFamily {
    fn name(&self) -> &str {
        match self {
            MetricFamily::Counter(c) => c.name(),
            MetricFamily::Histogram(h) => h.name(),
        }
    }
}

/// Declares metric families before the registry is shared.
#[derive(Default)]
pub struct MetricRegistryBuilder {
    families: Vec<MetricFamily>,
}

impl MetricRegistryBuilder {
    pub fn counter(mut self, name: &str, help: &str, label_keys: &[&str]) -> Result<Self> {
        self.check_names(name, label_keys)?;
        self.families.push(MetricFamily::Counter(CounterVec::new(name, help, label_keys)));
        Ok(self)
    }

    pub fn histogram(
        mut self,
        name: &str,
        help: &str,
        label_keys: &[&str],
        bounds: &[f64],
    ) -> Result<Self> {
        self.check_names(name, label_keys)?;
        if label_keys.contains(&"le") {
            return Err(ReqScopeError::InvalidConfig(format!(
                "histogram {name} cannot use reserved label \"le\""
            )));
        }
        let h = HistogramVec::new(name, help, label_keys, bounds)?;
        self.families.push(MetricFamily::Histogram(h));
        Ok(self)
    }

    pub fn build(self) -> MetricRegistry {
        let index = self
            .families
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name().to_string(), i))
            .collect();
        MetricRegistry { families: self.families, index }
    }

    fn check_names(&self, name: &str, label_keys: &[&str]) -> Result<()> {
        if !is_valid_name(name, true) {
            return Err(ReqScopeError::InvalidConfig(format!("invalid metric name: {name}")));
        }
        if let Some(bad) = label_keys.iter().find(|k| !is_valid_name(k, false) || k.starts_with("__")) {
            return Err(ReqScopeError::InvalidConfig(format!(
                "invalid label name {bad} on metric {name}"
            )));
        }
        if self.families.iter().any(|f| f.name() == name) {
            return Err(ReqScopeError::DuplicateMetric(name.to_string()));
        }
        Ok(())
    }
}

/// Process-wide metric state, shared by handle (`Arc<MetricRegistry>`).
///
/// The family set is fixed at `build()`; series inside each family are
/// created lazily and live for the registry's lifetime.
pub struct MetricRegistry {
    families: Vec<MetricFamily>,
    index: HashMap<String, usize>,
}

impl MetricRegistry {
    pub fn builder() -> MetricRegistryBuilder {
        MetricRegistryBuilder::default()
    }

    pub fn family(&self, name: &str) -> Option<&MetricFamily> {
        self.index.get(name).and_then(|&i| self.families.get(i))
    }

    pub fn counter(&self, name: &str) -> Result<&CounterVec> {
        match self.family(name) {
            Some(MetricFamily::Counter(c)) => Ok(c),
            _ => Err(ReqScopeError::UnknownMetric(name.to_string())),
        }
    }

    pub fn histogram(&self, name: &str) -> Result<&HistogramVec> {
        match self.family(name) {
            Some(MetricFamily::Histogram(h)) => Ok(h),
            _ => Err(ReqScopeError::UnknownMetric(name.to_string())),
        }
    }

    /// Add 1 to the series for `labels`, creating it at 0 first if needed.
    pub fn increment_counter(&self, name: &str, labels: &[&str]) -> Result<()> {
        self.counter(name)?.inc(labels)
    }

    /// Record one observation (seconds) on the series for `labels`.
    pub fn observe_histogram(&self, name: &str, labels: &[&str], value: f64) -> Result<()> {
        self.histogram(name)?.observe(labels, value)
    }

    pub fn counter_value(&self, name: &str, labels: &[&str]) -> Option<u64> {
        self.counter(name).ok()?.get(labels)
    }

    pub fn histogram_snapshot(&self, name: &str, labels: &[&str]) -> Option<HistogramSnapshot> {
        self.histogram(name).ok()?.get(labels)
    }

    /// Render every family in declaration order.
    ///
    /// Each series is read under its own lock, so its sample lines are
    /// self-consistent; series are not snapshotted atomically with each other.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for f in &self.families {
            match f {
                MetricFamily::Counter(c) => c.render(&mut out),
                MetricFamily::Histogram(h) => h.render(&mut out),
            }
        }
        out
    }
}
