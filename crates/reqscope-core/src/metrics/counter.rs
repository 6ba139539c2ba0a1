use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::error::{ReqScopeError, Result};

use super::exposition::{label_block, write_preamble};

struct CounterSeries {
    created_seq: u64,
    value: AtomicU64,
}

/// Monotonic counter family with a fixed label schema.
pub struct CounterVec {
    name: String,
    help: String,
    label_keys: Vec<String>,
    map: DashMap<Vec<String>, CounterSeries>,
    seq: AtomicU64,
}

impl CounterVec {
    pub(crate) fn new(name: &str, help: &str, label_keys: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            help: help.to_string(),
            label_keys: label_keys.iter().map(|k| k.to_string()).collect(),
            map: DashMap::new(),
            seq: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label_keys(&self) -> &[String] {
        &self.label_keys
    }

    /// Increment by 1.
    pub fn inc(&self, labels: &[&str]) -> Result<()> {
        self.add(labels, 1)
    }

    /// Increment by an arbitrary value. The series is created at 0 on first use.
    pub fn add(&self, labels: &[&str], v: u64) -> Result<()> {
        self.check_arity(labels)?;
        let key: Vec<String> = labels.iter().map(|v| v.to_string()).collect();

        let counter = self.map.entry(key).or_insert_with(|| CounterSeries {
            created_seq: self.seq.fetch_add(1, Ordering::Relaxed),
            value: AtomicU64::new(0),
        });
        counter.value.fetch_add(v, Ordering::Relaxed);
        Ok(())
    }

    /// Current value of one series, `None` if it was never incremented.
    pub fn get(&self, labels: &[&str]) -> Option<u64> {
        let key: Vec<String> = labels.iter().map(|v| v.to_string()).collect();
        self.map.get(&key).map(|s| s.value.load(Ordering::Relaxed))
    }

    /// Number of live series.
    pub fn series_count(&self) -> usize {
        self.map.len()
    }

    fn check_arity(&self, labels: &[&str]) -> Result<()> {
        if labels.len() != self.label_keys.len() {
            return Err(ReqScopeError::LabelMismatch {
                metric: self.name.clone(),
                expected: self.label_keys.len(),
                got: labels.len(),
            });
        }
        Ok(())
    }

    /// Render in Prometheus text exposition format.
    pub(crate) fn render(&self, out: &mut String) {
        write_preamble(out, &self.name, &self.help, "counter");

        let mut rows: Vec<(u64, Vec<String>, u64)> = self
            .map
            .iter()
            .map(|r| (r.value().created_seq, r.key().clone(), r.value().value.load(Ordering::Relaxed)))
            .collect();
        rows.sort_by_key(|(seq, _, _)| *seq);

        for (_, values, val) in rows {
            let labels = label_block(&self.label_keys, &values, None);
            let _ = writeln!(out, "{}{} {}", self.name, labels, val);
        }
    }
}
