use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;

use crate::error::{ReqScopeError, Result};

use super::exposition::{format_float, label_block, write_preamble};

/// Default request latency bounds, in seconds.
pub const DEFAULT_LATENCY_BUCKETS: [f64; 8] = [0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0];

#[derive(Debug)]
struct HistogramState {
    /// Cumulative count per finite bound (same length as the family bounds).
    cumulative: Vec<u64>,
    sum: f64,
    count: u64,
}

struct HistogramSeries {
    created_seq: u64,
    state: Mutex<HistogramState>,
}

/// Point-in-time copy of one histogram series.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    /// `(upper bound, cumulative count)` per finite bound, ascending.
    pub buckets: Vec<(f64, u64)>,
    pub sum: f64,
    /// Total observations; equals the `+Inf` bucket.
    pub count: u64,
}

impl HistogramSnapshot {
    /// Cumulative count for the bucket with exactly this bound.
    pub fn bucket(&self, le: f64) -> Option<u64> {
        self.buckets.iter().find(|(b, _)| *b == le).map(|(_, c)| *c)
    }
}

/// Histogram family: fixed ascending bounds shared by every label combination.
pub struct HistogramVec {
    name: String,
    help: String,
    label_keys: Vec<String>,
    bounds: Vec<f64>,
    map: DashMap<Vec<String>, Arc<HistogramSeries>>,
    seq: AtomicU64,
}

/// Bounds must be non-empty, finite, positive and strictly ascending.
pub fn validate_bounds(bounds: &[f64]) -> Result<()> {
    if bounds.is_empty() {
        return Err(ReqScopeError::InvalidBuckets("at least one bound is required".into()));
    }
    for b in bounds {
        if !b.is_finite() || *b <= 0.0 {
            return Err(ReqScopeError::InvalidBuckets(format!(
                "bound {b} must be finite and positive"
            )));
        }
    }
    if bounds.windows(2).any(|w| w[0] >= w[1]) {
        return Err(ReqScopeError::InvalidBuckets("bounds must be strictly ascending".into()));
    }
    Ok(())
}

impl HistogramVec {
    pub(crate) fn new(name: &str, help: &str, label_keys: &[&str], bounds: &[f64]) -> Result<Self> {
        validate_bounds(bounds)?;
        Ok(Self {
            name: name.to_string(),
            help: help.to_string(),
            label_keys: label_keys.iter().map(|k| k.to_string()).collect(),
            bounds: bounds.to_vec(),
            map: DashMap::new(),
            seq: AtomicU64::new(0),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label_keys(&self) -> &[String] {
        &self.label_keys
    }

    pub fn bounds(&self) -> &[f64] {
        &self.bounds
    }

    /// Record one observation (seconds).
    ///
    /// Every bucket whose bound is `>= value` is incremented; values above the
    /// largest bound only reach the implicit `+Inf` bucket (the total count).
    pub fn observe(&self, labels: &[&str], value: f64) -> Result<()> {
        if labels.len() != self.label_keys.len() {
            return Err(ReqScopeError::LabelMismatch {
                metric: self.name.clone(),
                expected: self.label_keys.len(),
                got: labels.len(),
            });
        }
        if value.is_nan() || value < 0.0 {
            return Err(ReqScopeError::InvalidObservation { metric: self.name.clone(), value });
        }

        let key: Vec<String> = labels.iter().map(|v| v.to_string()).collect();
        let series = Arc::clone(self.map.entry(key).or_insert_with(|| {
            Arc::new(HistogramSeries {
                created_seq: self.seq.fetch_add(1, Ordering::Relaxed),
                state: Mutex::new(HistogramState {
                    cumulative: vec![0; self.bounds.len()],
                    sum: 0.0,
                    count: 0,
                }),
            })
        }).value());

        let first = self.bounds.partition_point(|b| *b < value);
        let mut state = series
            .state
            .lock()
            .map_err(|_| ReqScopeError::Poisoned(self.name.clone()))?;
        for c in &mut state.cumulative[first..] {
            *c += 1;
        }
        state.sum += value;
        state.count += 1;
        Ok(())
    }

    /// Consistent copy of one series, `None` if it was never observed.
    pub fn get(&self, labels: &[&str]) -> Option<HistogramSnapshot> {
        let key: Vec<String> = labels.iter().map(|v| v.to_string()).collect();
        let series = self.map.get(&key).map(|r| Arc::clone(r.value()))?;
        Some(self.snapshot(&series))
    }

    /// Number of live series.
    pub fn series_count(&self) -> usize {
        self.map.len()
    }

    fn snapshot(&self, series: &HistogramSeries) -> HistogramSnapshot {
        // The critical section cannot leave a half-written triple behind.
        let state = series.state.lock().unwrap_or_else(PoisonError::into_inner);
        HistogramSnapshot {
            buckets: self.bounds.iter().copied().zip(state.cumulative.iter().copied()).collect(),
            sum: state.sum,
            count: state.count,
        }
    }

    /// Render in Prometheus text exposition format (unit: seconds).
    pub(crate) fn render(&self, out: &mut String) {
        write_preamble(out, &self.name, &self.help, "histogram");

        // Copy handles out first so no shard lock is held while series locks are taken.
        let mut rows: Vec<(u64, Vec<String>, Arc<HistogramSeries>)> = self
            .map
            .iter()
            .map(|r| (r.value().created_seq, r.key().clone(), Arc::clone(r.value())))
            .collect();
        rows.sort_by_key(|(seq, _, _)| *seq);

        for (_, values, series) in rows {
            let snap = self.snapshot(&series);
            for (le, count) in &snap.buckets {
                let le = format_float(*le);
                let labels = label_block(&self.label_keys, &values, Some(("le", &le)));
                let _ = writeln!(out, "{}_bucket{} {}", self.name, labels, count);
            }
            let labels = label_block(&self.label_keys, &values, Some(("le", "+Inf")));
            let _ = writeln!(out, "{}_bucket{} {}", self.name, labels, snap.count);

            let labels = label_block(&self.label_keys, &values, None);
            let _ = writeln!(out, "{}_sum{} {}", self.name, labels, format_float(snap.sum));
            let _ = writeln!(out, "{}_count{} {}", self.name, labels, snap.count);
        }
    }
}
