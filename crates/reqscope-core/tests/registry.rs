//! MetricRegistry behavior: lazy series, schema checks, concurrency, exposition.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicBool, Ordering};

use reqscope_core::error::ErrorCode;
use reqscope_core::instrument::{http_registry, HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS};
use reqscope_core::metrics::{MetricRegistry, DEFAULT_LATENCY_BUCKETS};

fn registry() -> MetricRegistry {
    http_registry(&DEFAULT_LATENCY_BUCKETS).unwrap()
}

#[test]
fn counter_series_created_on_first_increment() {
    let r = registry();
    assert_eq!(r.counter_value(HTTP_REQUESTS_TOTAL, &["GET", "/", "200"]), None);

    r.increment_counter(HTTP_REQUESTS_TOTAL, &["GET", "/", "200"]).unwrap();
    r.increment_counter(HTTP_REQUESTS_TOTAL, &["GET", "/", "200"]).unwrap();
    r.increment_counter(HTTP_REQUESTS_TOTAL, &["GET", "/fail", "500"]).unwrap();

    assert_eq!(r.counter_value(HTTP_REQUESTS_TOTAL, &["GET", "/", "200"]), Some(2));
    assert_eq!(r.counter_value(HTTP_REQUESTS_TOTAL, &["GET", "/fail", "500"]), Some(1));
    assert_eq!(r.counter_value(HTTP_REQUESTS_TOTAL, &["GET", "/fail", "200"]), None);
    assert_eq!(r.counter(HTTP_REQUESTS_TOTAL).unwrap().series_count(), 2);
}

#[test]
fn label_arity_is_enforced() {
    let r = registry();
    let err = r.increment_counter(HTTP_REQUESTS_TOTAL, &["GET", "/"]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::LabelMismatch);

    let err = r
        .observe_histogram(HTTP_REQUEST_DURATION_SECONDS, &["/", "extra"], 0.1)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::LabelMismatch);
    assert_eq!(r.histogram(HTTP_REQUEST_DURATION_SECONDS).unwrap().series_count(), 0);
}

#[test]
fn unknown_or_mistyped_metric_is_an_error() {
    let r = registry();
    let err = r.increment_counter("nope_total", &[]).unwrap_err();
    assert_eq!(err.code().as_str(), "UNKNOWN_METRIC");

    // A histogram name used as a counter is not a counter.
    let err = r.increment_counter(HTTP_REQUEST_DURATION_SECONDS, &["/"]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnknownMetric);
}

#[test]
fn builder_rejects_bad_declarations() {
    let err = MetricRegistry::builder()
        .counter("a_total", "a", &["x"])
        .unwrap()
        .counter("a_total", "again", &["x"])
        .err()
        .unwrap();
    assert_eq!(err.code(), ErrorCode::DuplicateMetric);

    let err = MetricRegistry::builder().counter("bad-name", "h", &[]).err().unwrap();
    assert_eq!(err.code(), ErrorCode::InvalidConfig);

    let err = MetricRegistry::builder().histogram("h", "h", &["le"], &[1.0]).err().unwrap();
    assert_eq!(err.code(), ErrorCode::InvalidConfig);

    for bad in [&[][..], &[0.5, 0.1][..], &[0.1, 0.1][..], &[-1.0][..], &[f64::INFINITY][..]] {
        let err = MetricRegistry::builder().histogram("h", "h", &[], bad).err().unwrap();
        assert_eq!(err.code(), ErrorCode::InvalidBuckets, "bounds {bad:?}");
    }
}

#[test]
fn bucket_bound_ties_are_included() {
    let r = registry();
    for v in [0.01, 0.05, 0.5] {
        r.observe_histogram(HTTP_REQUEST_DURATION_SECONDS, &["/"], v).unwrap();
    }
    let snap = r.histogram_snapshot(HTTP_REQUEST_DURATION_SECONDS, &["/"]).unwrap();
    assert_eq!(snap.bucket(0.01), Some(1));
    assert_eq!(snap.bucket(0.05), Some(2));
    assert_eq!(snap.bucket(0.25), Some(2));
    assert_eq!(snap.bucket(0.5), Some(3));
    assert_eq!(snap.count, 3);
}

#[test]
fn values_past_the_last_bound_only_reach_overflow() {
    let r = registry();
    r.observe_histogram(HTTP_REQUEST_DURATION_SECONDS, &["/work"], 7.5).unwrap();
    r.observe_histogram(HTTP_REQUEST_DURATION_SECONDS, &["/work"], f64::INFINITY).unwrap();

    let snap = r.histogram_snapshot(HTTP_REQUEST_DURATION_SECONDS, &["/work"]).unwrap();
    assert!(snap.buckets.iter().all(|(_, c)| *c == 0));
    assert_eq!(snap.count, 2);
}

#[test]
fn nan_and_negative_observations_are_rejected() {
    let r = registry();
    for v in [f64::NAN, -0.5] {
        let err = r.observe_histogram(HTTP_REQUEST_DURATION_SECONDS, &["/"], v).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidObservation);
    }
    assert!(r.histogram_snapshot(HTTP_REQUEST_DURATION_SECONDS, &["/"]).is_none());
}

#[test]
fn concurrent_increments_are_never_lost() {
    for n in [1usize, 10, 1000] {
        let r = registry();
        std::thread::scope(|s| {
            for _ in 0..n {
                s.spawn(|| {
                    r.increment_counter(HTTP_REQUESTS_TOTAL, &["GET", "/", "200"]).unwrap();
                });
            }
        });
        assert_eq!(
            r.counter_value(HTTP_REQUESTS_TOTAL, &["GET", "/", "200"]),
            Some(n as u64),
            "n={n}"
        );
    }
}

#[test]
fn concurrent_observations_keep_series_consistent() {
    let r = registry();
    let done = AtomicBool::new(false);

    std::thread::scope(|s| {
        let writers: Vec<_> = (0..8)
            .map(|i| {
                let r = &r;
                s.spawn(move || {
                    for j in 0..1000 {
                        let v = ((i * 1000 + j) % 700) as f64 / 100.0;
                        r.observe_histogram(HTTP_REQUEST_DURATION_SECONDS, &["/"], v).unwrap();
                    }
                })
            })
            .collect();

        s.spawn(|| {
            while !done.load(Ordering::Relaxed) {
                if let Some(snap) = r.histogram_snapshot(HTTP_REQUEST_DURATION_SECONDS, &["/"]) {
                    let counts: Vec<u64> = snap.buckets.iter().map(|(_, c)| *c).collect();
                    assert!(counts.windows(2).all(|w| w[0] <= w[1]), "{counts:?}");
                    assert!(counts.last().copied().unwrap_or(0) <= snap.count);
                }
                let _ = r.render();
            }
        });

        for w in writers {
            w.join().unwrap();
        }
        done.store(true, Ordering::Relaxed);
    });

    let snap = r.histogram_snapshot(HTTP_REQUEST_DURATION_SECONDS, &["/"]).unwrap();
    assert_eq!(snap.count, 8000);
}

#[test]
fn render_layout() {
    let r = registry();
    r.increment_counter(HTTP_REQUESTS_TOTAL, &["GET", "/", "200"]).unwrap();
    r.increment_counter(HTTP_REQUESTS_TOTAL, &["GET", "/fail", "500"]).unwrap();
    r.increment_counter(HTTP_REQUESTS_TOTAL, &["GET", "/", "200"]).unwrap();
    for v in [0.25, 0.5, 7.0] {
        r.observe_histogram(HTTP_REQUEST_DURATION_SECONDS, &["/"], v).unwrap();
    }

    let expected = "\
# HELP http_requests_total Total HTTP requests
# TYPE http_requests_total counter
http_requests_total{method=\"GET\",path=\"/\",status=\"200\"} 2
http_requests_total{method=\"GET\",path=\"/fail\",status=\"500\"} 1
# HELP http_request_duration_seconds Request latency in seconds
# TYPE http_request_duration_seconds histogram
http_request_duration_seconds_bucket{path=\"/\",le=\"0.01\"} 0
http_request_duration_seconds_bucket{path=\"/\",le=\"0.05\"} 0
http_request_duration_seconds_bucket{path=\"/\",le=\"0.1\"} 0
http_request_duration_seconds_bucket{path=\"/\",le=\"0.25\"} 1
http_request_duration_seconds_bucket{path=\"/\",le=\"0.5\"} 2
http_request_duration_seconds_bucket{path=\"/\",le=\"1.0\"} 2
http_request_duration_seconds_bucket{path=\"/\",le=\"2.0\"} 2
http_request_duration_seconds_bucket{path=\"/\",le=\"5.0\"} 2
http_request_duration_seconds_bucket{path=\"/\",le=\"+Inf\"} 3
http_request_duration_seconds_sum{path=\"/\"} 7.75
http_request_duration_seconds_count{path=\"/\"} 3
";
    assert_eq!(r.render(), expected);
}

#[test]
fn render_is_stable_without_mutation() {
    let r = registry();
    for (path, status) in [("/", "200"), ("/work", "200"), ("/fail", "500"), ("/", "200")] {
        r.increment_counter(HTTP_REQUESTS_TOTAL, &["GET", path, status]).unwrap();
        r.observe_histogram(HTTP_REQUEST_DURATION_SECONDS, &[path], 0.02).unwrap();
    }
    let first = r.render();
    assert_eq!(first, r.render());

    // Insertion order, not lexical order.
    let work = first.find("path=\"/work\",status").unwrap();
    let fail = first.find("path=\"/fail\",status").unwrap();
    assert!(work < fail);
}

#[test]
fn empty_families_render_only_preambles() {
    let r = registry();
    let out = r.render();
    assert_eq!(out.lines().count(), 4);
    assert!(out.lines().all(|l| l.starts_with('#')));
}

#[test]
fn label_values_and_help_are_escaped() {
    let r = MetricRegistry::builder()
        .counter("odd_total", "line one\nback\\slash", &["v"])
        .unwrap()
        .counter("plain_total", "no labels", &[])
        .unwrap()
        .build();
    r.increment_counter("odd_total", &["a\"b\\c\nd"]).unwrap();
    r.increment_counter("plain_total", &[]).unwrap();

    let out = r.render();
    assert!(out.contains("# HELP odd_total line one\\nback\\\\slash\n"));
    assert!(out.contains("odd_total{v=\"a\\\"b\\\\c\\nd\"} 1\n"));
    assert!(out.contains("\nplain_total 1\n"));
}
