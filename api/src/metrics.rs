use once_cell::sync::Lazy;
use prometheus::{
    opts, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Registry,
    TextEncoder,
};
use shared::Field;

macro_rules! counter_vec {
    ($name:expr, $help:expr, $labels:expr) => {
        Lazy::new(|| IntCounterVec::new(opts!($name, $help), $labels).unwrap())
    };
}
macro_rules! histogram_vec {
    ($name:expr, $help:expr, $labels:expr) => {
        Lazy::new(|| {
            HistogramVec::new(
                HistogramOpts::new($name, $help).buckets(LATENCY_BUCKETS.to_vec()),
                $labels,
            )
            .unwrap()
        })
    };
}
macro_rules! counter {
    ($name:expr, $help:expr) => {
        Lazy::new(|| IntCounter::new($name, $help).unwrap())
    };
}
macro_rules! gauge {
    ($name:expr, $help:expr) => {
        Lazy::new(|| IntGauge::new($name, $help).unwrap())
    };
}

const LATENCY_BUCKETS: [f64; 10] = [0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0];

// ── HTTP ────────────────────────────────────────────────────────────────────
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> =
    counter_vec!("http_requests_total", "Total HTTP requests", &["method", "path", "status"]);
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> =
    histogram_vec!("http_request_duration_seconds", "HTTP request latency", &["method", "path"]);

// ── Form pipeline ───────────────────────────────────────────────────────────
pub static SUBMISSIONS_ACCEPTED: Lazy<IntCounter> =
    counter!(
        "submissions_accepted_total",
        "Submissions that passed validation and were handed off"
    );
pub static SUBMISSIONS_REJECTED: Lazy<IntCounter> =
    counter!("submissions_rejected_total", "Submissions with at least one invalid field");
pub static VALIDATION_FAILURES: Lazy<IntCounterVec> =
    counter_vec!("validation_failures_total", "Failed field validations", &["field"]);

// ── Handoff store ───────────────────────────────────────────────────────────
pub static HANDOFF_OPERATIONS: Lazy<IntCounterVec> = counter_vec!(
    "handoff_operations_total",
    "Handoff store operations by outcome",
    &["operation", "outcome"]
);
pub static ACTIVE_SESSIONS: Lazy<IntGauge> =
    gauge!("active_sessions", "Browser sessions with a storage area");

pub fn register_all(r: &Registry) -> prometheus::Result<()> {
    r.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;
    r.register(Box::new(HTTP_REQUEST_DURATION.clone()))?;
    r.register(Box::new(SUBMISSIONS_ACCEPTED.clone()))?;
    r.register(Box::new(SUBMISSIONS_REJECTED.clone()))?;
    r.register(Box::new(VALIDATION_FAILURES.clone()))?;
    r.register(Box::new(HANDOFF_OPERATIONS.clone()))?;
    r.register(Box::new(ACTIVE_SESSIONS.clone()))?;
    Ok(())
}

pub fn gather_metrics(r: &Registry) -> String {
    let encoder = TextEncoder::new();
    let families = r.gather();
    let mut buf = Vec::new();
    encoder.encode(&families, &mut buf).unwrap_or_default();
    String::from_utf8(buf).unwrap_or_default()
}

pub fn observe_http(method: &str, path: &str, status: u16, duration_secs: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION
        .with_label_values(&[method, path])
        .observe(duration_secs);
}

/// Field names come from clients, so anything unknown shares one label
pub fn record_validation_failure(field: &str) {
    let label = field.parse::<Field>().map(|f| f.as_str()).unwrap_or("other");
    VALIDATION_FAILURES.with_label_values(&[label]).inc();
}

pub fn record_handoff(operation: &str, outcome: &str) {
    HANDOFF_OPERATIONS
        .with_label_values(&[operation, outcome])
        .inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_registry() -> Registry {
        let r = Registry::new_custom(Some("t".into()), None).unwrap();
        register_all(&r).unwrap();
        r
    }

    #[test]
    fn test_http_request_counter() {
        let r = fresh_registry();
        observe_http("GET", "/", 200, 0.002);
        let out = gather_metrics(&r);
        assert!(out.contains("t_http_requests_total"));
        assert!(out.contains("t_http_request_duration_seconds"));
    }

    #[test]
    fn test_validation_failure_labels_are_bounded() {
        let r = fresh_registry();
        record_validation_failure("name");
        record_validation_failure("<script>");
        let out = gather_metrics(&r);
        assert!(out.contains(r#"field="name""#));
        assert!(out.contains(r#"field="other""#));
        assert!(!out.contains("<script>"));
    }

    #[test]
    fn test_handoff_operations() {
        let r = fresh_registry();
        record_handoff("save", "ok");
        let out = gather_metrics(&r);
        assert!(out.contains(r#"operation="save",outcome="ok""#));
    }
}
