use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

use crate::metrics;
use crate::state::AppState;

const PROMETHEUS_TEXT: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Prometheus scrape endpoint.
///
/// Idle sessions expire without a request, so the session gauge is
/// recounted from the registry on every scrape.
pub async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let live = state.sessions.session_count();
    metrics::ACTIVE_SESSIONS.set(i64::try_from(live).unwrap_or(i64::MAX));

    ([(header::CONTENT_TYPE, PROMETHEUS_TEXT)], metrics::gather_metrics(&state.registry))
}
