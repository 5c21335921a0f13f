use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{
    handlers, metrics, metrics_handler, navigation_guard, session_middleware, state::AppState,
};

pub const ENTRY_PATH: &str = "/";
pub const RESPONSE_PATH: &str = "/response";

/// Entry page, form post and the guarded response page
pub fn form_routes(state: AppState) -> Router<AppState> {
    let guarded = Router::new()
        .route(RESPONSE_PATH, get(handlers::response_page))
        .route_layer(middleware::from_fn_with_state(
            state,
            navigation_guard::require_submission,
        ));

    Router::new()
        .route(ENTRY_PATH, get(handlers::entry_page))
        .route("/submit", post(handlers::submit_entry))
        .route("/reset", post(handlers::reset))
        .merge(guarded)
}

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/validate", post(handlers::validate_field))
        .route("/api/validate/form", post(handlers::validate_form))
        .route("/api/submissions", post(handlers::create_submission))
        .route(
            "/api/submission",
            get(handlers::get_submission).delete(handlers::delete_submission),
        )
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health_check))
}

pub fn observability_routes() -> Router<AppState> {
    Router::new().route("/metrics", get(metrics_handler::metrics_endpoint))
}

/// Full application router with every layer applied
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(form_routes(state.clone()))
        .merge(api_routes())
        .merge(health_routes())
        .merge(observability_routes())
        .fallback(handlers::route_not_found)
        .layer(middleware::from_fn(request_logger))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware::session_middleware,
        ))
        .with_state(state)
}

const KNOWN_PATHS: [&str; 10] = [
    ENTRY_PATH,
    RESPONSE_PATH,
    "/submit",
    "/reset",
    "/api/validate",
    "/api/validate/form",
    "/api/submissions",
    "/api/submission",
    "/health",
    "/metrics",
];

/// Metric label for a request path; anything unrouted shares one label
fn metric_path(path: &str) -> &'static str {
    KNOWN_PATHS
        .iter()
        .find(|known| **known == path)
        .copied()
        .unwrap_or("unmatched")
}

async fn request_logger(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let path = metric_path(uri.path());
    let start = std::time::Instant::now();

    let response = next.run(req).await;

    let elapsed = start.elapsed();
    let status = response.status().as_u16();

    metrics::observe_http(method.as_str(), path, status, elapsed.as_secs_f64());
    tracing::info!("{method} {uri} {status} {}ms", elapsed.as_millis());

    response
}
