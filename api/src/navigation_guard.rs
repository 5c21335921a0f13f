use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, Uri},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::routes::ENTRY_PATH;
use crate::session_middleware::SessionId;
use crate::state::AppState;

/// Whether the `Referer` points at the entry page
pub fn came_from_entry(headers: &HeaderMap) -> bool {
    headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<Uri>().ok())
        .map(|uri| uri.path() == ENTRY_PATH)
        .unwrap_or(false)
}

/// Guard for the response page.
///
/// Without a stored handoff record the request is sent back to the entry
/// page, unless it was navigated to from the entry page itself; the page
/// handler then double-checks the record on its own.
pub async fn require_submission(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let has_record = request
        .extensions()
        .get::<SessionId>()
        .map(|session| state.sessions.store_for(session).exists())
        .unwrap_or(false);

    if has_record || came_from_entry(request.headers()) {
        return next.run(request).await;
    }

    tracing::info!(
        path = %request.uri().path(),
        "no submission on record, redirecting to entry page"
    );
    Redirect::to(ENTRY_PATH).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn with_referer(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::REFERER, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_came_from_entry() {
        assert!(came_from_entry(&with_referer("http://localhost:3001/")));
        assert!(came_from_entry(&with_referer("https://example.org/?x=1")));
        assert!(!came_from_entry(&with_referer("http://localhost:3001/response")));
        assert!(!came_from_entry(&with_referer("https://elsewhere.example/other")));
        assert!(!came_from_entry(&HeaderMap::new()));
    }
}
