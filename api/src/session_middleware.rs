use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::state::AppState;

pub const SESSION_COOKIE: &str = "hw_session";

/// Identifier of one browser session, carried in the session cookie
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Accept only ids this service could have issued
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim())
            .ok()
            .map(|id| Self(id.simple().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Session id from the request's `Cookie` headers, if present and well-formed
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| SessionId::parse(value))
}

fn session_cookie(session: &SessionId, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        SESSION_COOKIE,
        session.as_str()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Attach a [`SessionId`] to every request, issuing a cookie for new sessions.
///
/// The cookie has no `Max-Age`, so the browser drops it when the browser
/// session ends.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let (session, is_new) = match session_id_from_headers(request.headers()) {
        Some(id) => (id, false),
        None => (SessionId::generate(), true),
    };

    request.extensions_mut().insert(session.clone());
    let mut response = next.run(request).await;

    if is_new {
        let secure = state.sessions.config().secure_cookie;
        match HeaderValue::from_str(&session_cookie(&session, secure)) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
                tracing::debug!(session = session.as_str(), "issued session cookie");
            }
            Err(err) => tracing::error!(error = %err, "failed to build session cookie"),
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_only_uuids() {
        let id = SessionId::generate();
        assert_eq!(SessionId::parse(id.as_str()), Some(id));
        assert_eq!(SessionId::parse("../../etc"), None);
        assert_eq!(SessionId::parse(""), None);
    }

    #[test]
    fn test_session_id_from_headers() {
        let id = SessionId::generate();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {}={}", SESSION_COOKIE, id.as_str()))
                .unwrap(),
        );
        assert_eq!(session_id_from_headers(&headers), Some(id));

        let mut other = HeaderMap::new();
        other.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(session_id_from_headers(&other), None);
        assert_eq!(session_id_from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let id = SessionId::generate();
        let cookie = session_cookie(&id, false);
        assert!(cookie.starts_with(&format!("{}={}", SESSION_COOKIE, id.as_str())));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(!cookie.contains("Max-Age"));
        assert!(!cookie.contains("Secure"));
        assert!(session_cookie(&id, true).ends_with("; Secure"));
    }
}
