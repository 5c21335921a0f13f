use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form, Json,
};
use serde_json::{json, Value};
use shared::{EntryForm, Field, FieldCheckRequest, Submission, SubmissionRequest};

use crate::{
    error::{ApiError, ApiResult},
    handoff::HandoffStore,
    metrics,
    routes::{ENTRY_PATH, RESPONSE_PATH},
    session_middleware::SessionId,
    state::AppState,
    validation::{
        accepted_submission, normalize_whitespace, sanitize_and_validate, sanitize_date,
        sanitize_name, ValidationSession,
    },
    views,
};

const STORAGE_FAILED: &str = "We could not save your submission. Please try again.";

fn store(state: &AppState, session: &SessionId) -> HandoffStore {
    state.sessions.store_for(session)
}

/// Sanitizer matching a field name; unknown fields only get whitespace cleanup
fn sanitize_field(field: &str, value: &str) -> String {
    match field.parse::<Field>() {
        Ok(Field::Name) => sanitize_name(value),
        Ok(Field::Date) => sanitize_date(value),
        Err(_) => normalize_whitespace(value),
    }
}

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let uptime = state.started_at.elapsed().as_secs();
    let now = chrono::Utc::now().to_rfc3339();

    tracing::debug!(uptime_secs = uptime, "health check passed");
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": now,
            "uptime_secs": uptime,
            "session_storage": state.sessions.config().enabled,
            "active_sessions": state.sessions.session_count(),
        })),
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Browser form flow
// ─────────────────────────────────────────────────────────────────────────────

pub async fn entry_page(State(state): State<AppState>) -> Html<String> {
    Html(views::entry_page("", "", None, state.rules.name_max_length()))
}

fn rerender_entry(state: &AppState, session: &ValidationSession, status: StatusCode) -> Response {
    let html = views::entry_page(
        session.value(Field::Name.as_str()).unwrap_or(""),
        session.value(Field::Date.as_str()).unwrap_or(""),
        Some(session.errors()),
        state.rules.name_max_length(),
    );
    (status, Html(html)).into_response()
}

/// Sanitize, validate, hand off, then navigate to the response page.
///
/// Any record left from an earlier submission is cleared first, so a
/// rejected submit never leaves stale data for the response page.
pub async fn submit_entry(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    Form(form): Form<EntryForm>,
) -> Response {
    let handoff = store(&state, &session_id);
    handoff.clear();

    let mut session = sanitize_and_validate(state.rules.clone(), &form);

    let Some(submission) = accepted_submission(&session) else {
        metrics::SUBMISSIONS_REJECTED.inc();
        tracing::info!(
            invalid_fields = session.errors().field_errors().len(),
            "entry form rejected"
        );
        return rerender_entry(&state, &session, StatusCode::UNPROCESSABLE_ENTITY);
    };

    if !handoff.save(&submission) {
        tracing::warn!(session = session_id.as_str(), "handoff save failed");
        session.set_error("form", STORAGE_FAILED);
        return rerender_entry(&state, &session, StatusCode::SERVICE_UNAVAILABLE);
    }

    metrics::SUBMISSIONS_ACCEPTED.inc();
    tracing::info!(session = session_id.as_str(), "entry form accepted");
    Redirect::to(RESPONSE_PATH).into_response()
}

pub async fn response_page(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
) -> Response {
    match store(&state, &session_id).load() {
        Some(submission) => Html(views::response_page(&submission)).into_response(),
        None => Redirect::to(ENTRY_PATH).into_response(),
    }
}

/// "Start over": drop the handoff record and go back to an empty form
pub async fn reset(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
) -> Redirect {
    store(&state, &session_id).clear();
    Redirect::to(ENTRY_PATH)
}

// ─────────────────────────────────────────────────────────────────────────────
// JSON API
// ─────────────────────────────────────────────────────────────────────────────

/// Single-field check used while the user edits (on blur).
///
/// Unknown field names have no rules and always come back valid.
pub async fn validate_field(
    State(state): State<AppState>,
    payload: Result<Json<FieldCheckRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(req) = payload.map_err(ApiError::invalid_json)?;

    let value = sanitize_field(&req.field, &req.value);
    let mut session = ValidationSession::for_entry_form(state.rules.clone());
    let valid = session.validate_field(&req.field, &value);

    Ok(Json(json!({
        "field": req.field,
        "value": value,
        "valid": valid,
        "error": session.error(&req.field).filter(|e| !e.is_empty()),
        "errors": session.errors(),
    })))
}

/// Whole-form validation without a handoff; returns the complete error map
pub async fn validate_form(
    State(state): State<AppState>,
    payload: Result<Json<SubmissionRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(req) = payload.map_err(ApiError::invalid_json)?;

    let session = sanitize_and_validate(state.rules.clone(), &EntryForm::from(req));

    Ok(Json(json!({
        "valid": session.is_valid(),
        "values": {
            "name": session.value(Field::Name.as_str()),
            "date": session.value(Field::Date.as_str()),
        },
        "errors": session.errors(),
    })))
}

/// JSON counterpart of the form post: clear, sanitize, validate, hand off
pub async fn create_submission(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    payload: Result<Json<SubmissionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Submission>)> {
    let handoff = store(&state, &session_id);
    handoff.clear();

    let Json(req) = payload.map_err(ApiError::invalid_json)?;
    let session = sanitize_and_validate(state.rules.clone(), &EntryForm::from(req));

    let Some(submission) = accepted_submission(&session) else {
        metrics::SUBMISSIONS_REJECTED.inc();
        return Err(ApiError::validation(session.errors().field_errors()));
    };

    if !handoff.save(&submission) {
        return Err(ApiError::storage_unavailable());
    }

    metrics::SUBMISSIONS_ACCEPTED.inc();
    Ok((StatusCode::CREATED, Json(submission)))
}

pub async fn get_submission(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
) -> ApiResult<Json<Submission>> {
    store(&state, &session_id)
        .load()
        .map(Json)
        .ok_or_else(|| {
            ApiError::not_found(
                "SubmissionNotFound",
                "No submission is stored for this session",
            )
        })
}

pub async fn delete_submission(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
) -> StatusCode {
    store(&state, &session_id).clear();
    StatusCode::NO_CONTENT
}

/// Unknown paths behave like an unmatched client route: back to the entry page
pub async fn route_not_found() -> Redirect {
    Redirect::to(ENTRY_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_field_dispatch() {
        assert_eq!(sanitize_field("name", "  John <b>Doe</b> "), "John bDoeb");
        assert_eq!(sanitize_field("date", "2024-13-01"), "");
        assert_eq!(sanitize_field("email", "  a   b "), "a b");
    }
}
