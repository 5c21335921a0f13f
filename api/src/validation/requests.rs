//! Sanitize-then-validate for the entry form
//!
//! The browser form post and the JSON API share [`sanitize_and_validate`], so
//! both paths see the same cleaned values and the same messages.

use std::sync::Arc;

use shared::{EntryForm, Field, Submission};

use super::rules::RuleTable;
use super::sanitizers::{sanitize_date, sanitize_name};
use super::session::ValidationSession;

/// Validate already-sanitized `name` and `date` as one form
pub fn validate_entry(rules: Arc<RuleTable>, name: &str, date: &str) -> ValidationSession {
    let mut session = ValidationSession::for_entry_form(rules);
    session.set_value(Field::Name.as_str(), name);
    session.set_value(Field::Date.as_str(), date);
    session.validate_form();
    session
}

/// Run each field through its sanitizer, then validate the cleaned form.
///
/// The returned session holds the sanitized values, ready to be re-rendered
/// or handed off.
pub fn sanitize_and_validate(rules: Arc<RuleTable>, form: &EntryForm) -> ValidationSession {
    let name = sanitize_name(form.value(Field::Name));
    let date = sanitize_date(form.value(Field::Date));
    validate_entry(rules, &name, &date)
}

/// Build the handoff payload once the session has accepted both fields
pub fn accepted_submission(session: &ValidationSession) -> Option<Submission> {
    if !session.is_valid() {
        return None;
    }
    let name = session.value(Field::Name.as_str())?;
    let date = session.value(Field::Date.as_str())?;
    Some(Submission::new(name, date))
}
