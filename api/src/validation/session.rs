//! Per-form validation state
//!
//! [`ValidationSession`] owns the error map and the working values of one
//! form. A field is absent from the map until it is registered; after that
//! its entry is `""` while valid and holds the failing message while invalid.
//! Entries are overwritten, never removed.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use shared::{Field, FieldError};

use super::rules::RuleTable;
use crate::metrics;

/// Field name → current message, `""` meaning valid
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorMap(BTreeMap<String, String>);

impl ErrorMap {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_registered(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn has_errors(&self) -> bool {
        self.0.values().any(|message| !message.is_empty())
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Non-empty messages only, in form order; other fields follow by name
    pub fn field_errors(&self) -> Vec<FieldError> {
        let known = Field::ALL.iter().map(|field| field.as_str());
        let others = self
            .0
            .keys()
            .map(String::as_str)
            .filter(|field| field.parse::<Field>().is_err());

        known
            .chain(others)
            .filter_map(|field| match self.get(field) {
                Some(message) if !message.is_empty() => Some(FieldError::new(field, message)),
                _ => None,
            })
            .collect()
    }

    fn set(&mut self, field: &str, message: impl Into<String>) {
        self.0.insert(field.to_string(), message.into());
    }
}

#[derive(Debug, Clone)]
pub struct ValidationSession {
    rules: Arc<RuleTable>,
    errors: ErrorMap,
    values: BTreeMap<String, String>,
}

impl ValidationSession {
    /// Register `fields`, each starting out valid
    pub fn new<I, S>(rules: Arc<RuleTable>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut errors = ErrorMap::default();
        for field in fields {
            errors.set(&field.into(), "");
        }

        Self {
            rules,
            errors,
            values: BTreeMap::new(),
        }
    }

    /// Session over the entry page's `name` and `date` fields
    pub fn for_entry_form(rules: Arc<RuleTable>) -> Self {
        Self::new(rules, Field::ALL.iter().map(Field::as_str))
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field)
    }

    pub fn has_errors(&self) -> bool {
        self.errors.has_errors()
    }

    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    /// Store the working value that [`validate_form`](Self::validate_form) checks
    pub fn set_value(&mut self, field: &str, value: impl Into<String>) {
        self.values.insert(field.to_string(), value.into());
    }

    pub fn value(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    /// Run `field`'s rules against `value` and record the outcome.
    ///
    /// Only this field's entry changes. Unregistered fields become registered.
    pub fn validate_field(&mut self, field: &str, value: &str) -> bool {
        match self.rules.evaluate_named(field, value) {
            Some(message) => {
                tracing::debug!(field = field, message = message, "field failed validation");
                metrics::record_validation_failure(field);
                let message = message.to_string();
                self.errors.set(field, message);
                false
            }
            None => {
                self.errors.set(field, "");
                true
            }
        }
    }

    /// Validate every registered field with its working value.
    ///
    /// Never stops early: every field's entry is refreshed so all messages can
    /// be shown at once. A field with no working value is checked as `""`.
    pub fn validate_form(&mut self) -> bool {
        let fields: Vec<String> = self.errors.fields().map(str::to_string).collect();
        let mut all_valid = true;
        for field in fields {
            let value = self.values.get(&field).cloned().unwrap_or_default();
            if !self.validate_field(&field, &value) {
                all_valid = false;
            }
        }
        all_valid
    }

    /// Reset one registered field; unknown fields are ignored
    pub fn clear_error(&mut self, field: &str) {
        if self.errors.is_registered(field) {
            self.errors.set(field, "");
        }
    }

    pub fn clear_all_errors(&mut self) {
        for message in self.errors.0.values_mut() {
            message.clear();
        }
    }

    /// Override a field's message with an error no single-field rule expresses
    pub fn set_error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.set(field, message);
    }
}
