//! Ordered validation rules per field
//!
//! A [`RuleTable`] is built once and only read afterwards. Evaluation walks a
//! field's rules in order and stops at the first failure, so message
//! precedence is positional.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use lazy_static::lazy_static;
use shared::Field;

use super::validators::{has_max_length, has_min_length, is_calendar_date, is_name_like, is_present};

// ─────────────────────────────────────────────────────────────────────────────
// Constants for validation rules
// ─────────────────────────────────────────────────────────────────────────────

/// Minimum length for a name, inclusive
pub const NAME_MIN_LENGTH: usize = 2;
/// Default maximum length for a name, inclusive
pub const DEFAULT_NAME_MAX_LENGTH: usize = 100;

pub const NAME_REQUIRED: &str = "Name is required";
pub const NAME_PATTERN_MESSAGE: &str =
    "Name can only contain letters, spaces, hyphens, and apostrophes";
pub const DATE_REQUIRED: &str = "Date is required";
pub const DATE_INVALID: &str = "Please enter a valid date";

pub fn name_min_length_message() -> String {
    format!("Name must be at least {} characters", NAME_MIN_LENGTH)
}

pub fn name_max_length_message(max: usize) -> String {
    format!("Name must not exceed {} characters", max)
}

lazy_static! {
    /// Table with the default name bound, for callers without configuration
    static ref DEFAULT_RULES: Arc<RuleTable> = Arc::new(RuleTable::new(DEFAULT_NAME_MAX_LENGTH));
}

pub fn default_rules() -> Arc<RuleTable> {
    DEFAULT_RULES.clone()
}

/// A pass/fail predicate with the message reported when it fails
pub struct Rule {
    message: String,
    test: Box<dyn Fn(&str) -> bool + Send + Sync>,
}

impl Rule {
    pub fn new<F>(message: impl Into<String>, test: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            test: Box::new(test),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn passes(&self, value: &str) -> bool {
        (self.test)(value)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("message", &self.message).finish()
    }
}

#[derive(Debug)]
pub struct RuleTable {
    rules: HashMap<Field, Vec<Rule>>,
    name_max_length: usize,
}

impl RuleTable {
    /// Build the name and date rule sequences.
    ///
    /// `name_max_length` is clamped so it never drops below the minimum.
    pub fn new(name_max_length: usize) -> Self {
        let max = name_max_length.max(NAME_MIN_LENGTH);

        let name_rules = vec![
            Rule::new(NAME_REQUIRED, is_present),
            Rule::new(name_min_length_message(), |v| has_min_length(v, NAME_MIN_LENGTH)),
            Rule::new(name_max_length_message(max), move |v| has_max_length(v, max)),
            Rule::new(NAME_PATTERN_MESSAGE, is_name_like),
        ];

        let date_rules = vec![
            Rule::new(DATE_REQUIRED, is_present),
            Rule::new(DATE_INVALID, is_calendar_date),
        ];

        let mut rules = HashMap::new();
        rules.insert(Field::Name, name_rules);
        rules.insert(Field::Date, date_rules);

        Self {
            rules,
            name_max_length: max,
        }
    }

    pub fn name_max_length(&self) -> usize {
        self.name_max_length
    }

    pub fn rules_for(&self, field: Field) -> &[Rule] {
        self.rules.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Message of the first failing rule, or `None` when every rule passes
    pub fn evaluate(&self, field: Field, value: &str) -> Option<&str> {
        self.rules_for(field)
            .iter()
            .find(|rule| !rule.passes(value))
            .map(Rule::message)
    }

    /// Same as [`evaluate`](Self::evaluate) for a field given by name.
    ///
    /// Names without a rule sequence always pass.
    pub fn evaluate_named(&self, field_name: &str, value: &str) -> Option<&str> {
        match field_name.parse::<Field>() {
            Ok(field) => self.evaluate(field, value),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_rules_in_order() {
        let table = RuleTable::new(DEFAULT_NAME_MAX_LENGTH);

        assert_eq!(table.evaluate(Field::Name, ""), Some(NAME_REQUIRED));
        assert_eq!(table.evaluate(Field::Name, "   "), Some(NAME_REQUIRED));
        assert_eq!(
            table.evaluate(Field::Name, "A"),
            Some("Name must be at least 2 characters")
        );
        assert_eq!(table.evaluate(Field::Name, "Jo"), None);
        assert_eq!(
            table.evaluate(Field::Name, &"A".repeat(101)),
            Some("Name must not exceed 100 characters")
        );
        assert_eq!(table.evaluate(Field::Name, &"A".repeat(100)), None);
        assert_eq!(table.evaluate(Field::Name, "J0hn"), Some(NAME_PATTERN_MESSAGE));
    }

    #[test]
    fn test_first_failure_wins() {
        let table = RuleTable::new(DEFAULT_NAME_MAX_LENGTH);
        // too short and bad characters: length rule comes first
        assert_eq!(
            table.evaluate(Field::Name, "1"),
            Some("Name must be at least 2 characters")
        );
        // too long and bad characters
        assert_eq!(
            table.evaluate(Field::Name, &"9".repeat(150)),
            Some("Name must not exceed 100 characters")
        );
    }

    #[test]
    fn test_date_rules() {
        let table = RuleTable::new(DEFAULT_NAME_MAX_LENGTH);
        assert_eq!(table.evaluate(Field::Date, ""), Some(DATE_REQUIRED));
        assert_eq!(table.evaluate(Field::Date, "not-a-date"), Some(DATE_INVALID));
        assert_eq!(table.evaluate(Field::Date, "2024-02-30"), Some(DATE_INVALID));
        assert_eq!(table.evaluate(Field::Date, "2024-01-15"), None);
    }

    #[test]
    fn test_configurable_max_length() {
        let table = RuleTable::new(10);
        assert_eq!(table.name_max_length(), 10);
        assert_eq!(
            table.evaluate(Field::Name, "Bartholomew"),
            Some("Name must not exceed 10 characters")
        );

        let clamped = RuleTable::new(0);
        assert_eq!(clamped.name_max_length(), NAME_MIN_LENGTH);
        assert_eq!(clamped.evaluate(Field::Name, "Jo"), None);
    }

    #[test]
    fn test_unknown_field_passes() {
        let table = default_rules();
        assert_eq!(table.evaluate_named("nickname", ""), None);
        assert_eq!(table.evaluate_named("name", ""), Some(NAME_REQUIRED));
    }

    #[test]
    fn test_rule_sequences_are_ordered() {
        let table = default_rules();
        let messages: Vec<&str> = table.rules_for(Field::Date).iter().map(Rule::message).collect();
        assert_eq!(messages, vec![DATE_REQUIRED, DATE_INVALID]);
        assert_eq!(table.rules_for(Field::Name).len(), 4);
    }
}
