//! Field predicates used by the rule table
//!
//! Each predicate trims its input before checking; the value itself is
//! never modified here.

use lazy_static::lazy_static;
use regex::Regex;
use shared::parse_iso_date;

lazy_static! {
    /// Letters (accented and combining marks included), whitespace, hyphens, apostrophes
    static ref NAME_PATTERN: Regex = Regex::new(r"^[\p{L}\p{M}\s'\-]+$").unwrap();
}

/// Non-empty after trimming
pub fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Length in characters after trimming
pub fn trimmed_len(value: &str) -> usize {
    value.trim().chars().count()
}

pub fn has_min_length(value: &str, min: usize) -> bool {
    trimmed_len(value) >= min
}

pub fn has_max_length(value: &str, max: usize) -> bool {
    trimmed_len(value) <= max
}

/// Only letters, spaces, hyphens and apostrophes
pub fn is_name_like(value: &str) -> bool {
    NAME_PATTERN.is_match(value.trim())
}

/// Strict `YYYY-MM-DD` naming a real calendar day
pub fn is_calendar_date(value: &str) -> bool {
    parse_iso_date(value.trim()).is_some()
}
