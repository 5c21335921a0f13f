//! Input validation for the entry form
//!
//! Input flows through the components in a fixed order:
//!
//! 1. **Sanitizers** - total functions that normalize and neutralize raw text
//! 2. **Rules** - ordered per-field rule sequences, first failure wins
//! 3. **Session** - the error map, derived validity, and error management
//!
//! Sanitizing always happens before validating, so rules never special-case
//! malformed raw input.
//!
//! ```ignore
//! let session = sanitize_and_validate(state.rules.clone(), &form);
//! if let Some(submission) = accepted_submission(&session) {
//!     // hand the submission off to the response page
//! }
//! ```

pub mod requests;
pub mod rules;
pub mod sanitizers;
pub mod session;
pub mod validators;

pub use requests::{accepted_submission, sanitize_and_validate, validate_entry};
pub use rules::{default_rules, Rule, RuleTable, DEFAULT_NAME_MAX_LENGTH, NAME_MIN_LENGTH};
pub use sanitizers::{
    escape_html, normalize_whitespace, sanitize_date, sanitize_input, sanitize_name,
};
pub use session::{ErrorMap, ValidationSession};
