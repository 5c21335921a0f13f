use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

// ═══════════════════════════════════════════════════════════════════════════
// FORM FIELDS
// ═══════════════════════════════════════════════════════════════════════════

/// A named input on the entry page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Date,
}

impl Field {
    /// Every field the entry form renders, in display order
    pub const ALL: [Field; 2] = [Field::Name, Field::Date];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Date => "date",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Field::Name),
            "date" => Ok(Field::Date),
            _ => Err(format!("Unknown field: {}", s)),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SUBMISSION
// ═══════════════════════════════════════════════════════════════════════════

/// Accepted payload handed from the entry step to the response step.
///
/// Only built once both fields have been sanitized and have passed every
/// rule. This is also the shape of the stored handoff record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub name: String,
    /// ISO calendar date, `YYYY-MM-DD`
    pub date: String,
}

impl Submission {
    pub fn new(name: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            date: date.into(),
        }
    }

    /// Parsed calendar date, `None` if the stored string is not ISO
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        parse_iso_date(&self.date)
    }
}

/// Parse a strict `YYYY-MM-DD` string into a calendar date.
///
/// Exactly four digits, hyphen, two digits, hyphen, two digits; no
/// surrounding whitespace, no single-digit months or days.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    if bytes.len() != 10 {
        return None;
    }
    let shape_ok = bytes.iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        _ => b.is_ascii_digit(),
    });
    if !shape_ok {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Raw entry form body as posted by the browser
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub date: String,
}

impl EntryForm {
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Date => &self.date,
        }
    }
}

impl From<SubmissionRequest> for EntryForm {
    fn from(req: SubmissionRequest) -> Self {
        Self {
            name: req.name,
            date: req.date,
        }
    }
}

/// One failing field, as reported to API clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// JSON body for single-field validation on blur
#[derive(Debug, Clone, Deserialize)]
pub struct FieldCheckRequest {
    pub field: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub value: String,
}

/// JSON body for `POST /api/submissions`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
}

/// Accepts any JSON value; anything that is not a string becomes `""`.
///
/// Nulls, numbers and objects reach the sanitizer as empty input instead of
/// failing the whole request.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        _ => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_round_trips_through_str() {
        for field in Field::ALL {
            assert_eq!(field.as_str().parse::<Field>(), Ok(field));
        }
        assert!("email".parse::<Field>().is_err());
    }

    #[test]
    fn test_lenient_string_drops_non_strings() {
        let req: SubmissionRequest =
            serde_json::from_str(r#"{"name": 42, "date": null}"#).unwrap();
        assert_eq!(req.name, "");
        assert_eq!(req.date, "");

        let req: FieldCheckRequest = serde_json::from_str(r#"{"field": "name"}"#).unwrap();
        assert_eq!(req.value, "");
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(
            parse_iso_date("2024-01-15"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert!(parse_iso_date("2024-02-30").is_none());
        assert!(parse_iso_date("2024-1-5").is_none());
        assert!(parse_iso_date("2024/01/15").is_none());
        assert!(parse_iso_date("+2024-01-1").is_none());
        assert!(parse_iso_date("").is_none());
    }

    #[test]
    fn test_calendar_date() {
        assert!(Submission::new("Jo", "2024-01-15").calendar_date().is_some());
        assert!(Submission::new("Jo", "15/01/2024").calendar_date().is_none());
    }
}
