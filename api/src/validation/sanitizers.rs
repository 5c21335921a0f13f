//! Input sanitization functions
//!
//! Every function here is total: malformed input is neutralized to an empty
//! or filtered string, never rejected. Validation runs afterwards on the
//! result and flags emptiness if sanitization stripped everything.

use lazy_static::lazy_static;
use regex::Regex;
use shared::parse_iso_date;

lazy_static! {
    /// Pattern to match runs of whitespace characters
    static ref MULTI_WHITESPACE: Regex = Regex::new(r"\s+").unwrap();

    /// Anything that is not a letter, combining mark, space, hyphen or apostrophe
    static ref NAME_DISALLOWED: Regex = Regex::new(r"[^\p{L}\p{M} '\-]").unwrap();
}

/// Normalize whitespace: trim, then collapse internal runs into a single space
pub fn normalize_whitespace(value: &str) -> String {
    MULTI_WHITESPACE.replace_all(value.trim(), " ").to_string()
}

/// Sanitize a name: normalize whitespace, then delete every disallowed character.
///
/// Deleting a character can leave two spaces side by side (`"Ann $ Lee"`),
/// so the result is normalized once more.
pub fn sanitize_name(name: &str) -> String {
    let normalized = normalize_whitespace(name);
    let filtered = NAME_DISALLOWED.replace_all(&normalized, "");
    normalize_whitespace(&filtered)
}

/// Escape the characters that are unsafe in an HTML context.
///
/// `&` goes first so entities produced by later replacements are not
/// escaped a second time.
pub fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
        .replace('/', "&#x2F;")
        .replace('`', "&#x60;")
        .replace('=', "&#x3D;")
}

/// Keep a date only if it is a strict `YYYY-MM-DD` that names a real day
pub fn sanitize_date(date: &str) -> String {
    match parse_iso_date(date) {
        Some(_) => date.to_string(),
        None => String::new(),
    }
}

/// Generic free-text pipeline: normalize whitespace, then HTML-escape
pub fn sanitize_input(value: &str) -> String {
    escape_html(&normalize_whitespace(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("hello   world"), "hello world");
        assert_eq!(normalize_whitespace("  multiple   spaces  "), "multiple spaces");
        assert_eq!(normalize_whitespace("line\n\nbreaks\tand\ttabs"), "line breaks and tabs");
        assert_eq!(normalize_whitespace("   "), "");
        assert_eq!(normalize_whitespace(""), "");
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("  John   Doe  "), "John Doe");
        assert_eq!(sanitize_name("O'Brien-Smith"), "O'Brien-Smith");
        assert_eq!(sanitize_name("<script>alert(1)</script>"), "scriptalertscript");
        assert_eq!(sanitize_name("Ann $ Lee"), "Ann Lee");
        assert_eq!(sanitize_name("R2-D2"), "R-D");
        assert_eq!(sanitize_name("12345"), "");
    }

    #[test]
    fn test_sanitize_name_keeps_accented_letters() {
        assert_eq!(sanitize_name("José Müller"), "José Müller");
        assert_eq!(sanitize_name("Zoë Ærøskøbing"), "Zoë Ærøskøbing");
        // decomposed e + combining acute accent
        assert_eq!(sanitize_name("Jose\u{0301}"), "Jose\u{0301}");
    }

    #[test]
    fn test_sanitize_name_output_is_allow_listed_and_idempotent() {
        let inputs = [
            "  John   Doe  ",
            "a $ b",
            "\t<b>Mary</b>\n-Jane ",
            "!!!",
            "x & y = z",
            "Jean-Luc  'Picard' 2",
            "  -- ' -- ",
            "Renée\u{00a0}Dubois",
        ];
        let allowed = Regex::new(r"^[\p{L}\p{M} '\-]*$").unwrap();

        for input in inputs {
            let once = sanitize_name(input);
            assert!(allowed.is_match(&once), "unexpected character in {:?}", once);
            assert!(!once.contains("  "), "doubled space in {:?}", once);
            assert_eq!(sanitize_name(&once), once, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("&"), "&amp;");
        assert_eq!(
            escape_html("<script>alert('xss')</script>"),
            "&lt;script&gt;alert(&#x27;xss&#x27;)&lt;&#x2F;script&gt;"
        );
        assert_eq!(escape_html(r#"a="b""#), "a&#x3D;&quot;b&quot;");
        assert_eq!(escape_html("`cmd`"), "&#x60;cmd&#x60;");
        assert_eq!(escape_html("plain text"), "plain text");
    }

    #[test]
    fn test_escape_html_leaves_no_raw_specials() {
        let escaped = escape_html(r#"<a href="x">Tom & "Jerry"</a>"#);
        assert!(!escaped.contains('<'));
        assert!(!escaped.contains('>'));
        assert!(!escaped.contains('"'));
        // every remaining ampersand starts an entity
        for (i, _) in escaped.match_indices('&') {
            let rest = &escaped[i..];
            assert!(rest.contains(';'));
        }
        assert!(!escaped.contains("&amp;amp;"));
    }

    #[test]
    fn test_sanitize_date() {
        assert_eq!(sanitize_date("2024-01-15"), "2024-01-15");
        assert_eq!(sanitize_date("2024-02-29"), "2024-02-29");
        assert_eq!(sanitize_date("2023-02-29"), "");
        assert_eq!(sanitize_date("2024-13-40"), "");
        assert_eq!(sanitize_date("2024-1-5"), "");
        assert_eq!(sanitize_date(" 2024-01-15"), "");
        assert_eq!(sanitize_date("not-a-date"), "");
        assert_eq!(sanitize_date(""), "");
    }

    #[test]
    fn test_sanitize_input() {
        assert_eq!(sanitize_input("  <b>hi</b>   there "), "&lt;b&gt;hi&lt;&#x2F;b&gt; there");
        assert_eq!(sanitize_input("   "), "");
    }
}
