//! Server-rendered entry and response pages
//!
//! Every user-supplied value is HTML-escaped at the point it is interpolated.

use shared::{Field, Submission};

use crate::validation::{escape_html, ErrorMap};

pub const APP_NAME: &str = "HelloWorld";
const ERROR_PREFIX: &str = "Error:";

fn layout(title: &str, description: &str, body: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<meta name="description" content="{description}">
<title>{title} - {app}</title>
</head>
<body>
<a class="skip-link" href="#main-content">Skip to main content</a>
<main id="main-content" tabindex="-1">
{body}
</main>
</body>
</html>
"##,
        title = escape_html(title),
        description = escape_html(description),
        app = APP_NAME,
        body = body,
    )
}

fn field_markup(
    field: Field,
    label: &str,
    input_type: &str,
    value: &str,
    error: &str,
    extra: &str,
) -> String {
    let id = field.as_str();
    let (aria, message) = if error.is_empty() {
        (r#"aria-invalid="false""#.to_string(), String::new())
    } else {
        (
            format!(r#"aria-invalid="true" aria-describedby="{id}-error""#),
            format!(
                r#"<p id="{id}-error" class="field-error" role="alert">{prefix} {message}</p>"#,
                prefix = ERROR_PREFIX,
                message = escape_html(error),
            ),
        )
    };

    format!(
        r#"<div class="field">
<label for="{id}">{label} <span class="required">(required)</span></label>
<input id="{id}" name="{id}" type="{input_type}" value="{value}" required {aria}{extra}>
{message}
</div>"#,
        value = escape_html(value),
    )
}

/// Entry page with the given working values and, after a failed submit, errors
pub fn entry_page(
    name: &str,
    date: &str,
    errors: Option<&ErrorMap>,
    name_max_length: usize,
) -> String {
    let error_for = |field: Field| {
        errors
            .and_then(|e| e.get(field.as_str()))
            .unwrap_or("")
            .to_string()
    };

    let summary = match errors.map(ErrorMap::field_errors) {
        Some(list) if !list.is_empty() => {
            let items: String = list
                .iter()
                .map(|e| {
                    format!(
                        r##"<li><a href="#{field}">{message}</a></li>"##,
                        field = escape_html(&e.field),
                        message = escape_html(&e.message)
                    )
                })
                .collect();
            format!(
                r#"<div class="error-summary" role="alert">
<h2>There is a problem</h2>
<ul>{items}</ul>
</div>"#
            )
        }
        _ => String::new(),
    };

    let body = format!(
        r#"<h1>Welcome</h1>
<p>Enter your name and a date to receive a personalized greeting.</p>
{summary}
<form id="form" method="post" action="/submit" novalidate>
{name_field}
{date_field}
<button type="submit">Submit</button>
</form>"#,
        name_field = field_markup(
            Field::Name,
            "Name",
            "text",
            name,
            &error_for(Field::Name),
            &format!(r#" autocomplete="name" maxlength="{name_max_length}""#),
        ),
        date_field = field_markup(Field::Date, "Date", "date", date, &error_for(Field::Date), ""),
    );

    layout(
        "Welcome",
        "Enter your information to receive a personalized greeting",
        &body,
    )
}

/// Long display form of an ISO date, e.g. "Monday, January 15, 2024"
pub fn format_long_date(submission: &Submission) -> String {
    match submission.calendar_date() {
        Some(date) => date.format("%A, %B %-d, %Y").to_string(),
        None => submission.date.clone(),
    }
}

/// Greeting line shown on the response page
pub fn greeting(submission: &Submission) -> String {
    format!("Hello, {}!", submission.name)
}

pub fn response_page(submission: &Submission) -> String {
    let body = format!(
        r#"<h1>Your Greeting</h1>
<p class="greeting">{greeting}</p>
<p>The date you chose is <time datetime="{iso}">{long}</time>.</p>
<form method="post" action="/reset">
<button type="submit">Start over</button>
</form>"#,
        greeting = escape_html(&greeting(submission)),
        iso = escape_html(&submission.date),
        long = escape_html(&format_long_date(submission)),
    );

    layout("Your Greeting", "View your personalized greeting", &body)
}
