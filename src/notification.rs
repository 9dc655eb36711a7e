//! Turning a `Submission` into the email the hosts receive. Everything here is
//! pure, no I/O.

use htmlescape::encode_minimal;

use crate::configuration::SmtpSettings;
use crate::domain::Submission;
use crate::email_client::Email;

/// Rendered in place of a value the guest did not give
pub const PLACEHOLDER: &str = "—";

pub const SENDER_NAME: &str = "RSVP";

/// Form name assumed when the request does not carry one
pub const DEFAULT_FORM_NAME: &str = "rsvp";

const CELL_STYLE: &str = "padding: 4px 8px; border-bottom: 1px solid #eee;";

/// Label/value rows shown in the HTML table, in order. Absent values are
/// `None`.
pub fn rows(sub: &Submission) -> [(&'static str, Option<String>); 5] {
    [
        ("Name", sub.name.clone()),
        ("Email", sub.email.clone()),
        ("Attendance", sub.attendance.map(|a| a.to_string())),
        ("Plus One", sub.plus_one().map(str::to_owned)),
        ("Dietary Notes", sub.dietary().map(str::to_owned)),
    ]
}

/// `Label: value` lines. Name, email and attendance are always present
/// (possibly as a placeholder); plus-one and dietary notes only when given.
pub fn plain_text(sub: &Submission) -> String {
    rows(sub)
        .into_iter()
        .enumerate()
        .filter_map(|(i, (label, value))| match (i < 3, value) {
            (_, Some(v)) => Some(format!("{label}: {v}")),
            (true, None) => Some(format!("{label}: {PLACEHOLDER}")),
            (false, None) => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A standalone HTML document with one table row per field. Values are
/// escaped.
pub fn html(sub: &Submission) -> String {
    let rows: String = rows(sub)
        .into_iter()
        .map(|(label, value)| {
            let value = value
                .as_deref()
                .map(encode_minimal)
                .unwrap_or_else(|| PLACEHOLDER.to_string());
            format!(
                r#"<tr><th align="left" style="{CELL_STYLE}">{label}</th><td style="{CELL_STYLE}">{value}</td></tr>"#
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
  <body style="font-family: Arial, sans-serif;">
    <p>You have received a new RSVP:</p>
    <table style="border-collapse: collapse;">{rows}</table>
  </body>
</html>"#
    )
}

/// `New RSVP submission from Jane`, or without the `from` part when the name
/// is unknown
pub fn default_subject(
    form_name: &str,
    sub: &Submission,
) -> String {
    let form_name = form_name.to_uppercase();
    match &sub.name {
        Some(name) => format!("New {form_name} submission from {name}"),
        None => format!("New {form_name} submission"),
    }
}

/// Build the notification for one submission. The configured subject, if
/// any, wins over the default one.
pub fn compose(
    sub: &Submission,
    settings: &SmtpSettings,
    form_name: &str,
) -> Email {
    Email {
        from_name: SENDER_NAME.to_string(),
        from: settings.username.clone(),
        to: settings.recipient.clone(),
        reply_to: sub.reply_to(),
        subject: settings
            .subject
            .clone()
            .unwrap_or_else(|| default_subject(form_name, sub)),
        text: plain_text(sub),
        html: html(sub),
    }
}
