use std::fmt::Debug;

use actix_web::http::header;
use actix_web::http::StatusCode;
use actix_web::web;
use actix_web::HttpResponse;
use actix_web::ResponseError;
use serde::Serialize;

use super::error_chain_fmt;
use crate::configuration::MissingConfiguration;
use crate::configuration::SmtpEnv;
use crate::domain::Submission;
use crate::email_client::MailError;
use crate::email_client::MailTransport;
use crate::notification::compose;
use crate::notification::DEFAULT_FORM_NAME;

/// Largest accepted request body. A real RSVP is a few hundred bytes.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Body of every `/rsvp` and `/submission-created` response except 405
#[derive(Serialize)]
pub struct DeliveryStatus {
    pub delivered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Everything that can go wrong with a submission. All of them are terminal
/// for the request; the guest retries from the page.
#[derive(thiserror::Error)]
pub enum RsvpError {
    #[error(transparent)]
    MissingConfiguration(#[from] MissingConfiguration),
    #[error("Missing request body")]
    MissingBody,
    #[error("Request body exceeds {MAX_BODY_BYTES} bytes")]
    BodyTooLarge,
    #[error("Failed to read request body")]
    Payload(#[source] actix_web::Error),
    #[error("Malformed request body: {0}")]
    MalformedBody(#[source] serde_json::Error),
    #[error(transparent)]
    Delivery(#[from] MailError),
}

impl Debug for RsvpError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for RsvpError {
    fn status_code(&self) -> StatusCode { StatusCode::INTERNAL_SERVER_ERROR }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(DeliveryStatus {
            delivered: false,
            message: Some(self.to_string()),
        })
    }
}

/// Any method other than `POST` on the submission endpoints
pub async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed()
        .insert_header((header::ALLOW, "POST"))
        .json(serde_json::json!({ "message": "Method Not Allowed" }))
}

/// Shared by both submission endpoints: validate config, parse, compose,
/// deliver once.
///
/// `extract` turns the raw (non-empty) body into the submission and the form
/// name; a config error is reported before anything about the body.
///
/// The body is collected here rather than by an extractor, so that an
/// oversized body fails like every other bad body, with our 500 JSON, instead
/// of actix's plain-text 413.
pub async fn notify(
    payload: web::Payload,
    smtp_env: &SmtpEnv,
    transport: &dyn MailTransport,
    extract: impl FnOnce(&[u8]) -> Result<(Submission, String), serde_json::Error>,
) -> Result<HttpResponse, RsvpError> {
    // drained up front so the connection is left clean whichever error wins
    let body = payload.to_bytes_limited(MAX_BODY_BYTES).await;

    let settings = smtp_env.validate()?;

    let body = body
        .map_err(|_| RsvpError::BodyTooLarge)?
        .map_err(RsvpError::Payload)?;

    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(RsvpError::MissingBody);
    }

    let (submission, form_name) = extract(&body).map_err(RsvpError::MalformedBody)?;

    let span = tracing::Span::current();
    span.record(
        "guest_name",
        tracing::field::debug(&submission.name),
    );
    span.record(
        "guest_email",
        tracing::field::debug(&submission.email),
    );
    span.record(
        "attendance",
        tracing::field::debug(&submission.attendance),
    );

    let email = compose(&submission, &settings, &form_name);
    transport.deliver(&settings, &email).await?;

    tracing::info!(recipient = %email.to, "RSVP email sent");

    Ok(HttpResponse::Ok().json(DeliveryStatus {
        delivered: true,
        message: None,
    }))
}

/// `POST /rsvp`
///
/// The body is read raw rather than through `web::Json`, so that an empty or
/// malformed body produces our own 500 JSON instead of actix's 400.
///
/// # Request example
///
/// ```sh
///     curl -i -H 'Content-Type: application/json' \
///         --data '{"name":"Jane","email":"jane@example.com","attendance":"accept","plusOne":"John"}' \
///         http://127.0.0.1:8000/rsvp
/// ```
#[tracing::instrument(
    name = "Relaying RSVP",
    skip_all,
    fields(
        guest_name = tracing::field::Empty,
        guest_email = tracing::field::Empty,
        attendance = tracing::field::Empty,
    ),
    err
)]
pub async fn rsvp(
    payload: web::Payload,
    smtp_env: web::Data<SmtpEnv>,
    transport: web::Data<dyn MailTransport>,
) -> Result<HttpResponse, RsvpError> {
    notify(payload, &smtp_env, transport.get_ref(), |body| {
        Ok((serde_json::from_slice(body)?, DEFAULT_FORM_NAME.to_string()))
    })
    .await
}
