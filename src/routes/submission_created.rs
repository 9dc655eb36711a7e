use actix_web::web;
use actix_web::HttpResponse;
use serde::Deserialize;

use super::notify;
use super::RsvpError;
use crate::configuration::SmtpEnv;
use crate::domain::Submission;
use crate::email_client::MailTransport;
use crate::notification::DEFAULT_FORM_NAME;

/// What the form platform posts after a form is submitted. The submission sits
/// under `payload.data`, or directly under `data` when the event is
/// forwarded without its outer wrapper.
#[derive(Debug, Deserialize)]
pub struct SubmissionEvent {
    payload: Option<FormPayload>,
    #[serde(flatten)]
    inline: FormPayload,
}

#[derive(Debug, Deserialize, Default)]
struct FormPayload {
    form_name: Option<String>,
    data: Option<Submission>,
}

impl SubmissionEvent {
    /// The wrapped payload wins over the inline one, field by field
    pub fn into_parts(self) -> (Submission, String) {
        let payload = self.payload.unwrap_or_default();
        let submission = payload.data.or(self.inline.data).unwrap_or_default();
        let form_name = payload
            .form_name
            .or(self.inline.form_name)
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FORM_NAME.to_string());
        (submission, form_name)
    }
}

/// `POST /submission-created`
///
/// Webhook variant of `/rsvp` for when the page's form is handled by the
/// hosting platform, which then forwards each submission as an event. Same
/// validation order and responses as `/rsvp`.
#[tracing::instrument(
    name = "Relaying form submission event",
    skip_all,
    fields(
        guest_name = tracing::field::Empty,
        guest_email = tracing::field::Empty,
        attendance = tracing::field::Empty,
    ),
    err
)]
pub async fn submission_created(
    payload: web::Payload,
    smtp_env: web::Data<SmtpEnv>,
    transport: web::Data<dyn MailTransport>,
) -> Result<HttpResponse, RsvpError> {
    notify(payload, &smtp_env, transport.get_ref(), |body| {
        serde_json::from_slice::<SubmissionEvent>(body).map(SubmissionEvent::into_parts)
    })
    .await
}
