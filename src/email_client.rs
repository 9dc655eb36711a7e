use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::MultiPart;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::Tls;
use lettre::transport::smtp::client::TlsParameters;
use lettre::Address;
use lettre::AsyncSmtpTransport;
use lettre::AsyncTransport;
use lettre::Message;
use lettre::Tokio1Executor;
use secrecy::ExposeSecret;

use crate::configuration::SmtpSettings;
use crate::domain::GuestEmail;

/// A fully composed notification, independent of how it is delivered
#[derive(Debug, Clone)]
pub struct Email {
    /// Display name of the sender
    pub from_name: String,
    pub from: String,
    pub to: String,
    pub reply_to: Option<GuestEmail>,
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
    #[error("Failed to build message: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("Failed to deliver message: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Something that can deliver an `Email` given the mail settings of the
/// current request. `SmtpMailTransport` in production; tests swap in a stub so
/// that no network is involved.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn deliver(
        &self,
        settings: &SmtpSettings,
        email: &Email,
    ) -> Result<(), MailError>;
}

/// Delivers through an authenticated SMTP relay with `lettre`.
///
/// The relay connection is built per delivery from the request's
/// `SmtpSettings`; there is at most one delivery per request, so there is
/// nothing to pool.
#[derive(Debug, Default, Clone)]
pub struct SmtpMailTransport;

fn mailbox(
    name: Option<String>,
    address: &str,
) -> Result<Mailbox, MailError> {
    let address: Address = address
        .parse()
        .map_err(|_| MailError::InvalidAddress(address.to_string()))?;
    Ok(Mailbox::new(name, address))
}

impl SmtpMailTransport {
    /// `multipart/alternative`, plaintext first so that HTML-capable clients
    /// prefer the HTML part
    pub fn build_message(email: &Email) -> Result<Message, MailError> {
        let mut builder = Message::builder()
            .from(mailbox(Some(email.from_name.clone()), &email.from)?)
            .to(mailbox(None, &email.to)?)
            .subject(&email.subject);

        if let Some(reply_to) = &email.reply_to {
            builder = builder.reply_to(mailbox(None, reply_to.as_ref())?);
        }

        let message = builder.multipart(MultiPart::alternative_plain_html(
            email.text.clone(),
            email.html.clone(),
        ))?;
        Ok(message)
    }

    fn relay(settings: &SmtpSettings) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailError> {
        let builder = match settings.secure {
            // TLS from the first byte, usually port 465
            true => AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)?,
            // plaintext, upgraded with STARTTLS if the relay offers it
            false => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host).tls(
                Tls::Opportunistic(TlsParameters::new(settings.host.clone())?),
            ),
        };

        Ok(builder
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.expose_secret().clone(),
            ))
            .build())
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    #[tracing::instrument(
        name = "Delivering notification over SMTP",
        skip_all,
        fields(
            smtp_host = %settings.host,
            smtp_port = settings.port,
            secure = settings.secure,
            recipient = %email.to,
        )
    )]
    async fn deliver(
        &self,
        settings: &SmtpSettings,
        email: &Email,
    ) -> Result<(), MailError> {
        let message = Self::build_message(email)?;
        let response = Self::relay(settings)?.send(message).await?;
        tracing::info!(code = %response.code(), "notification accepted by relay");
        Ok(())
    }
}
