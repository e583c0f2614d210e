//! SMTP mailer: delivers through an async SMTP relay (e.g. AWS SES's SMTP endpoint).

use crate::config::SmtpSettings;
use crate::mailer::{Mailer, OutboundMessage};
use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::{Credentials, Mechanism},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

/// Mailer backed by a lettre async SMTP transport. Building it does not
/// connect; the connection is made per send.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Build a transport from the resolved settings. Credentials are only
    /// attached over smtps: a misconfigured plain URL then fails to
    /// authenticate instead of sending the password in the clear.
    pub fn new(settings: &SmtpSettings) -> Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::from_url(&settings.url)
            .with_context(|| format!("invalid smtp url {}", settings.url))?
            .authentication(vec![Mechanism::Plain]);
        if settings.url.starts_with("smtps://") {
            if let Some((username, password)) = &settings.credentials {
                builder =
                    builder.credentials(Credentials::new(username.clone(), password.clone()));
            }
        }
        Ok(Self {
            transport: builder.build(),
        })
    }

    fn build_email(message: &OutboundMessage) -> Result<Message, String> {
        let from: Mailbox = message
            .from
            .parse()
            .map_err(|e| format!("invalid from address {:?}: {}", message.from, e))?;
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|e| format!("invalid to address {:?}: {}", message.to, e))?;
        let reply_to: Mailbox = message
            .reply_to
            .parse()
            .map_err(|e| format!("invalid reply-to address {:?}: {}", message.reply_to, e))?;
        Message::builder()
            .from(from)
            .reply_to(reply_to)
            .to(to)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|e| format!("building email: {}", e))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: &OutboundMessage) -> Result<(), String> {
        let email = Self::build_email(message)?;
        self.transport
            .send(email)
            .await
            .map(|_| ())
            .map_err(|e| format!("smtp send failed: {}", e))
    }
}
