//! Outbound email: the composed message, the provider seam, and the SMTP
//! implementation.
//!
//! The `Mailer` trait keeps the dispatcher independent of the delivery
//! mechanism; tests inject a recording mailer, production uses SMTP.

mod smtp;

pub use smtp::SmtpMailer;

use async_trait::async_trait;

/// One outbound email, fully composed. Plain text only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub from: String,
    pub to: String,
    pub reply_to: String,
    pub subject: String,
    pub body: String,
}

/// Email-sending capability. One attempt per call, no retries; the error
/// string is provider detail for the logs, never for responses.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<(), String>;
}
