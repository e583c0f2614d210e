//! Submission dispatch: honeypot and required-field checks, message
//! composition, the send, and the outcome redirect.

use crate::config::FormSettings;
use crate::event::{Outcome, Redirect};
use crate::form::FieldSet;
use crate::mailer::{Mailer, OutboundMessage};
use crate::mime::encoded_word;

/// A field counts as present only when non-empty.
fn field<'a>(fields: &'a FieldSet, name: &str) -> Option<&'a str> {
    fields
        .get(name)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
}

/// Reply-To for the outbound email: `"<encoded name> <email>"` when a name
/// was given, bare address otherwise.
fn reply_to(name: Option<&str>, email: &str) -> String {
    match name {
        Some(name) => format!("{} <{}>", encoded_word(name), email),
        None => email.to_string(),
    }
}

/// Run one validated submission through the pipeline. Exactly one terminal
/// per call: honeypot drop, error redirect, `#sent`, or `#fail`. The response
/// waits for the send outcome; there are no retries.
pub async fn handle_submission(
    settings: &FormSettings,
    mailer: &dyn Mailer,
    fields: &FieldSet,
) -> Outcome {
    if let Some(trap) = settings.honeypot.as_deref() {
        if field(fields, trap).is_some() {
            log::info!("bot trapped in honeypot");
            return Outcome::Drop;
        }
    }

    // Missing-field codes are collected in fixed order so combined fragments
    // stay stable for the confirmation page.
    let mut missing = Vec::new();
    let email = field(fields, "email");
    if email.is_none() {
        missing.push("no-email");
    }
    let message = field(fields, "message");
    if message.is_none() {
        missing.push("no-message");
    }
    let (Some(email), Some(message)) = (email, message) else {
        return Outcome::Redirect(Redirect::to(
            &settings.redirect_url,
            Some(&missing.join(",")),
        ));
    };

    let outbound = OutboundMessage {
        from: settings.from.clone(),
        to: settings.to.clone(),
        reply_to: reply_to(field(fields, "name"), email),
        subject: settings.subject.clone(),
        body: message.to_string(),
    };
    match mailer.send(&outbound).await {
        Ok(()) => Outcome::Redirect(Redirect::to(&settings.redirect_url, Some("sent"))),
        Err(detail) => {
            // Provider detail goes to the logs only; the submitter just sees #fail.
            log::error!("sending email via relay failed: {}", detail);
            Outcome::Redirect(Redirect::to(&settings.redirect_url, Some("fail")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const BASE: &str = "https://example.com/contact/";

    struct RecordingMailer {
        sent: Mutex<Vec<OutboundMessage>>,
        fail: bool,
    }

    impl RecordingMailer {
        fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn sent(&self) -> Vec<OutboundMessage> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, message: &OutboundMessage) -> Result<(), String> {
            self.sent.lock().unwrap().push(message.clone());
            if self.fail {
                Err("relay refused the message".to_string())
            } else {
                Ok(())
            }
        }
    }

    fn settings(honeypot: Option<&str>) -> FormSettings {
        FormSettings {
            redirect_url: BASE.to_string(),
            from: "relay@example.com".to_string(),
            to: "inbox@example.com".to_string(),
            subject: "Website question".to_string(),
            honeypot: honeypot.map(String::from),
        }
    }

    fn fields(pairs: &[(&str, &str)]) -> FieldSet {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn location(outcome: &Outcome) -> &str {
        match outcome {
            Outcome::Redirect(r) => &r.location,
            Outcome::Drop => panic!("expected a redirect, got Drop"),
        }
    }

    #[tokio::test]
    async fn valid_submission_sends_and_redirects_sent() {
        let mailer = RecordingMailer::new();
        let outcome = handle_submission(
            &settings(None),
            &mailer,
            &fields(&[("email", "a@b.com"), ("message", "hi")]),
        )
        .await;
        assert_eq!(location(&outcome), "https://example.com/contact/#sent");
        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].reply_to, "a@b.com");
        assert_eq!(sent[0].body, "hi");
        assert_eq!(sent[0].from, "relay@example.com");
        assert_eq!(sent[0].to, "inbox@example.com");
        assert_eq!(sent[0].subject, "Website question");
    }

    #[tokio::test]
    async fn name_is_mime_encoded_in_reply_to() {
        let mailer = RecordingMailer::new();
        handle_submission(
            &settings(None),
            &mailer,
            &fields(&[("email", "a@b.com"), ("message", "hi"), ("name", "A B")]),
        )
        .await;
        assert_eq!(mailer.sent()[0].reply_to, "=?utf-8?b?QSBC?= <a@b.com>");
    }

    #[tokio::test]
    async fn missing_email_redirects_without_sending() {
        let mailer = RecordingMailer::new();
        let outcome =
            handle_submission(&settings(None), &mailer, &fields(&[("message", "hi")])).await;
        assert_eq!(location(&outcome), "https://example.com/contact/#no-email");
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn missing_message_redirects_without_sending() {
        let mailer = RecordingMailer::new();
        let outcome =
            handle_submission(&settings(None), &mailer, &fields(&[("email", "a@b.com")])).await;
        assert_eq!(
            location(&outcome),
            "https://example.com/contact/#no-message"
        );
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn missing_both_fields_joins_codes_in_fixed_order() {
        let mailer = RecordingMailer::new();
        let outcome = handle_submission(&settings(None), &mailer, &fields(&[])).await;
        assert_eq!(
            location(&outcome),
            "https://example.com/contact/#no-email,no-message"
        );
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn empty_field_values_count_as_missing() {
        let mailer = RecordingMailer::new();
        let outcome = handle_submission(
            &settings(None),
            &mailer,
            &fields(&[("email", ""), ("message", "")]),
        )
        .await;
        assert_eq!(
            location(&outcome),
            "https://example.com/contact/#no-email,no-message"
        );
    }

    #[tokio::test]
    async fn populated_honeypot_drops_silently() {
        let mailer = RecordingMailer::new();
        let outcome = handle_submission(
            &settings(Some("bot_field")),
            &mailer,
            &fields(&[("bot_field", "1"), ("email", "a@b.com"), ("message", "hi")]),
        )
        .await;
        assert_eq!(outcome, Outcome::Drop);
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn empty_honeypot_value_is_not_a_trap() {
        let mailer = RecordingMailer::new();
        let outcome = handle_submission(
            &settings(Some("bot_field")),
            &mailer,
            &fields(&[("bot_field", ""), ("email", "a@b.com"), ("message", "hi")]),
        )
        .await;
        assert_eq!(location(&outcome), "https://example.com/contact/#sent");
        assert_eq!(mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn provider_failure_redirects_fail() {
        let mailer = RecordingMailer::failing();
        let outcome = handle_submission(
            &settings(None),
            &mailer,
            &fields(&[("email", "a@b.com"), ("message", "hi")]),
        )
        .await;
        assert_eq!(location(&outcome), "https://example.com/contact/#fail");
        // The provider was still invoked once; failure is absorbed, not retried.
        assert_eq!(mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn repeated_submissions_send_twice() {
        let mailer = RecordingMailer::new();
        let fields = fields(&[("email", "a@b.com"), ("message", "hi")]);
        handle_submission(&settings(None), &mailer, &fields).await;
        handle_submission(&settings(None), &mailer, &fields).await;
        assert_eq!(mailer.sent().len(), 2);
    }
}
