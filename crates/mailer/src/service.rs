use std::sync::Arc;
use std::time::Duration;

use palmsure_core::config::EmailConfig;
use palmsure_core::Submission;
use thiserror::Error;
use tracing::info;

use crate::message::{DeliveryReceipt, EmailMessage};
use crate::render::{EmailRenderer, RenderError};
use crate::transport::{MailTransport, NoopMailTransport, ResendTransport, TransportError};

#[derive(Debug, Error)]
pub enum MailerError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Assembles the notification email for a submission and hands it to the
/// transport. Every submission goes to the fixed contact + admin recipient
/// pair with the submitter's address as reply-to.
pub struct Mailer {
    transport: Arc<dyn MailTransport>,
    renderer: EmailRenderer,
    sender: String,
    recipients: Vec<String>,
}

impl Mailer {
    /// Picks the transport from configuration: Resend when an API key is
    /// present, the acknowledging noop otherwise.
    pub fn from_config(config: &EmailConfig) -> Result<Self, MailerError> {
        let transport: Arc<dyn MailTransport> = match &config.api_key {
            Some(api_key) => Arc::new(ResendTransport::new(
                &config.api_base_url,
                api_key.clone(),
                Duration::from_secs(config.timeout_secs),
            )?),
            None => Arc::new(NoopMailTransport),
        };
        Ok(Self::with_transport(config, transport))
    }

    pub fn with_transport(config: &EmailConfig, transport: Arc<dyn MailTransport>) -> Self {
        Self {
            transport,
            renderer: EmailRenderer::new(),
            sender: config.sender.clone(),
            recipients: vec![config.contact_recipient.clone(), config.admin_recipient.clone()],
        }
    }

    pub fn with_renderer(mut self, renderer: EmailRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn transport_mode(&self) -> &'static str {
        self.transport.mode()
    }

    /// Readiness probe for the health endpoint: proves the template set
    /// renders without touching the transport.
    pub fn probe(&self) -> Result<(), MailerError> {
        self.renderer.probe().map_err(Into::into)
    }

    pub async fn send_submission(
        &self,
        submission: &Submission,
        correlation_id: &str,
    ) -> Result<DeliveryReceipt, MailerError> {
        let message = EmailMessage {
            from: self.sender.clone(),
            to: self.recipients.clone(),
            subject: submission.subject(),
            html_body: self.renderer.render(submission)?,
            reply_to: submission.reply_to().to_string(),
        };

        info!(
            event_name = "mail.dispatch.start",
            correlation_id = %correlation_id,
            kind = submission.kind(),
            subject = %message.subject,
            "dispatching submission email"
        );

        let receipt = self.transport.deliver(&message).await?;

        info!(
            event_name = "mail.dispatch.delivered",
            correlation_id = %correlation_id,
            provider_id = %receipt.id,
            "submission email delivered"
        );

        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use palmsure_core::config::AppConfig;
    use palmsure_core::{
        ContactSubmission, PersonalDetails, PropertyDetails, QuoteDetails, QuoteSubmission,
        Submission,
    };
    use rust_decimal::Decimal;

    use super::{Mailer, MailerError};
    use crate::transport::{RecordingMailTransport, TransportError};

    fn jane_doe() -> Submission {
        Submission::Contact(ContactSubmission {
            full_name: "Jane Doe".to_string(),
            email: "jane@x.com".to_string(),
            contact_number: "0821234567".to_string(),
            message: "Hello".to_string(),
        })
    }

    fn mailer_with(transport: Arc<RecordingMailTransport>) -> Mailer {
        Mailer::with_transport(&AppConfig::default().email, transport)
    }

    #[tokio::test]
    async fn contact_submission_builds_the_expected_email() {
        let transport = Arc::new(RecordingMailTransport::default());
        let mailer = mailer_with(transport.clone());

        let receipt =
            mailer.send_submission(&jane_doe(), "req-1").await.expect("delivery succeeds");
        assert_eq!(receipt.id, "recorded-1");

        let sent = transport.sent().await;
        assert_eq!(sent.len(), 1);
        let message = &sent[0];
        assert_eq!(message.subject, "New Web Inquiry: Jane Doe");
        assert_eq!(message.reply_to, "jane@x.com");
        assert_eq!(
            message.to,
            vec!["info@palmshore.co.za".to_string(), "roy@palmshore.co.za".to_string()]
        );
        assert!(message.html_body.contains("jane@x.com"));
        assert!(message.html_body.contains("0821234567"));
        assert!(message.html_body.contains("Hello"));
    }

    #[tokio::test]
    async fn property_quote_addresses_reply_to_the_applicant() {
        let transport = Arc::new(RecordingMailTransport::default());
        let mailer = mailer_with(transport.clone());

        let submission = Submission::Quote(QuoteSubmission {
            personal: PersonalDetails {
                first_name: "Sam".to_string(),
                last_name: "Nkosi".to_string(),
                email: "sam@x.com".to_string(),
                phone: "021 555 0000".to_string(),
            },
            details: QuoteDetails::Property(PropertyDetails {
                address: "12 Main Rd".to_string(),
                value: Decimal::from(850_000),
            }),
        });

        mailer.send_submission(&submission, "req-2").await.expect("delivery succeeds");

        let sent = transport.sent().await;
        let message = &sent[0];
        assert_eq!(message.subject, "New Quote Request (property) - Sam Nkosi");
        assert_eq!(message.reply_to, "sam@x.com");
        assert!(message.html_body.contains("12 Main Rd"));
        assert!(!message.html_body.contains("Vehicle:"));
    }

    #[tokio::test]
    async fn transport_failure_surfaces_without_a_retry() {
        let transport = Arc::new(RecordingMailTransport::failing(TransportError::Request(
            "connection reset".to_string(),
        )));
        let mailer = mailer_with(transport.clone());

        let error = mailer.send_submission(&jane_doe(), "req-3").await.expect_err("delivery fails");
        assert!(matches!(error, MailerError::Transport(TransportError::Request(_))));
        assert!(transport.sent().await.is_empty());
    }

    #[test]
    fn transport_mode_follows_the_api_key() {
        let mut config = AppConfig::default().email;
        let mailer = Mailer::from_config(&config).expect("mailer builds");
        assert_eq!(mailer.transport_mode(), "noop");

        config.api_key = Some("re_test_key".to_string().into());
        let mailer = Mailer::from_config(&config).expect("mailer builds");
        assert_eq!(mailer.transport_mode(), "resend");
    }
}
