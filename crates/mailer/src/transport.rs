use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

use crate::message::{DeliveryReceipt, EmailMessage};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("email api request failed: {0}")]
    Request(String),
    #[error("email api rejected the message: status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("email api returned an unreadable response: {0}")]
    InvalidResponse(String),
}

/// Delivery seam of the mailer. One implementation per deployment mode.
#[async_trait]
pub trait MailTransport: Send + Sync {
    fn mode(&self) -> &'static str;
    async fn deliver(&self, message: &EmailMessage) -> Result<DeliveryReceipt, TransportError>;
}

/// JSON body of Resend's `POST /emails`.
#[derive(Debug, Serialize)]
struct SendEmailPayload<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: &'a str,
    reply_to: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendEmailAck {
    id: String,
}

pub struct ResendTransport {
    client: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
}

impl ResendTransport {
    pub fn new(
        api_base_url: &str,
        api_key: SecretString,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| TransportError::Request(error.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/emails", api_base_url.trim_end_matches('/')),
            api_key,
        })
    }
}

#[async_trait]
impl MailTransport for ResendTransport {
    fn mode(&self) -> &'static str {
        "resend"
    }

    async fn deliver(&self, message: &EmailMessage) -> Result<DeliveryReceipt, TransportError> {
        let payload = SendEmailPayload {
            from: &message.from,
            to: &message.to,
            subject: &message.subject,
            html: &message.html_body,
            reply_to: &message.reply_to,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&payload)
            .send()
            .await
            .map_err(|error| TransportError::Request(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Rejected { status: status.as_u16(), body });
        }

        let ack: SendEmailAck = response
            .json()
            .await
            .map_err(|error| TransportError::InvalidResponse(error.to_string()))?;

        Ok(DeliveryReceipt { id: ack.id })
    }
}

/// Stands in when no API key is configured: acknowledges every message
/// without sending anything.
#[derive(Default)]
pub struct NoopMailTransport;

#[async_trait]
impl MailTransport for NoopMailTransport {
    fn mode(&self) -> &'static str {
        "noop"
    }

    async fn deliver(&self, message: &EmailMessage) -> Result<DeliveryReceipt, TransportError> {
        info!(
            event_name = "mail.transport.noop",
            subject = %message.subject,
            "noop transport dropped an outbound email"
        );
        Ok(DeliveryReceipt { id: "noop".to_string() })
    }
}

/// Test double: captures every delivered message, or fails each call with a
/// configured error.
#[derive(Default)]
pub struct RecordingMailTransport {
    sent: Mutex<Vec<EmailMessage>>,
    failure: Option<TransportError>,
}

impl RecordingMailTransport {
    pub fn failing(failure: TransportError) -> Self {
        Self { failure: Some(failure), ..Self::default() }
    }

    pub async fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl MailTransport for RecordingMailTransport {
    fn mode(&self) -> &'static str {
        "recording"
    }

    async fn deliver(&self, message: &EmailMessage) -> Result<DeliveryReceipt, TransportError> {
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        let mut sent = self.sent.lock().await;
        sent.push(message.clone());
        Ok(DeliveryReceipt { id: format!("recorded-{}", sent.len()) })
    }
}
