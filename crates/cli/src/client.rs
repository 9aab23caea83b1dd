use std::time::Duration;

use async_trait::async_trait;
use palmsure_core::dispatch::{DispatchError, SubmissionDispatcher};
use palmsure_core::Submission;
use serde_json::Value;

/// HTTP client for the notification endpoint. This is the stand-in for the
/// website's email service: one POST of the `{type, data}` envelope per
/// submission attempt.
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| DispatchError::Transport(error.to_string()))?;

        Ok(Self { base_url: base_url.into().trim_end_matches('/').to_string(), client })
    }

    pub async fn send(&self, submission: &Submission) -> Result<Value, DispatchError> {
        let response = self
            .client
            .post(format!("{}/api/send-email", self.base_url))
            .json(submission)
            .send()
            .await
            .map_err(|error| DispatchError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::Rejected { status: status.as_u16() });
        }

        response.json().await.map_err(|error| DispatchError::Transport(error.to_string()))
    }
}

#[async_trait]
impl SubmissionDispatcher for ApiClient {
    async fn dispatch(&self, submission: &Submission) -> Result<(), DispatchError> {
        self.send(submission).await.map(|_| ())
    }
}
