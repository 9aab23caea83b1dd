use async_trait::async_trait;
use thiserror::Error;

use crate::domain::submission::Submission;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("submission transport failed: {0}")]
    Transport(String),
    #[error("submission rejected with status {status}")]
    Rejected { status: u16 },
}

/// Seam between the form flows and the notification endpoint. The production
/// implementation posts the submission envelope over HTTP; tests substitute
/// recording or failing doubles.
#[async_trait]
pub trait SubmissionDispatcher: Send + Sync {
    async fn dispatch(&self, submission: &Submission) -> Result<(), DispatchError>;
}
