use thiserror::Error;

use crate::dispatch::{DispatchError, SubmissionDispatcher};
use crate::domain::submission::{ContactSubmission, Submission};
use crate::toast::{ToastBus, ToastSeverity};
use crate::validate::{well_formed_email, FieldFailure};

const CONTACT_INVALID_MESSAGE: &str = "Please fill in all required fields.";
const CONTACT_SUCCESS_MESSAGE: &str = "Thank you! Message sent to Roy and the team.";
pub const CONTACT_FAILURE_MESSAGE: &str = "Failed to send message. Please try calling us directly.";

/// Raw input of the single-step contact form. The contact number carries no
/// validators, matching the website form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub full_name: String,
    pub email: String,
    pub contact_number: String,
    pub message: String,
    touched: bool,
}

impl ContactForm {
    pub fn parse(&self) -> Result<ContactSubmission, Vec<FieldFailure>> {
        let mut failures = Vec::new();

        if self.full_name.trim().is_empty() {
            failures.push(FieldFailure::MissingValue { field: "fullName" });
        }
        if self.email.trim().is_empty() {
            failures.push(FieldFailure::MissingValue { field: "email" });
        } else if !well_formed_email(&self.email) {
            failures.push(FieldFailure::InvalidEmail { field: "email" });
        }
        if self.message.trim().is_empty() {
            failures.push(FieldFailure::MissingValue { field: "message" });
        }

        if !failures.is_empty() {
            return Err(failures);
        }

        Ok(ContactSubmission {
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_string(),
            contact_number: self.contact_number.trim().to_string(),
            message: self.message.trim().to_string(),
        })
    }

    pub fn mark_all_touched(&mut self) {
        self.touched = true;
    }

    pub fn touched(&self) -> bool {
        self.touched
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("contact form failed validation: {failures:?}")]
    Invalid { failures: Vec<FieldFailure> },
    #[error("a submission is already in flight")]
    SubmissionInFlight,
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Single-step counterpart of the quote wizard: validate, dispatch, toast.
pub struct ContactFlow<D> {
    pub form: ContactForm,
    submitting: bool,
    toasts: ToastBus,
    dispatcher: D,
}

impl<D: SubmissionDispatcher> ContactFlow<D> {
    pub fn new(dispatcher: D, toasts: ToastBus) -> Self {
        Self { form: ContactForm::default(), submitting: false, toasts, dispatcher }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub async fn submit(&mut self) -> Result<(), ContactError> {
        if self.submitting {
            return Err(ContactError::SubmissionInFlight);
        }

        let submission = match self.form.parse() {
            Ok(contact) => Submission::Contact(contact),
            Err(failures) => {
                self.form.mark_all_touched();
                self.toasts.show(CONTACT_INVALID_MESSAGE, ToastSeverity::Error).await;
                return Err(ContactError::Invalid { failures });
            }
        };

        self.submitting = true;
        match self.dispatcher.dispatch(&submission).await {
            Ok(()) => {
                self.submitting = false;
                self.form.reset();
                self.toasts.show(CONTACT_SUCCESS_MESSAGE, ToastSeverity::Success).await;
                Ok(())
            }
            Err(error) => {
                self.submitting = false;
                self.toasts.show(CONTACT_FAILURE_MESSAGE, ToastSeverity::Error).await;
                Err(error.into())
            }
        }
    }
}
