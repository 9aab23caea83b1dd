use thiserror::Error;

use crate::validate::FieldFailure;
use crate::wizard::states::{
    TransitionOutcome, WizardAction, WizardContext, WizardEvent, WizardStep,
};

#[derive(Clone, Debug, Error, PartialEq)]
pub enum WizardTransitionError {
    #[error("no insurance category selected")]
    CategoryNotSelected,
    #[error("personal details failed validation: {failures:?}")]
    InvalidPersonalDetails { failures: Vec<FieldFailure> },
    #[error("category details failed validation: {failures:?}")]
    InvalidCategoryDetails { failures: Vec<FieldFailure> },
    #[error("a submission is already in flight")]
    SubmissionInFlight,
    #[error("invalid transition from {step:?} using event {event:?}")]
    InvalidTransition { step: WizardStep, event: WizardEvent },
}

/// Pure transition function of the quote wizard. Steps only move one screen
/// at a time; the guarded forward moves consult the validation snapshot in
/// the context and reject with the failure list that should be surfaced
/// inline.
pub fn transition(
    current: &WizardStep,
    event: &WizardEvent,
    context: &WizardContext,
) -> Result<TransitionOutcome, WizardTransitionError> {
    use WizardAction::{DispatchSubmission, ResetForms, ScrollToTop};
    use WizardEvent::{
        BackRequested, NextRequested, SubmissionAccepted, SubmissionFailed, SubmitRequested,
    };
    use WizardStep::{CategoryDetails, Confirmation, PersonalDetails, SelectCategory};

    let (to, actions) = match (current, event) {
        (SelectCategory, NextRequested) => {
            if context.category.is_none() {
                return Err(WizardTransitionError::CategoryNotSelected);
            }
            (PersonalDetails, Vec::new())
        }
        (PersonalDetails, NextRequested) => {
            if !context.personal_failures.is_empty() {
                return Err(WizardTransitionError::InvalidPersonalDetails {
                    failures: context.personal_failures.clone(),
                });
            }
            (CategoryDetails, Vec::new())
        }
        (CategoryDetails, SubmitRequested) => {
            if !context.details_failures.is_empty() {
                return Err(WizardTransitionError::InvalidCategoryDetails {
                    failures: context.details_failures.clone(),
                });
            }
            (CategoryDetails, vec![DispatchSubmission])
        }
        (CategoryDetails, SubmissionAccepted) => (Confirmation, vec![ResetForms, ScrollToTop]),
        (CategoryDetails, SubmissionFailed) => (CategoryDetails, Vec::new()),
        (PersonalDetails, BackRequested) => (SelectCategory, Vec::new()),
        (CategoryDetails, BackRequested) => (PersonalDetails, Vec::new()),
        (Confirmation, BackRequested) => (CategoryDetails, Vec::new()),
        _ => {
            return Err(WizardTransitionError::InvalidTransition {
                step: *current,
                event: event.clone(),
            });
        }
    };

    Ok(TransitionOutcome { from: *current, to, event: event.clone(), actions })
}
