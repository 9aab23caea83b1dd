use serde::Serialize;

use crate::domain::category::Category;
use crate::validate::FieldFailure;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum WizardStep {
    SelectCategory,
    PersonalDetails,
    CategoryDetails,
    Confirmation,
}

impl WizardStep {
    /// One-based screen number, as the progress indicator shows it.
    pub fn number(&self) -> u8 {
        match self {
            Self::SelectCategory => 1,
            Self::PersonalDetails => 2,
            Self::CategoryDetails => 3,
            Self::Confirmation => 4,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum WizardEvent {
    NextRequested,
    BackRequested,
    SubmitRequested,
    SubmissionAccepted,
    SubmissionFailed,
}

/// Validation snapshot the transition function consults. Failure lists are
/// empty when the corresponding form parses cleanly.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct WizardContext {
    pub category: Option<Category>,
    pub personal_failures: Vec<FieldFailure>,
    pub details_failures: Vec<FieldFailure>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum WizardAction {
    DispatchSubmission,
    ResetForms,
    ScrollToTop,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TransitionOutcome {
    pub from: WizardStep,
    pub to: WizardStep,
    pub event: WizardEvent,
    pub actions: Vec<WizardAction>,
}
