pub mod config;
pub mod contact;
pub mod dispatch;
pub mod domain;
pub mod errors;
pub mod toast;
pub mod validate;
pub mod wizard;

pub use contact::{ContactError, ContactFlow, ContactForm};
pub use dispatch::{DispatchError, SubmissionDispatcher};
pub use domain::category::Category;
pub use domain::submission::{
    BusinessDetails, ContactSubmission, PersonalDetails, PropertyDetails, QuoteDetails,
    QuoteSubmission, Submission, VehicleDetails,
};
pub use errors::{ApplicationError, InterfaceError};
pub use toast::{Toast, ToastBus, ToastSeverity};
pub use validate::{FieldFailure, QuoteFormRules};
pub use wizard::controller::{QuoteWizard, WizardError};
pub use wizard::engine::{transition, WizardTransitionError};
pub use wizard::forms::{BusinessForm, PersonalForm, PropertyForm, VehicleForm};
pub use wizard::states::{TransitionOutcome, WizardAction, WizardContext, WizardEvent, WizardStep};
