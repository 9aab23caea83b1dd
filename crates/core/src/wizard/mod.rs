pub mod controller;
pub mod engine;
pub mod forms;
pub mod states;

pub use controller::{QuoteWizard, WizardError};
pub use engine::{transition, WizardTransitionError};
pub use forms::{BusinessForm, PersonalForm, PropertyForm, VehicleForm};
pub use states::{TransitionOutcome, WizardAction, WizardContext, WizardEvent, WizardStep};
