use thiserror::Error;

use crate::dispatch::{DispatchError, SubmissionDispatcher};
use crate::domain::category::Category;
use crate::domain::submission::{QuoteDetails, QuoteSubmission, Submission};
use crate::toast::{ToastBus, ToastSeverity};
use crate::validate::QuoteFormRules;
use crate::wizard::engine::{transition, WizardTransitionError};
use crate::wizard::forms::{BusinessForm, PersonalForm, PropertyForm, VehicleForm};
use crate::wizard::states::{WizardAction, WizardContext, WizardEvent, WizardStep};

const PERSONAL_DETAILS_MESSAGE: &str = "Please fill in all personal details.";
const MISSING_DETAILS_MESSAGE: &str = "Please fill in the missing details.";
const SUBMIT_SUCCESS_MESSAGE: &str = "Quote request sent successfully!";
pub const SUBMIT_FALLBACK_MESSAGE: &str = "Connection error. Please call 021 699 8370.";

#[derive(Debug, Error)]
pub enum WizardError {
    #[error(transparent)]
    Transition(#[from] WizardTransitionError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Session-scoped quote flow: owns the four screens' forms, the current step,
/// the in-flight flag, and the toast bus the front end renders from.
///
/// Validation failures keep the step where it is, mark the offending form
/// touched so inline errors show, and emit the matching error toast. A
/// delivery failure keeps the wizard on the details screen with no automatic
/// retry.
pub struct QuoteWizard<D> {
    step: WizardStep,
    category: Option<Category>,
    pub personal: PersonalForm,
    pub property: PropertyForm,
    pub vehicle: VehicleForm,
    pub business: BusinessForm,
    rules: QuoteFormRules,
    submitting: bool,
    scroll_reset_requested: bool,
    toasts: ToastBus,
    dispatcher: D,
}

impl<D: SubmissionDispatcher> QuoteWizard<D> {
    pub fn new(dispatcher: D, toasts: ToastBus) -> Self {
        Self::with_rules(dispatcher, toasts, QuoteFormRules::default())
    }

    pub fn with_rules(dispatcher: D, toasts: ToastBus, rules: QuoteFormRules) -> Self {
        Self {
            step: WizardStep::SelectCategory,
            category: None,
            personal: PersonalForm::default(),
            property: PropertyForm::default(),
            vehicle: VehicleForm::default(),
            business: BusinessForm::default(),
            rules,
            submitting: false,
            scroll_reset_requested: false,
            toasts,
            dispatcher,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn selected_category(&self) -> Option<Category> {
        self.category
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn select_category(&mut self, category: Category) {
        self.category = Some(category);
    }

    /// Consumes the pending scroll-to-top request raised when the
    /// confirmation screen is reached.
    pub fn take_scroll_reset(&mut self) -> bool {
        std::mem::take(&mut self.scroll_reset_requested)
    }

    pub async fn next(&mut self) -> Result<WizardStep, WizardTransitionError> {
        let context = self.context();
        match transition(&self.step, &WizardEvent::NextRequested, &context) {
            Ok(outcome) => {
                self.step = outcome.to;
                Ok(self.step)
            }
            Err(error) => {
                if matches!(error, WizardTransitionError::InvalidPersonalDetails { .. }) {
                    self.personal.mark_all_touched();
                    self.toasts.show(PERSONAL_DETAILS_MESSAGE, ToastSeverity::Error).await;
                }
                Err(error)
            }
        }
    }

    /// Moves one screen backward; a no-op on the first screen, as in the
    /// original flow.
    pub fn back(&mut self) -> WizardStep {
        if let Ok(outcome) = transition(&self.step, &WizardEvent::BackRequested, &self.context()) {
            self.step = outcome.to;
        }
        self.step
    }

    pub async fn submit(&mut self) -> Result<WizardStep, WizardError> {
        if self.submitting {
            return Err(WizardTransitionError::SubmissionInFlight.into());
        }

        let context = self.context();
        let outcome = match transition(&self.step, &WizardEvent::SubmitRequested, &context) {
            Ok(outcome) => outcome,
            Err(error) => {
                if matches!(error, WizardTransitionError::InvalidCategoryDetails { .. }) {
                    self.mark_active_details_touched();
                    self.toasts.show(MISSING_DETAILS_MESSAGE, ToastSeverity::Error).await;
                }
                return Err(error.into());
            }
        };
        debug_assert!(outcome.actions.contains(&WizardAction::DispatchSubmission));

        let submission = self.build_submission()?;
        self.submitting = true;

        match self.dispatcher.dispatch(&submission).await {
            Ok(()) => {
                self.submitting = false;
                let accepted = transition(&self.step, &WizardEvent::SubmissionAccepted, &context)?;
                self.step = accepted.to;
                for action in &accepted.actions {
                    match action {
                        WizardAction::ResetForms => self.reset_forms(),
                        WizardAction::ScrollToTop => self.scroll_reset_requested = true,
                        WizardAction::DispatchSubmission => {}
                    }
                }
                self.toasts.show(SUBMIT_SUCCESS_MESSAGE, ToastSeverity::Success).await;
                Ok(self.step)
            }
            Err(error) => {
                self.submitting = false;
                let _ = transition(&self.step, &WizardEvent::SubmissionFailed, &context);
                self.toasts.show(SUBMIT_FALLBACK_MESSAGE, ToastSeverity::Error).await;
                Err(error.into())
            }
        }
    }

    fn context(&self) -> WizardContext {
        WizardContext {
            category: self.category,
            personal_failures: self.personal.parse().err().unwrap_or_default(),
            details_failures: self.details_failures(),
        }
    }

    fn details_failures(&self) -> Vec<crate::validate::FieldFailure> {
        match self.category {
            Some(Category::Property) => self.property.parse(&self.rules).err().unwrap_or_default(),
            Some(Category::Vehicle) => self.vehicle.parse(&self.rules).err().unwrap_or_default(),
            Some(Category::Business) => self.business.parse(&self.rules).err().unwrap_or_default(),
            None => Vec::new(),
        }
    }

    fn mark_active_details_touched(&mut self) {
        match self.category {
            Some(Category::Property) => self.property.mark_all_touched(),
            Some(Category::Vehicle) => self.vehicle.mark_all_touched(),
            Some(Category::Business) => self.business.mark_all_touched(),
            None => {}
        }
    }

    fn reset_forms(&mut self) {
        self.personal.reset();
        match self.category {
            Some(Category::Property) => self.property.reset(),
            Some(Category::Vehicle) => self.vehicle.reset(),
            Some(Category::Business) => self.business.reset(),
            None => {}
        }
    }

    fn build_submission(&self) -> Result<Submission, WizardTransitionError> {
        let Some(category) = self.category else {
            return Err(WizardTransitionError::CategoryNotSelected);
        };
        let personal = self
            .personal
            .parse()
            .map_err(|failures| WizardTransitionError::InvalidPersonalDetails { failures })?;
        let details = match category {
            Category::Property => QuoteDetails::Property(
                self.property
                    .parse(&self.rules)
                    .map_err(|failures| WizardTransitionError::InvalidCategoryDetails { failures })?,
            ),
            Category::Vehicle => QuoteDetails::Vehicle(
                self.vehicle
                    .parse(&self.rules)
                    .map_err(|failures| WizardTransitionError::InvalidCategoryDetails { failures })?,
            ),
            Category::Business => QuoteDetails::Business(
                self.business
                    .parse(&self.rules)
                    .map_err(|failures| WizardTransitionError::InvalidCategoryDetails { failures })?,
            ),
        };

        Ok(Submission::Quote(QuoteSubmission { personal, details }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::{QuoteWizard, WizardError, SUBMIT_FALLBACK_MESSAGE};
    use crate::dispatch::{DispatchError, SubmissionDispatcher};
    use crate::domain::category::Category;
    use crate::domain::submission::Submission;
    use crate::toast::{ToastBus, ToastSeverity};
    use crate::wizard::engine::WizardTransitionError;
    use crate::wizard::states::WizardStep;

    #[derive(Clone, Default)]
    struct StubDispatcher {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl StubDispatcher {
        fn failing() -> Self {
            Self { fail: true, ..Self::default() }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SubmissionDispatcher for StubDispatcher {
        async fn dispatch(&self, _submission: &Submission) -> Result<(), DispatchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DispatchError::Transport("connection refused".to_string()));
            }
            Ok(())
        }
    }

    fn filled_vehicle_wizard(dispatcher: StubDispatcher, toasts: ToastBus) -> QuoteWizard<StubDispatcher> {
        let mut wizard = QuoteWizard::new(dispatcher, toasts);
        wizard.select_category(Category::Vehicle);
        wizard.personal.first_name = "Sam".to_string();
        wizard.personal.last_name = "Nkosi".to_string();
        wizard.personal.email = "sam@x.com".to_string();
        wizard.personal.phone = "021 555 0000".to_string();
        wizard.vehicle.make = "Toyota".to_string();
        wizard.vehicle.model = "Corolla".to_string();
        wizard.vehicle.year = "2021".to_string();
        wizard
    }

    #[tokio::test]
    async fn next_without_a_category_keeps_the_first_step() {
        let mut wizard = QuoteWizard::new(StubDispatcher::default(), ToastBus::new());

        let error = wizard.next().await.expect_err("no category selected");
        assert_eq!(error, WizardTransitionError::CategoryNotSelected);
        assert_eq!(wizard.step(), WizardStep::SelectCategory);
    }

    #[tokio::test]
    async fn invalid_email_keeps_the_personal_step_and_raises_an_error_toast() {
        let toasts = ToastBus::new();
        let mut wizard = QuoteWizard::new(StubDispatcher::default(), toasts.clone());
        wizard.select_category(Category::Property);
        wizard.next().await.expect("advance to personal details");

        wizard.personal.first_name = "Sam".to_string();
        wizard.personal.last_name = "Nkosi".to_string();
        wizard.personal.email = "not-an-email".to_string();
        wizard.personal.phone = "021 555 0000".to_string();

        let error = wizard.next().await.expect_err("email is invalid");
        assert!(matches!(error, WizardTransitionError::InvalidPersonalDetails { .. }));
        assert_eq!(wizard.step(), WizardStep::PersonalDetails);
        assert!(wizard.personal.touched());

        let toast = toasts.current().await.expect("error toast raised");
        assert_eq!(toast.severity, ToastSeverity::Error);
        assert_eq!(toast.text, "Please fill in all personal details.");
    }

    #[tokio::test]
    async fn successful_submission_reaches_confirmation_and_resets_the_forms() {
        let dispatcher = StubDispatcher::default();
        let toasts = ToastBus::new();
        let mut wizard = filled_vehicle_wizard(dispatcher.clone(), toasts.clone());

        wizard.next().await.expect("category chosen");
        wizard.next().await.expect("personal details valid");
        let step = wizard.submit().await.expect("submission accepted");

        assert_eq!(step, WizardStep::Confirmation);
        assert_eq!(dispatcher.call_count(), 1);
        assert!(!wizard.is_submitting());
        assert!(wizard.take_scroll_reset());
        assert_eq!(wizard.personal.first_name, "");
        assert_eq!(wizard.vehicle.make, "");

        let toast = toasts.current().await.expect("success toast raised");
        assert_eq!(toast.severity, ToastSeverity::Success);
        assert_eq!(toast.text, "Quote request sent successfully!");
    }

    #[tokio::test]
    async fn invalid_details_block_the_dispatch_entirely() {
        let dispatcher = StubDispatcher::default();
        let toasts = ToastBus::new();
        let mut wizard = filled_vehicle_wizard(dispatcher.clone(), toasts.clone());
        wizard.vehicle.year = "1890".to_string();

        wizard.next().await.expect("category chosen");
        wizard.next().await.expect("personal details valid");
        let error = wizard.submit().await.expect_err("vehicle year below minimum");

        assert!(matches!(
            error,
            WizardError::Transition(WizardTransitionError::InvalidCategoryDetails { .. })
        ));
        assert_eq!(wizard.step(), WizardStep::CategoryDetails);
        assert_eq!(dispatcher.call_count(), 0);
        assert!(wizard.vehicle.touched());

        let toast = toasts.current().await.expect("error toast raised");
        assert_eq!(toast.text, "Please fill in the missing details.");
    }

    #[tokio::test]
    async fn delivery_failure_stays_on_details_with_the_fallback_toast() {
        let dispatcher = StubDispatcher::failing();
        let toasts = ToastBus::new();
        let mut wizard = filled_vehicle_wizard(dispatcher.clone(), toasts.clone());

        wizard.next().await.expect("category chosen");
        wizard.next().await.expect("personal details valid");
        let error = wizard.submit().await.expect_err("dispatch fails");

        assert!(matches!(error, WizardError::Dispatch(_)));
        assert_eq!(wizard.step(), WizardStep::CategoryDetails);
        assert!(!wizard.is_submitting());
        assert_eq!(wizard.vehicle.make, "Toyota", "failed submits keep the entered details");

        let toast = toasts.current().await.expect("fallback toast raised");
        assert_eq!(toast.severity, ToastSeverity::Error);
        assert_eq!(toast.text, SUBMIT_FALLBACK_MESSAGE);
    }

    #[tokio::test]
    async fn back_steps_one_screen_and_is_a_noop_on_the_first() {
        let mut wizard = filled_vehicle_wizard(StubDispatcher::default(), ToastBus::new());
        wizard.next().await.expect("category chosen");
        assert_eq!(wizard.step(), WizardStep::PersonalDetails);

        assert_eq!(wizard.back(), WizardStep::SelectCategory);
        assert_eq!(wizard.back(), WizardStep::SelectCategory);
    }
}
