use std::time::Duration;

use clap::Args;
use palmsure_core::config::{AppConfig, LoadOptions};
use palmsure_core::errors::ApplicationError;
use palmsure_core::toast::ToastBus;
use palmsure_core::wizard::controller::{QuoteWizard, WizardError};
use palmsure_core::Category;

use super::{build_runtime, error_class, latest_toast, CommandResult};
use crate::client::ApiClient;

#[derive(Debug, Args)]
pub struct QuoteArgs {
    #[arg(long, help = "Insurance category: property, vehicle, or business")]
    pub category: String,
    #[arg(long, help = "Applicant's first name")]
    pub first_name: String,
    #[arg(long, help = "Applicant's last name")]
    pub last_name: String,
    #[arg(long, help = "Applicant's email address")]
    pub email: String,
    #[arg(long, help = "Applicant's phone number")]
    pub phone: String,
    #[arg(long, help = "Property address (property category)")]
    pub property_address: Option<String>,
    #[arg(long, help = "Insured property value in rand (property category)")]
    pub property_value: Option<String>,
    #[arg(long, help = "Vehicle make (vehicle category)")]
    pub vehicle_make: Option<String>,
    #[arg(long, help = "Vehicle model (vehicle category)")]
    pub vehicle_model: Option<String>,
    #[arg(long, help = "Vehicle model year (vehicle category)")]
    pub vehicle_year: Option<String>,
    #[arg(long, help = "Business name (business category)")]
    pub business_name: Option<String>,
    #[arg(long, help = "Business industry (business category)")]
    pub industry: Option<String>,
    #[arg(long, help = "Number of employees (business category)")]
    pub num_employees: Option<String>,
    #[arg(long, help = "Server base URL (defaults to the configured bind address and port)")]
    pub api_url: Option<String>,
}

pub fn run(args: QuoteArgs) -> CommandResult {
    let Some(category) = Category::parse(&args.category) else {
        return CommandResult::failure(
            "quote",
            "bad_request",
            format!("unknown insurance category `{}` (expected property|vehicle|business)", args.category),
            2,
        );
    };

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("quote", "config_validation", error.to_string(), 2);
        }
    };
    let runtime = match build_runtime() {
        Ok(runtime) => runtime,
        Err(error) => return CommandResult::failure("quote", "runtime", error.to_string(), 1),
    };

    runtime.block_on(async move {
        let base_url = args.api_url.clone().unwrap_or_else(|| {
            format!("http://{}:{}", config.server.bind_address, config.server.port)
        });
        let client = match ApiClient::new(base_url, Duration::from_secs(config.email.timeout_secs))
        {
            Ok(client) => client,
            Err(error) => {
                return CommandResult::failure("quote", "service_unavailable", error.to_string(), 1);
            }
        };

        let toasts = ToastBus::new();
        let mut wizard = QuoteWizard::new(client, toasts.clone());

        wizard.select_category(category);
        wizard.personal.first_name = args.first_name;
        wizard.personal.last_name = args.last_name;
        wizard.personal.email = args.email;
        wizard.personal.phone = args.phone;
        wizard.property.address = args.property_address.unwrap_or_default();
        wizard.property.value = args.property_value.unwrap_or_default();
        wizard.vehicle.make = args.vehicle_make.unwrap_or_default();
        wizard.vehicle.model = args.vehicle_model.unwrap_or_default();
        wizard.vehicle.year = args.vehicle_year.unwrap_or_default();
        wizard.business.name = args.business_name.unwrap_or_default();
        wizard.business.industry = args.industry.unwrap_or_default();
        wizard.business.employee_count = args.num_employees.unwrap_or_default();

        if let Err(failure) = wizard.next().await {
            return wizard_failure(&toasts, ApplicationError::Wizard(failure)).await;
        }
        if let Err(failure) = wizard.next().await {
            return wizard_failure(&toasts, ApplicationError::Wizard(failure)).await;
        }

        match wizard.submit().await {
            Ok(_) => CommandResult::success("quote", latest_toast(&toasts).await),
            Err(WizardError::Transition(failure)) => {
                wizard_failure(&toasts, ApplicationError::Wizard(failure)).await
            }
            Err(WizardError::Dispatch(failure)) => {
                wizard_failure(&toasts, ApplicationError::Delivery(failure.to_string())).await
            }
        }
    })
}

async fn wizard_failure(toasts: &ToastBus, application: ApplicationError) -> CommandResult {
    let toast = latest_toast(toasts).await;
    let message = if toast.is_empty() { application.to_string() } else { toast };
    CommandResult::failure("quote", error_class(&application), message, 1)
}
