use std::time::Duration;

use clap::Args;
use palmsure_core::config::{AppConfig, LoadOptions};
use palmsure_core::contact::{ContactError, ContactFlow};
use palmsure_core::errors::ApplicationError;
use palmsure_core::toast::ToastBus;
use palmsure_core::wizard::engine::WizardTransitionError;

use super::{build_runtime, error_class, latest_toast, CommandResult};
use crate::client::ApiClient;

#[derive(Debug, Args)]
pub struct ContactArgs {
    #[arg(long, help = "Sender's full name")]
    pub full_name: String,
    #[arg(long, help = "Reply-to email address")]
    pub email: String,
    #[arg(long, default_value = "", help = "Contact number (optional)")]
    pub contact_number: String,
    #[arg(long, help = "Message body")]
    pub message: String,
    #[arg(long, help = "Server base URL (defaults to the configured bind address and port)")]
    pub api_url: Option<String>,
}

pub fn run(args: ContactArgs) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("contact", "config_validation", error.to_string(), 2);
        }
    };
    let runtime = match build_runtime() {
        Ok(runtime) => runtime,
        Err(error) => return CommandResult::failure("contact", "runtime", error.to_string(), 1),
    };

    runtime.block_on(async move {
        let base_url = args.api_url.clone().unwrap_or_else(|| {
            format!("http://{}:{}", config.server.bind_address, config.server.port)
        });
        let client = match ApiClient::new(base_url, Duration::from_secs(config.email.timeout_secs))
        {
            Ok(client) => client,
            Err(error) => {
                return CommandResult::failure(
                    "contact",
                    "service_unavailable",
                    error.to_string(),
                    1,
                );
            }
        };

        let toasts = ToastBus::new();
        let mut flow = ContactFlow::new(client, toasts.clone());
        flow.form.full_name = args.full_name;
        flow.form.email = args.email;
        flow.form.contact_number = args.contact_number;
        flow.form.message = args.message;

        match flow.submit().await {
            Ok(()) => CommandResult::success("contact", latest_toast(&toasts).await),
            Err(failure) => {
                let application = match failure {
                    ContactError::Invalid { failures } => ApplicationError::Validation(failures),
                    ContactError::SubmissionInFlight => {
                        ApplicationError::Wizard(WizardTransitionError::SubmissionInFlight)
                    }
                    ContactError::Dispatch(dispatch) => {
                        ApplicationError::Delivery(dispatch.to_string())
                    }
                };
                let toast = latest_toast(&toasts).await;
                let message =
                    if toast.is_empty() { application.to_string() } else { toast };
                CommandResult::failure("contact", error_class(&application), message, 1)
            }
        }
    })
}
