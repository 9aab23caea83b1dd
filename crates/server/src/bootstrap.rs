use std::sync::Arc;

use palmsure_core::config::{AppConfig, ConfigError, LoadOptions};
use palmsure_mailer::{Mailer, MailerError};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub mailer: Arc<Mailer>,
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("config", &self.config)
            .field("mailer", &self.mailer.transport_mode())
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("mail transport initialization failed: {0}")]
    Mailer(#[source] MailerError),
}

pub fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config)
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    let mailer = Arc::new(Mailer::from_config(&config.email).map_err(BootstrapError::Mailer)?);
    info!(
        event_name = "system.bootstrap.mailer_ready",
        correlation_id = "bootstrap",
        transport_mode = mailer.transport_mode(),
        "mail transport initialized"
    );

    Ok(Application { config, mailer })
}
