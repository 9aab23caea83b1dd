use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub email: EmailConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub health_check_port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct EmailConfig {
    /// Resend API key. Absent means the server runs the noop transport.
    pub api_key: Option<SecretString>,
    pub api_base_url: String,
    pub sender: String,
    pub contact_recipient: String,
    pub admin_recipient: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub api_key: Option<String>,
    pub api_base_url: Option<String>,
    pub contact_recipient: Option<String>,
    pub admin_recipient: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 3000,
                health_check_port: 8080,
                graceful_shutdown_secs: 15,
            },
            email: EmailConfig {
                api_key: None,
                api_base_url: "https://api.resend.com".to_string(),
                sender: "Palmsure Website <info@palmsure.co.za>".to_string(),
                contact_recipient: "info@palmshore.co.za".to_string(),
                admin_recipient: "roy@palmshore.co.za".to_string(),
                timeout_secs: 30,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    server: Option<ServerPatch>,
    email: Option<EmailPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    health_check_port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct EmailPatch {
    api_key: Option<String>,
    api_base_url: Option<String>,
    sender: Option<String>,
    contact_recipient: Option<String>,
    admin_recipient: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("palmsure.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(health_check_port) = server.health_check_port {
                self.server.health_check_port = health_check_port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(email) = patch.email {
            if let Some(api_key_value) = email.api_key {
                self.email.api_key = Some(secret_value(api_key_value));
            }
            if let Some(api_base_url) = email.api_base_url {
                self.email.api_base_url = api_base_url;
            }
            if let Some(sender) = email.sender {
                self.email.sender = sender;
            }
            if let Some(contact_recipient) = email.contact_recipient {
                self.email.contact_recipient = contact_recipient;
            }
            if let Some(admin_recipient) = email.admin_recipient {
                self.email.admin_recipient = admin_recipient;
            }
            if let Some(timeout_secs) = email.timeout_secs {
                self.email.timeout_secs = timeout_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("PALMSURE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("PALMSURE_SERVER_PORT") {
            self.server.port = parse_u16("PALMSURE_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("PALMSURE_SERVER_HEALTH_CHECK_PORT") {
            self.server.health_check_port =
                parse_u16("PALMSURE_SERVER_HEALTH_CHECK_PORT", &value)?;
        }
        if let Some(value) = read_env("PALMSURE_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("PALMSURE_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        // The deployment's original variable names are kept for the key and
        // the two recipient overrides.
        if let Some(value) = read_env("RESEND_API_KEY") {
            self.email.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("PALMSURE_CONTACT_EMAIL") {
            self.email.contact_recipient = value;
        }
        if let Some(value) = read_env("PALMSURE_ADMIN_EMAIL") {
            self.email.admin_recipient = value;
        }
        if let Some(value) = read_env("PALMSURE_EMAIL_API_BASE_URL") {
            self.email.api_base_url = value;
        }
        if let Some(value) = read_env("PALMSURE_EMAIL_SENDER") {
            self.email.sender = value;
        }
        if let Some(value) = read_env("PALMSURE_EMAIL_TIMEOUT_SECS") {
            self.email.timeout_secs = parse_u64("PALMSURE_EMAIL_TIMEOUT_SECS", &value)?;
        }

        let log_level =
            read_env("PALMSURE_LOGGING_LEVEL").or_else(|| read_env("PALMSURE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("PALMSURE_LOGGING_FORMAT").or_else(|| read_env("PALMSURE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(bind_address) = overrides.bind_address {
            self.server.bind_address = bind_address;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(api_key) = overrides.api_key {
            self.email.api_key = Some(secret_value(api_key));
        }
        if let Some(api_base_url) = overrides.api_base_url {
            self.email.api_base_url = api_base_url;
        }
        if let Some(contact_recipient) = overrides.contact_recipient {
            self.email.contact_recipient = contact_recipient;
        }
        if let Some(admin_recipient) = overrides.admin_recipient {
            self.email.admin_recipient = admin_recipient;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_server(&self.server)?;
        validate_email(&self.email)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("palmsure.toml"), PathBuf::from("config/palmsure.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn read_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be non-zero".to_string()));
    }
    if server.health_check_port == 0 {
        return Err(ConfigError::Validation(
            "server.health_check_port must be non-zero".to_string(),
        ));
    }
    if server.port == server.health_check_port {
        return Err(ConfigError::Validation(
            "server.port and server.health_check_port must differ".to_string(),
        ));
    }
    Ok(())
}

fn validate_email(email: &EmailConfig) -> Result<(), ConfigError> {
    if !email.api_base_url.starts_with("http://") && !email.api_base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "email.api_base_url must be an http(s) URL".to_string(),
        ));
    }
    if !email.sender.contains('@') {
        return Err(ConfigError::Validation(
            "email.sender must contain an email address".to_string(),
        ));
    }
    for (key, address) in [
        ("email.contact_recipient", &email.contact_recipient),
        ("email.admin_recipient", &email.admin_recipient),
    ] {
        if !address.contains('@') {
            return Err(ConfigError::Validation(format!("{key} must be an email address")));
        }
    }
    if email.timeout_secs == 0 {
        return Err(ConfigError::Validation("email.timeout_secs must be non-zero".to_string()));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    match logging.level.trim().to_ascii_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        other => Err(ConfigError::Validation(format!(
            "unsupported log level `{other}` (expected trace|debug|info|warn|error)"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::io::Write;
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    const GUARDED_VARS: &[&str] = &[
        "RESEND_API_KEY",
        "PALMSURE_CONTACT_EMAIL",
        "PALMSURE_ADMIN_EMAIL",
        "PALMSURE_EMAIL_API_BASE_URL",
        "PALMSURE_EMAIL_SENDER",
        "PALMSURE_EMAIL_TIMEOUT_SECS",
        "PALMSURE_SERVER_BIND_ADDRESS",
        "PALMSURE_SERVER_PORT",
        "PALMSURE_SERVER_HEALTH_CHECK_PORT",
        "PALMSURE_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "PALMSURE_LOGGING_LEVEL",
        "PALMSURE_LOG_LEVEL",
        "PALMSURE_LOGGING_FORMAT",
        "PALMSURE_LOG_FORMAT",
    ];

    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn with_env<T>(vars: &[(&str, &str)], run: impl FnOnce() -> T) -> T {
        let _guard = env_lock().lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let saved: Vec<(&str, Option<String>)> =
            GUARDED_VARS.iter().map(|name| (*name, env::var(name).ok())).collect();
        for name in GUARDED_VARS {
            env::remove_var(name);
        }
        for (name, value) in vars {
            env::set_var(name, value);
        }

        let result = run();

        for (name, value) in saved {
            match value {
                Some(value) => env::set_var(name, value),
                None => env::remove_var(name),
            }
        }
        result
    }

    #[test]
    fn defaults_match_the_original_deployment() {
        with_env(&[], || {
            let config = AppConfig::load(LoadOptions::default()).expect("defaults are valid");

            assert!(config.email.api_key.is_none());
            assert_eq!(config.email.contact_recipient, "info@palmshore.co.za");
            assert_eq!(config.email.admin_recipient, "roy@palmshore.co.za");
            assert_eq!(config.email.api_base_url, "https://api.resend.com");
            assert_eq!(config.server.port, 3000);
            assert_eq!(config.logging.format, LogFormat::Compact);
        });
    }

    #[test]
    fn config_file_patch_applies_over_defaults() {
        with_env(&[], || {
            let mut file = tempfile::NamedTempFile::new().expect("temp file");
            writeln!(
                file,
                "[server]\nport = 4000\n\n[email]\ncontact_recipient = \"leads@palmsure.co.za\"\n\n[logging]\nformat = \"json\"\n"
            )
            .expect("write config");

            let config = AppConfig::load(LoadOptions {
                config_path: Some(file.path().to_path_buf()),
                ..LoadOptions::default()
            })
            .expect("patched config is valid");

            assert_eq!(config.server.port, 4000);
            assert_eq!(config.email.contact_recipient, "leads@palmsure.co.za");
            assert_eq!(config.logging.format, LogFormat::Json);
            // Untouched keys keep their defaults.
            assert_eq!(config.email.admin_recipient, "roy@palmshore.co.za");
        });
    }

    #[test]
    fn env_overrides_beat_the_config_file() {
        with_env(
            &[
                ("RESEND_API_KEY", "re_test_key"),
                ("PALMSURE_CONTACT_EMAIL", "desk@palmsure.co.za"),
            ],
            || {
                let mut file = tempfile::NamedTempFile::new().expect("temp file");
                writeln!(file, "[email]\ncontact_recipient = \"file@palmsure.co.za\"\n")
                    .expect("write config");

                let config = AppConfig::load(LoadOptions {
                    config_path: Some(file.path().to_path_buf()),
                    ..LoadOptions::default()
                })
                .expect("config is valid");

                assert_eq!(config.email.contact_recipient, "desk@palmsure.co.za");
                let api_key = config.email.api_key.expect("key set from env");
                assert_eq!(api_key.expose_secret(), "re_test_key");
            },
        );
    }

    #[test]
    fn interpolation_fails_for_missing_variables() {
        with_env(&[], || {
            let mut file = tempfile::NamedTempFile::new().expect("temp file");
            writeln!(file, "[email]\napi_key = \"${{PALMSURE_MISSING_SECRET}}\"\n")
                .expect("write config");

            let error = AppConfig::load(LoadOptions {
                config_path: Some(file.path().to_path_buf()),
                ..LoadOptions::default()
            })
            .expect_err("interpolation must fail");

            assert!(matches!(
                error,
                ConfigError::MissingEnvInterpolation { ref var } if var == "PALMSURE_MISSING_SECRET"
            ));
        });
    }

    #[test]
    fn invalid_port_override_is_rejected() {
        with_env(&[("PALMSURE_SERVER_PORT", "eighty")], || {
            let error =
                AppConfig::load(LoadOptions::default()).expect_err("port must be numeric");
            assert!(matches!(error, ConfigError::InvalidEnvOverride { ref key, .. }
                if key == "PALMSURE_SERVER_PORT"));
        });
    }

    #[test]
    fn programmatic_overrides_win_over_everything() {
        with_env(&[("PALMSURE_CONTACT_EMAIL", "env@palmsure.co.za")], || {
            let config = AppConfig::load(LoadOptions {
                overrides: ConfigOverrides {
                    contact_recipient: Some("override@palmsure.co.za".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .expect("config is valid");

            assert_eq!(config.email.contact_recipient, "override@palmsure.co.za");
        });
    }

    #[test]
    fn recipient_without_an_at_sign_fails_validation() {
        with_env(&[("PALMSURE_ADMIN_EMAIL", "not-an-address")], || {
            let error = AppConfig::load(LoadOptions::default()).expect_err("invalid recipient");
            assert!(matches!(error, ConfigError::Validation(ref message)
                if message.contains("admin_recipient")));
        });
    }

    #[test]
    fn missing_required_file_is_an_error() {
        with_env(&[], || {
            let error = AppConfig::load(LoadOptions {
                config_path: Some("does-not-exist.toml".into()),
                require_file: true,
                ..LoadOptions::default()
            })
            .expect_err("file was required");

            assert!(matches!(error, ConfigError::MissingConfigFile(_)));
        });
    }
}
