use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use palmsure_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |dotted_key: &str, env_var: Option<&str>| {
        field_source(dotted_key, env_var, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "server.bind_address",
        &config.server.bind_address,
        source("server.bind_address", Some("PALMSURE_SERVER_BIND_ADDRESS")),
    ));
    lines.push(render_line(
        "server.port",
        &config.server.port.to_string(),
        source("server.port", Some("PALMSURE_SERVER_PORT")),
    ));
    lines.push(render_line(
        "server.health_check_port",
        &config.server.health_check_port.to_string(),
        source("server.health_check_port", Some("PALMSURE_SERVER_HEALTH_CHECK_PORT")),
    ));
    lines.push(render_line(
        "server.graceful_shutdown_secs",
        &config.server.graceful_shutdown_secs.to_string(),
        source("server.graceful_shutdown_secs", Some("PALMSURE_SERVER_GRACEFUL_SHUTDOWN_SECS")),
    ));

    let api_key = config
        .email
        .api_key
        .as_ref()
        .map(|key| redact_secret(key.expose_secret()))
        .unwrap_or_else(|| "(unset)".to_string());
    lines.push(render_line("email.api_key", &api_key, source("email.api_key", Some("RESEND_API_KEY"))));
    lines.push(render_line(
        "email.api_base_url",
        &config.email.api_base_url,
        source("email.api_base_url", Some("PALMSURE_EMAIL_API_BASE_URL")),
    ));
    lines.push(render_line(
        "email.sender",
        &config.email.sender,
        source("email.sender", Some("PALMSURE_EMAIL_SENDER")),
    ));
    lines.push(render_line(
        "email.contact_recipient",
        &config.email.contact_recipient,
        source("email.contact_recipient", Some("PALMSURE_CONTACT_EMAIL")),
    ));
    lines.push(render_line(
        "email.admin_recipient",
        &config.email.admin_recipient,
        source("email.admin_recipient", Some("PALMSURE_ADMIN_EMAIL")),
    ));
    lines.push(render_line(
        "email.timeout_secs",
        &config.email.timeout_secs.to_string(),
        source("email.timeout_secs", Some("PALMSURE_EMAIL_TIMEOUT_SECS")),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", Some("PALMSURE_LOGGING_LEVEL")),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", Some("PALMSURE_LOGGING_FORMAT")),
    ));

    lines.join("\n")
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("  {key} = {value}  ({source})")
}

fn field_source(
    dotted_key: &str,
    env_var: Option<&str>,
    doc: Option<&Value>,
    path: Option<&Path>,
) -> String {
    if let Some(name) = env_var {
        if env::var(name).ok().filter(|value| !value.trim().is_empty()).is_some() {
            return format!("env:{name}");
        }
    }
    if let (Some(doc), Some(path)) = (doc, path) {
        if doc_has_key(doc, dotted_key) {
            return format!("file:{}", path.display());
        }
    }
    "default".to_string()
}

fn doc_has_key(doc: &Value, dotted_key: &str) -> bool {
    let mut cursor = doc;
    for part in dotted_key.split('.') {
        match cursor.get(part) {
            Some(next) => cursor = next,
            None => return false,
        }
    }
    true
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("palmsure.toml"), PathBuf::from("config/palmsure.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn redact_secret(value: &str) -> String {
    let visible: String = value.chars().take(4).collect();
    if value.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{visible}…")
    }
}
