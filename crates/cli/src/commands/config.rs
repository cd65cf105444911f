use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use marcena_core::config::{AppConfig, LoadOptions};
use toml::Value;

/// Prints effective configuration values with source attribution. Secrets
/// are redacted, never echoed.
pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    let mut push = |field: &str, value: &str, env_var: Option<&str>| {
        lines.push(render_line(
            field,
            value,
            field_source(field, env_var, config_file_doc.as_ref(), config_file_path.as_deref()),
        ))
    };

    push("database.url", &config.database.url, Some("MARCENA_DATABASE_URL"));
    push(
        "database.max_connections",
        &config.database.max_connections.to_string(),
        Some("MARCENA_DATABASE_MAX_CONNECTIONS"),
    );
    push(
        "database.timeout_secs",
        &config.database.timeout_secs.to_string(),
        Some("MARCENA_DATABASE_TIMEOUT_SECS"),
    );

    push("auth.operator_name", &config.auth.operator_name, Some("MARCENA_OPERATOR_NAME"));
    push("auth.operator_email", &config.auth.operator_email, Some("MARCENA_OPERATOR_EMAIL"));
    push("auth.operator_password", "<redacted>", Some("MARCENA_OPERATOR_PASSWORD"));
    push(
        "auth.session_path",
        &config.auth.session_path.display().to_string(),
        Some("MARCENA_SESSION_PATH"),
    );

    push("company.name", &config.company.name, Some("MARCENA_COMPANY_NAME"));
    push("company.tax_id", &config.company.tax_id, Some("MARCENA_COMPANY_TAX_ID"));
    push(
        "company.contact_email",
        &config.company.contact_email,
        Some("MARCENA_COMPANY_CONTACT_EMAIL"),
    );
    push(
        "company.contact_phone",
        &config.company.contact_phone,
        Some("MARCENA_COMPANY_CONTACT_PHONE"),
    );
    push(
        "company.quote_validity_days",
        &config.company.quote_validity_days.to_string(),
        Some("MARCENA_QUOTE_VALIDITY_DAYS"),
    );

    push("logging.level", &config.logging.level, Some("MARCENA_LOGGING_LEVEL"));
    push("logging.format", &format!("{:?}", config.logging.format), Some("MARCENA_LOGGING_FORMAT"));

    lines.join("\n")
}

fn render_line(field: &str, value: &str, source: String) -> String {
    format!("  {field} = {value}  ({source})")
}

fn field_source(
    field: &str,
    env_var: Option<&str>,
    file_doc: Option<&Value>,
    file_path: Option<&Path>,
) -> String {
    if let Some(var) = env_var {
        if env::var(var).map(|value| !value.trim().is_empty()).unwrap_or(false) {
            return format!("env {var}");
        }
    }

    if let (Some(doc), Some(path)) = (file_doc, file_path) {
        if file_doc_has_field(doc, field) {
            return format!("file {}", path.display());
        }
    }

    "default".to_string()
}

fn file_doc_has_field(doc: &Value, field: &str) -> bool {
    let mut current = doc;
    for part in field.split('.') {
        match current.get(part) {
            Some(next) => current = next,
            None => return false,
        }
    }
    true
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("marcena.toml"), PathBuf::from("config/marcena.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}
