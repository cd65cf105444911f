use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub company: CompanyConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

/// The single operator credential pair plus where the session flag lives.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub operator_name: String,
    pub operator_email: String,
    pub operator_password: SecretString,
    pub session_path: PathBuf,
}

/// Letterhead and terms data consumed by the document renderer.
#[derive(Clone, Debug, Serialize)]
pub struct CompanyConfig {
    pub name: String,
    pub tax_id: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub quote_validity_days: u32,
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
    pub database_url: Option<String>,
    pub session_path: Option<PathBuf>,
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
            database: DatabaseConfig {
                url: "sqlite://marcena.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            auth: AuthConfig {
                operator_name: "Administrator".to_string(),
                operator_email: "operator@marcena.local".to_string(),
                operator_password: String::new().into(),
                session_path: PathBuf::from(".marcena-session.json"),
            },
            company: CompanyConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl Default for CompanyConfig {
    fn default() -> Self {
        Self {
            name: "Marcena Custom Furniture".to_string(),
            tax_id: "00.000.000/0001-00".to_string(),
            contact_email: "contact@marcena.example".to_string(),
            contact_phone: "+55 11 99999-9999".to_string(),
            quote_validity_days: 7,
        }
    }
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

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("marcena.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(auth) = patch.auth {
            if let Some(operator_name) = auth.operator_name {
                self.auth.operator_name = operator_name;
            }
            if let Some(operator_email) = auth.operator_email {
                self.auth.operator_email = operator_email;
            }
            if let Some(operator_password_value) = auth.operator_password {
                self.auth.operator_password = operator_password_value.into();
            }
            if let Some(session_path) = auth.session_path {
                self.auth.session_path = PathBuf::from(session_path);
            }
        }

        if let Some(company) = patch.company {
            if let Some(name) = company.name {
                self.company.name = name;
            }
            if let Some(tax_id) = company.tax_id {
                self.company.tax_id = tax_id;
            }
            if let Some(contact_email) = company.contact_email {
                self.company.contact_email = contact_email;
            }
            if let Some(contact_phone) = company.contact_phone {
                self.company.contact_phone = contact_phone;
            }
            if let Some(quote_validity_days) = company.quote_validity_days {
                self.company.quote_validity_days = quote_validity_days;
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
        if let Some(value) = read_env("MARCENA_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("MARCENA_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_u32("MARCENA_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("MARCENA_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("MARCENA_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("MARCENA_OPERATOR_NAME") {
            self.auth.operator_name = value;
        }
        if let Some(value) = read_env("MARCENA_OPERATOR_EMAIL") {
            self.auth.operator_email = value;
        }
        if let Some(value) = read_env("MARCENA_OPERATOR_PASSWORD") {
            self.auth.operator_password = value.into();
        }
        if let Some(value) = read_env("MARCENA_SESSION_PATH") {
            self.auth.session_path = PathBuf::from(value);
        }

        if let Some(value) = read_env("MARCENA_COMPANY_NAME") {
            self.company.name = value;
        }
        if let Some(value) = read_env("MARCENA_COMPANY_TAX_ID") {
            self.company.tax_id = value;
        }
        if let Some(value) = read_env("MARCENA_COMPANY_CONTACT_EMAIL") {
            self.company.contact_email = value;
        }
        if let Some(value) = read_env("MARCENA_COMPANY_CONTACT_PHONE") {
            self.company.contact_phone = value;
        }
        if let Some(value) = read_env("MARCENA_QUOTE_VALIDITY_DAYS") {
            self.company.quote_validity_days = parse_u32("MARCENA_QUOTE_VALIDITY_DAYS", &value)?;
        }

        let log_level =
            read_env("MARCENA_LOGGING_LEVEL").or_else(|| read_env("MARCENA_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("MARCENA_LOGGING_FORMAT").or_else(|| read_env("MARCENA_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(session_path) = overrides.session_path {
            self.auth.session_path = session_path;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_auth(&self.auth)?;
        validate_company(&self.company)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("marcena.toml"), PathBuf::from("config/marcena.toml")]
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

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite:") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite:...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_auth(auth: &AuthConfig) -> Result<(), ConfigError> {
    let email = auth.operator_email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ConfigError::Validation(
            "auth.operator_email must be a non-empty email address".to_string(),
        ));
    }

    if auth.operator_password.expose_secret().is_empty() {
        return Err(ConfigError::Validation(
            "auth.operator_password is required. Set it in marcena.toml or via MARCENA_OPERATOR_PASSWORD"
                .to_string(),
        ));
    }

    if auth.session_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation("auth.session_path must not be empty".to_string()));
    }

    Ok(())
}

fn validate_company(company: &CompanyConfig) -> Result<(), ConfigError> {
    if company.name.trim().is_empty() {
        return Err(ConfigError::Validation("company.name must not be empty".to_string()));
    }

    if company.quote_validity_days == 0 || company.quote_validity_days > 90 {
        return Err(ConfigError::Validation(
            "company.quote_validity_days must be in range 1..=90".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    auth: Option<AuthPatch>,
    company: Option<CompanyPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct AuthPatch {
    operator_name: Option<String>,
    operator_email: Option<String>,
    operator_password: Option<String>,
    session_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CompanyPatch {
    name: Option<String>,
    tax_id: Option<String>,
    contact_email: Option<String>,
    contact_phone: Option<String>,
    quote_validity_days: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    const MARCENA_VARS: &[&str] = &[
        "MARCENA_DATABASE_URL",
        "MARCENA_DATABASE_MAX_CONNECTIONS",
        "MARCENA_DATABASE_TIMEOUT_SECS",
        "MARCENA_OPERATOR_NAME",
        "MARCENA_OPERATOR_EMAIL",
        "MARCENA_OPERATOR_PASSWORD",
        "MARCENA_SESSION_PATH",
        "MARCENA_COMPANY_NAME",
        "MARCENA_COMPANY_TAX_ID",
        "MARCENA_COMPANY_CONTACT_EMAIL",
        "MARCENA_COMPANY_CONTACT_PHONE",
        "MARCENA_QUOTE_VALIDITY_DAYS",
        "MARCENA_LOGGING_LEVEL",
        "MARCENA_LOGGING_FORMAT",
        "MARCENA_LOG_LEVEL",
        "MARCENA_LOG_FORMAT",
    ];

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        clear_vars(MARCENA_VARS);
        env::set_var("TEST_OPERATOR_PASSWORD", "secret-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("marcena.toml");
            fs::write(
                &path,
                r#"
[auth]
operator_password = "${TEST_OPERATOR_PASSWORD}"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.auth.operator_password.expose_secret() == "secret-from-env",
                "operator password should be loaded from environment",
            )
        })();

        clear_vars(&["TEST_OPERATOR_PASSWORD"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        clear_vars(MARCENA_VARS);
        env::set_var("MARCENA_OPERATOR_PASSWORD", "pw-test");
        env::set_var("MARCENA_LOG_LEVEL", "warn");
        env::set_var("MARCENA_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warn log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )
        })();

        clear_vars(&["MARCENA_OPERATOR_PASSWORD", "MARCENA_LOG_LEVEL", "MARCENA_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        clear_vars(MARCENA_VARS);
        env::set_var("MARCENA_DATABASE_URL", "sqlite://from-env.db");
        env::set_var("MARCENA_OPERATOR_PASSWORD", "pw-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("marcena.toml");
            fs::write(
                &path,
                r#"
[database]
url = "sqlite://from-file.db"

[auth]
operator_password = "pw-from-file"

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    database_url: Some("sqlite://from-override.db".to_string()),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.database.url == "sqlite://from-override.db",
                "override database url should win",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(
                config.auth.operator_password.expose_secret() == "pw-from-env",
                "env password should win over file and defaults",
            )
        })();

        clear_vars(&["MARCENA_DATABASE_URL", "MARCENA_OPERATOR_PASSWORD"]);
        result
    }

    #[test]
    fn validation_requires_operator_password() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        clear_vars(MARCENA_VARS);

        let error = match AppConfig::load(LoadOptions::default()) {
            Ok(_) => return Err("expected validation failure but config load succeeded".into()),
            Err(error) => error,
        };

        ensure(
            matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("auth.operator_password")
            ),
            "validation failure should mention auth.operator_password",
        )
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        clear_vars(MARCENA_VARS);
        env::set_var("MARCENA_OPERATOR_PASSWORD", "pw-secret-value");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(
                !debug.contains("pw-secret-value"),
                "debug output should not contain the operator password",
            )?;
            ensure(
                matches!(config.logging.format, LogFormat::Compact),
                "default logging format should be compact",
            )
        })();

        clear_vars(&["MARCENA_OPERATOR_PASSWORD"]);
        result
    }
}
