pub mod clients;
pub mod config;
pub mod doctor;
pub mod materials;
pub mod quotes;
pub mod seed;
pub mod session;

use std::sync::Arc;

use serde::Serialize;

use marcena_core::auth::Session;
use marcena_core::config::{AppConfig, LoadOptions};
use marcena_db::{connect_with_settings, migrations, RepositoryError, SqliteCollectionStore};

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// (error_class, message, exit code) carried out of command bodies.
pub(crate) type Failure = (&'static str, String, u8);

pub(crate) const EXIT_INVALID: u8 = 2;
pub(crate) const EXIT_RUNTIME: u8 = 3;
pub(crate) const EXIT_DB: u8 = 4;
pub(crate) const EXIT_STORAGE: u8 = 5;
pub(crate) const EXIT_NOT_FOUND: u8 = 6;
pub(crate) const EXIT_AUTH: u8 = 7;
pub(crate) const EXIT_RENDER: u8 = 8;

pub(crate) fn load_config(command: &'static str) -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            EXIT_INVALID,
        )
    })
}

pub(crate) fn build_runtime(
    command: &'static str,
) -> Result<tokio::runtime::Runtime, CommandResult> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(
            command,
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            EXIT_RUNTIME,
        )
    })
}

/// Connects, applies pending migrations, and hands back the collection
/// store every repository runs against.
pub(crate) async fn open_store(config: &AppConfig) -> Result<Arc<SqliteCollectionStore>, Failure> {
    let pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(|error| ("db_connectivity", error.to_string(), EXIT_DB))?;

    migrations::run_pending(&pool)
        .await
        .map_err(|error| ("migration", error.to_string(), EXIT_STORAGE))?;

    Ok(Arc::new(SqliteCollectionStore::new(pool)))
}

/// Mutating and exporting commands require the operator session flag.
pub(crate) fn require_operator(config: &AppConfig) -> Result<(), Failure> {
    match Session::load(&config.auth.session_path) {
        Ok(session) if session.is_signed_in() => Ok(()),
        Ok(_) => Err((
            "auth_required",
            "no operator session. Run `marcena login` first.".to_string(),
            EXIT_AUTH,
        )),
        Err(error) => Err(("auth_required", error.to_string(), EXIT_AUTH)),
    }
}

pub(crate) fn classify(error: RepositoryError) -> Failure {
    match error {
        RepositoryError::Domain(domain) => ("validation", domain.to_string(), EXIT_INVALID),
        other => ("storage", other.to_string(), EXIT_STORAGE),
    }
}

pub(crate) fn not_found(message: impl Into<String>) -> Failure {
    ("not_found", message.into(), EXIT_NOT_FOUND)
}

pub(crate) fn parse_money(field: &'static str, raw: &str) -> Result<rust_decimal::Decimal, Failure> {
    raw.parse::<rust_decimal::Decimal>().map_err(|_| {
        ("validation", format!("{field} must be a decimal number, got `{raw}`"), EXIT_INVALID)
    })
}
