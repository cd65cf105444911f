use serde::Serialize;

use marcena_core::auth::Session;
use marcena_core::config::{AppConfig, LoadOptions};
use marcena_db::{connect_with_settings, migrations};

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: &'static str,
    detail: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    command: &'static str,
    status: &'static str,
    checks: Vec<DoctorCheck>,
}

/// Validates config, storage connectivity, applied schema, export tooling,
/// and the operator session. Informational: always exits 0.
pub fn run(json: bool) -> String {
    let mut checks = Vec::new();

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config",
                status: "ok",
                detail: "configuration loads and validates".to_string(),
            });
            Some(config)
        }
        Err(error) => {
            checks.push(DoctorCheck { name: "config", status: "fail", detail: error.to_string() });
            None
        }
    };

    if let Some(config) = &config {
        match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime.block_on(async {
                match connect_with_settings(
                    &config.database.url,
                    config.database.max_connections,
                    config.database.timeout_secs,
                )
                .await
                {
                    Ok(pool) => {
                        checks.push(DoctorCheck {
                            name: "database",
                            status: "ok",
                            detail: format!("connected to {}", config.database.url),
                        });

                        let applied = migrations::is_applied(&pool).await.unwrap_or(false);

                        checks.push(if applied {
                            DoctorCheck {
                                name: "schema",
                                status: "ok",
                                detail: "collections table is present".to_string(),
                            }
                        } else {
                            DoctorCheck {
                                name: "schema",
                                status: "warn",
                                detail: "collections table missing; run any command to migrate"
                                    .to_string(),
                            }
                        });

                        pool.close().await;
                    }
                    Err(error) => checks.push(DoctorCheck {
                        name: "database",
                        status: "fail",
                        detail: error.to_string(),
                    }),
                }
            }),
            Err(error) => checks.push(DoctorCheck {
                name: "database",
                status: "fail",
                detail: format!("async runtime unavailable: {error}"),
            }),
        }

        let session_check = match Session::load(&config.auth.session_path) {
            Ok(session) if session.is_signed_in() => DoctorCheck {
                name: "session",
                status: "ok",
                detail: session
                    .operator()
                    .map(|operator| format!("signed in as {}", operator.email))
                    .unwrap_or_else(|| "signed in".to_string()),
            },
            Ok(_) => DoctorCheck {
                name: "session",
                status: "warn",
                detail: "signed out; mutating commands will be refused".to_string(),
            },
            Err(error) => {
                DoctorCheck { name: "session", status: "fail", detail: error.to_string() }
            }
        };
        checks.push(session_check);
    }

    checks.push(if marcena_render::is_wkhtmltopdf_available() {
        DoctorCheck {
            name: "export",
            status: "ok",
            detail: "wkhtmltopdf found; exports produce PDF".to_string(),
        }
    } else {
        DoctorCheck {
            name: "export",
            status: "warn",
            detail: "wkhtmltopdf not found; exports fall back to HTML".to_string(),
        }
    });

    let healthy = checks.iter().all(|check| check.status != "fail");
    let report = DoctorReport {
        command: "doctor",
        status: if healthy { "ok" } else { "fail" },
        checks,
    };

    if json {
        serde_json::to_string_pretty(&report)
            .unwrap_or_else(|error| format!("doctor report serialization failed: {error}"))
    } else {
        let mut lines = vec![format!("doctor: {}", report.status)];
        for check in &report.checks {
            lines.push(format!("  [{}] {}: {}", check.status, check.name, check.detail));
        }
        lines.join("\n")
    }
}
