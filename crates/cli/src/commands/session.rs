use marcena_core::auth::Session;

use super::{CommandResult, EXIT_AUTH, EXIT_STORAGE};

pub fn login(email: &str, password: &str) -> CommandResult {
    const COMMAND: &str = "login";

    let config = match super::load_config(COMMAND) {
        Ok(config) => config,
        Err(result) => return result,
    };

    match Session::login(&config.auth, email, password) {
        Some(session) => match session.persist(&config.auth.session_path) {
            Ok(()) => CommandResult::success(COMMAND, format!("signed in as {email}")),
            Err(error) => {
                CommandResult::failure(COMMAND, "session_io", error.to_string(), EXIT_STORAGE)
            }
        },
        None => CommandResult::failure(
            COMMAND,
            "auth_failed",
            "invalid operator credentials",
            EXIT_AUTH,
        ),
    }
}

pub fn logout() -> CommandResult {
    const COMMAND: &str = "logout";

    let config = match super::load_config(COMMAND) {
        Ok(config) => config,
        Err(result) => return result,
    };

    match Session::clear(&config.auth.session_path) {
        Ok(()) => CommandResult::success(COMMAND, "signed out"),
        Err(error) => {
            CommandResult::failure(COMMAND, "session_io", error.to_string(), EXIT_STORAGE)
        }
    }
}
