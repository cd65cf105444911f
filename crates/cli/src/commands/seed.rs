use marcena_db::storage::CollectionStore;
use marcena_db::{fixtures, CLIENTS_COLLECTION, MATERIALS_COLLECTION, QUOTES_COLLECTION};

use super::{CommandResult, Failure, EXIT_STORAGE};

/// Resets every collection to the built-in demo fixtures. Deterministic and
/// idempotent: running it twice leaves the same data and prints the same
/// summary.
pub fn run() -> CommandResult {
    const COMMAND: &str = "seed";

    let config = match super::load_config(COMMAND) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match super::build_runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let store = super::open_store(&config).await?;

        let materials = fixtures::default_materials();
        let quotes = fixtures::sample_quotes();
        let clients = fixtures::default_clients();

        store
            .save(MATERIALS_COLLECTION, &encode(&materials)?)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), EXIT_STORAGE))?;
        store
            .save(QUOTES_COLLECTION, &encode(&quotes)?)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), EXIT_STORAGE))?;
        store
            .save(CLIENTS_COLLECTION, &encode(&clients)?)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), EXIT_STORAGE))?;

        Ok(format!(
            "demo fixtures loaded:\n  - materials: {} entries\n  - quotes: {} records\n  - clients: {} records",
            materials.len(),
            quotes.len(),
            clients.len()
        ))
    });

    match result {
        Ok(message) => CommandResult::success(COMMAND, message),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure(COMMAND, error_class, message, exit_code)
        }
    }
}

fn encode<T: serde::Serialize>(value: &T) -> Result<String, Failure> {
    serde_json::to_string(value)
        .map_err(|error| ("seed_execution", error.to_string(), EXIT_STORAGE))
}
