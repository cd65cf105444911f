use clap::Subcommand;

use marcena_core::domain::material::MaterialPatch;
use marcena_db::MaterialCatalog;

use super::{classify, not_found, parse_money, require_operator, CommandResult};

#[derive(Debug, Subcommand)]
pub enum MaterialsCommand {
    #[command(about = "List catalog entries in insertion order")]
    List,
    #[command(about = "Add a material to the catalog")]
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, help = "Unit price, e.g. 500.00")]
        price: String,
    },
    #[command(about = "Update the name and/or price of a catalog entry")]
    Update {
        id: u32,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<String>,
    },
    #[command(about = "Remove a catalog entry")]
    Remove { id: u32 },
}

pub fn run(command: MaterialsCommand) -> CommandResult {
    const COMMAND: &str = "materials";

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
        let catalog = MaterialCatalog::open(store).await.map_err(classify)?;

        match command {
            MaterialsCommand::List => {
                let entries = catalog.list().await;
                if entries.is_empty() {
                    return Ok("the catalog is empty".to_string());
                }
                let lines: Vec<String> = entries
                    .iter()
                    .map(|entry| {
                        format!(
                            "  {:>4}  {:<36} {:>12.2}",
                            entry.id,
                            entry.name,
                            entry.unit_price
                        )
                    })
                    .collect();
                Ok(format!("{} material(s):\n{}", entries.len(), lines.join("\n")))
            }
            MaterialsCommand::Add { name, price } => {
                require_operator(&config)?;
                let price = parse_money("price", &price)?;
                let entry = catalog.add(&name, price).await.map_err(classify)?;
                Ok(format!(
                    "material {} added: {} at {:.2}",
                    entry.id, entry.name, entry.unit_price
                ))
            }
            MaterialsCommand::Update { id, name, price } => {
                require_operator(&config)?;
                let unit_price = match price {
                    Some(raw) => Some(parse_money("price", &raw)?),
                    None => None,
                };
                let patch = MaterialPatch { name, unit_price };
                match catalog.update(id, patch).await.map_err(classify)? {
                    Some(entry) => Ok(format!(
                        "material {} updated: {} at {:.2}",
                        entry.id, entry.name, entry.unit_price
                    )),
                    None => Err(not_found(format!("material {id} is not in the catalog"))),
                }
            }
            MaterialsCommand::Remove { id } => {
                require_operator(&config)?;
                if catalog.remove(id).await.map_err(classify)? {
                    Ok(format!("material {id} removed"))
                } else {
                    Err(not_found(format!("material {id} is not in the catalog")))
                }
            }
        }
    });

    match result {
        Ok(message) => CommandResult::success(COMMAND, message),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure(COMMAND, error_class, message, exit_code)
        }
    }
}
