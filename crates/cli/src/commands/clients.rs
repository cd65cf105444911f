use clap::Subcommand;

use marcena_core::domain::client::Client;
use marcena_db::ClientDirectory;

use super::{classify, require_operator, CommandResult};

#[derive(Debug, Subcommand)]
pub enum ClientsCommand {
    #[command(about = "List known clients")]
    List,
    #[command(about = "Substring search over name, email, and phone")]
    Search { query: String },
    #[command(about = "Add a client to the directory")]
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
    },
}

fn describe(client: &Client) -> String {
    format!("  {:<24} {:<28} {}", client.name, client.email, client.phone)
}

pub fn run(command: ClientsCommand) -> CommandResult {
    const COMMAND: &str = "clients";

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
        let directory = ClientDirectory::open(store).await.map_err(classify)?;

        match command {
            ClientsCommand::List => {
                let clients = directory.list().await;
                if clients.is_empty() {
                    return Ok("the client directory is empty".to_string());
                }
                let lines: Vec<String> = clients.iter().map(describe).collect();
                Ok(format!("{} client(s):\n{}", clients.len(), lines.join("\n")))
            }
            ClientsCommand::Search { query } => {
                let matches = directory.search(&query).await;
                if matches.is_empty() {
                    return Ok(format!("no clients match `{query}`"));
                }
                let lines: Vec<String> = matches.iter().map(describe).collect();
                Ok(format!("{} match(es):\n{}", matches.len(), lines.join("\n")))
            }
            ClientsCommand::Add { name, email, phone } => {
                require_operator(&config)?;
                let client = directory.add(&name, &email, &phone).await.map_err(classify)?;
                Ok(format!("client {} added: {}", client.id, client.name))
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
