pub mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commands::clients::ClientsCommand;
use commands::materials::MaterialsCommand;
use commands::quotes::QuotesCommand;

#[derive(Debug, Parser)]
#[command(
    name = "marcena",
    about = "Marcena workshop quote manager",
    long_about = "Manage the material catalog, client directory, and furniture-project quotes, \
                  and export internal or client documents for any quote.",
    after_help = "Examples:\n  marcena login --email operator@marcena.local --password ...\n  marcena materials list\n  marcena quotes create --file draft.toml\n  marcena quotes export 1718275800000 --document client"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Sign in as the configured operator")]
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    #[command(about = "Sign out and clear the session flag")]
    Logout,
    #[command(subcommand, about = "Manage the material catalog")]
    Materials(MaterialsCommand),
    #[command(subcommand, about = "Manage the client directory")]
    Clients(ClientsCommand),
    #[command(subcommand, about = "Create, inspect, track, and export quotes")]
    Quotes(QuotesCommand),
    #[command(about = "Reset collections to the built-in demo fixtures")]
    Seed,
    #[command(about = "Validate config, storage connectivity, and export tooling")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_env("MARCENA_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    // Logs go to stderr so command output on stdout stays machine-readable.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Command::Login { email, password } => commands::session::login(&email, &password),
        Command::Logout => commands::session::logout(),
        Command::Materials(command) => commands::materials::run(command),
        Command::Clients(command) => commands::clients::run(command),
        Command::Quotes(command) => commands::quotes::run(command),
        Command::Seed => commands::seed::run(),
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
