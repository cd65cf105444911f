use std::path::PathBuf;

use clap::Subcommand;
use rust_decimal::Decimal;
use serde::Deserialize;

use marcena_core::domain::quote::{ExtraCost, QuoteDraft, QuoteLineItem, QuotePatch, QuoteStatus};
use marcena_db::{MaterialCatalog, QuoteRepository};
use marcena_render::{DocumentKind, QuoteRenderer};

use super::{
    classify, not_found, require_operator, CommandResult, Failure, EXIT_INVALID, EXIT_RENDER,
    EXIT_STORAGE,
};

#[derive(Debug, Subcommand)]
pub enum QuotesCommand {
    #[command(about = "List quotes, newest first")]
    List,
    #[command(about = "Print a quote record as JSON")]
    Show { id: String },
    #[command(about = "Create a quote from a draft file (materials referenced by catalog id)")]
    Create {
        #[arg(long, help = "Path to a TOML draft file")]
        file: PathBuf,
    },
    #[command(about = "Update customer details, labor fee, or notes of a quote")]
    Update {
        id: String,
        #[arg(long)]
        customer_name: Option<String>,
        #[arg(long)]
        customer_phone: Option<String>,
        #[arg(long)]
        customer_email: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        labor_fee: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    #[command(about = "Set the status of a quote (pending|approved|rejected|in_progress|completed)")]
    SetStatus { id: String, status: String },
    #[command(about = "Remove a quote")]
    Remove { id: String },
    #[command(about = "Export the internal or client document for a quote")]
    Export {
        id: String,
        #[arg(long, default_value = "client", help = "internal or client")]
        document: String,
        #[arg(long, help = "Output path; defaults to quote-<id>-<document>.<ext>")]
        out: Option<PathBuf>,
    },
}

/// On-disk draft format for `quotes create`. Line items reference catalog
/// entries by id; the command snapshots name and price at creation time.
#[derive(Debug, Deserialize)]
struct DraftFile {
    customer_name: String,
    customer_phone: String,
    customer_email: String,
    project_description: String,
    #[serde(default)]
    labor_fee: Decimal,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    items: Vec<DraftItem>,
    #[serde(default)]
    extra_costs: Vec<DraftCost>,
}

#[derive(Debug, Deserialize)]
struct DraftItem {
    material: u32,
    quantity: u32,
}

#[derive(Debug, Deserialize)]
struct DraftCost {
    description: String,
    amount: Decimal,
}

fn read_draft(path: &PathBuf) -> Result<DraftFile, Failure> {
    let raw = std::fs::read_to_string(path).map_err(|error| {
        ("draft_file", format!("could not read `{}`: {error}", path.display()), EXIT_INVALID)
    })?;
    toml::from_str(&raw).map_err(|error| {
        ("draft_file", format!("could not parse `{}`: {error}", path.display()), EXIT_INVALID)
    })
}

pub fn run(command: QuotesCommand) -> CommandResult {
    const COMMAND: &str = "quotes";

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
        let repo = QuoteRepository::open(store.clone()).await.map_err(classify)?;

        match command {
            QuotesCommand::List => {
                let mut quotes = repo.get_all().await;
                // Stored order is insertion order; newest-first is purely a
                // presentation choice made here.
                quotes.sort_by(|a, b| b.created_at.cmp(&a.created_at));

                if quotes.is_empty() {
                    return Ok("no quotes yet".to_string());
                }
                let lines: Vec<String> = quotes
                    .iter()
                    .map(|quote| {
                        format!(
                            "  {}  {}  {:<12} {:<24} {:>12.2}",
                            quote.id,
                            quote.created_at.format("%Y-%m-%d"),
                            quote.status.as_str(),
                            quote.customer_name,
                            quote.total_amount
                        )
                    })
                    .collect();
                Ok(format!("{} quote(s):\n{}", quotes.len(), lines.join("\n")))
            }
            QuotesCommand::Show { id } => match repo.get_by_id(&id).await {
                Some(quote) => serde_json::to_string_pretty(&quote)
                    .map_err(|error| ("encode", error.to_string(), EXIT_STORAGE)),
                None => Err(not_found(format!("quote {id} does not exist"))),
            },
            QuotesCommand::Create { file } => {
                require_operator(&config)?;
                let draft_file = read_draft(&file)?;

                let catalog = MaterialCatalog::open(store).await.map_err(classify)?;
                let mut line_items = Vec::with_capacity(draft_file.items.len());
                for item in draft_file.items {
                    let entry = catalog.find(item.material).await.ok_or_else(|| {
                        not_found(format!("material {} is not in the catalog", item.material))
                    })?;
                    line_items.push(QuoteLineItem {
                        id: entry.id,
                        name: entry.name,
                        unit_price: entry.unit_price,
                        quantity: item.quantity,
                    });
                }

                let draft = QuoteDraft {
                    customer_name: draft_file.customer_name,
                    customer_phone: draft_file.customer_phone,
                    customer_email: draft_file.customer_email,
                    project_description: draft_file.project_description,
                    line_items,
                    labor_fee: draft_file.labor_fee,
                    extra_costs: draft_file
                        .extra_costs
                        .into_iter()
                        .map(|cost| ExtraCost { description: cost.description, amount: cost.amount })
                        .collect(),
                    notes: draft_file.notes,
                };

                let quote = repo.create(draft).await.map_err(classify)?;
                Ok(format!(
                    "quote {} created (total {:.2})",
                    quote.id, quote.total_amount
                ))
            }
            QuotesCommand::Update {
                id,
                customer_name,
                customer_phone,
                customer_email,
                description,
                labor_fee,
                notes,
            } => {
                require_operator(&config)?;
                let labor_fee = match labor_fee {
                    Some(raw) => Some(super::parse_money("labor_fee", &raw)?),
                    None => None,
                };
                let patch = QuotePatch {
                    customer_name,
                    customer_phone,
                    customer_email,
                    project_description: description,
                    labor_fee,
                    notes,
                    ..QuotePatch::default()
                };

                match repo.update(&id, patch).await.map_err(classify)? {
                    Some(quote) => Ok(format!(
                        "quote {} updated (total {:.2})",
                        quote.id, quote.total_amount
                    )),
                    None => Err(not_found(format!("quote {id} does not exist"))),
                }
            }
            QuotesCommand::SetStatus { id, status } => {
                require_operator(&config)?;
                let status = QuoteStatus::parse(&status).ok_or_else(|| -> Failure {
                    (
                        "validation",
                        format!(
                            "unknown status `{status}` (expected pending|approved|rejected|in_progress|completed)"
                        ),
                        EXIT_INVALID,
                    )
                })?;

                match repo.set_status(&id, status).await.map_err(classify)? {
                    Some(quote) => {
                        Ok(format!("quote {} is now {}", quote.id, quote.status.as_str()))
                    }
                    None => Err(not_found(format!("quote {id} does not exist"))),
                }
            }
            QuotesCommand::Remove { id } => {
                require_operator(&config)?;
                if repo.remove(&id).await.map_err(classify)? {
                    Ok(format!("quote {id} removed"))
                } else {
                    Err(not_found(format!("quote {id} does not exist")))
                }
            }
            QuotesCommand::Export { id, document, out } => {
                require_operator(&config)?;
                let kind = DocumentKind::parse(&document).ok_or_else(|| -> Failure {
                    (
                        "validation",
                        format!("unknown document kind `{document}` (expected internal|client)"),
                        EXIT_INVALID,
                    )
                })?;

                let quote = repo
                    .get_by_id(&id)
                    .await
                    .ok_or_else(|| not_found(format!("quote {id} does not exist")))?;

                let renderer = QuoteRenderer::new(config.company.clone())
                    .map_err(|error| ("render", error.to_string(), EXIT_RENDER))?;
                let rendered = renderer
                    .render(&quote, kind)
                    .await
                    .map_err(|error| ("render", error.to_string(), EXIT_RENDER))?;

                let extension = rendered.extension();
                let path = out.unwrap_or_else(|| {
                    PathBuf::from(format!("quote-{}-{}.{extension}", quote.id, kind.as_str()))
                });
                let bytes = rendered.into_bytes();
                tokio::fs::write(&path, &bytes)
                    .await
                    .map_err(|error| ("io", error.to_string(), EXIT_STORAGE))?;

                Ok(format!("wrote {extension} document ({} bytes) to {}", bytes.len(), path.display()))
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
