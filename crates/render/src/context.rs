use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use tera::Context;
use tracing::warn;

use marcena_core::config::CompanyConfig;
use marcena_core::domain::quote::Quote;
use marcena_core::pricing;

use crate::DocumentKind;

/// Payment methods printed on both documents.
const PAYMENT_METHODS: &[&str] = &[
    "Pix",
    "Bank transfer",
    "Cash",
    "Credit card (card machine fee applies)",
    "Debit card",
];

/// Warranty and terms boilerplate for the terms block.
const WARRANTY_PERIOD: &str = "3 years";
const WARRANTY_NOTE: &str = "The warranty does not cover damage caused by misuse, such as \
     impacts, scratches, or excess weight on or inside the furniture.";

/// Builds the template context from a persisted quote. Pure read: the quote
/// is never mutated, and the grand total printed is the stored one. A
/// disagreement with recomputation is logged and nothing more.
pub(crate) fn document_context(
    quote: &Quote,
    kind: DocumentKind,
    company: &CompanyConfig,
) -> Context {
    let totals = pricing::quote_totals(quote);
    if totals.grand_total != quote.total_amount {
        warn!(
            quote_id = %quote.id,
            stored = %quote.total_amount,
            recomputed = %totals.grand_total,
            "stored total disagrees with recomputation; rendering the stored value"
        );
    }

    let mut rows: Vec<serde_json::Value> = quote
        .line_items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            json!({
                "position": index + 1,
                "description": item.name,
                "quantity": item.quantity,
                "unit_price": item.unit_price,
                "line_total": item.unit_price * Decimal::from(item.quantity),
            })
        })
        .collect();

    // Extra costs and the labor fee continue the same numbered table.
    for (index, cost) in quote.extra_costs.iter().enumerate() {
        rows.push(json!({
            "position": quote.line_items.len() + index + 1,
            "description": format!("{} (additional)", cost.description),
            "quantity": 1,
            "unit_price": cost.amount,
            "line_total": cost.amount,
        }));
    }
    rows.push(json!({
        "position": quote.line_items.len() + quote.extra_costs.len() + 1,
        "description": match kind {
            DocumentKind::Internal => "Labor (profit)",
            DocumentKind::Client => "Labor",
        },
        "quantity": 1,
        "unit_price": quote.labor_fee,
        "line_total": quote.labor_fee,
    }));

    let mut context = Context::new();
    context.insert("quote", quote);
    context.insert("rows", &rows);
    context.insert("totals", &totals);
    context.insert("grand_total", &quote.total_amount);
    context.insert("has_extras", &!quote.extra_costs.is_empty());
    context.insert("company", company);
    context.insert("reference", &format!("{:0>6}", quote.id));
    context.insert("issued_on", &quote.created_at.format("%d/%m/%Y").to_string());
    context.insert(
        "valid_until",
        &(Utc::now() + Duration::days(i64::from(company.quote_validity_days)))
            .format("%d/%m/%Y")
            .to_string(),
    );
    context.insert("payment_methods", PAYMENT_METHODS);
    context.insert("warranty_period", WARRANTY_PERIOD);
    context.insert("warranty_note", WARRANTY_NOTE);

    context
}
