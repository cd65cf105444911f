//! First-run demo collections. A repository seeds its collection from these
//! only when the persistence medium has nothing stored under its key.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use marcena_core::domain::client::Client;
use marcena_core::domain::material::MaterialEntry;
use marcena_core::domain::quote::{ExtraCost, Quote, QuoteLineItem, QuoteStatus, DEFAULT_NOTES};
use marcena_core::pricing;

pub fn default_materials() -> Vec<MaterialEntry> {
    vec![
        material(1, "MDF sheet 18mm", Decimal::new(50000, 2)),
        material(2, "Edge banding roll 50m", Decimal::new(4500, 2)),
        material(3, "Soft-close hinge 35mm", Decimal::new(1890, 2)),
        material(4, "Telescopic drawer slide 450mm", Decimal::new(3250, 2)),
        material(5, "Aluminum handle 128mm", Decimal::new(1575, 2)),
    ]
}

pub fn sample_quotes() -> Vec<Quote> {
    vec![
        sample_quote(
            "1718275800000",
            1_718_275_800,
            "Helena Prado",
            "11 98765-4321",
            "helena.prado@example.com",
            "Kitchen cabinets with island",
            vec![
                line_item(1, "MDF sheet 18mm", Decimal::new(50000, 2), 4),
                line_item(3, "Soft-close hinge 35mm", Decimal::new(1890, 2), 12),
            ],
            Decimal::new(120000, 2),
            vec![ExtraCost {
                description: "Delivery".to_string(),
                amount: Decimal::new(15000, 2),
            }],
            QuoteStatus::Pending,
        ),
        sample_quote(
            "1716561000000",
            1_716_561_000,
            "Marcos Lima",
            "11 91234-5678",
            "marcos.lima@example.com",
            "Bedroom wardrobe, sliding doors",
            vec![
                line_item(1, "MDF sheet 18mm", Decimal::new(50000, 2), 3),
                line_item(4, "Telescopic drawer slide 450mm", Decimal::new(3250, 2), 6),
                line_item(5, "Aluminum handle 128mm", Decimal::new(1575, 2), 4),
            ],
            Decimal::new(95000, 2),
            vec![],
            QuoteStatus::Completed,
        ),
    ]
}

pub fn default_clients() -> Vec<Client> {
    vec![Client {
        id: "1".to_string(),
        name: "João da Silva".to_string(),
        email: "joao.silva@example.com".to_string(),
        phone: "11 98765-4321".to_string(),
    }]
}

fn material(id: u32, name: &str, unit_price: Decimal) -> MaterialEntry {
    MaterialEntry { id, name: name.to_string(), unit_price }
}

fn line_item(id: u32, name: &str, unit_price: Decimal, quantity: u32) -> QuoteLineItem {
    QuoteLineItem { id, name: name.to_string(), unit_price, quantity }
}

#[allow(clippy::too_many_arguments)]
fn sample_quote(
    id: &str,
    created_at_secs: i64,
    customer_name: &str,
    customer_phone: &str,
    customer_email: &str,
    project_description: &str,
    line_items: Vec<QuoteLineItem>,
    labor_fee: Decimal,
    extra_costs: Vec<ExtraCost>,
    status: QuoteStatus,
) -> Quote {
    // Totals go through the calculator so the stored-total invariant holds
    // for seeded records by construction.
    let total_amount = pricing::quote_total(&line_items, labor_fee, &extra_costs);

    Quote {
        id: id.to_string(),
        created_at: DateTime::<Utc>::from_timestamp(created_at_secs, 0).unwrap_or_default(),
        customer_name: customer_name.to_string(),
        customer_phone: customer_phone.to_string(),
        customer_email: customer_email.to_string(),
        project_description: project_description.to_string(),
        line_items,
        labor_fee,
        extra_costs,
        notes: DEFAULT_NOTES.to_string(),
        total_amount,
        status,
    }
}
