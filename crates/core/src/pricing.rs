use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::quote::{ExtraCost, Quote, QuoteLineItem};

/// Breakdown of a quote's monetary components, as rendered on both export
/// documents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteTotals {
    pub materials_subtotal: Decimal,
    pub extras_subtotal: Decimal,
    pub labor_fee: Decimal,
    pub grand_total: Decimal,
}

pub fn line_items_subtotal(items: &[QuoteLineItem]) -> Decimal {
    items.iter().map(|item| item.unit_price * Decimal::from(item.quantity)).sum()
}

pub fn extra_costs_subtotal(costs: &[ExtraCost]) -> Decimal {
    costs.iter().map(|cost| cost.amount).sum()
}

/// The single total rule: materials plus labor plus extra costs. Applies
/// identically to drafts and stored quotes; no rounding before persistence.
pub fn quote_total(items: &[QuoteLineItem], labor_fee: Decimal, costs: &[ExtraCost]) -> Decimal {
    line_items_subtotal(items) + labor_fee + extra_costs_subtotal(costs)
}

pub fn totals(items: &[QuoteLineItem], labor_fee: Decimal, costs: &[ExtraCost]) -> QuoteTotals {
    let materials_subtotal = line_items_subtotal(items);
    let extras_subtotal = extra_costs_subtotal(costs);

    QuoteTotals {
        materials_subtotal,
        extras_subtotal,
        labor_fee,
        grand_total: materials_subtotal + labor_fee + extras_subtotal,
    }
}

pub fn quote_totals(quote: &Quote) -> QuoteTotals {
    totals(&quote.line_items, quote.labor_fee, &quote.extra_costs)
}
