use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::pricing;

/// Payment-terms boilerplate applied when the operator leaves the notes
/// field empty.
pub const DEFAULT_NOTES: &str =
    "50% due on contract signing, 50% on delivery. Lead time of 15 business days.";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    InProgress,
    Completed,
}

impl QuoteStatus {
    pub const ALL: [QuoteStatus; 5] = [
        QuoteStatus::Pending,
        QuoteStatus::Approved,
        QuoteStatus::Rejected,
        QuoteStatus::InProgress,
        QuoteStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Human label for a raw status value. Display surfaces must not fail on
/// values outside the known set; anything unrecognized renders as "unknown".
pub fn status_label(raw: &str) -> &'static str {
    match QuoteStatus::parse(raw) {
        Some(QuoteStatus::Pending) => "Pending",
        Some(QuoteStatus::Approved) => "Approved",
        Some(QuoteStatus::Rejected) => "Rejected",
        Some(QuoteStatus::InProgress) => "In progress",
        Some(QuoteStatus::Completed) => "Completed",
        None => "unknown",
    }
}

/// A catalog material snapshotted into a quote at selection time. Later
/// catalog edits never reach stored quotes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteLineItem {
    pub id: u32,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraCost {
    pub description: String,
    pub amount: Decimal,
}

impl ExtraCost {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.description.trim().is_empty() {
            return Err(DomainError::validation("extra_cost.description", "must not be empty"));
        }
        if self.amount <= Decimal::ZERO {
            return Err(DomainError::validation("extra_cost.amount", "must be a positive amount"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: String,
    pub project_description: String,
    pub line_items: Vec<QuoteLineItem>,
    pub labor_fee: Decimal,
    /// Records stored before this field existed load as an empty list.
    #[serde(default)]
    pub extra_costs: Vec<ExtraCost>,
    pub notes: String,
    pub total_amount: Decimal,
    #[serde(default)]
    pub status: QuoteStatus,
}

/// In-progress quote data as entered by the operator; unpersisted until
/// promoted. Line items may still carry zero quantities here.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteDraft {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: String,
    pub project_description: String,
    #[serde(default)]
    pub line_items: Vec<QuoteLineItem>,
    #[serde(default)]
    pub labor_fee: Decimal,
    #[serde(default)]
    pub extra_costs: Vec<ExtraCost>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl QuoteDraft {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_text("customer_name", &self.customer_name)?;
        require_text("customer_phone", &self.customer_phone)?;
        require_text("customer_email", &self.customer_email)?;
        require_text("project_description", &self.project_description)?;
        if self.labor_fee < Decimal::ZERO {
            return Err(DomainError::validation("labor_fee", "must not be negative"));
        }
        for cost in &self.extra_costs {
            cost.validate()?;
        }
        Ok(())
    }

    /// Running total over the draft as entered, zero-quantity lines and all.
    /// The same arithmetic applies after promotion; excluded lines simply
    /// contribute nothing.
    pub fn total(&self) -> Decimal {
        pricing::quote_total(&self.line_items, self.labor_fee, &self.extra_costs)
    }

    pub fn add_extra_cost(
        &mut self,
        description: impl Into<String>,
        amount: Decimal,
    ) -> Result<(), DomainError> {
        let cost = ExtraCost { description: description.into(), amount };
        cost.validate()?;
        self.extra_costs.push(cost);
        Ok(())
    }

    /// Removal is positional; extra costs have no identity beyond list order.
    pub fn remove_extra_cost(&mut self, index: usize) -> bool {
        if index < self.extra_costs.len() {
            self.extra_costs.remove(index);
            true
        } else {
            false
        }
    }

    /// Turns the draft into a persistable quote: validates, drops
    /// zero-quantity lines, applies the notes boilerplate, and derives the
    /// stored total from the retained components.
    pub fn promote(self, id: String, created_at: DateTime<Utc>) -> Result<Quote, DomainError> {
        self.validate()?;

        let line_items: Vec<QuoteLineItem> =
            self.line_items.into_iter().filter(|item| item.quantity > 0).collect();
        let notes = match self.notes {
            Some(notes) if !notes.trim().is_empty() => notes,
            _ => DEFAULT_NOTES.to_string(),
        };
        let total_amount = pricing::quote_total(&line_items, self.labor_fee, &self.extra_costs);

        Ok(Quote {
            id,
            created_at,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            customer_email: self.customer_email,
            project_description: self.project_description,
            line_items,
            labor_fee: self.labor_fee,
            extra_costs: self.extra_costs,
            notes,
            total_amount,
            status: QuoteStatus::Pending,
        })
    }
}

/// Partial update to a stored quote. There is deliberately no total field:
/// the stored total is recomputed whenever a contributing component changes
/// and can never be supplied by a caller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotePatch {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub project_description: Option<String>,
    pub line_items: Option<Vec<QuoteLineItem>>,
    pub labor_fee: Option<Decimal>,
    pub extra_costs: Option<Vec<ExtraCost>>,
    pub notes: Option<String>,
    pub status: Option<QuoteStatus>,
}

impl QuotePatch {
    pub fn status(status: QuoteStatus) -> Self {
        Self { status: Some(status), ..Self::default() }
    }

    pub fn touches_total(&self) -> bool {
        self.line_items.is_some() || self.labor_fee.is_some() || self.extra_costs.is_some()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(name) = &self.customer_name {
            require_text("customer_name", name)?;
        }
        if let Some(phone) = &self.customer_phone {
            require_text("customer_phone", phone)?;
        }
        if let Some(email) = &self.customer_email {
            require_text("customer_email", email)?;
        }
        if let Some(description) = &self.project_description {
            require_text("project_description", description)?;
        }
        if let Some(labor_fee) = &self.labor_fee {
            if *labor_fee < Decimal::ZERO {
                return Err(DomainError::validation("labor_fee", "must not be negative"));
            }
        }
        if let Some(costs) = &self.extra_costs {
            for cost in costs {
                cost.validate()?;
            }
        }
        Ok(())
    }

    /// Merges the patch onto a stored quote. Zero-quantity lines are dropped
    /// and the stored total is re-derived when any component changed.
    pub fn apply(self, quote: &mut Quote) {
        let recompute = self.touches_total();

        if let Some(name) = self.customer_name {
            quote.customer_name = name;
        }
        if let Some(phone) = self.customer_phone {
            quote.customer_phone = phone;
        }
        if let Some(email) = self.customer_email {
            quote.customer_email = email;
        }
        if let Some(description) = self.project_description {
            quote.project_description = description;
        }
        if let Some(items) = self.line_items {
            quote.line_items = items.into_iter().filter(|item| item.quantity > 0).collect();
        }
        if let Some(labor_fee) = self.labor_fee {
            quote.labor_fee = labor_fee;
        }
        if let Some(costs) = self.extra_costs {
            quote.extra_costs = costs;
        }
        if let Some(notes) = self.notes {
            quote.notes = notes;
        }
        if let Some(status) = self.status {
            quote.status = status;
        }

        if recompute {
            quote.total_amount =
                pricing::quote_total(&quote.line_items, quote.labor_fee, &quote.extra_costs);
        }
    }
}

fn require_text(field: &'static str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        Err(DomainError::validation(field, "must not be empty"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::{status_label, ExtraCost, QuoteDraft, QuoteLineItem, QuotePatch, QuoteStatus};
    use crate::errors::DomainError;

    fn draft() -> QuoteDraft {
        QuoteDraft {
            customer_name: "Helena Prado".to_string(),
            customer_phone: "11 98765-4321".to_string(),
            customer_email: "helena@example.com".to_string(),
            project_description: "Kitchen cabinets".to_string(),
            line_items: vec![QuoteLineItem {
                id: 1,
                name: "MDF sheet".to_string(),
                unit_price: Decimal::new(50000, 2),
                quantity: 2,
            }],
            labor_fee: Decimal::new(30000, 2),
            extra_costs: vec![ExtraCost {
                description: "Delivery".to_string(),
                amount: Decimal::new(15000, 2),
            }],
            notes: None,
        }
    }

    #[test]
    fn promote_derives_total_and_defaults() {
        let quote = draft().promote("1".to_string(), Utc::now()).expect("promote");

        assert_eq!(quote.total_amount, Decimal::new(145000, 2));
        assert_eq!(quote.status, QuoteStatus::Pending);
        assert_eq!(quote.notes, super::DEFAULT_NOTES);
    }

    #[test]
    fn running_total_tracks_the_draft_as_entered() {
        let mut input = draft();
        assert_eq!(input.total(), Decimal::new(145000, 2));

        input.add_extra_cost("Install", Decimal::new(20000, 2)).expect("add");
        assert_eq!(input.total(), Decimal::new(165000, 2));
    }

    #[test]
    fn promote_drops_zero_quantity_lines() {
        let mut input = draft();
        input.line_items.push(QuoteLineItem {
            id: 2,
            name: "Edge banding".to_string(),
            unit_price: Decimal::new(4500, 2),
            quantity: 0,
        });

        let quote = input.promote("1".to_string(), Utc::now()).expect("promote");

        assert_eq!(quote.line_items.len(), 1);
        assert_eq!(quote.total_amount, Decimal::new(145000, 2));
    }

    #[test]
    fn promote_rejects_blank_required_fields() {
        let mut input = draft();
        input.customer_name = "   ".to_string();

        let error = input.promote("1".to_string(), Utc::now()).expect_err("blank name");
        assert!(matches!(error, DomainError::Validation { field: "customer_name", .. }));
    }

    #[test]
    fn promote_keeps_operator_notes() {
        let mut input = draft();
        input.notes = Some("Deliver after the 15th.".to_string());

        let quote = input.promote("1".to_string(), Utc::now()).expect("promote");
        assert_eq!(quote.notes, "Deliver after the 15th.");
    }

    #[test]
    fn extra_cost_removal_is_positional() {
        let mut input = draft();
        input.add_extra_cost("Hardware", Decimal::new(8000, 2)).expect("add");

        assert!(input.remove_extra_cost(0));
        assert_eq!(input.extra_costs.len(), 1);
        assert_eq!(input.extra_costs[0].description, "Hardware");
        assert!(!input.remove_extra_cost(5));
    }

    #[test]
    fn add_extra_cost_rejects_non_positive_amounts() {
        let mut input = draft();
        let error = input.add_extra_cost("Discount", Decimal::ZERO).expect_err("zero amount");
        assert!(matches!(error, DomainError::Validation { field: "extra_cost.amount", .. }));
    }

    #[test]
    fn patch_recomputes_total_when_components_change() {
        let mut quote = draft().promote("1".to_string(), Utc::now()).expect("promote");

        let patch =
            QuotePatch { labor_fee: Some(Decimal::new(40000, 2)), ..QuotePatch::default() };
        patch.apply(&mut quote);

        assert_eq!(quote.total_amount, Decimal::new(155000, 2));
    }

    #[test]
    fn patch_without_components_keeps_stored_total() {
        let mut quote = draft().promote("1".to_string(), Utc::now()).expect("promote");

        let patch = QuotePatch {
            customer_name: Some("Marcos Lima".to_string()),
            status: Some(QuoteStatus::Approved),
            ..QuotePatch::default()
        };
        patch.apply(&mut quote);

        assert_eq!(quote.customer_name, "Marcos Lima");
        assert_eq!(quote.status, QuoteStatus::Approved);
        assert_eq!(quote.total_amount, Decimal::new(145000, 2));
    }

    #[test]
    fn patch_filters_zero_quantity_lines() {
        let mut quote = draft().promote("1".to_string(), Utc::now()).expect("promote");

        let patch = QuotePatch {
            line_items: Some(vec![
                QuoteLineItem {
                    id: 1,
                    name: "MDF sheet".to_string(),
                    unit_price: Decimal::new(50000, 2),
                    quantity: 3,
                },
                QuoteLineItem {
                    id: 2,
                    name: "Hinge".to_string(),
                    unit_price: Decimal::new(1890, 2),
                    quantity: 0,
                },
            ]),
            ..QuotePatch::default()
        };
        patch.apply(&mut quote);

        assert_eq!(quote.line_items.len(), 1);
        assert_eq!(quote.total_amount, Decimal::new(195000, 2));
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&QuoteStatus::InProgress).expect("serialize");
        assert_eq!(json, "\"in_progress\"");
        assert_eq!(QuoteStatus::parse("in_progress"), Some(QuoteStatus::InProgress));
    }

    #[test]
    fn unknown_status_labels_fall_back() {
        assert_eq!(status_label("approved"), "Approved");
        assert_eq!(status_label("archived"), "unknown");
        assert_eq!(status_label(""), "unknown");
    }

    #[test]
    fn stored_quote_without_extra_costs_loads_as_empty() {
        let payload = r#"{
            "id": "1718000000000",
            "created_at": "2024-06-10T09:00:00Z",
            "customer_name": "Helena Prado",
            "customer_phone": "11 98765-4321",
            "customer_email": "helena@example.com",
            "project_description": "Kitchen cabinets",
            "line_items": [],
            "labor_fee": "300",
            "notes": "Standard terms",
            "total_amount": "300",
            "status": "pending"
        }"#;

        let quote: super::Quote = serde_json::from_str(payload).expect("decode legacy record");
        assert!(quote.extra_costs.is_empty());
    }
}
