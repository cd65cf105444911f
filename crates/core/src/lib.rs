pub mod auth;
pub mod config;
pub mod domain;
pub mod errors;
pub mod pricing;

pub use auth::{Operator, Session};
pub use domain::client::Client;
pub use domain::material::{MaterialEntry, MaterialPatch};
pub use domain::quote::{
    status_label, ExtraCost, Quote, QuoteDraft, QuoteLineItem, QuotePatch, QuoteStatus,
    DEFAULT_NOTES,
};
pub use errors::{ApplicationError, DomainError};
pub use pricing::{quote_total, quote_totals, QuoteTotals};
