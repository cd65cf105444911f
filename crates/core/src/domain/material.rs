use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// A purchasable material in the catalog. Quotes copy these by value at
/// selection time; the catalog and stored quotes have independent lifecycles
/// after the copy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialEntry {
    pub id: u32,
    pub name: String,
    pub unit_price: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialPatch {
    pub name: Option<String>,
    pub unit_price: Option<Decimal>,
}

impl MaterialPatch {
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(unit_price) = &self.unit_price {
            validate_unit_price(*unit_price)?;
        }
        Ok(())
    }

    pub fn apply(self, entry: &mut MaterialEntry) {
        if let Some(name) = self.name {
            entry.name = name;
        }
        if let Some(unit_price) = self.unit_price {
            entry.unit_price = unit_price;
        }
    }
}

pub fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("material.name", "must not be empty"));
    }
    Ok(())
}

pub fn validate_unit_price(unit_price: Decimal) -> Result<(), DomainError> {
    if unit_price <= Decimal::ZERO {
        return Err(DomainError::validation("material.unit_price", "must be a positive amount"));
    }
    Ok(())
}

/// Next id is recomputed from the surviving entries, so the max id is
/// reissued after the entry holding it is deleted. Intentional, matches the
/// catalog's historical behavior.
pub fn next_id(entries: &[MaterialEntry]) -> u32 {
    entries.iter().map(|entry| entry.id).max().unwrap_or(0) + 1
}
