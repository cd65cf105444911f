use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A known customer, used for autocompleting quote drafts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl Client {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    /// Case-insensitive substring match over name and email; phone matches on
    /// the digits as stored.
    pub fn matches(&self, query: &str) -> bool {
        let query_lower = query.to_lowercase();
        self.name.to_lowercase().contains(&query_lower)
            || self.email.to_lowercase().contains(&query_lower)
            || self.phone.contains(query)
    }
}
