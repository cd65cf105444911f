use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use marcena_core::domain::quote::{Quote, QuoteDraft, QuotePatch, QuoteStatus};

use super::{encode, RepositoryError};
use crate::fixtures;
use crate::storage::{CollectionStore, QUOTES_COLLECTION};

/// Single writer of the durable quote collection. The stored collection is
/// loaded once at open and written back as a whole on every mutation; the
/// in-memory copy is the authoritative one between writes.
pub struct QuoteRepository {
    store: Arc<dyn CollectionStore>,
    quotes: RwLock<Vec<Quote>>,
}

impl QuoteRepository {
    /// Loads the persisted collection, seeding the built-in sample set when
    /// the medium has nothing stored. Absent optional fields (older records
    /// without extra costs) normalize during decode.
    pub async fn open(store: Arc<dyn CollectionStore>) -> Result<Self, RepositoryError> {
        let quotes = match store.load(QUOTES_COLLECTION).await? {
            Some(payload) => {
                serde_json::from_str::<Vec<Quote>>(&payload).map_err(RepositoryError::codec)?
            }
            None => {
                let seeded = fixtures::sample_quotes();
                store.save(QUOTES_COLLECTION, &encode(&seeded)?).await?;
                info!(count = seeded.len(), "seeded quote collection on first run");
                seeded
            }
        };

        Ok(Self { store, quotes: RwLock::new(quotes) })
    }

    /// Promotes a draft into the collection: validation, zero-quantity
    /// filtering, notes defaulting, and total derivation all happen here,
    /// before anything is stored.
    pub async fn create(&self, draft: QuoteDraft) -> Result<Quote, RepositoryError> {
        let mut quotes = self.quotes.write().await;

        let created_at = Utc::now();
        let id = next_quote_id(&quotes, created_at);
        let quote = draft.promote(id, created_at)?;

        quotes.push(quote.clone());
        self.persist(&quotes).await?;
        info!(quote_id = %quote.id, total = %quote.total_amount, "quote created");

        Ok(quote)
    }

    /// Stored order, stable across reads. Presentation sorting is the
    /// caller's concern.
    pub async fn get_all(&self) -> Vec<Quote> {
        self.quotes.read().await.clone()
    }

    pub async fn get_by_id(&self, id: &str) -> Option<Quote> {
        self.quotes.read().await.iter().find(|quote| quote.id == id).cloned()
    }

    /// Merges a partial update onto the stored record. The stored total is
    /// recomputed whenever a contributing component is in the patch; the
    /// patch type cannot carry a total at all. Returns `Ok(None)` for an
    /// unknown id, leaving the collection untouched.
    pub async fn update(
        &self,
        id: &str,
        patch: QuotePatch,
    ) -> Result<Option<Quote>, RepositoryError> {
        patch.validate()?;

        let mut quotes = self.quotes.write().await;
        let Some(quote) = quotes.iter_mut().find(|quote| quote.id == id) else {
            return Ok(None);
        };

        patch.apply(quote);
        let updated = quote.clone();

        self.persist(&quotes).await?;
        debug!(quote_id = %id, "quote updated");

        Ok(Some(updated))
    }

    /// Any status may move to any other status, including itself; there are
    /// no guard conditions and no transition side effects.
    pub async fn set_status(
        &self,
        id: &str,
        status: QuoteStatus,
    ) -> Result<Option<Quote>, RepositoryError> {
        self.update(id, QuotePatch::status(status)).await
    }

    pub async fn remove(&self, id: &str) -> Result<bool, RepositoryError> {
        let mut quotes = self.quotes.write().await;
        let before = quotes.len();
        quotes.retain(|quote| quote.id != id);

        if quotes.len() == before {
            return Ok(false);
        }

        self.persist(&quotes).await?;
        info!(quote_id = %id, "quote removed");
        Ok(true)
    }

    async fn persist(&self, quotes: &[Quote]) -> Result<(), RepositoryError> {
        self.store.save(QUOTES_COLLECTION, &encode(&quotes)?).await
    }
}

/// Ids derive from the creation timestamp in milliseconds; the bump loop
/// keeps same-millisecond creations unique.
fn next_quote_id(quotes: &[Quote], created_at: DateTime<Utc>) -> String {
    let mut millis = created_at.timestamp_millis();
    loop {
        let candidate = millis.to_string();
        if !quotes.iter().any(|quote| quote.id == candidate) {
            return candidate;
        }
        millis += 1;
    }
}
