use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::{debug, info};

use marcena_core::domain::material::{self, MaterialEntry, MaterialPatch};

use super::{encode, RepositoryError};
use crate::fixtures;
use crate::storage::{CollectionStore, MATERIALS_COLLECTION};

/// Authoritative list of purchasable materials. Quotes copy entries by value
/// at selection time, so catalog edits never reach stored quotes.
pub struct MaterialCatalog {
    store: Arc<dyn CollectionStore>,
    entries: RwLock<Vec<MaterialEntry>>,
}

impl MaterialCatalog {
    pub async fn open(store: Arc<dyn CollectionStore>) -> Result<Self, RepositoryError> {
        let entries = match store.load(MATERIALS_COLLECTION).await? {
            Some(payload) => serde_json::from_str::<Vec<MaterialEntry>>(&payload)
                .map_err(RepositoryError::codec)?,
            None => {
                let seeded = fixtures::default_materials();
                store.save(MATERIALS_COLLECTION, &encode(&seeded)?).await?;
                info!(count = seeded.len(), "seeded material catalog on first run");
                seeded
            }
        };

        Ok(Self { store, entries: RwLock::new(entries) })
    }

    /// Insertion order.
    pub async fn list(&self) -> Vec<MaterialEntry> {
        self.entries.read().await.clone()
    }

    pub async fn find(&self, id: u32) -> Option<MaterialEntry> {
        self.entries.read().await.iter().find(|entry| entry.id == id).cloned()
    }

    /// Validates at the boundary, then appends with the next recomputed id.
    /// Duplicate names are allowed.
    pub async fn add(
        &self,
        name: &str,
        unit_price: Decimal,
    ) -> Result<MaterialEntry, RepositoryError> {
        material::validate_name(name)?;
        material::validate_unit_price(unit_price)?;

        let mut entries = self.entries.write().await;
        let entry = MaterialEntry {
            id: material::next_id(&entries),
            name: name.trim().to_string(),
            unit_price,
        };

        entries.push(entry.clone());
        self.persist(&entries).await?;
        info!(material_id = entry.id, name = %entry.name, "material added");

        Ok(entry)
    }

    /// Field-level partial update; `Ok(None)` for an unknown id.
    pub async fn update(
        &self,
        id: u32,
        patch: MaterialPatch,
    ) -> Result<Option<MaterialEntry>, RepositoryError> {
        patch.validate()?;

        let mut entries = self.entries.write().await;
        let Some(entry) = entries.iter_mut().find(|entry| entry.id == id) else {
            return Ok(None);
        };

        patch.apply(entry);
        let updated = entry.clone();

        self.persist(&entries).await?;
        debug!(material_id = id, "material updated");

        Ok(Some(updated))
    }

    pub async fn remove(&self, id: u32) -> Result<bool, RepositoryError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|entry| entry.id != id);

        if entries.len() == before {
            return Ok(false);
        }

        self.persist(&entries).await?;
        info!(material_id = id, "material removed");
        Ok(true)
    }

    async fn persist(&self, entries: &[MaterialEntry]) -> Result<(), RepositoryError> {
        self.store.save(MATERIALS_COLLECTION, &encode(&entries)?).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use marcena_core::domain::material::MaterialPatch;
    use marcena_core::errors::DomainError;

    use super::MaterialCatalog;
    use crate::repositories::RepositoryError;
    use crate::storage::{CollectionStore, InMemoryCollectionStore, MATERIALS_COLLECTION};

    async fn empty_catalog() -> MaterialCatalog {
        let store = Arc::new(InMemoryCollectionStore::default());
        store.save(MATERIALS_COLLECTION, "[]").await.expect("prime empty collection");
        MaterialCatalog::open(store).await.expect("open catalog")
    }

    #[tokio::test]
    async fn sequential_adds_yield_sequential_ids() {
        let catalog = empty_catalog().await;

        for index in 1..=4u32 {
            let entry = catalog
                .add(&format!("Material {index}"), Decimal::from(10))
                .await
                .expect("add material");
            assert_eq!(entry.id, index);
        }
    }

    #[tokio::test]
    async fn deleting_the_max_id_reissues_it() {
        let catalog = empty_catalog().await;
        catalog.add("First", Decimal::from(10)).await.expect("add");
        catalog.add("Second", Decimal::from(20)).await.expect("add");
        let third = catalog.add("Third", Decimal::from(30)).await.expect("add");

        assert!(catalog.remove(third.id).await.expect("remove"));

        let reissued = catalog.add("Fourth", Decimal::from(40)).await.expect("add");
        assert_eq!(reissued.id, third.id);
    }

    #[tokio::test]
    async fn duplicate_names_are_permitted() {
        let catalog = empty_catalog().await;
        catalog.add("MDF sheet", Decimal::from(500)).await.expect("first add");
        let second = catalog.add("MDF sheet", Decimal::from(550)).await.expect("second add");

        assert_eq!(second.id, 2);
        assert_eq!(catalog.list().await.len(), 2);
    }

    #[tokio::test]
    async fn add_rejects_blank_names_and_non_positive_prices() {
        let catalog = empty_catalog().await;

        let blank = catalog.add("  ", Decimal::from(10)).await.expect_err("blank name");
        assert!(matches!(blank, RepositoryError::Domain(DomainError::Validation { .. })));

        let free = catalog.add("Offcut", Decimal::ZERO).await.expect_err("zero price");
        assert!(matches!(free, RepositoryError::Domain(DomainError::Validation { .. })));

        assert!(catalog.list().await.is_empty());
    }

    #[tokio::test]
    async fn update_unknown_id_signals_not_found_without_failing() {
        let catalog = empty_catalog().await;

        let result = catalog
            .update(99, MaterialPatch { name: Some("Renamed".to_string()), unit_price: None })
            .await
            .expect("update");

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn update_applies_partial_fields() {
        let catalog = empty_catalog().await;
        let entry = catalog.add("Hinge", Decimal::new(1890, 2)).await.expect("add");

        let updated = catalog
            .update(
                entry.id,
                MaterialPatch { name: None, unit_price: Some(Decimal::new(2100, 2)) },
            )
            .await
            .expect("update")
            .expect("entry should exist");

        assert_eq!(updated.name, "Hinge");
        assert_eq!(updated.unit_price, Decimal::new(2100, 2));
    }

    #[tokio::test]
    async fn first_open_seeds_the_default_catalog() {
        let store = Arc::new(InMemoryCollectionStore::default());
        let catalog = MaterialCatalog::open(store).await.expect("open");

        assert!(!catalog.list().await.is_empty());
    }
}
