use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use marcena_core::domain::client::Client;
use marcena_core::errors::DomainError;

use super::{encode, RepositoryError};
use crate::fixtures;
use crate::storage::{CollectionStore, CLIENTS_COLLECTION};

/// Known customers, used to autocomplete quote drafts.
pub struct ClientDirectory {
    store: Arc<dyn CollectionStore>,
    clients: RwLock<Vec<Client>>,
}

impl ClientDirectory {
    pub async fn open(store: Arc<dyn CollectionStore>) -> Result<Self, RepositoryError> {
        let clients = match store.load(CLIENTS_COLLECTION).await? {
            Some(payload) => {
                serde_json::from_str::<Vec<Client>>(&payload).map_err(RepositoryError::codec)?
            }
            None => {
                let seeded = fixtures::default_clients();
                store.save(CLIENTS_COLLECTION, &encode(&seeded)?).await?;
                info!(count = seeded.len(), "seeded client directory on first run");
                seeded
            }
        };

        Ok(Self { store, clients: RwLock::new(clients) })
    }

    pub async fn list(&self) -> Vec<Client> {
        self.clients.read().await.clone()
    }

    /// Substring search over name, email, and phone. A blank query matches
    /// nothing rather than everything; the directory backs an autocomplete
    /// field.
    pub async fn search(&self, query: &str) -> Vec<Client> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        self.clients.read().await.iter().filter(|client| client.matches(query)).cloned().collect()
    }

    pub async fn add(
        &self,
        name: &str,
        email: &str,
        phone: &str,
    ) -> Result<Client, RepositoryError> {
        if name.trim().is_empty() {
            return Err(DomainError::validation("client.name", "must not be empty").into());
        }

        let client = Client::new(name.trim(), email.trim(), phone.trim());

        let mut clients = self.clients.write().await;
        clients.push(client.clone());
        self.persist(&clients).await?;
        info!(client_id = %client.id, "client added");

        Ok(client)
    }

    async fn persist(&self, clients: &[Client]) -> Result<(), RepositoryError> {
        self.store.save(CLIENTS_COLLECTION, &encode(&clients)?).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::ClientDirectory;
    use crate::storage::{CollectionStore, InMemoryCollectionStore, CLIENTS_COLLECTION};

    async fn empty_directory() -> ClientDirectory {
        let store = Arc::new(InMemoryCollectionStore::default());
        store.save(CLIENTS_COLLECTION, "[]").await.expect("prime empty collection");
        ClientDirectory::open(store).await.expect("open directory")
    }

    #[tokio::test]
    async fn search_matches_name_email_and_phone() {
        let directory = empty_directory().await;
        directory.add("João da Silva", "joao@example.com", "11987654321").await.expect("add");
        directory.add("Ana Souza", "ana@example.com", "21912345678").await.expect("add");

        assert_eq!(directory.search("joão").await.len(), 1);
        assert_eq!(directory.search("example.com").await.len(), 2);
        assert_eq!(directory.search("219").await.len(), 1);
        assert!(directory.search("carlos").await.is_empty());
    }

    #[tokio::test]
    async fn blank_queries_match_nothing() {
        let directory = empty_directory().await;
        directory.add("João da Silva", "joao@example.com", "11987654321").await.expect("add");

        assert!(directory.search("").await.is_empty());
        assert!(directory.search("   ").await.is_empty());
    }

    #[tokio::test]
    async fn add_requires_a_name() {
        let directory = empty_directory().await;
        assert!(directory.add(" ", "a@b.c", "123").await.is_err());
    }

    #[tokio::test]
    async fn first_open_seeds_the_default_client() {
        let store = Arc::new(InMemoryCollectionStore::default());
        let directory = ClientDirectory::open(store).await.expect("open");

        assert!(!directory.list().await.is_empty());
    }
}
