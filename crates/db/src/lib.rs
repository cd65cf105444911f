pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;
pub mod storage;

pub use connection::{connect, connect_with_settings, DbPool};
pub use repositories::{ClientDirectory, MaterialCatalog, QuoteRepository, RepositoryError};
pub use storage::{
    CollectionStore, InMemoryCollectionStore, SqliteCollectionStore, CLIENTS_COLLECTION,
    MATERIALS_COLLECTION, QUOTES_COLLECTION,
};
