use thiserror::Error;

use marcena_core::errors::DomainError;

pub mod client;
pub mod material;
pub mod quote;

pub use client::ClientDirectory;
pub use material::MaterialCatalog;
pub use quote::QuoteRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl RepositoryError {
    pub(crate) fn codec(error: serde_json::Error) -> Self {
        Self::Decode(error.to_string())
    }
}

pub(crate) fn encode<T: serde::Serialize>(value: &T) -> Result<String, RepositoryError> {
    serde_json::to_string(value).map_err(RepositoryError::codec)
}
