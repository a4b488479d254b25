//! Vector index abstraction layer.
//!
//! The seeding pipeline writes through the [`VectorStore`] trait so the remote
//! index can be swapped for an in-memory fake in tests.

mod pinecone;

pub use pinecone::PineconeBackend;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::VectorStoreError;
use crate::models::{PineconeConfig, UpsertRecord};

/// Index statistics.
#[derive(Debug, Clone, Serialize)]
pub struct IndexInfo {
    pub dimension: Option<u64>,
    pub total_vector_count: u64,
}

/// Abstract trait for vector index operations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Check if the index is reachable.
    async fn health_check(&self) -> Result<bool, VectorStoreError>;

    /// Get dimension and vector count of the index.
    async fn describe_index(&self) -> Result<IndexInfo, VectorStoreError>;

    /// Insert or overwrite records by id in a single request.
    /// Returns the count acknowledged by the index.
    async fn upsert(&self, records: &[UpsertRecord]) -> Result<usize, VectorStoreError>;

    /// Name of the target index.
    fn index_name(&self) -> &str;
}

/// Connect to the configured index.
pub async fn create_backend(
    config: &PineconeConfig,
) -> Result<Box<dyn VectorStore>, VectorStoreError> {
    let backend = PineconeBackend::connect(config).await?;
    Ok(Box::new(backend))
}
