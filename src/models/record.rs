use serde::{Deserialize, Serialize};

use super::catalog::CatalogEntry;

/// Metadata stored next to each vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub label: String,
    pub description: String,
}

/// Unit of write to the vector index, in Pinecone's upsert wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsertRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: RecordMetadata,
}

impl UpsertRecord {
    pub fn from_entry(entry: &CatalogEntry, values: Vec<f32>) -> Self {
        Self {
            id: entry.id.key(),
            values,
            metadata: RecordMetadata {
                label: entry.name.clone(),
                description: entry.description.clone().unwrap_or_default(),
            },
        }
    }
}
