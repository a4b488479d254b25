mod catalog;
mod config;
mod record;
mod report;

pub use catalog::{CatalogEntry, CatalogId};
pub use config::{
    CatalogConfig, Config, DEFAULT_BIND, DEFAULT_CONTROL_PLANE_URL, DEFAULT_EMBEDDING_DIMENSION,
    DEFAULT_IMAGE_SIZE, DEFAULT_MODEL_ID, DEFAULT_PINECONE_API_VERSION, DeviceKind,
    EmbeddingConfig, PineconeConfig, ServerConfig,
};
pub use record::{RecordMetadata, UpsertRecord};
pub use report::{ItemFailure, OutputFormat, SeedReport};
