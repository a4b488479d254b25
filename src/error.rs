//! Error types for the menu seeder.

use thiserror::Error;

/// Errors raised while talking to the upstream GraphQL catalog endpoint.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot connect to menu GraphQL endpoint: {0}")]
    Unreachable(String),

    #[error("menu GraphQL endpoint returned status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("menu GraphQL endpoint returned errors: {0}")]
    GraphQl(serde_json::Value),

    #[error("unexpected catalog response: {0}")]
    Structural(String),
}

impl CatalogError {
    /// Whether the query service should answer with a gateway-class status.
    pub fn is_gateway_failure(&self) -> bool {
        matches!(
            self,
            CatalogError::Unreachable(_) | CatalogError::HttpStatus { .. } | CatalogError::GraphQl(_)
        )
    }
}

/// Errors related to loading or running the image model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model not found: {0}")]
    NotFound(String),

    #[error("failed to load model: {0}")]
    LoadError(String),

    #[error("inference error: {0}")]
    InferenceError(String),
}

/// Per-item failures while turning an image URL into an embedding.
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("entry has no image URL")]
    MissingImageUrl,

    #[error("failed to download image: {0}")]
    Fetch(String),

    #[error("image host returned status {0}")]
    HttpStatus(u16),

    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error(transparent)]
    Inference(#[from] ModelError),
}

/// Errors related to vector index operations.
#[derive(Debug, Error)]
pub enum VectorStoreError {
    #[error("failed to connect to Pinecone: {0}")]
    ConnectionError(String),

    #[error("index error: {0}")]
    IndexError(String),

    #[error("upsert error: {0}")]
    UpsertError(String),

    #[error("invalid Pinecone response: {0}")]
    InvalidResponse(String),
}

/// Errors that abort a seeding run.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("catalog fetch failed: {0}")]
    Catalog(#[from] CatalogError),

    #[error("vector upsert failed: {0}")]
    Sink(#[from] VectorStoreError),
}

/// Errors related to configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    #[error("path error: {0}")]
    PathError(String),

    #[error("validation error: {0}")]
    ValidationError(String),
}
