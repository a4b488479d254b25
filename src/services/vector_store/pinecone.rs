//! Pinecone REST backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};

use super::{IndexInfo, VectorStore};
use crate::error::VectorStoreError;
use crate::models::{PineconeConfig, UpsertRecord};

const API_KEY_HEADER: &str = "Api-Key";
const API_VERSION_HEADER: &str = "X-Pinecone-API-Version";

#[derive(Debug, Deserialize)]
struct IndexDescription {
    host: String,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [UpsertRecord],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexStats {
    #[serde(default)]
    dimension: Option<u64>,
    #[serde(default)]
    total_vector_count: u64,
}

pub struct PineconeBackend {
    client: Client,
    api_key: String,
    api_version: String,
    index: String,
    host: String,
}

impl PineconeBackend {
    /// Build the client and resolve the index's data-plane host.
    ///
    /// A configured `host` is used as-is; otherwise the control plane is asked once.
    pub async fn connect(config: &PineconeConfig) -> Result<Self, VectorStoreError> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            VectorStoreError::ConnectionError("Pinecone API key is not configured".to_string())
        })?;

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| VectorStoreError::ConnectionError(e.to_string()))?;

        let mut backend = Self {
            client,
            api_key,
            api_version: config.api_version.clone(),
            index: config.index.clone(),
            host: String::new(),
        };

        backend.host = match config.host {
            Some(ref host) => normalize_host(host),
            None => backend.resolve_host(&config.control_plane_url).await?,
        };

        tracing::debug!(index = %backend.index, host = %backend.host, "pinecone index resolved");
        Ok(backend)
    }

    async fn resolve_host(&self, control_plane_url: &str) -> Result<String, VectorStoreError> {
        let url = format!(
            "{}/indexes/{}",
            control_plane_url.trim_end_matches('/'),
            self.index
        );

        let response = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .map_err(|e| VectorStoreError::ConnectionError(e.to_string()))?;

        let response = check_status(response, VectorStoreError::IndexError).await?;
        let description: IndexDescription = response
            .json()
            .await
            .map_err(|e| VectorStoreError::InvalidResponse(e.to_string()))?;

        Ok(normalize_host(&description.host))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(API_KEY_HEADER, &self.api_key)
            .header(API_VERSION_HEADER, &self.api_version)
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

#[async_trait]
impl VectorStore for PineconeBackend {
    async fn health_check(&self) -> Result<bool, VectorStoreError> {
        self.describe_index().await.map(|_| true)
    }

    async fn describe_index(&self) -> Result<IndexInfo, VectorStoreError> {
        let url = format!("{}/describe_index_stats", self.host);
        let response = self
            .authorized(self.client.post(&url))
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| VectorStoreError::ConnectionError(e.to_string()))?;

        let response = check_status(response, VectorStoreError::IndexError).await?;
        let stats: IndexStats = response
            .json()
            .await
            .map_err(|e| VectorStoreError::InvalidResponse(e.to_string()))?;

        Ok(IndexInfo {
            dimension: stats.dimension,
            total_vector_count: stats.total_vector_count,
        })
    }

    async fn upsert(&self, records: &[UpsertRecord]) -> Result<usize, VectorStoreError> {
        if records.is_empty() {
            return Ok(0);
        }

        let url = format!("{}/vectors/upsert", self.host);
        let response = self
            .authorized(self.client.post(&url))
            .json(&UpsertRequest { vectors: records })
            .send()
            .await
            .map_err(|e| VectorStoreError::UpsertError(e.to_string()))?;

        let response = check_status(response, VectorStoreError::UpsertError).await?;
        let body: UpsertResponse = response
            .json()
            .await
            .map_err(|e| VectorStoreError::InvalidResponse(e.to_string()))?;

        Ok(body.upserted_count.unwrap_or(records.len()))
    }

    fn index_name(&self) -> &str {
        &self.index
    }
}

async fn check_status(
    response: Response,
    wrap: fn(String) -> VectorStoreError,
) -> Result<Response, VectorStoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(wrap(format!("status {}: {}", status, body)))
}

/// Control plane returns bare hostnames; data-plane calls need a scheme.
fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}
