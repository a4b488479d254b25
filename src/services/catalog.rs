//! GraphQL client for the upstream menu catalog.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::models::{CatalogConfig, CatalogEntry, CatalogId};

/// Fixed query sent to the menu endpoint.
pub const MENU_QUERY: &str = r#"
{
    menus {
        id
        name
        description
        imageUrl
    }
}
"#;

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<MenusData>,
    #[serde(default)]
    errors: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct MenusData {
    #[serde(default)]
    menus: Option<Vec<CatalogEntry>>,
}

impl GraphQlResponse {
    fn into_entries(self) -> Result<Vec<CatalogEntry>, CatalogError> {
        self.data
            .ok_or_else(|| CatalogError::Structural("response has no `data` field".to_string()))?
            .menus
            .ok_or_else(|| CatalogError::Structural("response has no `data.menus` field".to_string()))
    }
}

/// Anything that can produce the full catalog for a seeding run.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, CatalogError>;
}

/// Client for the menu GraphQL endpoint.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    endpoint: String,
}

impl CatalogClient {
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| CatalogError::Unreachable(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    /// Fetch the catalog without inspecting GraphQL `errors`.
    ///
    /// An error payload without `data` surfaces as [`CatalogError::Structural`].
    pub async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        self.query().await?.into_entries()
    }

    /// Fetch the catalog, turning a GraphQL `errors` payload into
    /// [`CatalogError::GraphQl`] before looking at `data`.
    pub async fn fetch_catalog_checked(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        let response = self.query().await?;
        if let Some(errors) = response.errors {
            return Err(CatalogError::GraphQl(errors));
        }
        response.into_entries()
    }

    async fn query(&self) -> Result<GraphQlResponse, CatalogError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&GraphQlRequest { query: MENU_QUERY })
            .send()
            .await
            .map_err(|e| CatalogError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::Unreachable(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| CatalogError::Structural(e.to_string()))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CatalogSource for CatalogClient {
    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        CatalogClient::fetch_catalog(self).await
    }
}

/// Keep the entries whose string id appears in `ids`, in catalog order.
pub fn filter_by_ids(entries: &[CatalogEntry], ids: &[CatalogId]) -> Vec<CatalogEntry> {
    let wanted: HashSet<String> = ids.iter().map(CatalogId::key).collect();
    entries
        .iter()
        .filter(|entry| wanted.contains(&entry.id.key()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn client_for(url: String) -> CatalogClient {
        CatalogClient::new(&CatalogConfig {
            endpoint: url,
            timeout_secs: Some(5),
        })
        .unwrap()
    }

    fn menus_body() -> String {
        serde_json::json!({
            "data": {
                "menus": [
                    {"id": 2, "name": "Banh Mi", "description": "Sandwich", "imageUrl": "http://x/bm.jpg"},
                    {"id": 1, "name": "Pho", "description": "Beef noodle soup", "imageUrl": "http://x/pho.jpg"},
                    {"id": "3", "name": "Che", "description": "Dessert", "imageUrl": "http://x/che.jpg"}
                ]
            }
        })
        .to_string()
    }

    fn sample_entries() -> Vec<CatalogEntry> {
        vec![
            CatalogEntry::new(1, "Pho", "Beef noodle soup", "http://x/pho.jpg"),
            CatalogEntry::new("2", "Banh Mi", "Sandwich", "http://x/bm.jpg"),
            CatalogEntry::new(3, "Che", "Dessert", "http://x/che.jpg"),
        ]
    }

    #[tokio::test]
    async fn test_fetch_preserves_order_and_count() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/graphql")
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJson(serde_json::json!({"query": MENU_QUERY})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(menus_body())
            .create_async()
            .await;

        let client = client_for(format!("{}/graphql", server.url()));
        let entries = client.fetch_catalog().await.unwrap();

        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Banh Mi", "Pho", "Che"]);
        assert_eq!(entries[2].id, CatalogId::Str("3".into()));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_checked_fetch_surfaces_graphql_errors() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"errors":[{"message":"boom"}]}"#)
            .create_async()
            .await;

        let client = client_for(server.url());
        let err = client.fetch_catalog_checked().await.unwrap_err();

        match err {
            CatalogError::GraphQl(detail) => {
                assert_eq!(detail, serde_json::json!([{"message": "boom"}]));
            }
            other => panic!("expected GraphQl error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unchecked_fetch_reports_missing_data() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"errors":[{"message":"boom"}]}"#)
            .create_async()
            .await;

        let client = client_for(server.url());
        let err = client.fetch_catalog().await.unwrap_err();
        assert!(matches!(err, CatalogError::Structural(_)));
    }

    #[tokio::test]
    async fn test_malformed_entry_is_structural() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"data":{"menus":[{"id":1,"imageUrl":"http://x"}]}}"#)
            .create_async()
            .await;

        let client = client_for(server.url());
        let err = client.fetch_catalog_checked().await.unwrap_err();
        assert!(matches!(err, CatalogError::Structural(_)));
        assert!(!err.is_gateway_failure());
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(503)
            .with_body("down")
            .create_async()
            .await;

        let client = client_for(server.url());
        let err = client.fetch_catalog().await.unwrap_err();
        assert!(matches!(err, CatalogError::HttpStatus { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let client = client_for("http://127.0.0.1:1/graphql".to_string());
        let err = client.fetch_catalog().await.unwrap_err();
        assert!(matches!(err, CatalogError::Unreachable(_)));
        assert!(err.is_gateway_failure());
    }

    #[tokio::test]
    async fn test_empty_catalog() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"data":{"menus":[]}}"#)
            .create_async()
            .await;

        let client = client_for(server.url());
        assert!(client.fetch_catalog().await.unwrap().is_empty());
    }

    #[test]
    fn test_filter_keeps_catalog_order() {
        let ids = vec![CatalogId::from("3"), CatalogId::from("1")];
        let filtered = filter_by_ids(&sample_entries(), &ids);
        let names: Vec<&str> = filtered.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Pho", "Che"]);
    }

    #[test]
    fn test_filter_compares_string_forms() {
        let filtered = filter_by_ids(&sample_entries(), &[CatalogId::Int(2)]);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "Banh Mi");
    }

    #[test]
    fn test_filter_empty_ids() {
        assert!(filter_by_ids(&sample_entries(), &[]).is_empty());
    }

    #[test]
    fn test_filter_unknown_ids() {
        assert!(filter_by_ids(&sample_entries(), &[CatalogId::from("99")]).is_empty());
    }
}
