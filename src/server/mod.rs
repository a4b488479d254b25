//! HTTP query service over the menu catalog.

pub mod protocol;

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::models::CatalogEntry;
use crate::services::{CatalogClient, filter_by_ids};
use protocol::{ApiError, FilterRequest, HealthResponse};

#[derive(Clone)]
pub struct AppState {
    catalog: Arc<CatalogClient>,
}

impl AppState {
    pub fn new(catalog: CatalogClient) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/menus", get(list_menus))
        .route("/menus/filter", post(filter_menus))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn list_menus(State(state): State<AppState>) -> Result<Json<Vec<CatalogEntry>>, ApiError> {
    let entries = state.catalog.fetch_catalog_checked().await?;
    Ok(Json(entries))
}

async fn filter_menus(
    State(state): State<AppState>,
    Json(request): Json<FilterRequest>,
) -> Result<Json<Vec<CatalogEntry>>, ApiError> {
    let entries = state.catalog.fetch_catalog_checked().await?;
    Ok(Json(filter_by_ids(&entries, &request.ids)))
}

/// Bind and serve until the surrounding task is dropped.
pub async fn run_server(state: AppState, bind: &str) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(bind).await?;
    tracing::info!(addr = %listener.local_addr()?, "menu query service listening");
    axum::serve(listener, router(state)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CatalogConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use mockito::Server;
    use tower::ServiceExt;

    fn app(endpoint: String) -> Router {
        let catalog = CatalogClient::new(&CatalogConfig {
            endpoint,
            timeout_secs: Some(5),
        })
        .unwrap();
        router(AppState::new(catalog))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn upstream_with_menus() -> mockito::ServerGuard {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "data": {"menus": [
                        {"id": 1, "name": "Pho", "description": "Beef noodle soup", "imageUrl": "http://x/pho.jpg"},
                        {"id": 2, "name": "Banh Mi", "description": "Sandwich", "imageUrl": "http://x/bm.jpg"},
                        {"id": 3, "name": "Che", "description": "Dessert", "imageUrl": "http://x/che.jpg"}
                    ]}
                })
                .to_string(),
            )
            .create_async()
            .await;
        server
    }

    #[tokio::test]
    async fn test_list_menus() {
        let server = upstream_with_menus().await;
        let response = app(server.url())
            .oneshot(Request::get("/menus").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json.as_array().unwrap().len(), 3);
        assert_eq!(json[0]["id"], serde_json::json!(1));
        assert_eq!(json[0]["imageUrl"], serde_json::json!("http://x/pho.jpg"));
    }

    #[tokio::test]
    async fn test_filter_menus_by_ids() {
        let server = upstream_with_menus().await;
        let request = Request::post("/menus/filter")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"ids": ["3", 1]}"#))
            .unwrap();

        let response = app(server.url()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let names: Vec<&str> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Pho", "Che"]);
    }

    #[tokio::test]
    async fn test_filter_with_no_ids_returns_empty() {
        let server = upstream_with_menus().await;
        let request = Request::post("/menus/filter")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"ids": []}"#))
            .unwrap();

        let response = app(server.url()).oneshot(request).await.unwrap();
        assert_eq!(body_json(response).await, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_graphql_errors_map_to_bad_gateway() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"errors":[{"message":"boom"}]}"#)
            .create_async()
            .await;

        let response = app(server.url())
            .oneshot(Request::get("/menus").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"detail": [{"message": "boom"}]})
        );
    }

    #[tokio::test]
    async fn test_unreachable_upstream_maps_to_bad_gateway() {
        let response = app("http://127.0.0.1:1/graphql".to_string())
            .oneshot(Request::get("/menus").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            body_json(response).await["detail"],
            serde_json::json!("Cannot connect to menu GraphQL endpoint")
        );
    }

    #[tokio::test]
    async fn test_malformed_upstream_is_internal_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"data":{}}"#)
            .create_async()
            .await;

        let response = app(server.url())
            .oneshot(Request::get("/menus").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_health() {
        let response = app("http://127.0.0.1:1".to_string())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
