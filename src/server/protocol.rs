use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::models::CatalogId;

/// Body of `POST /menus/filter`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRequest {
    #[serde(default)]
    pub ids: Vec<CatalogId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Error body, `{"detail": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: serde_json::Value,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: serde_json::Value,
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::GraphQl(errors) => ApiError {
                status: StatusCode::BAD_GATEWAY,
                detail: errors,
            },
            other if other.is_gateway_failure() => {
                tracing::warn!(error = %other, "menu endpoint unavailable");
                ApiError {
                    status: StatusCode::BAD_GATEWAY,
                    detail: "Cannot connect to menu GraphQL endpoint".into(),
                }
            }
            other => ApiError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                detail: other.to_string().into(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                detail: self.detail,
            }),
        )
            .into_response()
    }
}
