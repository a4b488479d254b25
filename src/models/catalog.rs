//! Catalog entries returned by the upstream menu service.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Upstream identifier, either numeric or textual.
///
/// The original JSON form is kept for serialization; comparisons go through
/// [`CatalogId::key`], so `1` and `"1"` are the same entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CatalogId {
    Int(i64),
    Str(String),
}

impl CatalogId {
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogId::Int(n) => write!(f, "{}", n),
            CatalogId::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for CatalogId {
    fn from(n: i64) -> Self {
        CatalogId::Int(n)
    }
}

impl From<i32> for CatalogId {
    fn from(n: i32) -> Self {
        CatalogId::Int(i64::from(n))
    }
}

impl From<&str> for CatalogId {
    fn from(s: &str) -> Self {
        CatalogId::Str(s.to_string())
    }
}

/// One menu item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: CatalogId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl CatalogEntry {
    pub fn new(
        id: impl Into<CatalogId>,
        name: impl Into<String>,
        description: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: Some(description.into()),
            image_url: Some(image_url.into()),
        }
    }
}
