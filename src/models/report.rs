use chrono::{DateTime, Utc};
use serde::Serialize;

use super::record::UpsertRecord;

/// An entry that could not be embedded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemFailure {
    pub id: String,
    pub name: String,
    pub cause: String,
}

/// Outcome of one seeding run.
#[derive(Debug, Clone, Serialize)]
pub struct SeedReport {
    pub index: String,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub succeeded: Vec<UpsertRecord>,
    pub failed: Vec<ItemFailure>,
    /// Count acknowledged by the index; zero when no upsert was sent.
    pub upserted: usize,
}

impl SeedReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.succeeded.is_empty()
    }
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// Machine-parseable JSON format
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("unknown output format: {}", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
