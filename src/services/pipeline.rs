//! Catalog → embedding → vector index seeding.

use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{EncodingError, SeedError};
use crate::models::{CatalogEntry, ItemFailure, SeedReport, UpsertRecord};
use crate::services::catalog::CatalogSource;
use crate::services::encoder::ImageEncoder;
use crate::services::vector_store::VectorStore;

/// Progress notification for one catalog entry.
#[derive(Debug)]
pub struct ItemProgress<'a> {
    /// 1-based position in catalog order.
    pub position: usize,
    pub total: usize,
    pub entry: &'a CatalogEntry,
    pub error: Option<&'a EncodingError>,
}

pub struct SeedingPipeline<'a> {
    catalog: &'a dyn CatalogSource,
    encoder: &'a dyn ImageEncoder,
    sink: &'a dyn VectorStore,
}

impl<'a> SeedingPipeline<'a> {
    pub fn new(
        catalog: &'a dyn CatalogSource,
        encoder: &'a dyn ImageEncoder,
        sink: &'a dyn VectorStore,
    ) -> Self {
        Self {
            catalog,
            encoder,
            sink,
        }
    }

    /// Run the pipeline, logging each failed entry at `warn`.
    pub async fn run(&self) -> Result<SeedReport, SeedError> {
        self.run_with(|progress| {
            if let Some(err) = progress.error {
                warn!(name = %progress.entry.name, error = %err, "failed to embed entry");
            }
        })
        .await
    }

    /// Run the pipeline, reporting each entry's outcome to `on_item`.
    ///
    /// Entries are processed one at a time in catalog order. Per-entry failures
    /// are collected; catalog and sink failures abort the run. Per-entry logs
    /// are `debug` only, so `on_item` decides how failures reach the user.
    pub async fn run_with<F>(&self, mut on_item: F) -> Result<SeedReport, SeedError>
    where
        F: FnMut(ItemProgress<'_>),
    {
        let started_at = Utc::now();
        let start = Instant::now();

        let entries = self.catalog.fetch_catalog().await?;
        let total = entries.len();
        info!(count = total, "catalog fetched");

        let mut succeeded = Vec::with_capacity(total);
        let mut failed = Vec::new();

        for (i, entry) in entries.iter().enumerate() {
            match self.encode_entry(entry).await {
                Ok(record) => {
                    debug!(name = %entry.name, id = %record.id, "added vector");
                    succeeded.push(record);
                    on_item(ItemProgress {
                        position: i + 1,
                        total,
                        entry,
                        error: None,
                    });
                }
                Err(err) => {
                    debug!(name = %entry.name, error = %err, "failed to embed entry");
                    on_item(ItemProgress {
                        position: i + 1,
                        total,
                        entry,
                        error: Some(&err),
                    });
                    failed.push(ItemFailure {
                        id: entry.id.key(),
                        name: entry.name.clone(),
                        cause: err.to_string(),
                    });
                }
            }
        }

        let upserted = if succeeded.is_empty() {
            info!("no vectors to insert");
            0
        } else {
            let count = self.sink.upsert(&succeeded).await?;
            info!(count, index = %self.sink.index_name(), "upserted vectors");
            count
        };

        Ok(SeedReport {
            index: self.sink.index_name().to_string(),
            started_at,
            duration_ms: start.elapsed().as_millis() as u64,
            succeeded,
            failed,
            upserted,
        })
    }

    async fn encode_entry(&self, entry: &CatalogEntry) -> Result<UpsertRecord, EncodingError> {
        let url = entry
            .image_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or(EncodingError::MissingImageUrl)?;
        let values = self.encoder.encode(url).await?;
        Ok(UpsertRecord::from_entry(entry, values))
    }
}
