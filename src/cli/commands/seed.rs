use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::output::get_formatter;
use crate::models::{Config, OutputFormat};
use crate::services::{
    CatalogClient, ClipImageEncoder, ImageEncoder, ItemProgress, SeedingPipeline, create_backend,
};

pub async fn handle_seed(format: OutputFormat, _verbose: bool) -> Result<()> {
    let config = Config::load()?;
    config.validate_for_seed()?;
    let formatter = get_formatter(format);

    let model_dir = config
        .model_dir()
        .ok_or_else(|| anyhow::anyhow!("could not determine model directory"))?;

    let catalog = CatalogClient::new(&config.catalog)?;
    let encoder = ClipImageEncoder::load(&config.embedding, &model_dir)
        .with_context(|| format!("failed to load image model from {}", model_dir.display()))?;
    let store = create_backend(&config.pinecone).await?;

    if let Ok(info) = store.describe_index().await
        && let Some(dim) = info.dimension
        && dim as usize != encoder.dimension()
    {
        tracing::warn!(
            index = %store.index_name(),
            index_dimension = dim,
            model_dimension = encoder.dimension(),
            "index dimension differs from model output; upserts will be rejected"
        );
    }

    let pb = if format == OutputFormat::Json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(0)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let pipeline = SeedingPipeline::new(&catalog, &encoder, store.as_ref());
    let report = pipeline
        .run_with(|progress| report_progress(&pb, &progress))
        .await?;
    pb.finish_and_clear();

    print!("{}", formatter.format_seed_report(&report));
    Ok(())
}

/// Advance the bar for one entry. Failures are logged with the bar suspended,
/// and the bar is cleared after the last entry so later logs print cleanly.
fn report_progress(pb: &ProgressBar, progress: &ItemProgress<'_>) {
    pb.set_length(progress.total as u64);
    pb.set_position(progress.position as u64);
    pb.set_message(progress.entry.name.clone());

    if let Some(err) = progress.error {
        pb.suspend(|| {
            tracing::warn!(name = %progress.entry.name, error = %err, "failed to embed entry");
        });
    }

    if progress.position == progress.total {
        pb.finish_and_clear();
    }
}
