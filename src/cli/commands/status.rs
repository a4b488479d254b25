use anyhow::Result;

use crate::cli::output::{StatusInfo, get_formatter};
use crate::models::{Config, OutputFormat};
use crate::services::{
    CatalogClient, Device, MODEL_FILE, ORT_DYLIB_ENV, create_backend, runtime_library,
};

pub async fn handle_status(format: OutputFormat, _verbose: bool) -> Result<()> {
    let config = Config::load()?;
    let formatter = get_formatter(format);

    let mut status = StatusInfo {
        catalog_endpoint: config.catalog.endpoint.clone(),
        index: config.pinecone.index.clone(),
        ..Default::default()
    };

    if config.catalog.endpoint.is_empty() {
        status.catalog_error = Some("endpoint not configured".to_string());
    } else {
        match CatalogClient::new(&config.catalog) {
            Ok(client) => match client.fetch_catalog_checked().await {
                Ok(entries) => status.catalog_entries = Some(entries.len()),
                Err(e) => status.catalog_error = Some(e.to_string()),
            },
            Err(e) => status.catalog_error = Some(e.to_string()),
        }
    }

    if let Some(dir) = config.model_dir() {
        status.model_present = dir.join(MODEL_FILE).exists();
        status.model_dir = Some(dir.display().to_string());
    }
    status.device = Some(match Device::resolve(config.embedding.device) {
        Ok(device) => device.to_string(),
        Err(e) => format!("unavailable ({})", e),
    });

    match create_backend(&config.pinecone).await {
        Ok(store) => match store.health_check().await {
            Ok(connected) => {
                status.index_connected = connected;
                if connected && let Ok(info) = store.describe_index().await {
                    status.index_dimension = info.dimension;
                    status.index_vectors = info.total_vector_count;
                }
            }
            Err(e) => status.index_error = Some(e.to_string()),
        },
        Err(e) => status.index_error = Some(e.to_string()),
    }

    print!("{}", formatter.format_status(&status));

    if format == OutputFormat::Text {
        if status.catalog_entries.is_none() {
            eprintln!();
            eprintln!("Hint: set NESTJS_MENU_ENDPOINT to the menu GraphQL endpoint.");
        }
        if !status.model_present {
            eprintln!();
            eprintln!(
                "Hint: export the CLIP visual tower to {} in the model directory,",
                MODEL_FILE
            );
            eprintln!("      or point CLIP_MODEL_PATH at a directory containing it.");
        }
        if runtime_library().is_none() {
            eprintln!();
            eprintln!(
                "Hint: ONNX Runtime not found. Set {} to libonnxruntime.",
                ORT_DYLIB_ENV
            );
        }
        if !status.index_connected {
            eprintln!();
            eprintln!("Warning: vector index not reachable. Check PINECONE_API_KEY and PINECONE_INDEX.");
        }
    }

    Ok(())
}
