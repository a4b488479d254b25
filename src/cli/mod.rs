//! Command-line interface for the menu seeder.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

use crate::models::OutputFormat;

/// Embed menu images with CLIP and seed a Pinecone index, or serve the menu catalog.
#[derive(Debug, Parser)]
#[command(name = "menu-seeder")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[arg(long, short = 'f', global = true, help = "Output format: text or json")]
    pub format: Option<OutputFormat>,

    #[arg(long, short = 'v', global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    /// Defaults to `seed` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch the catalog, embed every image and upsert into the index
    Seed,

    /// Serve the catalog over HTTP
    Serve(commands::ServeArgs),

    /// Print the catalog, optionally filtered by id
    Catalog(commands::CatalogArgs),

    /// Check catalog, model and index status
    Status,

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::ConfigCommand),
}
