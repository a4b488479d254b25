use anyhow::Result;
use clap::Args;

use crate::models::Config;
use crate::server::{AppState, run_server};
use crate::services::CatalogClient;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to listen on (overrides server.bind)
    #[arg(long, short = 'b')]
    pub bind: Option<String>,
}

pub async fn handle_serve(args: ServeArgs) -> Result<()> {
    let config = Config::load()?;
    config.validate_for_serve()?;

    let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());
    let catalog = CatalogClient::new(&config.catalog)?;

    run_server(AppState::new(catalog), &bind).await?;
    Ok(())
}
