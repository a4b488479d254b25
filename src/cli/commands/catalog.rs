use anyhow::Result;
use clap::Args;

use crate::cli::output::get_formatter;
use crate::models::{CatalogId, Config, OutputFormat};
use crate::services::{CatalogClient, filter_by_ids};

#[derive(Debug, Args)]
pub struct CatalogArgs {
    /// Only show entries with these ids (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub ids: Option<Vec<String>>,
}

pub async fn handle_catalog(args: CatalogArgs, format: OutputFormat, _verbose: bool) -> Result<()> {
    let config = Config::load()?;
    config.validate_for_serve()?;
    let formatter = get_formatter(format);

    let client = CatalogClient::new(&config.catalog)?;
    let entries = client.fetch_catalog_checked().await?;

    let entries = match args.ids {
        Some(ids) => {
            let ids: Vec<CatalogId> = ids.into_iter().map(parse_id).collect();
            filter_by_ids(&entries, &ids)
        }
        None => entries,
    };

    print!("{}", formatter.format_catalog(&entries));
    Ok(())
}

fn parse_id(raw: String) -> CatalogId {
    let trimmed = raw.trim();
    match trimmed.parse::<i64>() {
        Ok(n) => CatalogId::Int(n),
        Err(_) => CatalogId::Str(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id(" 7".to_string()), CatalogId::Int(7));
        assert_eq!(parse_id("abc".to_string()), CatalogId::Str("abc".to_string()));
    }
}
