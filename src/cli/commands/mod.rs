mod catalog;
mod config;
mod seed;
mod serve;
mod status;

pub use catalog::CatalogArgs;
pub use config::ConfigCommand;
pub use serve::ServeArgs;

pub use catalog::handle_catalog;
pub use config::handle_config;
pub use seed::handle_seed;
pub use serve::handle_serve;
pub use status::handle_status;
