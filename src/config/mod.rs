pub mod cli;
pub mod toml_config;

pub use cli::LocalStorage;
#[cfg(feature = "cli")]
pub use cli::CliArgs;
pub use toml_config::AppConfig;
