use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::Path;

#[cfg(feature = "cli")]
use crate::config::toml_config::AppConfig;
#[cfg(feature = "cli")]
use clap::Parser;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    pub fn full_path(&self, path: &str) -> String {
        Path::new(&self.base_path).join(path).display().to_string()
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "apartment-hunter")]
#[command(about = "Fetch rental listings from several providers, score them and build a ranked dashboard")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use sample data (no API keys needed)
    #[arg(long)]
    pub demo: bool,

    /// Open dashboard in browser after generating
    #[arg(long)]
    pub open: bool,

    /// Override output.output_dir from config
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Skip network checks of listing links
    #[arg(long)]
    pub no_verify_links: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Show the resolved configuration without fetching anything
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(feature = "cli")]
impl CliArgs {
    /// Loads the config file when one is given, then applies flag overrides.
    pub fn resolve_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::from_env(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(output_dir) = &self.output_dir {
            config.output.output_dir = output_dir.clone();
            tracing::debug!("🔧 output_dir overridden to: {}", output_dir);
        }
        if self.no_verify_links {
            config.fetch.verify_links = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_local_storage_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().display().to_string());

        storage.write_file("nested/out.json", b"{}").await.unwrap();

        let written = std::fs::read(temp_dir.path().join("nested/out.json")).unwrap();
        assert_eq!(written, b"{}");
        assert!(storage.full_path("nested/out.json").ends_with("nested/out.json"));
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_cli_overrides() {
        let args = CliArgs::parse_from([
            "apartment-hunter",
            "--demo",
            "--output-dir",
            "/tmp/hunter",
            "--no-verify-links",
        ]);
        assert!(args.demo);

        let config = args.resolve_config().unwrap();
        assert_eq!(config.output.output_dir, "/tmp/hunter");
        assert!(!config.fetch.verify_links);
    }
}
