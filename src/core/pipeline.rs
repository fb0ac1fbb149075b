use crate::adapters::{default_providers, fetch_all};
use crate::config::toml_config::AppConfig;
use crate::core::dedup::dedup_listings;
use crate::core::scorer::Scorer;
use crate::core::{Listing, ListingProvider, Pipeline, RankedListings, Storage};
use crate::demo::demo_listings;
use crate::render::Renderer;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};

/// Fetch (or demo data), dedup and score, then write the dashboard, JSON
/// snapshot and CSV through `storage`.
pub struct HunterPipeline<S: Storage> {
    storage: S,
    config: AppConfig,
    providers: Vec<Box<dyn ListingProvider>>,
    demo: bool,
    now: Option<DateTime<Utc>>,
}

impl<S: Storage> HunterPipeline<S> {
    pub fn new(storage: S, config: AppConfig, demo: bool) -> Self {
        let providers = default_providers(&config);
        Self {
            storage,
            config,
            providers,
            demo,
            now: None,
        }
    }

    pub fn with_providers(mut self, providers: Vec<Box<dyn ListingProvider>>) -> Self {
        self.providers = providers;
        self
    }

    /// Pins the clock used for recency scoring and timestamps.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for HunterPipeline<S> {
    async fn extract(&self) -> Result<Vec<Listing>> {
        if self.demo {
            tracing::info!("🎭 Running in DEMO mode with sample data...");
            return Ok(demo_listings(self.now()));
        }

        tracing::debug!("Search criteria: {:?}", self.config.search);
        Ok(fetch_all(&self.providers, &self.config.search).await)
    }

    async fn transform(&self, listings: Vec<Listing>) -> Result<RankedListings> {
        let fetched = listings.len();
        let unique = dedup_listings(listings);

        let scorer = Scorer::new(self.config.scoring, self.config.output.new_listing_days).at(self.now());
        let scored = scorer.score_all(unique);

        Ok(RankedListings { scored, fetched })
    }

    async fn load(&self, ranked: RankedListings) -> Result<String> {
        let output = Renderer::new(&self.config).render(&ranked, self.now()).await?;
        let files = &self.config.output;

        tracing::debug!("Writing {} listings to {}", output.exported, files.output_dir);
        self.storage
            .write_file(&files.data_filename, &output.snapshot_json)
            .await?;
        self.storage
            .write_file(&files.csv_filename, &output.listings_csv)
            .await?;
        self.storage
            .write_file(&files.dashboard_filename, output.dashboard_html.as_bytes())
            .await?;

        Ok(format!("{}/{}", files.output_dir, files.dashboard_filename))
    }
}
