use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Runs fetch, rank and render in order. Returns the dashboard path, or
    /// `None` when no listings were found and nothing was written.
    pub async fn run(&self) -> Result<Option<String>> {
        tracing::info!("🏠 Starting apartment search...");

        // Extract
        let listings = self.pipeline.extract().await?;
        tracing::info!("📥 Fetched {} listings", listings.len());

        if listings.is_empty() {
            tracing::warn!("⚠️ No listings found. Check your API keys and search criteria.");
            return Ok(None);
        }

        // Transform
        let ranked = self.pipeline.transform(listings).await?;
        tracing::info!("📊 Scored {} unique listings", ranked.scored.len());

        if let Some(top) = ranked.scored.first() {
            tracing::info!(
                "🏆 Top pick: {} ({:.1}) {}",
                top.listing.address,
                top.score,
                top.tags
                    .iter()
                    .map(|t| t.label())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        // Load
        let dashboard_path = self.pipeline.load(ranked).await?;
        tracing::info!("📁 Dashboard saved to: {}", dashboard_path);

        Ok(Some(dashboard_path))
    }
}
