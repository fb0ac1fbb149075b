// Adapters layer: one module per rental listing provider, plus the shared HTTP client.

pub mod http;
pub mod redfin;
pub mod rentcast;
pub mod zillow;

use crate::config::toml_config::AppConfig;
use crate::domain::model::{Listing, SearchCriteria};
use crate::domain::ports::ListingProvider;

pub use redfin::RedfinProvider;
pub use rentcast::RentCastProvider;
pub use zillow::ZillowProvider;

/// RentCast, Zillow, Redfin, in that order.
pub fn default_providers(config: &AppConfig) -> Vec<Box<dyn ListingProvider>> {
    vec![
        Box::new(RentCastProvider::new(config)),
        Box::new(ZillowProvider::new(config)),
        Box::new(RedfinProvider::new(config)),
    ]
}

/// Queries every provider in turn and concatenates the results. A provider
/// that fails contributes nothing.
pub async fn fetch_all(
    providers: &[Box<dyn ListingProvider>],
    criteria: &SearchCriteria,
) -> Vec<Listing> {
    let mut all = Vec::new();

    for provider in providers {
        tracing::info!("🔎 Fetching from {}...", provider.source().display_name());
        let listings = provider.fetch(criteria).await;
        tracing::debug!("{} returned {} listings", provider.source(), listings.len());
        all.extend(listings);
    }

    all
}
