pub mod dashboard;
pub mod links;
pub mod snapshot;

use crate::config::toml_config::AppConfig;
use crate::domain::model::{Listing, RankedListings, SearchCriteria};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use dashboard::{render_dashboard, DashboardView};
use links::LinkVerifier;
use snapshot::{listings_csv, snapshot_json, ExportedListing};

/// The three output documents, ready to be written.
#[derive(Debug, Clone)]
pub struct RenderedOutput {
    pub dashboard_html: String,
    pub snapshot_json: Vec<u8>,
    pub listings_csv: Vec<u8>,
    pub exported: usize,
}

pub struct Renderer {
    verifier: LinkVerifier,
    criteria: SearchCriteria,
    max_listings: usize,
}

impl Renderer {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            verifier: LinkVerifier::new(config),
            criteria: config.search.clone(),
            max_listings: config.output.max_dashboard_listings,
        }
    }

    /// Exports the top `max_dashboard_listings` of `ranked`, in rank order.
    pub async fn render(&self, ranked: &RankedListings, now: DateTime<Utc>) -> Result<RenderedOutput> {
        let top = &ranked.scored[..ranked.scored.len().min(self.max_listings)];

        let listings: Vec<Listing> = top.iter().map(|s| s.listing.clone()).collect();
        let links = self.verifier.enrich(&listings).await;

        let exported: Vec<ExportedListing> = top
            .iter()
            .zip(links)
            .map(|(scored, link)| ExportedListing::new(scored, link, now))
            .collect();

        tracing::debug!(
            "Rendering {} of {} ranked listings",
            exported.len(),
            ranked.scored.len()
        );

        Ok(RenderedOutput {
            dashboard_html: render_dashboard(&DashboardView {
                criteria: &self.criteria,
                listings: &exported,
                generated_at: now,
            }),
            snapshot_json: snapshot_json(&exported, &self.criteria, ranked.scored.len(), now)?,
            listings_csv: listings_csv(&exported)?,
            exported: exported.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ScoredListing, Source};

    fn ranked(count: usize) -> RankedListings {
        let scored = (0..count)
            .map(|i| ScoredListing {
                listing: Listing {
                    address: format!("{} Valencia St", i + 1),
                    url: format!("https://www.rentcast.io/l/{}", i),
                    ..Listing::new(format!("rc_{}", i), Source::RentCast)
                },
                score: 90.0 - i as f64,
                tags: vec![],
            })
            .collect();
        RankedListings {
            scored,
            fetched: count,
        }
    }

    #[tokio::test]
    async fn test_render_truncates_to_max_listings() {
        let mut config = AppConfig::default();
        config.output.max_dashboard_listings = 3;
        config.fetch.verify_links = false;

        let output = Renderer::new(&config).render(&ranked(5), Utc::now()).await.unwrap();

        assert_eq!(output.exported, 3);
        let json: serde_json::Value = serde_json::from_slice(&output.snapshot_json).unwrap();
        assert_eq!(json["total_listings"], 5);
        assert_eq!(json["listings"].as_array().unwrap().len(), 3);
        assert_eq!(json["listings"][0]["id"], "rc_0");

        let csv = String::from_utf8(output.listings_csv).unwrap();
        assert_eq!(csv.lines().count(), 4);
        assert!(output.dashboard_html.contains("id=\"rc_2\""));
        assert!(!output.dashboard_html.contains("id=\"rc_3\""));
    }

    #[tokio::test]
    async fn test_render_empty_ranking() {
        let output = Renderer::new(&AppConfig::default())
            .render(&RankedListings::default(), Utc::now())
            .await
            .unwrap();

        assert_eq!(output.exported, 0);
        assert!(output.dashboard_html.contains("No listings found"));
    }
}
