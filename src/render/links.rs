//! Search links for listings that came back without a provider URL.
//!
//! Zillow is probed once with a HEAD request. If it answers, each listing's
//! Zillow rental search page is fetched and classified as a rental or a sale
//! page; otherwise every listing falls back to a Google rental search.

use crate::config::toml_config::AppConfig;
use crate::domain::model::Listing;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

const CANARY_TIMEOUT: Duration = Duration::from_secs(4);
const PAGE_TIMEOUT: Duration = Duration::from_secs(5);
const PAGE_SCAN_CHARS: usize = 120_000;

const RENTAL_MARKERS: [&str; 3] = ["for rent", "\"forrent\"", "\"for_rent\""];
const SALE_MARKERS: [&str; 3] = ["for sale", "\"forsale\"", "\"for_sale\""];

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingLink {
    pub search_url: String,
    /// `Some(true)` rental confirmed, `Some(false)` looked like a sale page,
    /// `None` not checked or inconclusive.
    pub url_verified: Option<bool>,
    pub search_label: String,
}

impl ListingLink {
    fn provider(listing: &Listing) -> Self {
        Self {
            search_url: listing.url.clone(),
            url_verified: Some(true),
            search_label: format!("via {}", listing.source.display_name()),
        }
    }

    fn verified_rental(url: String) -> Self {
        Self {
            search_url: url,
            url_verified: Some(true),
            search_label: "Zillow (verified rental)".to_string(),
        }
    }

    fn rental_search(url: String, verified: Option<bool>) -> Self {
        Self {
            search_url: url,
            url_verified: verified,
            search_label: "Search Rentals".to_string(),
        }
    }

    fn zillow_search(url: String) -> Self {
        Self {
            search_url: url,
            url_verified: None,
            search_label: "Search Zillow".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageVerdict {
    Rental,
    Sale,
    Inconclusive,
}

/// Counts rental vs sale markers in the start of a page.
pub fn classify_page(body: &str) -> PageVerdict {
    let text: String = body.chars().take(PAGE_SCAN_CHARS).collect::<String>().to_lowercase();

    let rental = count_markers(&text, &RENTAL_MARKERS);
    let sale = count_markers(&text, &SALE_MARKERS);

    match rental.cmp(&sale) {
        std::cmp::Ordering::Greater => PageVerdict::Rental,
        std::cmp::Ordering::Less => PageVerdict::Sale,
        std::cmp::Ordering::Equal => PageVerdict::Inconclusive,
    }
}

fn count_markers(text: &str, markers: &[&str]) -> usize {
    markers.iter().map(|m| text.matches(m).count()).sum()
}

/// Runs of non-alphanumerics become a single `-`, trimmed at both ends.
pub fn address_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Builds rental search URLs against configurable site roots.
#[derive(Debug, Clone)]
pub struct SearchLinks {
    zillow_web_url: String,
    google_search_url: String,
}

impl SearchLinks {
    pub fn new(zillow_web_url: &str, google_search_url: &str) -> Self {
        Self {
            zillow_web_url: zillow_web_url.trim_end_matches('/').to_string(),
            google_search_url: google_search_url.to_string(),
        }
    }

    pub fn zillow_rental_url(&self, listing: &Listing) -> String {
        let full = format!(
            "{}, {}, {} {}",
            listing.address, listing.city, listing.state, listing.zip_code
        );
        format!("{}/homes/for_rent/{}_rb/", self.zillow_web_url, address_slug(&full))
    }

    pub fn google_rental_url(&self, listing: &Listing) -> String {
        let query = format!(
            "\"{}\" \"{}\" {} for rent",
            listing.address, listing.city, listing.state
        );
        match url::Url::parse_with_params(&self.google_search_url, &[("q", &query)]) {
            Ok(mut url) => {
                // 表單編碼的空白是 +，改成 %20；原本的 + 已被編成 %2B
                let encoded = url.query().map(|q| q.replace('+', "%20"));
                url.set_query(encoded.as_deref());
                url.to_string()
            }
            Err(_) => format!("{}?q={}", self.google_search_url, query),
        }
    }
}

pub struct LinkVerifier {
    client: Client,
    links: SearchLinks,
    workers: usize,
    enabled: bool,
}

impl LinkVerifier {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            links: SearchLinks::new(
                &config.providers.zillow_web_url,
                &config.providers.google_search_url,
            ),
            workers: config.fetch.verify_workers.max(1),
            enabled: config.fetch.verify_links,
        }
    }

    /// One link per listing, in the same order.
    pub async fn enrich(&self, listings: &[Listing]) -> Vec<ListingLink> {
        let mut links: Vec<Option<ListingLink>> = listings
            .iter()
            .map(|l| (!l.url.is_empty()).then(|| ListingLink::provider(l)))
            .collect();

        let pending: Vec<usize> = links
            .iter()
            .enumerate()
            .filter(|(_, link)| link.is_none())
            .map(|(index, _)| index)
            .collect();

        if let Some(&first) = pending.first() {
            let reachable = self.enabled
                && self
                    .site_reachable(&self.links.zillow_rental_url(&listings[first]))
                    .await;

            if reachable {
                tracing::info!("🔗 Zillow reachable, verifying {} listing URLs...", pending.len());
                self.verify_pending(listings, &pending, &mut links).await;
            } else {
                if self.enabled {
                    tracing::info!("🚫 Zillow blocked, using Google rental search as fallback");
                } else {
                    tracing::debug!("Link verification disabled, using Google rental search");
                }
                for &index in &pending {
                    links[index] = Some(ListingLink::rental_search(
                        self.links.google_rental_url(&listings[index]),
                        None,
                    ));
                }
            }
        }

        let links: Vec<ListingLink> = links
            .into_iter()
            .zip(listings)
            .map(|(link, listing)| {
                link.unwrap_or_else(|| ListingLink::zillow_search(self.links.zillow_rental_url(listing)))
            })
            .collect();

        let verified = links.iter().filter(|l| l.url_verified == Some(true)).count();
        let sale = links.iter().filter(|l| l.url_verified == Some(false)).count();
        tracing::info!(
            "🔗 URL results: {} verified, {} sale-redirect, {} search-fallback",
            verified,
            sale,
            links.len() - verified - sale
        );

        links
    }

    async fn verify_pending(
        &self,
        listings: &[Listing],
        pending: &[usize],
        links: &mut [Option<ListingLink>],
    ) {
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();

        for &index in pending {
            let url = self.links.zillow_rental_url(&listings[index]);
            let client = self.client.clone();
            let semaphore = semaphore.clone();

            tasks.spawn(async move {
                let verdict = match semaphore.acquire_owned().await {
                    Ok(_permit) => check_page(&client, &url).await,
                    Err(_) => PageVerdict::Inconclusive,
                };
                (index, url, verdict)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let (index, url, verdict) = match joined {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!("⚠️ Link check task failed: {}", e);
                    continue;
                }
            };

            links[index] = Some(match verdict {
                PageVerdict::Rental => ListingLink::verified_rental(url),
                PageVerdict::Sale => ListingLink::rental_search(
                    self.links.google_rental_url(&listings[index]),
                    Some(false),
                ),
                PageVerdict::Inconclusive => ListingLink::zillow_search(url),
            });
        }
    }

    async fn site_reachable(&self, url: &str) -> bool {
        match browser_headers(self.client.head(url))
            .timeout(CANARY_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response.status() == StatusCode::OK,
            Err(e) => {
                tracing::debug!("Canary request failed: {}", e);
                false
            }
        }
    }
}

fn browser_headers(request: RequestBuilder) -> RequestBuilder {
    request
        .header(USER_AGENT, BROWSER_USER_AGENT)
        .header(ACCEPT, "text/html,application/xhtml+xml")
        .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
}

async fn check_page(client: &Client, url: &str) -> PageVerdict {
    let response = match browser_headers(client.get(url)).timeout(PAGE_TIMEOUT).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("Page check failed for {}: {}", url, e);
            return PageVerdict::Inconclusive;
        }
    };

    if response.status() != StatusCode::OK {
        return PageVerdict::Inconclusive;
    }

    match response.text().await {
        Ok(body) => classify_page(&body),
        Err(_) => PageVerdict::Inconclusive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Source;
    use httpmock::prelude::*;
    use httpmock::Method::HEAD;

    fn listing(id: &str, address: &str, url: &str) -> Listing {
        Listing {
            address: address.to_string(),
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            zip_code: "94110".to_string(),
            url: url.to_string(),
            ..Listing::new(id, Source::Zillow)
        }
    }

    fn verifier(zillow_web_url: &str, enabled: bool) -> LinkVerifier {
        let mut config = AppConfig::default();
        config.providers.zillow_web_url = zillow_web_url.to_string();
        config.fetch.verify_links = enabled;
        config.fetch.verify_workers = 2;
        LinkVerifier::new(&config)
    }

    #[test]
    fn test_classify_page() {
        assert_eq!(classify_page("<h1>FOR RENT</h1> for rent"), PageVerdict::Rental);
        assert_eq!(classify_page("{\"status\":\"for_sale\"} for rent for sale"), PageVerdict::Sale);
        assert_eq!(classify_page("nothing useful"), PageVerdict::Inconclusive);

        let late_marker = format!("{}for rent", " ".repeat(PAGE_SCAN_CHARS));
        assert_eq!(classify_page(&late_marker), PageVerdict::Inconclusive);
    }

    #[test]
    fn test_address_slug() {
        assert_eq!(
            address_slug("123 Main St, San Francisco, CA 94110"),
            "123-Main-St-San-Francisco-CA-94110"
        );
        assert_eq!(address_slug("  #4, , Apt. B  "), "4-Apt-B");
        assert_eq!(address_slug("---"), "");
    }

    #[test]
    fn test_search_urls() {
        let links = SearchLinks::new("https://www.zillow.com/", "https://www.google.com/search");
        let l = listing("zl_1", "55 Dolores St", "");

        assert_eq!(
            links.zillow_rental_url(&l),
            "https://www.zillow.com/homes/for_rent/55-Dolores-St-San-Francisco-CA-94110_rb/"
        );

        let google = links.google_rental_url(&l);
        assert!(google.starts_with("https://www.google.com/search?q="));
        let parsed = url::Url::parse(&google).unwrap();
        let (_, query) = parsed.query_pairs().next().unwrap();
        assert_eq!(query, "\"55 Dolores St\" \"San Francisco\" CA for rent");
    }

    #[test]
    fn test_google_search_encodes_spaces_as_percent_twenty() {
        let links = SearchLinks::new("https://www.zillow.com", "https://www.google.com/search");
        let l = listing("rf_1", "1+2 Main St", "");

        assert_eq!(
            links.google_rental_url(&l),
            "https://www.google.com/search?q=%221%2B2%20Main%20St%22%20%22San%20Francisco%22%20CA%20for%20rent"
        );
    }

    #[tokio::test]
    async fn test_provider_urls_are_kept_without_network() {
        let l = Listing {
            source: Source::RentCast,
            ..listing("rc_1", "1 Main St", "https://www.rentcast.io/l/1")
        };

        let links = verifier("http://127.0.0.1:9", true).enrich(&[l]).await;

        assert_eq!(links[0].search_url, "https://www.rentcast.io/l/1");
        assert_eq!(links[0].url_verified, Some(true));
        assert_eq!(links[0].search_label, "via Rentcast");
    }

    #[tokio::test]
    async fn test_disabled_verification_falls_back_to_google() {
        let server = MockServer::start();
        let any_request = server.mock(|when, then| {
            when.path_contains("/homes/");
            then.status(200);
        });

        let links = verifier(&server.base_url(), false)
            .enrich(&[listing("zl_1", "1 Main St", "")])
            .await;

        any_request.assert_hits(0);
        assert!(links[0].search_url.contains("google.com/search"));
        assert_eq!(links[0].url_verified, None);
        assert_eq!(links[0].search_label, "Search Rentals");
    }

    #[tokio::test]
    async fn test_blocked_canary_falls_back_to_google() {
        let server = MockServer::start();
        let canary = server.mock(|when, then| {
            when.method(HEAD);
            then.status(403);
        });

        let links = verifier(&server.base_url(), true)
            .enrich(&[listing("zl_1", "1 Main St", ""), listing("zl_2", "2 Main St", "")])
            .await;

        canary.assert_hits(1);
        assert!(links.iter().all(|l| l.search_label == "Search Rentals"));
        assert!(links.iter().all(|l| l.url_verified.is_none()));
    }

    #[tokio::test]
    async fn test_pages_are_classified_per_listing() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(HEAD);
            then.status(200);
        });
        server.mock(|when, then| {
            when.method(GET).path_contains("1-Rent-Ave");
            then.status(200).body("<title>1 Rent Ave - For Rent</title> for rent");
        });
        server.mock(|when, then| {
            when.method(GET).path_contains("2-Sale-St");
            then.status(200).body("<title>2 Sale St - For Sale</title> \"for_sale\"");
        });
        server.mock(|when, then| {
            when.method(GET).path_contains("3-Broken-Way");
            then.status(500);
        });

        let listings = vec![
            listing("zl_1", "1 Rent Ave", ""),
            listing("zl_2", "2 Sale St", ""),
            listing("zl_3", "3 Broken Way", ""),
        ];
        let links = verifier(&server.base_url(), true).enrich(&listings).await;

        assert_eq!(links[0].url_verified, Some(true));
        assert_eq!(links[0].search_label, "Zillow (verified rental)");
        assert!(links[0].search_url.starts_with(&server.base_url()));

        assert_eq!(links[1].url_verified, Some(false));
        assert_eq!(links[1].search_label, "Search Rentals");
        assert!(links[1].search_url.contains("google.com/search"));

        assert_eq!(links[2].url_verified, None);
        assert_eq!(links[2].search_label, "Search Zillow");
        assert!(links[2].search_url.ends_with("3-Broken-Way-San-Francisco-CA-94110_rb/"));
    }
}
