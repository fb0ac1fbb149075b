use crate::domain::model::Listing;
use std::collections::HashSet;

const FINGERPRINT_LEN: usize = 40;

/// Approximate address key: lowercase, whitespace and commas removed,
/// truncated to 40 characters. "St" and "Street" stay distinct.
pub fn address_fingerprint(address: &str) -> String {
    address
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .take(FINGERPRINT_LEN)
        .collect()
}

/// Keeps the first listing seen for each fingerprint, preserving input order.
pub fn dedup_listings(listings: Vec<Listing>) -> Vec<Listing> {
    let total = listings.len();
    let mut seen: HashSet<String> = HashSet::with_capacity(total);

    let unique: Vec<Listing> = listings
        .into_iter()
        .filter(|listing| {
            let key = address_fingerprint(&listing.address);
            let first = seen.insert(key);
            if !first {
                tracing::debug!("Dropping duplicate {} ({})", listing.id, listing.address);
            }
            first
        })
        .collect();

    tracing::info!("Total: {} listings, {} after dedup", total, unique.len());
    unique
}
