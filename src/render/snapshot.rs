use crate::core::location::nearest_neighborhood;
use crate::domain::model::{Laundry, ScoredListing, SearchCriteria, Source, Tag};
use crate::render::links::ListingLink;
use crate::utils::error::{HunterError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

const MAX_EXPORTED_AMENITIES: usize = 10;

/// Flat view of a ranked listing, shared by the JSON snapshot, the CSV export
/// and the dashboard cards.
#[derive(Debug, Clone, Serialize)]
pub struct ExportedListing {
    pub id: String,
    pub source: Source,
    pub title: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub price: Option<f64>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<f64>,
    pub sqft: Option<u32>,
    pub url: String,
    pub image: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub listed_date: Option<String>,
    pub days_on_market: Option<i64>,
    pub property_type: String,
    pub pet_friendly: bool,
    pub parking: bool,
    pub laundry: Laundry,
    pub photos_count: u32,
    pub score: f64,
    pub tags: Vec<Tag>,
    pub amenities: Vec<String>,
    pub neighborhood: String,
    #[serde(flatten)]
    pub link: ListingLink,
}

impl ExportedListing {
    pub fn new(scored: &ScoredListing, link: ListingLink, now: DateTime<Utc>) -> Self {
        let listing = &scored.listing;
        Self {
            id: listing.id.clone(),
            source: listing.source,
            title: listing.title.clone(),
            address: listing.address.clone(),
            city: listing.city.clone(),
            state: listing.state.clone(),
            zip: listing.zip_code.clone(),
            price: listing.price,
            bedrooms: listing.bedrooms,
            bathrooms: listing.bathrooms,
            sqft: listing.sqft,
            url: listing.url.clone(),
            image: listing.image_url.clone(),
            lat: listing.coordinates.map(|c| c.lat),
            lng: listing.coordinates.map(|c| c.lng),
            listed_date: listing.listed_date.clone(),
            days_on_market: listing.days_on_market_at(now),
            property_type: listing.property_type.clone(),
            pet_friendly: listing.pet_friendly,
            parking: listing.parking,
            laundry: listing.laundry,
            photos_count: listing.photos_count,
            score: scored.score,
            tags: scored.tags.clone(),
            amenities: listing
                .amenities
                .iter()
                .take(MAX_EXPORTED_AMENITIES)
                .cloned()
                .collect(),
            neighborhood: nearest_neighborhood(listing.coordinates)
                .unwrap_or_default()
                .to_string(),
            link,
        }
    }

    pub fn is_new(&self) -> bool {
        self.tags.contains(&Tag::New)
    }
}

#[derive(Debug, Serialize)]
struct SnapshotCriteria<'a> {
    city: &'a str,
    state: &'a str,
    bedrooms: u32,
    max_price: Option<u32>,
}

#[derive(Debug, Serialize)]
struct Snapshot<'a> {
    generated_at: DateTime<Utc>,
    criteria: SnapshotCriteria<'a>,
    total_listings: usize,
    listings: &'a [ExportedListing],
}

/// `listings.json`: the exported listings plus run metadata.
/// `total_listings` counts every ranked listing, not only the exported ones.
pub fn snapshot_json(
    listings: &[ExportedListing],
    criteria: &SearchCriteria,
    total_listings: usize,
    generated_at: DateTime<Utc>,
) -> Result<Vec<u8>> {
    let snapshot = Snapshot {
        generated_at,
        criteria: SnapshotCriteria {
            city: &criteria.city,
            state: &criteria.state,
            bedrooms: criteria.bedrooms,
            max_price: criteria.max_price,
        },
        total_listings,
        listings,
    };

    Ok(serde_json::to_vec_pretty(&snapshot)?)
}

const CSV_HEADERS: [&str; 13] = [
    "rank",
    "score",
    "id",
    "source",
    "address",
    "price",
    "bedrooms",
    "bathrooms",
    "sqft",
    "neighborhood",
    "days_on_market",
    "tags",
    "search_url",
];

fn cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// `listings.csv`: one row per exported listing, in rank order.
pub fn listings_csv(listings: &[ExportedListing]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADERS)?;

    for (rank, l) in listings.iter().enumerate() {
        let tags = l.tags.iter().map(Tag::label).collect::<Vec<_>>().join("; ");
        writer.write_record([
            (rank + 1).to_string(),
            format!("{:.1}", l.score),
            l.id.clone(),
            l.source.to_string(),
            l.address.clone(),
            cell(l.price),
            cell(l.bedrooms),
            cell(l.bathrooms),
            cell(l.sqft),
            l.neighborhood.clone(),
            cell(l.days_on_market),
            tags,
            l.link.search_url.clone(),
        ])?;
    }

    writer.into_inner().map_err(|e| HunterError::RenderError {
        message: format!("failed to flush CSV: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Coordinates, Listing};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap()
    }

    fn exported() -> ExportedListing {
        let listing = Listing {
            title: "500 Hayes St".to_string(),
            address: "500 Hayes St, San Francisco, CA, 94102".to_string(),
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            zip_code: "94102".to_string(),
            price: Some(5200.0),
            bedrooms: Some(3),
            bathrooms: Some(2.0),
            sqft: Some(1450),
            coordinates: Some(Coordinates {
                lat: 37.7752,
                lng: -122.4372,
            }),
            listed_date: Some("2026-04-29".to_string()),
            amenities: (0..12).map(|i| format!("Amenity {}", i)).collect(),
            ..Listing::new("rc_1", Source::RentCast)
        };
        let scored = ScoredListing {
            listing,
            score: 81.3,
            tags: vec![Tag::New, Tag::Parking],
        };
        let link = ListingLink {
            search_url: "https://www.rentcast.io/l/1".to_string(),
            url_verified: Some(true),
            search_label: "via Rentcast".to_string(),
        };
        ExportedListing::new(&scored, link, now())
    }

    #[test]
    fn test_exported_listing_fields() {
        let l = exported();
        assert_eq!(l.days_on_market, Some(2));
        assert_eq!(l.amenities.len(), MAX_EXPORTED_AMENITIES);
        assert_eq!(l.neighborhood, "Hayes Valley");
        assert_eq!(l.lat, Some(37.7752));
        assert!(l.is_new());
    }

    #[test]
    fn test_snapshot_json_shape() {
        let listings = vec![exported()];
        let bytes = snapshot_json(&listings, &SearchCriteria::default(), 7, now()).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(json["total_listings"], 7);
        assert_eq!(json["criteria"]["city"], "San Francisco");
        assert_eq!(json["criteria"]["max_price"], 8000);
        assert!(json["generated_at"].as_str().unwrap().starts_with("2026-05-01T12:00:00"));

        let first = &json["listings"][0];
        assert_eq!(first["source"], "rentcast");
        assert_eq!(first["zip"], "94102");
        assert_eq!(first["laundry"], "unknown");
        assert_eq!(first["tags"], serde_json::json!(["🆕 New", "Parking"]));
        assert_eq!(first["search_label"], "via Rentcast");
        assert_eq!(first["url_verified"], true);
    }

    #[test]
    fn test_listings_csv_rows() {
        let mut second = exported();
        second.id = "zl_2".to_string();
        second.price = None;
        second.tags.clear();

        let bytes = listings_csv(&[exported(), second]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "rank,score,id,source,address,price,bedrooms,bathrooms,sqft,neighborhood,days_on_market,tags,search_url"
        );
        assert!(lines[1].starts_with("1,81.3,rc_1,rentcast,\"500 Hayes St, San Francisco, CA, 94102\",5200,3,2,1450,Hayes Valley,2,🆕 New; Parking,"));
        assert!(lines[2].starts_with("2,81.3,zl_2,rentcast,"));
        assert!(lines[2].contains(",,3,"));
        assert_eq!(lines.len(), 3);
    }
}
