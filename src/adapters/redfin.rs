use crate::adapters::http::{price_params, ProviderClient};
use crate::config::toml_config::AppConfig;
use crate::core::normalize::{
    absolute_url, array_len, as_object, coordinates, count, infer_amenity_flags, nested,
    normalize_batch, number, positive, text, text_or, value_as_f64, value_as_string, JsonObject,
};
use crate::domain::model::{Listing, SearchCriteria, Source};
use crate::domain::ports::ListingProvider;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;

const REDFIN_SITE: &str = "https://www.redfin.com";
/// San Francisco, used when the region lookup comes back empty.
pub const FALLBACK_REGION_ID: &str = "20330";

/// Redfin rentals through RapidAPI: region lookup, then search.
pub struct RedfinProvider {
    api_key: String,
    base_url: String,
    client: ProviderClient,
}

impl RedfinProvider {
    pub fn new(config: &AppConfig) -> Self {
        let api_key = config.keys.rapidapi.clone();
        Self {
            client: ProviderClient::new(Source::Redfin, &config.fetch)
                .with_header("x-rapidapi-key", &api_key)
                .with_header("x-rapidapi-host", &config.providers.redfin_host),
            base_url: config.providers.redfin_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    async fn resolve_region_id(&self, criteria: &SearchCriteria) -> String {
        let url = format!("{}/auto-complete", self.base_url);
        let region_id = self
            .client
            .get_json_or_log(&url, &[("location", criteria.location())])
            .await
            .and_then(|data| Self::first_region_id(&data));

        match region_id {
            Some(id) => id,
            None => {
                tracing::info!("[redfin] Using fallback SF region ID");
                FALLBACK_REGION_ID.to_string()
            }
        }
    }

    fn first_region_id(data: &Value) -> Option<String> {
        let regions = data
            .pointer("/data/regions")
            .and_then(Value::as_array)
            .filter(|regions| !regions.is_empty())
            .or_else(|| data.as_array())?;

        regions
            .iter()
            .filter_map(|region| region.get("id"))
            .find_map(value_as_string)
    }

    fn search_params(criteria: &SearchCriteria, region_id: String) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("region_id", region_id),
            ("region_type", "city".to_string()),
            ("status", "For Rent".to_string()),
            ("beds_min", criteria.bedrooms.to_string()),
            ("beds_max", criteria.bedrooms.to_string()),
            ("sort", "redfin-recommended".to_string()),
            ("num_homes", "50".to_string()),
        ];
        params.extend(price_params(
            criteria.min_price,
            criteria.max_price,
            "price_min",
            "price_max",
        ));
        params
    }

    fn extract_homes(mut data: Value) -> Vec<Value> {
        if let Some(Value::Array(homes)) = data.pointer_mut("/data/homes").map(Value::take) {
            if !homes.is_empty() {
                return homes;
            }
        }
        match data {
            Value::Array(homes) => homes,
            Value::Object(mut obj) => match obj.remove("homes") {
                Some(Value::Array(homes)) => homes,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    /// Redfin nests most values (`priceInfo.amount`, `sqFt.value`); older
    /// payloads carry them flat.
    fn price(home: &JsonObject) -> Option<f64> {
        nested(home, &["priceInfo"])
            .and_then(|info| number(info, "amount"))
            .or_else(|| match home.get("price") {
                Some(Value::Object(price)) => number(price, "value"),
                Some(other) => value_as_f64(other),
                None => None,
            })
    }

    fn sqft(home: &JsonObject) -> Option<u32> {
        match home.get("sqFt") {
            Some(Value::Object(sqft)) => count(sqft, "value"),
            Some(_) => count(home, "sqFt"),
            None => None,
        }
        .filter(|s| *s > 0)
    }

    fn first_photo_url(home: &JsonObject) -> String {
        home.get("photos")
            .and_then(Value::as_array)
            .and_then(|photos| photos.first())
            .and_then(Value::as_object)
            .map(|photo| text_or(photo, "photoUrl", ""))
            .unwrap_or_default()
    }

    pub fn normalize(item: &Value, criteria: &SearchCriteria) -> Result<Listing> {
        let obj = as_object(Source::Redfin, item)?;
        let home = obj.get("homeData").and_then(Value::as_object).unwrap_or(obj);

        let empty = JsonObject::new();
        let address_info = nested(home, &["addressInfo"]).unwrap_or(&empty);

        let street = text(address_info, "formattedStreetLine")
            .or_else(|| text(home, "streetLine"))
            .unwrap_or_default();
        let city = text_or(address_info, "city", &criteria.city);
        let state = text_or(address_info, "state", &criteria.state);
        let zip_code = text_or(address_info, "zip", "");
        let address = format!("{}, {}, {} {}", street, city, state, zip_code);

        let listing_id = text(home, "listingId")
            .or_else(|| text(home, "propertyId"))
            .unwrap_or_default();

        let centroid = nested(address_info, &["centroid", "centroid"]);
        let lat = centroid
            .and_then(|c| number(c, "latitude"))
            .or_else(|| number(home, "latitude"));
        let lng = centroid
            .and_then(|c| number(c, "longitude"))
            .or_else(|| number(home, "longitude"));

        let amenities: Vec<String> = Vec::new();
        let flags = infer_amenity_flags(&amenities);

        Ok(Listing {
            id: format!("{}_{}", Source::Redfin.id_prefix(), listing_id),
            source: Source::Redfin,
            title: if street.is_empty() {
                format!("{}BR Apartment", criteria.bedrooms)
            } else {
                street.clone()
            },
            address,
            street,
            city,
            state,
            zip_code,
            price: positive(Self::price(home)),
            bedrooms: count(home, "beds").or_else(|| count(home, "bedrooms")),
            bathrooms: number(home, "baths").or_else(|| number(home, "bathrooms")),
            sqft: Self::sqft(home),
            url: absolute_url(&text_or(home, "url", ""), REDFIN_SITE),
            image_url: Self::first_photo_url(home),
            coordinates: coordinates(lat, lng),
            listed_date: text(home, "listingDate"),
            property_type: text_or(home, "propertyType", ""),
            amenities,
            pet_friendly: flags.pet_friendly,
            parking: flags.parking,
            laundry: flags.laundry,
            photos_count: array_len(home, "photos"),
        })
    }
}

#[async_trait]
impl ListingProvider for RedfinProvider {
    fn source(&self) -> Source {
        Source::Redfin
    }

    async fn fetch(&self, criteria: &SearchCriteria) -> Vec<Listing> {
        if self.api_key.is_empty() {
            tracing::warn!("RapidAPI key not set. Skipping Redfin.");
            return Vec::new();
        }

        let region_id = self.resolve_region_id(criteria).await;

        let url = format!("{}/properties/search-rent", self.base_url);
        let Some(data) = self
            .client
            .get_json_or_log(&url, &Self::search_params(criteria, region_id))
            .await
        else {
            return Vec::new();
        };

        let homes = Self::extract_homes(data);
        let listings = normalize_batch(Source::Redfin, &homes, |item| {
            Self::normalize(item, criteria)
        });

        tracing::info!("[redfin] Fetched {} listings", listings.len());
        listings
    }
}
