use crate::adapters::http::{price_params, ProviderClient};
use crate::config::toml_config::AppConfig;
use crate::core::normalize::{
    absolute_url, array_len, as_object, coordinates, count, infer_amenity_flags, normalize_batch,
    number, text, text_or,
};
use crate::domain::model::{Listing, SearchCriteria, Source};
use crate::domain::ports::ListingProvider;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;

const ZILLOW_SITE: &str = "https://www.zillow.com";

/// Zillow extended search through RapidAPI.
pub struct ZillowProvider {
    api_key: String,
    base_url: String,
    client: ProviderClient,
}

impl ZillowProvider {
    pub fn new(config: &AppConfig) -> Self {
        let api_key = config.keys.rapidapi.clone();
        Self {
            client: ProviderClient::new(Source::Zillow, &config.fetch)
                .with_header("x-rapidapi-key", &api_key)
                .with_header("x-rapidapi-host", &config.providers.zillow_host),
            base_url: config.providers.zillow_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn search_params(criteria: &SearchCriteria) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("location", criteria.location()),
            ("status_type", "ForRent".to_string()),
            ("beds_min", criteria.bedrooms.to_string()),
            ("beds_max", criteria.bedrooms.to_string()),
            ("sort", "Newest".to_string()),
            ("listing_type", "by_agent".to_string()),
        ];
        params.extend(price_params(
            criteria.min_price,
            criteria.max_price,
            "price_min",
            "price_max",
        ));
        params
    }

    pub fn normalize(item: &Value, criteria: &SearchCriteria) -> Result<Listing> {
        let obj = as_object(Source::Zillow, item)?;
        let zpid = text_or(obj, "zpid", "");

        // address 可能是字串，也可能是物件
        let address_obj = obj.get("address").and_then(Value::as_object);
        let (address, street, city, state, zip_code) = match address_obj {
            Some(parts) => {
                let street = text_or(parts, "streetAddress", "");
                let city = text_or(parts, "city", &criteria.city);
                let state = text_or(parts, "state", &criteria.state);
                let zip = text(parts, "zipcode").or_else(|| text(obj, "zipcode")).unwrap_or_default();
                (
                    format!("{}, {}, {} {}", street, city, state, zip),
                    street,
                    city,
                    state,
                    zip,
                )
            }
            None => {
                let address = text_or(obj, "address", "");
                let street = text(obj, "streetAddress").unwrap_or_else(|| {
                    address.split(',').next().unwrap_or_default().trim().to_string()
                });
                (
                    address,
                    street,
                    criteria.city.clone(),
                    criteria.state.clone(),
                    text_or(obj, "zipcode", ""),
                )
            }
        };

        let detail_url = text_or(obj, "detailUrl", "");
        let url = if detail_url.is_empty() && !zpid.is_empty() {
            format!("{}/homedetails/{}_zpid/", ZILLOW_SITE, zpid)
        } else {
            absolute_url(&detail_url, ZILLOW_SITE)
        };

        let title = if !street.is_empty() {
            street.clone()
        } else if !address.is_empty() {
            address.clone()
        } else {
            format!("{}BR Apartment", criteria.bedrooms)
        };

        // 這個 API 不提供設施清單
        let amenities: Vec<String> = Vec::new();
        let flags = infer_amenity_flags(&amenities);

        Ok(Listing {
            id: format!("{}_{}", Source::Zillow.id_prefix(), zpid),
            source: Source::Zillow,
            title,
            address,
            street,
            city,
            state,
            zip_code,
            price: number(obj, "price"),
            bedrooms: count(obj, "bedrooms"),
            bathrooms: number(obj, "bathrooms"),
            sqft: count(obj, "livingArea"),
            url,
            image_url: text_or(obj, "imgSrc", ""),
            coordinates: coordinates(number(obj, "latitude"), number(obj, "longitude")),
            listed_date: text(obj, "datePosted"),
            property_type: text_or(obj, "propertyType", ""),
            amenities,
            pet_friendly: flags.pet_friendly,
            parking: flags.parking,
            laundry: flags.laundry,
            photos_count: array_len(obj, "carouselPhotos"),
        })
    }
}

#[async_trait]
impl ListingProvider for ZillowProvider {
    fn source(&self) -> Source {
        Source::Zillow
    }

    async fn fetch(&self, criteria: &SearchCriteria) -> Vec<Listing> {
        if self.api_key.is_empty() {
            tracing::warn!("RapidAPI key not set. Skipping Zillow.");
            return Vec::new();
        }

        let url = format!("{}/propertyExtendedSearch", self.base_url);
        let Some(mut data) = self
            .client
            .get_json_or_log(&url, &Self::search_params(criteria))
            .await
        else {
            return Vec::new();
        };

        let items = match data.get_mut("props").map(Value::take) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };
        let listings = normalize_batch(Source::Zillow, &items, |item| {
            Self::normalize(item, criteria)
        });

        tracing::info!("[zillow] Fetched {} listings", listings.len());
        listings
    }
}
