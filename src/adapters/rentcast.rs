use crate::adapters::http::{price_params, ProviderClient};
use crate::config::toml_config::AppConfig;
use crate::core::normalize::{
    array_len, as_object, coordinates, count, infer_amenity_flags, normalize_batch, number,
    string_list, text, text_or,
};
use crate::domain::model::{Listing, SearchCriteria, Source};
use crate::domain::ports::ListingProvider;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// RentCast long-term rental listings (`X-Api-Key` auth).
pub struct RentCastProvider {
    api_key: String,
    base_url: String,
    client: ProviderClient,
}

impl RentCastProvider {
    pub fn new(config: &AppConfig) -> Self {
        let api_key = config.keys.rentcast.clone();
        Self {
            client: ProviderClient::new(Source::RentCast, &config.fetch)
                .with_header("X-Api-Key", &api_key),
            base_url: config.providers.rentcast_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn search_params(criteria: &SearchCriteria) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("city", criteria.city.clone()),
            ("state", criteria.state.clone()),
            ("bedrooms", criteria.bedrooms.to_string()),
            ("status", "Active".to_string()),
            ("limit", "50".to_string()),
        ];
        params.extend(price_params(
            criteria.min_price,
            criteria.max_price,
            "minPrice",
            "maxPrice",
        ));
        params
    }

    /// The API answers with a bare array or wraps it in `listings`/`results`.
    fn extract_items(data: Value) -> Vec<Value> {
        match data {
            Value::Array(items) => items,
            Value::Object(mut obj) => match obj.remove("listings").or_else(|| obj.remove("results")) {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    pub fn normalize(item: &Value, criteria: &SearchCriteria) -> Result<Listing> {
        let obj = as_object(Source::RentCast, item)?;

        let street = text_or(obj, "addressLine1", "");
        let address = ["addressLine1", "city", "state", "zipCode"]
            .iter()
            .filter_map(|key| text(obj, key))
            .collect::<Vec<_>>()
            .join(", ");

        let amenities = string_list(obj, "amenities");
        let flags = infer_amenity_flags(&amenities);

        Ok(Listing {
            id: format!("{}_{}", Source::RentCast.id_prefix(), text_or(obj, "id", "")),
            source: Source::RentCast,
            title: if street.is_empty() {
                format!("{}BR Apartment", criteria.bedrooms)
            } else {
                street.clone()
            },
            address,
            street,
            city: text_or(obj, "city", &criteria.city),
            state: text_or(obj, "state", &criteria.state),
            zip_code: text_or(obj, "zipCode", ""),
            price: number(obj, "price"),
            bedrooms: count(obj, "bedrooms"),
            bathrooms: number(obj, "bathrooms"),
            sqft: count(obj, "squareFootage"),
            url: text_or(obj, "listingUrl", ""),
            image_url: text_or(obj, "photoUrl", ""),
            coordinates: coordinates(number(obj, "latitude"), number(obj, "longitude")),
            listed_date: text(obj, "listedDate").or_else(|| text(obj, "createdDate")),
            property_type: text_or(obj, "propertyType", ""),
            amenities,
            pet_friendly: flags.pet_friendly,
            parking: flags.parking,
            laundry: flags.laundry,
            photos_count: array_len(obj, "photos"),
        })
    }
}

#[async_trait]
impl ListingProvider for RentCastProvider {
    fn source(&self) -> Source {
        Source::RentCast
    }

    async fn fetch(&self, criteria: &SearchCriteria) -> Vec<Listing> {
        if self.api_key.is_empty() {
            tracing::warn!("RentCast API key not set. Skipping.");
            return Vec::new();
        }

        let url = format!("{}/listings/rental/long-term", self.base_url);
        let Some(data) = self
            .client
            .get_json_or_log(&url, &Self::search_params(criteria))
            .await
        else {
            return Vec::new();
        };

        let items = Self::extract_items(data);
        let listings = normalize_batch(Source::RentCast, &items, |item| {
            Self::normalize(item, criteria)
        });

        tracing::info!("[rentcast] Fetched {} listings", listings.len());
        listings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Coordinates, Laundry};
    use serde_json::json;

    #[test]
    fn test_normalize_full_record() {
        let item = json!({
            "id": "abc-1",
            "addressLine1": "500 Hayes St",
            "city": "San Francisco",
            "state": "CA",
            "zipCode": "94102",
            "price": 5200,
            "bedrooms": 3,
            "bathrooms": 2.5,
            "squareFootage": 1450,
            "listingUrl": "https://www.rentcast.io/l/abc-1",
            "latitude": 37.7766,
            "longitude": -122.4246,
            "createdDate": "2026-04-28T00:00:00.000Z",
            "propertyType": "Apartment",
            "amenities": ["Dog Park", "Pets OK", "Garage", "Laundry room", "In-unit washer"],
            "photos": ["a.jpg", "b.jpg"]
        });

        let listing = RentCastProvider::normalize(&item, &SearchCriteria::default()).unwrap();

        assert_eq!(listing.id, "rc_abc-1");
        assert_eq!(listing.title, "500 Hayes St");
        assert_eq!(listing.address, "500 Hayes St, San Francisco, CA, 94102");
        assert_eq!(listing.price, Some(5200.0));
        assert_eq!(listing.bedrooms, Some(3));
        assert_eq!(listing.bathrooms, Some(2.5));
        assert_eq!(listing.sqft, Some(1450));
        assert_eq!(
            listing.coordinates,
            Some(Coordinates {
                lat: 37.7766,
                lng: -122.4246
            })
        );
        assert_eq!(listing.listed_date.as_deref(), Some("2026-04-28T00:00:00.000Z"));
        assert!(listing.pet_friendly);
        assert!(listing.parking);
        assert_eq!(listing.laundry, Laundry::InUnit);
        assert_eq!(listing.photos_count, 2);
    }

    #[test]
    fn test_normalize_sparse_record_uses_defaults() {
        let listing = RentCastProvider::normalize(&json!({}), &SearchCriteria::default()).unwrap();

        assert_eq!(listing.id, "rc_");
        assert_eq!(listing.title, "3BR Apartment");
        assert_eq!(listing.address, "");
        assert_eq!(listing.city, "San Francisco");
        assert_eq!(listing.state, "CA");
        assert_eq!(listing.price, None);
        assert_eq!(listing.coordinates, None);
        assert_eq!(listing.listed_date, None);
        assert!(listing.amenities.is_empty());
        assert_eq!(listing.laundry, Laundry::Unknown);
        assert_eq!(listing.photos_count, 0);
    }

    #[test]
    fn test_extract_items_shapes() {
        assert_eq!(RentCastProvider::extract_items(json!([{"id": 1}])).len(), 1);
        assert_eq!(
            RentCastProvider::extract_items(json!({"listings": [{"id": 1}, {"id": 2}]})).len(),
            2
        );
        assert_eq!(RentCastProvider::extract_items(json!({"results": [{"id": 1}]})).len(), 1);
        assert!(RentCastProvider::extract_items(json!({"error": "nope"})).is_empty());
    }

    #[test]
    fn test_search_params() {
        let criteria = SearchCriteria {
            min_price: Some(3000),
            ..SearchCriteria::default()
        };
        let params = RentCastProvider::search_params(&criteria);
        assert!(params.contains(&("bedrooms", "3".to_string())));
        assert!(params.contains(&("maxPrice", "8000".to_string())));
        assert!(params.contains(&("minPrice", "3000".to_string())));
    }
}
