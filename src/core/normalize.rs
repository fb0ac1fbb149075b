//! Helpers shared by the provider adapters for turning loosely-typed provider
//! JSON into [`Listing`] fields. Every accessor has a neutral fallback; only a
//! record that is not a JSON object is rejected.

use crate::domain::model::{Coordinates, Laundry, Listing, Source};
use crate::utils::error::{HunterError, Result};
use serde_json::{Map, Value};

pub type JsonObject = Map<String, Value>;

/// Flags inferred from the free-text amenity list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AmenityFlags {
    pub pet_friendly: bool,
    pub parking: bool,
    pub laundry: Laundry,
}

/// Case-insensitive substring matching against the amenity list.
/// In-unit laundry wins over on-site no matter the order.
pub fn infer_amenity_flags(amenities: &[String]) -> AmenityFlags {
    let mut flags = AmenityFlags::default();

    for amenity in amenities {
        let lower = amenity.to_lowercase();

        if lower.contains("pet") {
            flags.pet_friendly = true;
        }
        if lower.contains("parking") || lower.contains("garage") {
            flags.parking = true;
        }
        if lower.contains("in-unit") || lower.contains("washer") {
            flags.laundry = Laundry::InUnit;
        } else if lower.contains("laundry") && flags.laundry != Laundry::InUnit {
            flags.laundry = Laundry::OnSite;
        }
    }

    flags
}

/// Runs `normalize` over every raw item, skipping (and logging) the ones that
/// fail instead of aborting the batch.
pub fn normalize_batch<F>(source: Source, items: &[Value], normalize: F) -> Vec<Listing>
where
    F: Fn(&Value) -> Result<Listing>,
{
    let mut listings = Vec::with_capacity(items.len());
    let mut skipped = 0usize;

    for (index, item) in items.iter().enumerate() {
        match normalize(item) {
            Ok(listing) => listings.push(listing),
            Err(e) => {
                skipped += 1;
                tracing::warn!("⚠️ [{}] Skipping item #{}: {}", source, index, e);
            }
        }
    }

    if skipped > 0 {
        tracing::debug!("[{}] {} of {} items skipped", source, skipped, items.len());
    }

    listings
}

pub fn as_object<'a>(source: Source, item: &'a Value) -> Result<&'a JsonObject> {
    item.as_object().ok_or_else(|| {
        HunterError::malformed(
            source.as_str(),
            format!("expected a JSON object, got {}", json_kind(item)),
        )
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Strings are taken as-is, numbers are stringified, anything else is absent.
pub fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn value_as_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

pub fn value_as_u32(value: &Value) -> Option<u32> {
    value_as_f64(value)
        .filter(|v| *v >= 0.0 && *v <= u32::MAX as f64)
        .map(|v| v as u32)
}

/// Non-empty string field, or `None`.
pub fn text(obj: &JsonObject, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(value_as_string)
        .filter(|s| !s.trim().is_empty())
}

pub fn text_or(obj: &JsonObject, key: &str, default: &str) -> String {
    text(obj, key).unwrap_or_else(|| default.to_string())
}

pub fn number(obj: &JsonObject, key: &str) -> Option<f64> {
    obj.get(key).and_then(value_as_f64)
}

pub fn count(obj: &JsonObject, key: &str) -> Option<u32> {
    obj.get(key).and_then(value_as_u32)
}

/// Length of an array field; zero when absent or not an array.
pub fn array_len(obj: &JsonObject, key: &str) -> u32 {
    obj.get(key)
        .and_then(Value::as_array)
        .map(|items| items.len() as u32)
        .unwrap_or(0)
}

pub fn string_list(obj: &JsonObject, key: &str) -> Vec<String> {
    obj.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter(|v| !v.is_null())
                .map(|v| value_as_string(v).unwrap_or_else(|| v.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

/// Nested object lookup along `path`, e.g. `["centroid", "centroid"]`.
pub fn nested<'a>(obj: &'a JsonObject, path: &[&str]) -> Option<&'a JsonObject> {
    path.iter()
        .try_fold(obj, |current, key| current.get(*key).and_then(Value::as_object))
}

/// A zero latitude or longitude is treated as unknown.
pub fn coordinates(lat: Option<f64>, lng: Option<f64>) -> Option<Coordinates> {
    match (lat, lng) {
        (Some(lat), Some(lng)) if lat != 0.0 && lng != 0.0 => Some(Coordinates { lat, lng }),
        _ => None,
    }
}

/// Prefixes site-relative URLs with `origin`.
pub fn absolute_url(url: &str, origin: &str) -> String {
    if url.is_empty() || url.starts_with("http") {
        url.to_string()
    } else {
        format!("{}{}", origin, url)
    }
}

/// Positive prices only; zero or negative means unknown.
pub fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn amenities(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_batch_skips_malformed_records_in_order() {
        let items = vec![
            json!({"id": "1"}),
            json!("junk"),
            Value::Null,
            json!({"id": "2"}),
        ];

        let listings = normalize_batch(Source::RentCast, &items, |item| {
            let obj = as_object(Source::RentCast, item)?;
            Ok(Listing::new(text_or(obj, "id", ""), Source::RentCast))
        });

        let ids: Vec<_> = listings.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_infer_amenity_flags() {
        let flags = infer_amenity_flags(&amenities(&["Pets Allowed", "Covered Garage"]));
        assert!(flags.pet_friendly);
        assert!(flags.parking);
        assert_eq!(flags.laundry, Laundry::Unknown);

        let flags = infer_amenity_flags(&amenities(&["Street PARKING"]));
        assert!(!flags.pet_friendly);
        assert!(flags.parking);
    }

    #[test]
    fn test_in_unit_laundry_takes_precedence() {
        let flags = infer_amenity_flags(&amenities(&["Laundry Room", "Washer/Dryer"]));
        assert_eq!(flags.laundry, Laundry::InUnit);

        let flags = infer_amenity_flags(&amenities(&["In-Unit W/D", "Shared laundry"]));
        assert_eq!(flags.laundry, Laundry::InUnit);

        let flags = infer_amenity_flags(&amenities(&["Laundry facilities"]));
        assert_eq!(flags.laundry, Laundry::OnSite);
    }

    #[test]
    fn test_value_coercions() {
        assert_eq!(value_as_f64(&json!(3200)), Some(3200.0));
        assert_eq!(value_as_f64(&json!("3,200")), Some(3200.0));
        assert_eq!(value_as_f64(&json!("n/a")), None);
        assert_eq!(value_as_u32(&json!(2.0)), Some(2));
        assert_eq!(value_as_u32(&json!(-1)), None);
        assert_eq!(value_as_string(&json!(12345)), Some("12345".to_string()));
        assert_eq!(value_as_string(&json!(null)), None);
    }

    #[test]
    fn test_field_helpers_default_safely() {
        let obj = json!({
            "name": "  ",
            "photos": [{}, {}, {}],
            "amenities": ["Gym", 42, null],
            "centroid": {"centroid": {"latitude": 37.77}}
        });
        let obj = obj.as_object().unwrap();

        assert_eq!(text(obj, "name"), None);
        assert_eq!(text_or(obj, "missing", "fallback"), "fallback");
        assert_eq!(array_len(obj, "photos"), 3);
        assert_eq!(array_len(obj, "name"), 0);
        assert_eq!(string_list(obj, "amenities"), vec!["Gym", "42"]);
        assert_eq!(
            nested(obj, &["centroid", "centroid"]).and_then(|c| number(c, "latitude")),
            Some(37.77)
        );
        assert!(nested(obj, &["centroid", "missing"]).is_none());
    }

    #[test]
    fn test_coordinates_require_both_non_zero() {
        assert!(coordinates(Some(37.7), Some(-122.4)).is_some());
        assert!(coordinates(Some(37.7), None).is_none());
        assert!(coordinates(Some(0.0), Some(-122.4)).is_none());
    }

    #[test]
    fn test_absolute_url() {
        assert_eq!(
            absolute_url("/homedetails/1_zpid/", "https://www.zillow.com"),
            "https://www.zillow.com/homedetails/1_zpid/"
        );
        assert_eq!(absolute_url("https://x.test/a", "https://www.zillow.com"), "https://x.test/a");
        assert_eq!(absolute_url("", "https://www.zillow.com"), "");
    }

    #[test]
    fn test_as_object_rejects_non_objects() {
        assert!(as_object(Source::Zillow, &json!({"zpid": 1})).is_ok());
        let err = as_object(Source::Zillow, &json!("oops")).unwrap_err();
        assert!(err.to_string().contains("expected a JSON object, got a string"));
    }
}
