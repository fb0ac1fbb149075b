use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 資料來源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    RentCast,
    Zillow,
    Redfin,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::RentCast => "rentcast",
            Source::Zillow => "zillow",
            Source::Redfin => "redfin",
        }
    }

    /// Prefix used to build listing ids, e.g. `rc_12345`.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Source::RentCast => "rc",
            Source::Zillow => "zl",
            Source::Redfin => "rf",
        }
    }

    /// Capitalized name shown in link labels ("via Rentcast").
    pub fn display_name(&self) -> &'static str {
        match self {
            Source::RentCast => "Rentcast",
            Source::Zillow => "Zillow",
            Source::Redfin => "Redfin",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Laundry {
    #[serde(rename = "in-unit")]
    InUnit,
    #[serde(rename = "on-site")]
    OnSite,
    #[serde(rename = "none")]
    None,
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

impl Laundry {
    pub fn as_str(&self) -> &'static str {
        match self {
            Laundry::InUnit => "in-unit",
            Laundry::OnSite => "on-site",
            Laundry::None => "none",
            Laundry::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// 統一格式的租屋物件，建立後不再修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub source: Source,
    pub title: String,
    /// Full formatted address, the input to the dedup fingerprint.
    pub address: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub price: Option<f64>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<f64>,
    pub sqft: Option<u32>,
    pub url: String,
    pub image_url: String,
    pub coordinates: Option<Coordinates>,
    /// ISO 8601 date as reported by the provider.
    pub listed_date: Option<String>,
    pub property_type: String,
    pub amenities: Vec<String>,
    pub pet_friendly: bool,
    pub parking: bool,
    pub laundry: Laundry,
    pub photos_count: u32,
}

impl Listing {
    /// An otherwise empty listing; providers fill in what they know.
    pub fn new(id: impl Into<String>, source: Source) -> Self {
        Self {
            id: id.into(),
            source,
            title: String::new(),
            address: String::new(),
            street: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            price: None,
            bedrooms: None,
            bathrooms: None,
            sqft: None,
            url: String::new(),
            image_url: String::new(),
            coordinates: None,
            listed_date: None,
            property_type: String::new(),
            amenities: Vec::new(),
            pet_friendly: false,
            parking: false,
            laundry: Laundry::Unknown,
            photos_count: 0,
        }
    }

    pub fn days_on_market(&self) -> Option<i64> {
        self.days_on_market_at(Utc::now())
    }

    /// Whole days elapsed since `listed_date`, floored. `None` when the date
    /// is missing or cannot be parsed.
    pub fn days_on_market_at(&self, now: DateTime<Utc>) -> Option<i64> {
        let listed = parse_listed_date(self.listed_date.as_deref()?)?;
        Some((now - listed).num_seconds().div_euclid(86_400))
    }
}

fn parse_listed_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    // 沒有時區的時間一律當作 UTC
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Badge attached to a listing when a scoring condition triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    GreatValue,
    Spacious,
    LoadedWithAmenities,
    New,
    Parking,
    InUnitLaundry,
}

impl Tag {
    pub fn label(&self) -> &'static str {
        match self {
            Tag::GreatValue => "Great Value",
            Tag::Spacious => "Spacious",
            Tag::LoadedWithAmenities => "Loaded with Amenities",
            Tag::New => "🆕 New",
            Tag::Parking => "Parking",
            Tag::InUnitLaundry => "In-Unit Laundry",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Tag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredListing {
    pub listing: Listing,
    /// Always within [0, 100], rounded to one decimal.
    pub score: f64,
    pub tags: Vec<Tag>,
}

impl ScoredListing {
    pub fn is_new(&self) -> bool {
        self.tags.contains(&Tag::New)
    }
}

/// 轉換階段的輸出
#[derive(Debug, Clone, Default)]
pub struct RankedListings {
    pub scored: Vec<ScoredListing>,
    /// Listings received before dedup.
    pub fetched: usize,
}

/// 評分權重，不要求總和為 1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub price_value: f64,
    pub size_sqft: f64,
    pub amenities: f64,
    pub location_walkscore: f64,
    pub photos_count: f64,
    pub recency: f64,
    pub pet_friendly: f64,
    pub parking: f64,
    pub laundry: f64,
}

impl ScoringWeights {
    pub fn zero() -> Self {
        Self {
            price_value: 0.0,
            size_sqft: 0.0,
            amenities: 0.0,
            location_walkscore: 0.0,
            photos_count: 0.0,
            recency: 0.0,
            pet_friendly: 0.0,
            parking: 0.0,
            laundry: 0.0,
        }
    }

    /// Named weights in a fixed order, used by validation and the scorer.
    pub fn entries(&self) -> [(&'static str, f64); 9] {
        [
            ("price_value", self.price_value),
            ("size_sqft", self.size_sqft),
            ("amenities", self.amenities),
            ("location_walkscore", self.location_walkscore),
            ("photos_count", self.photos_count),
            ("recency", self.recency),
            ("pet_friendly", self.pet_friendly),
            ("parking", self.parking),
            ("laundry", self.laundry),
        ]
    }

    pub fn total(&self) -> f64 {
        self.entries().iter().map(|(_, w)| w).sum()
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            price_value: 0.20,
            size_sqft: 0.15,
            amenities: 0.15,
            location_walkscore: 0.15,
            photos_count: 0.05,
            recency: 0.15,
            pet_friendly: 0.05,
            parking: 0.05,
            laundry: 0.05,
        }
    }
}

/// 搜尋條件，各家 API 的查詢參數都由此產生
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchCriteria {
    pub city: String,
    pub state: String,
    pub bedrooms: u32,
    pub min_price: Option<u32>,
    pub max_price: Option<u32>,
    pub property_types: Vec<String>,
}

impl SearchCriteria {
    /// "City, ST" as used by the RapidAPI location parameters.
    pub fn location(&self) -> String {
        format!("{}, {}", self.city, self.state)
    }
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            bedrooms: 3,
            min_price: None,
            max_price: Some(8000),
            property_types: vec![
                "apartment".to_string(),
                "condo".to_string(),
                "townhouse".to_string(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn listing_with_date(date: Option<&str>) -> Listing {
        Listing {
            id: "rc_1".to_string(),
            source: Source::RentCast,
            title: String::new(),
            address: String::new(),
            street: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            price: None,
            bedrooms: None,
            bathrooms: None,
            sqft: None,
            url: String::new(),
            image_url: String::new(),
            coordinates: None,
            listed_date: date.map(str::to_string),
            property_type: String::new(),
            amenities: vec![],
            pet_friendly: false,
            parking: false,
            laundry: Laundry::Unknown,
            photos_count: 0,
        }
    }

    #[test]
    fn test_days_on_market_accepts_common_iso_forms() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();

        let cases = [
            ("2026-03-08T12:00:00Z", 2),
            ("2026-03-08T12:00:00+00:00", 2),
            ("2026-03-09T18:30:00.123456", 0),
            ("2026-03-01", 9),
            ("2026-03-10 11:00:00", 0),
        ];
        for (raw, expected) in cases {
            assert_eq!(
                listing_with_date(Some(raw)).days_on_market_at(now),
                Some(expected),
                "date {}",
                raw
            );
        }
    }

    #[test]
    fn test_days_on_market_undefined_for_missing_or_garbage() {
        let now = Utc::now();
        assert_eq!(listing_with_date(None).days_on_market_at(now), None);
        assert_eq!(listing_with_date(Some("")).days_on_market_at(now), None);
        assert_eq!(listing_with_date(Some("last tuesday")).days_on_market_at(now), None);
    }

    #[test]
    fn test_future_dates_floor_to_negative_days() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        let listing = listing_with_date(Some("2026-03-10T13:00:00Z"));
        assert_eq!(listing.days_on_market_at(now), Some(-1));
    }

    #[test]
    fn test_tags_serialize_as_labels() {
        let json = serde_json::to_string(&vec![Tag::New, Tag::GreatValue]).unwrap();
        assert_eq!(json, r#"["🆕 New","Great Value"]"#);
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        assert!((ScoringWeights::default().total() - 1.0).abs() < 1e-9);
        assert_eq!(ScoringWeights::zero().total(), 0.0);
    }
}
