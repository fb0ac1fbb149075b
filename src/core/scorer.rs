//! Weighted desirability scoring.
//!
//! Each listing gets nine sub-scores in `[0, 100]`, some of them relative to
//! batch statistics, which are combined into a weighted average. Every missing
//! input falls back to a neutral 50, so scoring never fails.

use crate::core::location::location_score;
use crate::domain::model::{Laundry, Listing, ScoredListing, ScoringWeights, Tag};
use chrono::{DateTime, Utc};

pub const DEFAULT_AVG_PRICE: f64 = 4000.0;
pub const DEFAULT_AVG_SQFT: f64 = 1200.0;
pub const DEFAULT_MAX_PHOTOS: u32 = 10;
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Reference statistics computed once per batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchStats {
    pub avg_price: f64,
    pub avg_sqft: f64,
    pub max_photos: u32,
}

impl BatchStats {
    pub fn from_listings(listings: &[Listing]) -> Self {
        let prices: Vec<f64> = listings
            .iter()
            .filter_map(|l| l.price)
            .filter(|p| *p > 0.0)
            .collect();
        let sqfts: Vec<f64> = listings
            .iter()
            .filter_map(|l| l.sqft)
            .filter(|s| *s > 0)
            .map(f64::from)
            .collect();

        Self {
            avg_price: mean(&prices).unwrap_or(DEFAULT_AVG_PRICE),
            avg_sqft: mean(&sqfts).unwrap_or(DEFAULT_AVG_SQFT),
            max_photos: listings
                .iter()
                .map(|l| l.photos_count)
                .filter(|c| *c > 0)
                .max()
                .unwrap_or(DEFAULT_MAX_PHOTOS),
        }
    }
}

impl Default for BatchStats {
    fn default() -> Self {
        Self {
            avg_price: DEFAULT_AVG_PRICE,
            avg_sqft: DEFAULT_AVG_SQFT,
            max_photos: DEFAULT_MAX_PHOTOS,
        }
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Per-criterion scores, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubScores {
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

impl SubScores {
    /// `None` when the weights sum to zero.
    pub fn weighted_average(&self, weights: &ScoringWeights) -> Option<f64> {
        let total = weights.total();
        if total == 0.0 {
            return None;
        }

        let weighted_sum = self.price_value * weights.price_value
            + self.size_sqft * weights.size_sqft
            + self.amenities * weights.amenities
            + self.location_walkscore * weights.location_walkscore
            + self.photos_count * weights.photos_count
            + self.recency * weights.recency
            + self.pet_friendly * weights.pet_friendly
            + self.parking * weights.parking
            + self.laundry * weights.laundry;

        Some(weighted_sum / total)
    }
}

pub struct Scorer {
    weights: ScoringWeights,
    new_listing_days: i64,
    now: DateTime<Utc>,
}

impl Scorer {
    pub fn new(weights: ScoringWeights, new_listing_days: u32) -> Self {
        Self {
            weights,
            new_listing_days: i64::from(new_listing_days),
            now: Utc::now(),
        }
    }

    /// Pins the clock used for days-on-market.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Scores the whole batch and returns it sorted by score, highest first.
    /// Ties keep their input order.
    pub fn score_all(&self, listings: Vec<Listing>) -> Vec<ScoredListing> {
        if listings.is_empty() {
            return Vec::new();
        }

        let stats = BatchStats::from_listings(&listings);
        tracing::debug!(
            "Batch stats: avg_price={:.0}, avg_sqft={:.0}, max_photos={}",
            stats.avg_price,
            stats.avg_sqft,
            stats.max_photos
        );

        let mut scored: Vec<ScoredListing> = listings
            .into_iter()
            .map(|listing| {
                let (score, tags) = self.score_one(&listing, &stats);
                ScoredListing {
                    listing,
                    score: round_one_decimal(score),
                    tags,
                }
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored
    }

    pub fn score_one(&self, listing: &Listing, stats: &BatchStats) -> (f64, Vec<Tag>) {
        let (sub_scores, tags) = self.evaluate(listing, stats);
        let score = sub_scores
            .weighted_average(&self.weights)
            .unwrap_or(NEUTRAL_SCORE);
        (score.clamp(0.0, 100.0), tags)
    }

    /// Sub-scores plus tags in the order their conditions are checked.
    pub fn evaluate(&self, listing: &Listing, stats: &BatchStats) -> (SubScores, Vec<Tag>) {
        let mut tags = Vec::new();

        // 價格：比平均便宜越多分數越高
        let price_value = match listing.price.filter(|p| *p > 0.0) {
            Some(price) => {
                let ratio = price / stats.avg_price;
                if ratio < 0.85 {
                    tags.push(Tag::GreatValue);
                }
                clamp_score((1.4 - ratio) / 0.8 * 100.0)
            }
            None => NEUTRAL_SCORE,
        };

        let size_sqft = match listing.sqft.filter(|s| *s > 0) {
            Some(sqft) => {
                let ratio = f64::from(sqft) / stats.avg_sqft;
                if ratio > 1.2 {
                    tags.push(Tag::Spacious);
                }
                clamp_score((ratio - 0.6) / 0.8 * 100.0)
            }
            None => NEUTRAL_SCORE,
        };

        let amenity_count = listing.amenities.len();
        let amenities = (amenity_count as f64 * 10.0).min(100.0);
        if amenity_count >= 8 {
            tags.push(Tag::LoadedWithAmenities);
        }

        let location_walkscore = location_score(listing.coordinates);

        let photos_count = if stats.max_photos > 0 {
            clamp_score(f64::from(listing.photos_count) / f64::from(stats.max_photos) * 100.0)
        } else {
            NEUTRAL_SCORE
        };

        let recency = match listing.days_on_market_at(self.now) {
            Some(days) if days <= self.new_listing_days => {
                tags.push(Tag::New);
                100.0
            }
            Some(days) if days <= 7 => 80.0,
            Some(days) if days <= 14 => 60.0,
            Some(days) if days <= 30 => 40.0,
            Some(_) => 20.0,
            None => NEUTRAL_SCORE,
        };

        let pet_friendly = if listing.pet_friendly { 100.0 } else { 30.0 };

        let parking = if listing.parking {
            tags.push(Tag::Parking);
            100.0
        } else {
            30.0
        };

        let laundry = match listing.laundry {
            Laundry::InUnit => {
                tags.push(Tag::InUnitLaundry);
                100.0
            }
            Laundry::OnSite => 60.0,
            Laundry::None | Laundry::Unknown => 30.0,
        };

        let sub_scores = SubScores {
            price_value,
            size_sqft,
            amenities,
            location_walkscore,
            photos_count,
            recency,
            pet_friendly,
            parking,
            laundry,
        };

        (sub_scores, tags)
    }
}

fn clamp_score(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Convenience wrapper using the current time.
pub fn score_listings(
    listings: Vec<Listing>,
    weights: &ScoringWeights,
    new_listing_days: u32,
) -> Vec<ScoredListing> {
    Scorer::new(*weights, new_listing_days).score_all(listings)
}
