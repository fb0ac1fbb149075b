//! Sample San Francisco listings for `--demo` runs, no API keys needed.

use crate::domain::model::{Coordinates, Laundry, Listing, Source};
use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

/// (name, lat, lng, min price, max price)
const DEMO_NEIGHBORHOODS: [(&str, f64, f64, u32, u32); 15] = [
    ("Hayes Valley", 37.7752, -122.4372, 4200, 5800),
    ("Mission District", 37.7599, -122.4148, 3800, 5500),
    ("Nob Hill", 37.7920, -122.4130, 4500, 6500),
    ("Pacific Heights", 37.7925, -122.4382, 5000, 7500),
    ("SoMa", 37.7785, -122.3950, 3900, 5600),
    ("Inner Sunset", 37.7640, -122.4680, 3600, 5200),
    ("Noe Valley", 37.7510, -122.4330, 4300, 6200),
    ("Castro", 37.7609, -122.4350, 3700, 5400),
    ("Marina", 37.8020, -122.4370, 4800, 7000),
    ("Richmond", 37.7800, -122.4600, 3400, 4900),
    ("Potrero Hill", 37.7600, -122.4000, 3600, 5300),
    ("Dogpatch", 37.7580, -122.3870, 3800, 5500),
    ("North Beach", 37.8060, -122.4100, 4000, 5800),
    ("Russian Hill", 37.8000, -122.4200, 4500, 6800),
    ("Glen Park", 37.7340, -122.4340, 3500, 5000),
];

const AMENITY_POOL: [&str; 12] = [
    "Dishwasher",
    "Hardwood Floors",
    "Central AC",
    "Gym",
    "Rooftop Deck",
    "Concierge",
    "Bike Storage",
    "Pool",
    "EV Charging",
    "Package Room",
    "Dog Run",
    "Co-Working Space",
];

const STREETS: [&str; 12] = [
    "Valencia St",
    "Fillmore St",
    "Divisadero St",
    "Market St",
    "Guerrero St",
    "Hyde St",
    "Polk St",
    "Irving St",
    "24th St",
    "Haight St",
    "Church St",
    "Folsom St",
];

const SOURCES: [Source; 3] = [Source::RentCast, Source::Zillow, Source::Redfin];
const BATHS: [f64; 4] = [1.0, 1.5, 2.0, 2.5];
const LAUNDRY: [Laundry; 4] = [Laundry::InUnit, Laundry::OnSite, Laundry::None, Laundry::Unknown];
const PROPERTY_TYPES: [&str; 3] = ["apartment", "condo", "townhouse"];
const MAX_JITTER: f64 = 0.008;

pub fn demo_listings(now: DateTime<Utc>) -> Vec<Listing> {
    generate_demo_listings(&mut rand::thread_rng(), now)
}

/// Two to four listings per demo neighborhood, all 3BR.
pub fn generate_demo_listings<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> Vec<Listing> {
    let mut listings = Vec::new();

    for (i, (_, lat, lng, low, high)) in DEMO_NEIGHBORHOODS.iter().enumerate() {
        for j in 0..rng.gen_range(2..=4) {
            let source = *SOURCES.choose(rng).unwrap_or(&Source::RentCast);
            let street_num: u32 = rng.gen_range(100..=3999);
            let street = *STREETS.choose(rng).unwrap_or(&STREETS[0]);
            let zip = format!("94{}", rng.gen_range(100..=134));
            let amenity_count = rng.gen_range(2..=8);
            let amenities: Vec<String> = AMENITY_POOL
                .choose_multiple(rng, amenity_count)
                .map(|a| a.to_string())
                .collect();
            let listed = now - Duration::days(rng.gen_range(0..=45));

            let dashed = street.replace(' ', "-");
            let url = match source {
                Source::Zillow => format!(
                    "https://www.zillow.com/homedetails/{}-{}-San-Francisco-CA/1234{}{}_zpid/",
                    street_num, dashed, i, j
                ),
                Source::Redfin => format!(
                    "https://www.redfin.com/CA/San-Francisco/{}-{}-{}/home/1234{}{}",
                    street_num, dashed, zip, i, j
                ),
                Source::RentCast => format!(
                    "https://www.rentcast.io/apartments/san-francisco-ca/{}-{}",
                    street_num,
                    dashed.to_lowercase()
                ),
            };

            listings.push(Listing {
                title: format!("{} {}", street_num, street),
                address: format!("{} {}, San Francisco, CA {}", street_num, street, zip),
                street: format!("{} {}", street_num, street),
                city: "San Francisco".to_string(),
                state: "CA".to_string(),
                zip_code: zip,
                price: Some(rng.gen_range(*low..=*high) as f64),
                bedrooms: Some(3),
                bathrooms: BATHS.choose(rng).copied(),
                sqft: Some(rng.gen_range(900..=1800)),
                url,
                coordinates: Some(Coordinates {
                    lat: lat + rng.gen_range(-MAX_JITTER..=MAX_JITTER),
                    lng: lng + rng.gen_range(-MAX_JITTER..=MAX_JITTER),
                }),
                listed_date: Some(listed.to_rfc3339()),
                property_type: PROPERTY_TYPES.choose(rng).unwrap_or(&"apartment").to_string(),
                amenities,
                pet_friendly: rng.gen_bool(0.6),
                parking: rng.gen_bool(0.5),
                laundry: LAUNDRY.choose(rng).copied().unwrap_or_default(),
                photos_count: rng.gen_range(3..=25),
                ..Listing::new(format!("{}_{}_{}", source.id_prefix(), i, j), source)
            });
        }
    }

    tracing::debug!("Generated {} demo listings", listings.len());
    listings
}
