use crate::domain::model::Coordinates;

/// Desirable San Francisco centers used by the walkability heuristic.
pub const HOTSPOTS: [(&str, f64, f64); 10] = [
    ("Downtown/FiDi", 37.7749, -122.4194),
    ("Mission", 37.7599, -122.4148),
    ("Inner Sunset", 37.7694, -122.4862),
    ("Nob Hill", 37.7849, -122.4094),
    ("North Beach", 37.7879, -122.4074),
    ("SoMa", 37.7751, -122.4193),
    ("Castro", 37.7647, -122.4230),
    ("Hayes Valley", 37.7752, -122.4372),
    ("Pacific Heights", 37.7850, -122.4383),
    ("Noe Valley", 37.7609, -122.4350),
];

pub const NEIGHBORHOODS: [(&str, f64, f64); 38] = [
    ("Hayes Valley", 37.7752, -122.4372),
    ("Mission District", 37.7599, -122.4148),
    ("Castro", 37.7609, -122.4350),
    ("Noe Valley", 37.7502, -122.4337),
    ("SoMa", 37.7785, -122.3950),
    ("Pacific Heights", 37.7925, -122.4382),
    ("Marina", 37.8015, -122.4368),
    ("Russian Hill", 37.7982, -122.4183),
    ("Nob Hill", 37.7930, -122.4161),
    ("North Beach", 37.8061, -122.4103),
    ("Financial District", 37.7946, -122.3999),
    ("Tenderloin", 37.7847, -122.4141),
    ("Chinatown", 37.7941, -122.4078),
    ("Lower Haight", 37.7717, -122.4310),
    ("Inner Sunset", 37.7602, -122.4634),
    ("Outer Sunset", 37.7555, -122.4950),
    ("Inner Richmond", 37.7797, -122.4630),
    ("Outer Richmond", 37.7766, -122.4950),
    ("Cole Valley", 37.7657, -122.4500),
    ("Haight-Ashbury", 37.7692, -122.4481),
    ("Western Addition", 37.7808, -122.4310),
    ("Japantown", 37.7853, -122.4298),
    ("Polk Gulch", 37.7895, -122.4197),
    ("Potrero Hill", 37.7601, -122.3926),
    ("Dogpatch", 37.7574, -122.3871),
    ("Bernal Heights", 37.7442, -122.4158),
    ("Glen Park", 37.7341, -122.4333),
    ("Mission Bay", 37.7706, -122.3932),
    ("Bayview", 37.7296, -122.3884),
    ("Excelsior", 37.7251, -122.4300),
    ("Visitacion Valley", 37.7135, -122.4108),
    ("Twin Peaks", 37.7544, -122.4477),
    ("Diamond Heights", 37.7436, -122.4414),
    ("Duboce Triangle", 37.7694, -122.4300),
    ("Laurel Heights", 37.7863, -122.4515),
    ("Presidio Heights", 37.7886, -122.4500),
    ("Cow Hollow", 37.7985, -122.4380),
    ("Telegraph Hill", 37.8025, -122.4060),
];

fn squared_distance(point: Coordinates, lat: f64, lng: f64) -> f64 {
    (point.lat - lat).powi(2) + (point.lng - lng).powi(2)
}

/// Euclidean distance in degrees to the closest hotspot.
pub fn nearest_hotspot_distance(point: Coordinates) -> f64 {
    HOTSPOTS
        .iter()
        .map(|(_, lat, lng)| squared_distance(point, *lat, *lng))
        .fold(f64::INFINITY, f64::min)
        .sqrt()
}

/// Walkability proxy; roughly 0.01 degree is 1 km in SF.
pub fn location_score(coordinates: Option<Coordinates>) -> f64 {
    let Some(point) = coordinates else {
        return 50.0;
    };

    let distance = nearest_hotspot_distance(point);
    if distance < 0.005 {
        95.0
    } else if distance < 0.01 {
        85.0
    } else if distance < 0.02 {
        70.0
    } else if distance < 0.04 {
        55.0
    } else {
        35.0
    }
}

pub fn nearest_neighborhood(coordinates: Option<Coordinates>) -> Option<&'static str> {
    let point = coordinates?;
    let mut best: Option<(&'static str, f64)> = None;

    for (name, lat, lng) in NEIGHBORHOODS.iter() {
        let distance = squared_distance(point, *lat, *lng);
        // 距離相同時保留先出現的
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((*name, distance));
        }
    }

    best.map(|(name, _)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(lat: f64, lng: f64) -> Option<Coordinates> {
        Some(Coordinates { lat, lng })
    }

    #[test]
    fn test_location_score_bands() {
        assert_eq!(location_score(at(37.7752, -122.4372)), 95.0);
        // Inner Sunset sits well west of the other hotspots
        assert_eq!(location_score(at(37.7694, -122.4792)), 85.0);
        assert_eq!(location_score(at(37.7544, -122.4862)), 70.0);
        assert_eq!(location_score(at(37.7694, -122.5162)), 55.0);
        assert_eq!(location_score(at(37.70, -122.50)), 35.0);
    }

    #[test]
    fn test_unknown_location_is_neutral() {
        assert_eq!(location_score(None), 50.0);
    }

    #[test]
    fn test_nearest_neighborhood() {
        assert_eq!(nearest_neighborhood(at(37.8016, -122.4367)), Some("Marina"));
        assert_eq!(nearest_neighborhood(at(37.7600, -122.3925)), Some("Potrero Hill"));
        assert_eq!(nearest_neighborhood(None), None);
    }
}
