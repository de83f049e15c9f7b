//! Generated vehicle catalogue.

use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Centre of the generated fleet (Berlin).
pub const FLEET_CENTER: Coordinates = Coordinates {
    lat: 52.5200,
    lng: 13.4050,
};

/// Total spread of generated coordinates around the centre, in degrees.
const FLEET_SPREAD: f64 = 0.1;

/// Number of vehicles generated at start-up.
pub const FLEET_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    Available,
    Rented,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: u32,
    pub status: VehicleStatus,
    pub coordinates: Coordinates,
}

/// Immutable set of vehicles, cheap to clone into handlers.
#[derive(Debug, Clone)]
pub struct Fleet {
    vehicles: Arc<Vec<Vehicle>>,
}

impl Fleet {
    /// Generate `count` vehicles with ids `0..count`.
    pub fn generate<R: Rng>(count: u32, rng: &mut R) -> Self {
        let vehicles = (0..count)
            .map(|id| Vehicle {
                id,
                status: if rng.gen_bool(0.5) {
                    VehicleStatus::Available
                } else {
                    VehicleStatus::Rented
                },
                coordinates: Coordinates {
                    lat: FLEET_CENTER.lat + (rng.gen::<f64>() - 0.5) * FLEET_SPREAD,
                    lng: FLEET_CENTER.lng + (rng.gen::<f64>() - 0.5) * FLEET_SPREAD,
                },
            })
            .collect();

        Self {
            vehicles: Arc::new(vehicles),
        }
    }

    pub fn all(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn get(&self, id: i64) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| i64::from(v.id) == id)
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}

/// Parse a vehicle id the lenient way clients expect: surrounding
/// whitespace and trailing garbage are ignored, so `"42abc"` is `42`.
pub fn parse_vehicle_id(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generated_fleet() {
        let fleet = Fleet::generate(FLEET_SIZE, &mut StdRng::seed_from_u64(3));
        assert_eq!(fleet.len(), 100);

        for (i, v) in fleet.all().iter().enumerate() {
            assert_eq!(v.id as usize, i);
            assert!((v.coordinates.lat - FLEET_CENTER.lat).abs() <= FLEET_SPREAD / 2.0);
            assert!((v.coordinates.lng - FLEET_CENTER.lng).abs() <= FLEET_SPREAD / 2.0);
        }
        assert!(fleet.get(99).is_some());
        assert!(fleet.get(100).is_none());
        assert!(fleet.get(-1).is_none());
    }

    #[test]
    fn test_parse_vehicle_id() {
        assert_eq!(parse_vehicle_id("42"), Some(42));
        assert_eq!(parse_vehicle_id("  7"), Some(7));
        assert_eq!(parse_vehicle_id("12abc"), Some(12));
        assert_eq!(parse_vehicle_id("-3"), Some(-3));
        assert_eq!(parse_vehicle_id("abc"), None);
        assert_eq!(parse_vehicle_id(""), None);
        assert_eq!(parse_vehicle_id("-"), None);
    }

    #[test]
    fn test_status_serialization() {
        let value = serde_json::to_value(VehicleStatus::Available).unwrap();
        assert_eq!(value, serde_json::json!("available"));
    }
}
