use serde::{Deserialize, Serialize};

use crate::types::{RiskFactor, Waypoint};

/// Named axis-aligned lat/lng rectangle tagged with one risk factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskZone {
    pub name: String,
    pub factor: RiskFactor,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl RiskZone {
    pub fn new(
        name: impl Into<String>,
        factor: RiskFactor,
        (min_lat, max_lat): (f64, f64),
        (min_lng, max_lng): (f64, f64),
    ) -> Self {
        Self {
            name: name.into(),
            factor,
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        }
    }

    pub fn contains(&self, point: &Waypoint) -> bool {
        point_in_zone(point.latitude, point.longitude, self)
    }
}

/// Inclusive bounds check. Out-of-range coordinates never match.
pub fn point_in_zone(lat: f64, lng: f64, zone: &RiskZone) -> bool {
    lat >= zone.min_lat && lat <= zone.max_lat && lng >= zone.min_lng && lng <= zone.max_lng
}

/// Immutable set of risk zones, grouped by factor on lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneTable {
    zones: Vec<RiskZone>,
}

impl ZoneTable {
    pub fn new(zones: Vec<RiskZone>) -> Self {
        Self { zones }
    }

    pub fn empty() -> Self {
        Self { zones: Vec::new() }
    }

    pub fn zones(&self) -> &[RiskZone] {
        &self.zones
    }

    pub fn for_factor(&self, factor: RiskFactor) -> Vec<&RiskZone> {
        self.zones.iter().filter(|z| z.factor == factor).collect()
    }

    /// True if the point lies in at least one zone of the given factor
    pub fn is_in_zone(&self, point: &Waypoint, factor: RiskFactor) -> bool {
        self.zones
            .iter()
            .any(|z| z.factor == factor && z.contains(point))
    }

    /// Names of every zone (any factor) containing the point
    pub fn zones_containing(&self, point: &Waypoint) -> Vec<&str> {
        self.zones
            .iter()
            .filter(|z| z.contains(point))
            .map(|z| z.name.as_str())
            .collect()
    }
}

impl Default for ZoneTable {
    /// Compiled-in hazard areas used by the simulated estimator
    fn default() -> Self {
        use RiskFactor::*;

        Self::new(vec![
            // Heavy weather
            RiskZone::new("North Atlantic", Weather, (40.0, 65.0), (-60.0, -10.0)),
            RiskZone::new("Southern Ocean", Weather, (-65.0, -40.0), (-180.0, 180.0)),
            RiskZone::new("Bay of Bengal", Weather, (5.0, 22.0), (80.0, 100.0)),
            RiskZone::new("Western Pacific Typhoon Belt", Weather, (10.0, 35.0), (120.0, 160.0)),
            RiskZone::new("Caribbean Hurricane Belt", Weather, (10.0, 30.0), (-90.0, -60.0)),
            // Piracy
            RiskZone::new("Gulf of Aden", Piracy, (0.0, 15.0), (40.0, 60.0)),
            RiskZone::new("Gulf of Guinea", Piracy, (-5.0, 10.0), (-10.0, 10.0)),
            RiskZone::new("Strait of Malacca", Piracy, (-2.0, 8.0), (95.0, 106.0)),
            RiskZone::new("Sulu Sea", Piracy, (4.0, 10.0), (117.0, 126.0)),
            // Vessel congestion
            RiskZone::new("English Channel", Traffic, (48.0, 52.0), (-6.0, 3.0)),
            RiskZone::new("Strait of Malacca", Traffic, (-2.0, 8.0), (95.0, 106.0)),
            RiskZone::new("South China Sea", Traffic, (0.0, 25.0), (105.0, 122.0)),
            RiskZone::new("Red Sea and Suez", Traffic, (12.0, 32.0), (32.0, 44.0)),
            RiskZone::new("Panama Approaches", Traffic, (7.0, 10.0), (-81.0, -78.0)),
            // Claims history
            RiskZone::new("Gulf of Mexico", Claims, (18.0, 30.0), (-98.0, -81.0)),
            RiskZone::new("Caribbean", Claims, (10.0, 27.0), (-90.0, -60.0)),
            RiskZone::new("North Sea", Claims, (51.0, 60.0), (-4.0, 10.0)),
            RiskZone::new("East China Sea", Claims, (25.0, 35.0), (120.0, 130.0)),
        ])
    }
}
