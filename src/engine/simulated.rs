use rand::Rng;

use crate::geo::ZoneTable;
use crate::types::{RiskFactor, Waypoint};

/// Contribution of a waypoint that lies inside a hazard zone
const IN_ZONE_WEIGHT: f64 = 2.0;

/// Upper bound (exclusive) of the jitter added outside hazard zones
pub const MAX_JITTER: f64 = 0.5;

/// Source of the small random contribution for out-of-zone waypoints
pub trait Jitter: Send + Sync {
    /// Returns a value in [0, MAX_JITTER)
    fn sample(&self) -> f64;
}

/// Uniform jitter from the thread-local RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomJitter;

impl Jitter for RandomJitter {
    fn sample(&self) -> f64 {
        rand::thread_rng().gen_range(0.0..MAX_JITTER)
    }
}

/// Always zero, for reproducible scoring
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl Jitter for NoJitter {
    fn sample(&self) -> f64 {
        0.0
    }
}

/// Zone-driven score estimator used when no live source is available
pub struct SimulatedEstimator {
    zones: ZoneTable,
    jitter: Box<dyn Jitter>,
}

impl SimulatedEstimator {
    pub fn new(zones: ZoneTable) -> Self {
        Self::with_jitter(zones, RandomJitter)
    }

    pub fn with_jitter(zones: ZoneTable, jitter: impl Jitter + 'static) -> Self {
        Self {
            zones,
            jitter: Box::new(jitter),
        }
    }

    pub fn zones(&self) -> &ZoneTable {
        &self.zones
    }

    /// Score a route for one factor, 0-100
    ///
    /// Each in-zone waypoint adds 2 points, every other waypoint adds
    /// jitter in [0, 0.5). The sum is normalised by the maximum possible
    /// contribution (2 per waypoint).
    pub fn estimate(&self, waypoints: &[Waypoint], factor: RiskFactor) -> u8 {
        if waypoints.is_empty() {
            return 0;
        }

        let total: f64 = waypoints
            .iter()
            .map(|wp| {
                if self.zones.is_in_zone(wp, factor) {
                    IN_ZONE_WEIGHT
                } else {
                    self.jitter.sample().clamp(0.0, MAX_JITTER)
                }
            })
            .sum();

        let max_total = IN_ZONE_WEIGHT * waypoints.len() as f64;
        let percent = (total / max_total * 100.0).round();

        percent.min(100.0) as u8
    }
}

impl Default for SimulatedEstimator {
    fn default() -> Self {
        Self::new(ZoneTable::default())
    }
}
