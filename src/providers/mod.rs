mod traffic;
mod weather;

pub use traffic::{density_score, VesselTrafficProvider};
pub use weather::{MarineConditions, MarineWeatherProvider};

use std::future::Future;

use crate::types::{RiskFactor, Waypoint};

/// Result of asking a live data source for a factor score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactorOutcome {
    Resolved(u8),
    Unavailable,
}

impl FactorOutcome {
    pub fn score(&self) -> Option<u8> {
        match self {
            FactorOutcome::Resolved(score) => Some(*score),
            FactorOutcome::Unavailable => None,
        }
    }

    /// Average successful per-point scores, Unavailable if there are none
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return FactorOutcome::Unavailable;
        }
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        FactorOutcome::Resolved(crate::types::risk::clamp_score(mean))
    }
}

/// A live source able to score one risk factor for a route
///
/// Implementations never fail past this boundary: any fetch or parse
/// problem is reported as `FactorOutcome::Unavailable`.
pub trait ExternalRiskProvider: Send + Sync {
    fn factor(&self) -> RiskFactor;

    fn assess(&self, waypoints: &[Waypoint]) -> impl Future<Output = FactorOutcome> + Send;
}
