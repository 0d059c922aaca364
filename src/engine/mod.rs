mod aggregator;
mod sampling;
mod simulated;

pub use aggregator::{resolve_with_fallback, FactorResolution, RiskEngine};
pub use sampling::sample;
pub use simulated::{Jitter, NoJitter, RandomJitter, SimulatedEstimator, MAX_JITTER};
