pub mod risk;
pub mod waypoint;

// Re-export commonly used types
pub use risk::{FactorSource, FactorSources, RiskAssessment, RiskFactor, RiskScores};
pub use waypoint::Waypoint;
