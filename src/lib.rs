pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod geo;
pub mod providers;
pub mod service;
pub mod types;

// Re-exports
pub use api::ApiState;
pub use config::Config;
pub use engine::{resolve_with_fallback, RiskEngine, SimulatedEstimator};
pub use error::{Result, VoyageRiskError};
pub use providers::{ExternalRiskProvider, FactorOutcome, MarineWeatherProvider, VesselTrafficProvider};
pub use service::{LiveRiskEngine, RiskService};
pub use types::{RiskAssessment, RiskFactor, RiskScores, Waypoint};
