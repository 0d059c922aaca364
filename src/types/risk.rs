use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The four independent risk dimensions of a voyage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskFactor {
    Weather,
    Piracy,
    Traffic,
    Claims,
}

impl RiskFactor {
    pub const ALL: [RiskFactor; 4] = [
        RiskFactor::Weather,
        RiskFactor::Piracy,
        RiskFactor::Traffic,
        RiskFactor::Claims,
    ];

    /// Weight of this factor in the overall score. Weights sum to 1.0.
    pub fn weight(&self) -> f64 {
        match self {
            RiskFactor::Weather => 0.25,
            RiskFactor::Piracy => 0.35,
            RiskFactor::Traffic => 0.20,
            RiskFactor::Claims => 0.20,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RiskFactor::Weather => "weather",
            RiskFactor::Piracy => "piracy",
            RiskFactor::Traffic => "traffic",
            RiskFactor::Claims => "claims",
        }
    }
}

/// Composite voyage risk, every field in [0, 100]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskScores {
    pub overall: u8,
    pub weather: u8,
    pub piracy: u8,
    pub traffic: u8,
    pub claims: u8,
}

impl RiskScores {
    /// Build scores from the four factor sub-scores, deriving `overall`
    pub fn from_factors(weather: u8, piracy: u8, traffic: u8, claims: u8) -> Self {
        let weather = weather.min(100);
        let piracy = piracy.min(100);
        let traffic = traffic.min(100);
        let claims = claims.min(100);

        let weighted = f64::from(weather) * RiskFactor::Weather.weight()
            + f64::from(piracy) * RiskFactor::Piracy.weight()
            + f64::from(traffic) * RiskFactor::Traffic.weight()
            + f64::from(claims) * RiskFactor::Claims.weight();

        Self {
            overall: clamp_score(weighted),
            weather,
            piracy,
            traffic,
            claims,
        }
    }

    pub fn factor(&self, factor: RiskFactor) -> u8 {
        match factor {
            RiskFactor::Weather => self.weather,
            RiskFactor::Piracy => self.piracy,
            RiskFactor::Traffic => self.traffic,
            RiskFactor::Claims => self.claims,
        }
    }
}

/// Round to the nearest integer and clamp into [0, 100]
pub fn clamp_score(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

/// Which path produced a factor's sub-score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorSource {
    External,
    Simulated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorSources {
    pub weather: FactorSource,
    pub piracy: FactorSource,
    pub traffic: FactorSource,
    pub claims: FactorSource,
}

impl Default for FactorSources {
    fn default() -> Self {
        Self {
            weather: FactorSource::Simulated,
            piracy: FactorSource::Simulated,
            traffic: FactorSource::Simulated,
            claims: FactorSource::Simulated,
        }
    }
}

/// Scores plus provenance for one route assessment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub scores: RiskScores,
    pub sources: FactorSources,
    pub waypoint_count: usize,
    pub assessed_at: DateTime<Utc>,
}

impl RiskAssessment {
    pub fn new(waypoint_count: usize) -> Self {
        Self {
            scores: RiskScores::default(),
            sources: FactorSources::default(),
            waypoint_count,
            assessed_at: Utc::now(),
        }
    }

    pub fn with_scores(mut self, scores: RiskScores) -> Self {
        self.scores = scores;
        self
    }

    pub fn with_sources(mut self, sources: FactorSources) -> Self {
        self.sources = sources;
        self
    }

    pub fn used_fallback(&self) -> bool {
        self.sources.weather == FactorSource::Simulated
            || self.sources.traffic == FactorSource::Simulated
    }
}
