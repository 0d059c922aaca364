//! Live marine-weather risk
//!
//! Queries an Open-Meteo style marine endpoint for current sea state at a
//! handful of sampled waypoints and turns wave, wind-wave and current
//! readings into a 0-100 score.

use futures::future::join_all;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::config::WeatherConfig;
use crate::engine::sample;
use crate::error::{Result, VoyageRiskError};
use crate::types::{RiskFactor, Waypoint};

use super::{ExternalRiskProvider, FactorOutcome};

const CURRENT_FIELDS: &str =
    "wave_height,wind_wave_height,swell_wave_height,ocean_current_velocity";

// Readings at or above these saturate their component at 100
const WAVE_HEIGHT_CEILING_M: f64 = 4.0;
const WIND_WAVE_HEIGHT_CEILING_M: f64 = 3.0;
const CURRENT_VELOCITY_CEILING: f64 = 15.0;

const SWELL_THRESHOLD_M: f64 = 2.0;
const SWELL_MULTIPLIER: f64 = 1.2;

#[derive(Debug, Deserialize)]
struct MarineResponse {
    current: Option<MarineCurrent>,
}

#[derive(Debug, Deserialize)]
struct MarineCurrent {
    wave_height: Option<f64>,
    wind_wave_height: Option<f64>,
    swell_wave_height: Option<f64>,
    ocean_current_velocity: Option<f64>,
}

/// Sea state at one point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarineConditions {
    pub wave_height_m: f64,
    pub wind_wave_height_m: f64,
    pub swell_wave_height_m: f64,
    pub current_velocity: f64,
}

impl MarineConditions {
    /// Per-point score, rounded, in [0, 100]
    pub fn risk_score(&self) -> f64 {
        let wave_risk = (self.wave_height_m / WAVE_HEIGHT_CEILING_M).min(1.0) * 100.0;
        let wind_wave_risk =
            (self.wind_wave_height_m / WIND_WAVE_HEIGHT_CEILING_M).min(1.0) * 100.0;
        let current_risk = (self.current_velocity / CURRENT_VELOCITY_CEILING).min(1.0) * 100.0;

        let swell_multiplier = if self.swell_wave_height_m > SWELL_THRESHOLD_M {
            SWELL_MULTIPLIER
        } else {
            1.0
        };

        let score =
            (0.4 * wave_risk + 0.4 * wind_wave_risk + 0.2 * current_risk) * swell_multiplier;

        score.clamp(0.0, 100.0).round()
    }
}

impl MarineResponse {
    fn into_conditions(self) -> Result<MarineConditions> {
        let current = self
            .current
            .ok_or(VoyageRiskError::MissingField("current"))?;

        Ok(MarineConditions {
            wave_height_m: current
                .wave_height
                .ok_or(VoyageRiskError::MissingField("wave_height"))?,
            wind_wave_height_m: current
                .wind_wave_height
                .ok_or(VoyageRiskError::MissingField("wind_wave_height"))?,
            swell_wave_height_m: current
                .swell_wave_height
                .ok_or(VoyageRiskError::MissingField("swell_wave_height"))?,
            current_velocity: current
                .ocean_current_velocity
                .ok_or(VoyageRiskError::MissingField("ocean_current_velocity"))?,
        })
    }
}

/// Weather factor backed by a live marine forecast API
pub struct MarineWeatherProvider {
    client: reqwest::Client,
    base_url: String,
    sample_target: usize,
}

impl MarineWeatherProvider {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            sample_target: config.sample_target,
        })
    }

    /// Fetch current sea state for a single point
    pub async fn fetch_conditions(&self, point: &Waypoint) -> Result<MarineConditions> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", point.latitude.to_string()),
                ("longitude", point.longitude.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(VoyageRiskError::upstream_status(response.status()));
        }

        let body: MarineResponse = response.json().await?;
        body.into_conditions()
    }

    async fn score_point(&self, point: Waypoint) -> Option<f64> {
        match self.fetch_conditions(&point).await {
            Ok(conditions) => {
                let score = conditions.risk_score();
                debug!(
                    "Weather sample ({:.3}, {:.3}): {:?} -> {}",
                    point.latitude, point.longitude, conditions, score
                );
                Some(score)
            }
            Err(e) if e.is_sample_failure() => {
                warn!(
                    "Weather sample ({:.3}, {:.3}) failed: {}",
                    point.latitude, point.longitude, e
                );
                None
            }
            Err(e) => {
                error!("Weather sample ({:.3}, {:.3}): {}", point.latitude, point.longitude, e);
                None
            }
        }
    }
}

impl ExternalRiskProvider for MarineWeatherProvider {
    fn factor(&self) -> RiskFactor {
        RiskFactor::Weather
    }

    async fn assess(&self, waypoints: &[Waypoint]) -> FactorOutcome {
        let points = sample(waypoints, self.sample_target);

        let scores: Vec<f64> = join_all(points.into_iter().map(|p| self.score_point(p)))
            .await
            .into_iter()
            .flatten()
            .collect();

        debug!("Weather: {} sampled points scored", scores.len());
        FactorOutcome::from_samples(&scores)
    }
}
