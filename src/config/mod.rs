use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Result, VoyageRiskError};

const ENV_PREFIX: &str = "VOYAGE_RISK";
const AISSTREAM_KEY_VAR: &str = "AISSTREAM_API_KEY";

/// Voyage risk configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub weather: WeatherConfig,
    pub traffic: TrafficConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
    pub sample_target: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficConfig {
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub session_timeout_ms: u64,
    pub bbox_radius_deg: f64,
    pub sample_target: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://marine-api.open-meteo.com/v1/marine".to_string(),
            request_timeout_ms: 10_000,
            sample_target: 5,
        }
    }
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            endpoint: "wss://stream.aisstream.io/v0/stream".to_string(),
            api_key: None,
            session_timeout_ms: 8_000,
            bbox_radius_deg: 0.25,
            sample_target: 3,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

impl Config {
    /// Load configuration from `.env`, defaults, and environment
    ///
    /// Keys are read as `VOYAGE_RISK__<SECTION>__<KEY>`, e.g.
    /// `VOYAGE_RISK__TRAFFIC__SESSION_TIMEOUT_MS=5000`. The traffic
    /// credential also falls back to `AISSTREAM_API_KEY`.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let settings = ::config::Config::builder()
            .add_source(::config::Config::try_from(&Config::default())?)
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let mut config: Config = settings.try_deserialize()?;

        if config.traffic.api_key.is_none() {
            config.traffic.api_key = std::env::var(AISSTREAM_KEY_VAR).ok();
        }
        config.traffic.api_key = config
            .traffic
            .api_key
            .take()
            .filter(|k| !k.trim().is_empty());

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.weather.base_url.trim().is_empty() {
            return Err(VoyageRiskError::config("Weather base URL required"));
        }

        if self.traffic.endpoint.trim().is_empty() {
            return Err(VoyageRiskError::config("Traffic feed endpoint required"));
        }

        if self.weather.request_timeout_ms == 0 || self.traffic.session_timeout_ms == 0 {
            return Err(VoyageRiskError::config("Timeouts must be > 0"));
        }

        if self.weather.sample_target == 0 || self.traffic.sample_target == 0 {
            return Err(VoyageRiskError::config("Sample targets must be > 0"));
        }

        let radius = self.traffic.bbox_radius_deg;
        if !(radius > 0.0 && radius <= 5.0) {
            return Err(VoyageRiskError::config(format!(
                "Bounding box radius ({}) must be in (0, 5] degrees",
                radius
            )));
        }

        Ok(())
    }

    pub fn weather_timeout(&self) -> Duration {
        Duration::from_millis(self.weather.request_timeout_ms)
    }

    pub fn traffic_session_timeout(&self) -> Duration {
        Duration::from_millis(self.traffic.session_timeout_ms)
    }

    pub fn has_traffic_feed(&self) -> bool {
        self.traffic.api_key.is_some()
    }
}
