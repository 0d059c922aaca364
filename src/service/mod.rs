use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::api::{create_router, ApiState};
use crate::config::Config;
use crate::engine::RiskEngine;
use crate::error::Result;
use crate::providers::{MarineWeatherProvider, VesselTrafficProvider};

/// Engine wired to the live weather and AIS providers
pub type LiveRiskEngine = RiskEngine<MarineWeatherProvider, VesselTrafficProvider>;

/// Main risk service
pub struct RiskService {
    config: Arc<Config>,
    engine: Arc<LiveRiskEngine>,
}

impl RiskService {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let weather = MarineWeatherProvider::new(&config.weather)?;
        let traffic = VesselTrafficProvider::new(&config.traffic);
        let engine = Arc::new(RiskEngine::new(weather, traffic));

        Ok(Self {
            config: Arc::new(config),
            engine,
        })
    }

    /// Serve the HTTP API until the process is stopped
    pub async fn run(self: Arc<Self>) -> Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.api.port));

        info!("🚢 Starting voyage risk service");
        info!("🌊 Weather source: {}", self.config.weather.base_url);
        info!(
            "📡 Traffic feed: {} ({})",
            self.config.traffic.endpoint,
            if self.config.has_traffic_feed() {
                "credential set"
            } else {
                "no credential"
            }
        );
        info!("🗺️  {} risk zones loaded", self.engine.zones().zones().len());

        let listener = TcpListener::bind(addr).await?;
        info!("👂 Listening on {}", addr);

        axum::serve(listener, create_router(self.api_state())).await?;
        Ok(())
    }

    pub fn api_state(&self) -> ApiState {
        ApiState {
            engine: self.engine(),
        }
    }

    pub fn engine(&self) -> Arc<LiveRiskEngine> {
        Arc::clone(&self.engine)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
