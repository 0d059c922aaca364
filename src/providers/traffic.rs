//! Live vessel-traffic risk
//!
//! Opens a short streaming session against an AISStream style position feed
//! for each sampled waypoint, counts distinct vessels seen inside a small
//! bounding box, and maps the resulting density onto a 0-100 score.

use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use crate::config::TrafficConfig;
use crate::engine::sample;
use crate::error::{Result, VoyageRiskError};
use crate::types::{RiskFactor, Waypoint};

use super::{ExternalRiskProvider, FactorOutcome};

const KM_PER_DEGREE: f64 = 111.0;
const POSITION_REPORT: &str = "PositionReport";

/// Subscription frame sent once a session is open
#[derive(Debug, Serialize)]
struct Subscription<'a> {
    #[serde(rename = "APIKey")]
    api_key: &'a str,
    #[serde(rename = "BoundingBoxes")]
    bounding_boxes: [[[f64; 2]; 2]; 1],
    #[serde(rename = "FilterMessageTypes")]
    message_types: [&'static str; 1],
}

impl<'a> Subscription<'a> {
    fn around(api_key: &'a str, point: &Waypoint, radius_deg: f64) -> Self {
        Self {
            api_key,
            bounding_boxes: [[
                [point.latitude - radius_deg, point.longitude - radius_deg],
                [point.latitude + radius_deg, point.longitude + radius_deg],
            ]],
            message_types: [POSITION_REPORT],
        }
    }
}

#[derive(Debug, Deserialize)]
struct FeedMessage {
    #[serde(rename = "MessageType")]
    message_type: Option<String>,
    #[serde(rename = "MetaData")]
    meta_data: Option<FeedMetaData>,
}

#[derive(Debug, Deserialize)]
struct FeedMetaData {
    #[serde(rename = "MMSI")]
    mmsi: Option<u64>,
}

/// Vessel identifier carried by a position report, if any
fn vessel_id(payload: &[u8]) -> Option<u64> {
    let message: FeedMessage = serde_json::from_slice(payload).ok()?;
    match message.message_type.as_deref() {
        Some(POSITION_REPORT) | None => message.meta_data?.mmsi,
        Some(_) => None,
    }
}

/// Area of the square observation box in km²
pub fn box_area_km2(radius_deg: f64) -> f64 {
    (2.0 * radius_deg * KM_PER_DEGREE).powi(2)
}

/// Map vessels per km² onto a 0-100 score
pub fn density_score(density: f64) -> f64 {
    let score = if density < 0.01 {
        (density * 1000.0).min(20.0)
    } else if density < 0.05 {
        20.0 + (density - 0.01) / 0.04 * 30.0
    } else if density < 0.1 {
        50.0 + (density - 0.05) / 0.05 * 30.0
    } else {
        (80.0 + (density - 0.1) * 200.0).min(100.0)
    };
    score.max(0.0)
}

/// Traffic factor backed by a live AIS position stream
pub struct VesselTrafficProvider {
    endpoint: String,
    api_key: Option<String>,
    session_timeout: Duration,
    radius_deg: f64,
    sample_target: usize,
}

impl VesselTrafficProvider {
    pub fn new(config: &TrafficConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            session_timeout: Duration::from_millis(config.session_timeout_ms),
            radius_deg: config.bbox_radius_deg,
            sample_target: config.sample_target,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Count distinct vessels reporting inside the box around `point`
    ///
    /// Only a session that lasts the whole observation window counts as a
    /// sample. Connect failures, stream errors and early closes by the feed
    /// are errors, never a zero count. The connect handshake is part of the
    /// window, so one session never outlives `session_timeout`.
    pub async fn observe_vessels(&self, api_key: &str, point: &Waypoint) -> Result<usize> {
        let timeout_ms = self.session_timeout.as_millis() as u64;
        let deadline = Instant::now() + self.session_timeout;

        let (mut stream, _) = timeout_at(deadline, connect_async(self.endpoint.as_str()))
            .await
            .map_err(|_| VoyageRiskError::SessionTimeout(timeout_ms))??;

        let subscription = Subscription::around(api_key, point, self.radius_deg);
        let mut vessels = HashSet::new();

        let outcome = match stream
            .send(Message::Text(serde_json::to_string(&subscription)?))
            .await
        {
            Err(e) => Err(e.into()),
            Ok(()) => loop {
                match timeout_at(deadline, stream.next()).await {
                    // Observation window complete
                    Err(_) => break Ok(()),
                    Ok(None) => break Err(VoyageRiskError::SessionClosed),
                    Ok(Some(Err(e))) => break Err(e.into()),
                    Ok(Some(Ok(Message::Close(_)))) => break Err(VoyageRiskError::SessionClosed),
                    Ok(Some(Ok(Message::Text(text)))) => {
                        vessels.extend(vessel_id(text.as_bytes()));
                    }
                    Ok(Some(Ok(Message::Binary(bytes)))) => {
                        vessels.extend(vessel_id(&bytes));
                    }
                    Ok(Some(Ok(_))) => {}
                }
            },
        };

        if let Err(e) = stream.close(None).await {
            debug!("Traffic session close: {}", e);
        }

        outcome.map(|()| vessels.len())
    }

    async fn score_point(&self, api_key: &str, point: &Waypoint) -> Option<f64> {
        match self.observe_vessels(api_key, point).await {
            Ok(count) => {
                let density = count as f64 / box_area_km2(self.radius_deg);
                let score = density_score(density);
                debug!(
                    "Traffic sample ({:.3}, {:.3}): {} vessels, density={:.5} -> {:.1}",
                    point.latitude, point.longitude, count, density, score
                );
                Some(score)
            }
            Err(e) if e.is_sample_failure() => {
                warn!(
                    "Traffic sample ({:.3}, {:.3}) failed: {}",
                    point.latitude, point.longitude, e
                );
                None
            }
            Err(e) => {
                error!("Traffic sample ({:.3}, {:.3}): {}", point.latitude, point.longitude, e);
                None
            }
        }
    }
}

impl ExternalRiskProvider for VesselTrafficProvider {
    fn factor(&self) -> RiskFactor {
        RiskFactor::Traffic
    }

    async fn assess(&self, waypoints: &[Waypoint]) -> FactorOutcome {
        let Some(api_key) = self.api_key.as_deref() else {
            info!("Traffic feed not configured, skipping live lookup");
            return FactorOutcome::Unavailable;
        };

        let points = sample(waypoints, self.sample_target);
        let mut scores = Vec::with_capacity(points.len());

        // One session at a time to keep load on the feed bounded
        for point in &points {
            if let Some(score) = self.score_point(api_key, point).await {
                scores.push(score);
            }
        }

        debug!("Traffic: {}/{} sessions succeeded", scores.len(), points.len());
        FactorOutcome::from_samples(&scores)
    }
}
