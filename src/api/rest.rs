use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::geo::{km_to_nautical_miles, leg_distances_km};
use crate::service::LiveRiskEngine;
use crate::types::{RiskAssessment, RiskScores, Waypoint};

/// API State
#[derive(Clone)]
pub struct ApiState {
    pub engine: Arc<LiveRiskEngine>,
}

/// One waypoint as sent by clients
///
/// `sequence` is accepted for compatibility but array order is what counts.
#[derive(Debug, Deserialize)]
pub struct WaypointInput {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub sequence: Option<i64>,
}

/// Request body carrying a route
#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    #[serde(default)]
    pub waypoints: Option<Vec<WaypointInput>>,
}

impl RouteRequest {
    fn into_waypoints(self) -> Result<Vec<Waypoint>, AppError> {
        let inputs = self
            .waypoints
            .ok_or_else(|| AppError::InvalidRequest("waypoints is required".to_string()))?;

        inputs
            .into_iter()
            .enumerate()
            .map(|(idx, input)| {
                let waypoint = Waypoint::new(input.latitude, input.longitude);
                if waypoint.is_finite() {
                    Ok(waypoint)
                } else {
                    Err(AppError::InvalidRequest(format!(
                        "waypoint {} has non-finite coordinates",
                        idx
                    )))
                }
            })
            .collect()
    }
}

/// Route length response
#[derive(Debug, Serialize, Deserialize)]
pub struct DistanceResponse {
    pub total_km: f64,
    pub total_nm: f64,
    pub legs_km: Vec<f64>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub traffic_feed: String,
}

/// Create REST API router
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/risk/route", post(route_risk))
        .route("/api/risk/route/breakdown", post(route_risk_breakdown))
        .route("/api/route/distance", post(route_distance))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check(State(state): State<ApiState>) -> impl IntoResponse {
    let traffic_feed = if state.engine.traffic_provider().is_configured() {
        "configured"
    } else {
        "unconfigured"
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        traffic_feed: traffic_feed.to_string(),
    })
}

/// Composite risk for a route
async fn route_risk(
    State(state): State<ApiState>,
    payload: Result<Json<RouteRequest>, JsonRejection>,
) -> Result<Json<RiskScores>, AppError> {
    let waypoints = parse_route(payload)?;
    info!("API: Scoring route with {} waypoints", waypoints.len());

    Ok(Json(state.engine.calculate_route_risk(&waypoints).await))
}

/// Composite risk plus the source used for each factor
async fn route_risk_breakdown(
    State(state): State<ApiState>,
    payload: Result<Json<RouteRequest>, JsonRejection>,
) -> Result<Json<RiskAssessment>, AppError> {
    let waypoints = parse_route(payload)?;
    info!("API: Assessing route with {} waypoints", waypoints.len());

    Ok(Json(state.engine.assess_route(&waypoints).await))
}

/// Great-circle length of a route
async fn route_distance(
    payload: Result<Json<RouteRequest>, JsonRejection>,
) -> Result<Json<DistanceResponse>, AppError> {
    let waypoints = parse_route(payload)?;
    let legs_km = leg_distances_km(&waypoints);
    let total_km: f64 = legs_km.iter().sum();

    Ok(Json(DistanceResponse {
        total_km,
        total_nm: km_to_nautical_miles(total_km),
        legs_km,
    }))
}

fn parse_route(payload: Result<Json<RouteRequest>, JsonRejection>) -> Result<Vec<Waypoint>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::InvalidRequest(e.body_text()))?;
    request.into_waypoints()
}

/// API error wrapper
#[derive(Debug)]
pub enum AppError {
    InvalidRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::service::RiskService;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    /// Router whose live sources always fail: unreachable weather, no AIS key
    fn offline_router() -> Router {
        let mut config = Config::default();
        config.weather.base_url = "http://127.0.0.1:1/v1/marine".to_string();
        config.weather.request_timeout_ms = 500;
        config.traffic.api_key = None;

        let service = RiskService::new(config).unwrap();
        create_router(service.api_state())
    }

    async fn post_json(router: Router, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let response = offline_router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["traffic_feed"], "unconfigured");
    }

    #[tokio::test]
    async fn test_route_risk_with_offline_sources() {
        let body = r#"{"waypoints":[
            {"latitude":7.0,"longitude":50.0,"sequence":0},
            {"latitude":12.0,"longitude":45.0,"sequence":1}
        ]}"#;
        let (status, json) = post_json(offline_router(), "/api/risk/route", body).await;

        assert_eq!(status, StatusCode::OK);
        for field in ["overall", "weather", "piracy", "traffic", "claims"] {
            let value = json[field].as_u64().unwrap();
            assert!(value <= 100, "{} = {}", field, value);
        }
        // Both points sit in the Gulf of Aden piracy zone
        assert_eq!(json["piracy"], 100);
    }

    #[tokio::test]
    async fn test_empty_route_is_zero() {
        let (status, json) =
            post_json(offline_router(), "/api/risk/route", r#"{"waypoints":[]}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            serde_json::json!({"overall":0,"weather":0,"piracy":0,"traffic":0,"claims":0})
        );
    }

    #[tokio::test]
    async fn test_missing_waypoints_is_bad_request() {
        let (status, json) = post_json(offline_router(), "/api/risk/route", "{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "waypoints is required");
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let (status, json) = post_json(
            offline_router(),
            "/api/risk/route",
            r#"{"waypoints":[{"latitude":"north","longitude":1}]}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn test_breakdown_reports_fallback() {
        let body = r#"{"waypoints":[{"latitude":51.0,"longitude":1.0}]}"#;
        let (status, json) = post_json(offline_router(), "/api/risk/route/breakdown", body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["sources"]["weather"], "simulated");
        assert_eq!(json["sources"]["traffic"], "simulated");
        assert_eq!(json["waypoint_count"], 1);
    }

    #[tokio::test]
    async fn test_route_distance() {
        let body = r#"{"waypoints":[
            {"latitude":0.0,"longitude":0.0},
            {"latitude":1.0,"longitude":0.0},
            {"latitude":1.0,"longitude":1.0}
        ]}"#;
        let (status, json) = post_json(offline_router(), "/api/route/distance", body).await;

        assert_eq!(status, StatusCode::OK);
        let response: DistanceResponse = serde_json::from_value(json).unwrap();
        assert_eq!(response.legs_km.len(), 2);
        assert!((response.total_km - 222.37).abs() < 0.1);
        assert!((response.total_nm - response.total_km / 1.852).abs() < 1e-9);
    }
}
