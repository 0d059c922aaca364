use std::future::Future;
use tracing::{debug, info, warn};

use crate::geo::ZoneTable;
use crate::providers::{ExternalRiskProvider, FactorOutcome};
use crate::types::{
    FactorSource, FactorSources, RiskAssessment, RiskFactor, RiskScores, Waypoint,
};

use super::simulated::SimulatedEstimator;

/// A factor score together with the path that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactorResolution {
    pub score: u8,
    pub source: FactorSource,
}

impl FactorResolution {
    pub fn simulated(score: u8) -> Self {
        Self {
            score,
            source: FactorSource::Simulated,
        }
    }
}

/// Await the live source and only run the simulated path if it is unavailable
pub async fn resolve_with_fallback<E, S>(external: E, simulated: S) -> FactorResolution
where
    E: Future<Output = FactorOutcome>,
    S: FnOnce() -> u8,
{
    match external.await {
        FactorOutcome::Resolved(score) => FactorResolution {
            score: score.min(100),
            source: FactorSource::External,
        },
        FactorOutcome::Unavailable => FactorResolution::simulated(simulated()),
    }
}

/// Composite route risk engine
///
/// Weather and traffic prefer their live providers and fall back to the
/// zone estimator. Piracy and claims are always zone-estimated.
pub struct RiskEngine<W, T> {
    weather: W,
    traffic: T,
    estimator: SimulatedEstimator,
}

impl<W, T> RiskEngine<W, T>
where
    W: ExternalRiskProvider,
    T: ExternalRiskProvider,
{
    pub fn new(weather: W, traffic: T) -> Self {
        Self::with_estimator(weather, traffic, SimulatedEstimator::default())
    }

    pub fn with_estimator(weather: W, traffic: T, estimator: SimulatedEstimator) -> Self {
        Self {
            weather,
            traffic,
            estimator,
        }
    }

    pub fn zones(&self) -> &ZoneTable {
        self.estimator.zones()
    }

    pub fn weather_provider(&self) -> &W {
        &self.weather
    }

    pub fn traffic_provider(&self) -> &T {
        &self.traffic
    }

    /// Score a route. Never fails; empty routes score all zeros.
    pub async fn calculate_route_risk(&self, waypoints: &[Waypoint]) -> RiskScores {
        self.assess_route(waypoints).await.scores
    }

    /// Score a route and report which source produced each factor
    ///
    /// Pipeline:
    /// 1. Short-circuit empty routes
    /// 2. Resolve all four factors concurrently
    /// 3. Combine into the weighted overall score
    pub async fn assess_route(&self, waypoints: &[Waypoint]) -> RiskAssessment {
        if waypoints.is_empty() {
            debug!("Empty route, returning zero risk");
            return RiskAssessment::new(0);
        }

        let (weather, piracy, traffic, claims) = tokio::join!(
            self.resolve_external(&self.weather, waypoints),
            async { FactorResolution::simulated(self.simulate(waypoints, RiskFactor::Piracy)) },
            self.resolve_external(&self.traffic, waypoints),
            async { FactorResolution::simulated(self.simulate(waypoints, RiskFactor::Claims)) },
        );

        let scores =
            RiskScores::from_factors(weather.score, piracy.score, traffic.score, claims.score);
        let sources = FactorSources {
            weather: weather.source,
            piracy: piracy.source,
            traffic: traffic.source,
            claims: claims.source,
        };

        info!(
            "Route risk: overall={} weather={} piracy={} traffic={} claims={} ({} waypoints)",
            scores.overall,
            scores.weather,
            scores.piracy,
            scores.traffic,
            scores.claims,
            waypoints.len()
        );

        RiskAssessment::new(waypoints.len())
            .with_scores(scores)
            .with_sources(sources)
    }

    async fn resolve_external<P>(&self, provider: &P, waypoints: &[Waypoint]) -> FactorResolution
    where
        P: ExternalRiskProvider,
    {
        let factor = provider.factor();

        resolve_with_fallback(provider.assess(waypoints), || {
            warn!("{} source unavailable, using simulated estimate", factor.name());
            self.simulate(waypoints, factor)
        })
        .await
    }

    fn simulate(&self, waypoints: &[Waypoint], factor: RiskFactor) -> u8 {
        self.estimator.estimate(waypoints, factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::simulated::NoJitter;
    use crate::geo::RiskZone;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Provider stub returning a fixed outcome and counting calls
    struct StubProvider {
        factor: RiskFactor,
        outcome: FactorOutcome,
        calls: Arc<AtomicUsize>,
        delay: Duration,
    }

    impl StubProvider {
        fn new(factor: RiskFactor, outcome: FactorOutcome) -> Self {
            Self {
                factor,
                outcome,
                calls: Arc::new(AtomicUsize::new(0)),
                delay: Duration::ZERO,
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    impl ExternalRiskProvider for StubProvider {
        fn factor(&self) -> RiskFactor {
            self.factor
        }

        async fn assess(&self, _waypoints: &[Waypoint]) -> FactorOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.outcome
        }
    }

    fn failing_engine() -> RiskEngine<StubProvider, StubProvider> {
        RiskEngine::new(
            StubProvider::new(RiskFactor::Weather, FactorOutcome::Unavailable),
            StubProvider::new(RiskFactor::Traffic, FactorOutcome::Unavailable),
        )
    }

    fn assert_weighted(scores: &RiskScores) {
        let expected = (0.25 * f64::from(scores.weather)
            + 0.35 * f64::from(scores.piracy)
            + 0.20 * f64::from(scores.traffic)
            + 0.20 * f64::from(scores.claims))
        .round() as u8;
        assert_eq!(scores.overall, expected, "{:?}", scores);
    }

    fn voyage() -> Vec<Waypoint> {
        vec![
            Waypoint::new(51.9, 4.5),
            Waypoint::new(50.0, -2.0),
            Waypoint::new(36.0, -6.0),
            Waypoint::new(31.0, 32.3),
            Waypoint::new(12.5, 45.0),
            Waypoint::new(6.0, 80.0),
            Waypoint::new(3.0, 100.0),
            Waypoint::new(1.3, 103.8),
        ]
    }

    #[tokio::test]
    async fn test_empty_route_is_all_zero() {
        let engine = failing_engine();
        let scores = engine.calculate_route_risk(&[]).await;

        assert_eq!(scores, RiskScores::default());
        assert_eq!(engine.weather_provider().calls.load(Ordering::SeqCst), 0);
        assert_eq!(engine.traffic_provider().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_scores_are_bounded_and_weighted() {
        let engine = failing_engine();
        for _ in 0..50 {
            let scores = engine.calculate_route_risk(&voyage()).await;
            for factor in RiskFactor::ALL {
                assert!(scores.factor(factor) <= 100);
            }
            assert!(scores.overall <= 100);
            assert_weighted(&scores);
        }
    }

    #[tokio::test]
    async fn test_external_scores_are_used_when_available() {
        let engine = RiskEngine::new(
            StubProvider::new(RiskFactor::Weather, FactorOutcome::Resolved(64)),
            StubProvider::new(RiskFactor::Traffic, FactorOutcome::Resolved(12)),
        );

        let assessment = engine.assess_route(&voyage()).await;

        assert_eq!(assessment.scores.weather, 64);
        assert_eq!(assessment.scores.traffic, 12);
        assert_eq!(assessment.sources.weather, FactorSource::External);
        assert_eq!(assessment.sources.traffic, FactorSource::External);
        assert_eq!(assessment.sources.piracy, FactorSource::Simulated);
        assert_eq!(assessment.sources.claims, FactorSource::Simulated);
        assert!(!assessment.used_fallback());
        assert_weighted(&assessment.scores);
    }

    #[tokio::test]
    async fn test_unavailable_sources_fall_back() {
        let engine = failing_engine();
        let assessment = engine.assess_route(&voyage()).await;

        assert_eq!(assessment.sources.weather, FactorSource::Simulated);
        assert_eq!(assessment.sources.traffic, FactorSource::Simulated);
        assert!(assessment.used_fallback());
        assert_eq!(assessment.waypoint_count, 8);
        assert_eq!(engine.weather_provider().calls.load(Ordering::SeqCst), 1);
        assert_eq!(engine.traffic_provider().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_deterministic_without_jitter() {
        let engine = RiskEngine::with_estimator(
            StubProvider::new(RiskFactor::Weather, FactorOutcome::Unavailable),
            StubProvider::new(RiskFactor::Traffic, FactorOutcome::Unavailable),
            SimulatedEstimator::with_jitter(ZoneTable::default(), NoJitter),
        );

        let first = engine.calculate_route_risk(&voyage()).await;
        let second = engine.calculate_route_risk(&voyage()).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_zone_driven_scores_without_jitter() {
        let zones = ZoneTable::new(vec![
            RiskZone::new("aden", RiskFactor::Piracy, (0.0, 15.0), (40.0, 60.0)),
            RiskZone::new("gulf", RiskFactor::Claims, (18.0, 30.0), (-98.0, -81.0)),
        ]);
        let engine = RiskEngine::with_estimator(
            StubProvider::new(RiskFactor::Weather, FactorOutcome::Resolved(40)),
            StubProvider::new(RiskFactor::Traffic, FactorOutcome::Unavailable),
            SimulatedEstimator::with_jitter(zones, NoJitter),
        );

        let scores = engine
            .calculate_route_risk(&[Waypoint::new(7.0, 50.0), Waypoint::new(-30.0, 0.0)])
            .await;

        assert_eq!(scores.weather, 40);
        assert_eq!(scores.piracy, 50);
        assert_eq!(scores.traffic, 0);
        assert_eq!(scores.claims, 0);
        // 10 + 17.5
        assert_eq!(scores.overall, 28);
    }

    #[tokio::test]
    async fn test_out_of_range_coordinates_do_not_fail() {
        let engine = failing_engine();
        let scores = engine
            .calculate_route_risk(&[Waypoint::new(95.0, 200.0), Waypoint::new(-91.0, -181.0)])
            .await;
        assert!(scores.overall <= 25);
        assert_weighted(&scores);
    }

    #[tokio::test(start_paused = true)]
    async fn test_factors_resolve_concurrently() {
        let engine = RiskEngine::new(
            StubProvider::new(RiskFactor::Weather, FactorOutcome::Resolved(10))
                .with_delay(Duration::from_secs(5)),
            StubProvider::new(RiskFactor::Traffic, FactorOutcome::Resolved(10))
                .with_delay(Duration::from_secs(5)),
        );

        let started = tokio::time::Instant::now();
        engine.calculate_route_risk(&voyage()).await;

        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_simulated_path_runs_only_on_unavailable() {
        let evaluated = AtomicUsize::new(0);

        let resolved = resolve_with_fallback(async { FactorOutcome::Resolved(33) }, || {
            evaluated.fetch_add(1, Ordering::SeqCst);
            99
        })
        .await;
        assert_eq!(resolved.score, 33);
        assert_eq!(resolved.source, FactorSource::External);
        assert_eq!(evaluated.load(Ordering::SeqCst), 0);

        let fallback = resolve_with_fallback(async { FactorOutcome::Unavailable }, || {
            evaluated.fetch_add(1, Ordering::SeqCst);
            99
        })
        .await;
        assert_eq!(fallback, FactorResolution::simulated(99));
        assert_eq!(evaluated.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_external_scores_are_clamped() {
        let resolved = resolve_with_fallback(async { FactorOutcome::Resolved(180) }, || 0).await;
        assert_eq!(resolved.score, 100);
    }
}
