use crate::types::Waypoint;

/// Thin a route to roughly `target` points before calling a live source
///
/// Keeps every k-th waypoint, k = max(1, floor(n / target)), starting at
/// index 0. Path order is preserved. A target of 0 is treated as 1.
pub fn sample(waypoints: &[Waypoint], target: usize) -> Vec<Waypoint> {
    let stride = (waypoints.len() / target.max(1)).max(1);

    waypoints.iter().step_by(stride).copied().collect()
}
