use crate::types::Waypoint;

const EARTH_RADIUS_KM: f64 = 6371.0;
const KM_PER_NAUTICAL_MILE: f64 = 1.852;

/// Great-circle distance between two waypoints in kilometres
pub fn haversine_km(from: &Waypoint, to: &Waypoint) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let dlat = (to.latitude - from.latitude).to_radians();
    let dlon = (to.longitude - from.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Distance of each consecutive leg, in path order
pub fn leg_distances_km(waypoints: &[Waypoint]) -> Vec<f64> {
    waypoints
        .windows(2)
        .map(|pair| haversine_km(&pair[0], &pair[1]))
        .collect()
}

pub fn route_distance_km(waypoints: &[Waypoint]) -> f64 {
    leg_distances_km(waypoints).iter().sum()
}

pub fn km_to_nautical_miles(km: f64) -> f64 {
    km / KM_PER_NAUTICAL_MILE
}
