mod distance;
mod zones;

pub use distance::{haversine_km, km_to_nautical_miles, leg_distances_km, route_distance_km};
pub use zones::{point_in_zone, RiskZone, ZoneTable};
