mod rest;

pub use rest::{create_router, ApiState, AppError, DistanceResponse, RouteRequest, WaypointInput};
