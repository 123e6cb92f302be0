//! Common types shared across the balloon router crates.

pub mod error;
pub mod geo;
pub mod route;
pub mod telemetry;

pub use error::{RouterError, RouterResult};
pub use geo::{BoundingBox, Position};
pub use route::{Route, RouteCoordinate, RouteResponse};
pub use telemetry::{BalloonRecord, BalloonSample, TelemetrySnapshot, WindRecord, WindSample, WindSnapshot};
