//! Common test fixtures for balloon router tests.

use router_common::{BalloonSample, Position, Route, WindSample};

/// Well-known places used across form and service tests.
pub mod places {
    /// (latitude, longitude) of New York City
    pub const NEW_YORK: (f64, f64) = (40.712_728, -74.006_015);

    /// (latitude, longitude) of Los Angeles
    pub const LOS_ANGELES: (f64, f64) = (34.052_235, -118.243_683);

    /// (latitude, longitude) of San Francisco, the default map center
    pub const SAN_FRANCISCO: (f64, f64) = (37.7749, -122.4194);
}

/// Build a validated position, panicking on invalid input.
pub fn pos(latitude: f64, longitude: f64) -> Position {
    Position::new(latitude, longitude).expect("fixture position must be valid")
}

/// Telemetry samples with ordinals taken from slice order.
pub fn telemetry(points: &[(f64, f64)]) -> Vec<BalloonSample> {
    points
        .iter()
        .enumerate()
        .map(|(index, &(lat, lon))| BalloonSample::new(index, Some(pos(lat, lon))))
        .collect()
}

/// Wind samples from `(speed, direction)` pairs, ordinals from slice order.
pub fn wind(samples: &[(f64, f64)]) -> Vec<WindSample> {
    samples
        .iter()
        .enumerate()
        .map(|(index, &(speed, direction))| WindSample::new(index, speed, direction))
        .collect()
}

/// A route through the given `(lat, lon)` points.
pub fn route(points: &[(f64, f64)]) -> Route {
    Route::new(points.iter().map(|&(lat, lon)| pos(lat, lon)).collect())
}

/// A telemetry snapshot of `count` balloons spread along the equator.
pub fn equator_fleet(count: usize) -> Vec<BalloonSample> {
    (0..count)
        .map(|i| BalloonSample::new(i, Some(pos(0.0, -170.0 + i as f64))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_telemetry_ordinals() {
        let samples = telemetry(&[(1.0, 2.0), (3.0, 4.0)]);
        assert_eq!(samples[0].index, 0);
        assert_eq!(samples[1].index, 1);
        assert_eq!(samples[1].position, Some(pos(3.0, 4.0)));
    }

    #[test]
    fn test_equator_fleet() {
        let fleet = equator_fleet(5);
        assert_eq!(fleet.len(), 5);
        assert!(fleet.iter().all(|s| s.position.is_some()));
    }
}
