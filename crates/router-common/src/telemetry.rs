//! Balloon telemetry and wind snapshots.
//!
//! Both snapshots come from the route backend as plain arrays. Wind samples
//! carry no identity of their own: entry `i` of the wind snapshot belongs to
//! entry `i` of the telemetry snapshot.

use serde::{Deserialize, Serialize};

use crate::geo::Position;

/// One balloon entry as served by `/balloon-data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalloonRecord {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
}

/// Body of `/balloon-data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    #[serde(default)]
    pub balloon_data: Vec<Option<BalloonRecord>>,
}

impl TelemetrySnapshot {
    /// Convert wire records into samples, keeping each record's ordinal.
    ///
    /// Null entries and entries with a missing or invalid coordinate still
    /// produce a sample (without a position) so ordinals stay aligned with
    /// the wind snapshot.
    pub fn into_samples(self) -> Vec<BalloonSample> {
        self.balloon_data
            .into_iter()
            .enumerate()
            .map(|(index, record)| BalloonSample::from_record(index, record.unwrap_or_default()))
            .collect()
    }
}

/// A balloon position at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalloonSample {
    /// Ordinal in the snapshot. Not a stable identity across snapshots.
    pub index: usize,
    pub position: Option<Position>,
    pub altitude: Option<f64>,
}

impl BalloonSample {
    pub fn new(index: usize, position: Option<Position>) -> Self {
        Self {
            index,
            position,
            altitude: None,
        }
    }

    pub fn from_record(index: usize, record: BalloonRecord) -> Self {
        let position = match (record.latitude, record.longitude) {
            (Some(lat), Some(lon)) => Position::new(lat, lon).ok(),
            _ => None,
        };
        Self {
            index,
            position,
            altitude: record.altitude.filter(|a| a.is_finite()),
        }
    }
}

/// One wind entry as served by `/wind-data`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindRecord {
    pub speed: f64,
    pub direction: f64,
}

/// Body of `/wind-data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindSnapshot {
    #[serde(default)]
    pub speed_direction: Vec<Option<WindRecord>>,
}

impl WindSnapshot {
    /// Convert wire records into samples. Null entries are dropped but the
    /// remaining samples keep their original ordinal.
    pub fn into_samples(self) -> Vec<WindSample> {
        self.speed_direction
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| {
                record.map(|r| WindSample {
                    index,
                    speed: r.speed,
                    direction: r.direction,
                })
            })
            .collect()
    }
}

/// Wind speed (m/s) and direction (degrees, meteorological) for the balloon
/// with the same ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindSample {
    pub index: usize,
    pub speed: f64,
    pub direction: f64,
}

impl WindSample {
    pub fn new(index: usize, speed: f64, direction: f64) -> Self {
        Self {
            index,
            speed,
            direction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_telemetry_snapshot() {
        let json = r#"{"balloon_data": [
            {"latitude": 10.0, "longitude": 20.0, "altitude": 14.2},
            {"latitude": null, "longitude": 5.0},
            null,
            {"latitude": 95.0, "longitude": 5.0}
        ]}"#;
        let snapshot: TelemetrySnapshot = serde_json::from_str(json).unwrap();
        let samples = snapshot.into_samples();

        assert_eq!(samples.len(), 4);
        assert_eq!(samples[0].position, Some(Position::new(10.0, 20.0).unwrap()));
        assert_eq!(samples[0].altitude, Some(14.2));
        assert!(samples[1].position.is_none());
        assert!(samples[2].position.is_none());
        assert!(samples[3].position.is_none());
        assert_eq!(samples[3].index, 3);
    }

    #[test]
    fn test_zero_coordinates_are_valid() {
        let sample = BalloonSample::from_record(
            0,
            BalloonRecord {
                latitude: Some(0.0),
                longitude: Some(0.0),
                altitude: None,
            },
        );
        assert!(sample.position.is_some());
    }

    #[test]
    fn test_parse_wind_snapshot_keeps_ordinals() {
        let json = r#"{"speed_direction": [
            {"speed": 5.0, "direction": 90.0},
            null,
            {"speed": 2.5, "direction": 180.0}
        ]}"#;
        let snapshot: WindSnapshot = serde_json::from_str(json).unwrap();
        let samples = snapshot.into_samples();

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0], WindSample::new(0, 5.0, 90.0));
        assert_eq!(samples[1], WindSample::new(2, 2.5, 180.0));
    }

    #[test]
    fn test_missing_array_is_empty() {
        let snapshot: WindSnapshot = serde_json::from_str("{}").unwrap();
        assert!(snapshot.into_samples().is_empty());
    }
}
