//! Geographic positions and bounding boxes.

use serde::{Deserialize, Serialize};

use crate::error::{RouterError, RouterResult};

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    /// Create a position, rejecting non-finite or out-of-range coordinates.
    pub fn new(latitude: f64, longitude: f64) -> RouterResult<Self> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(RouterError::InvalidPosition(format!(
                "non-finite coordinate ({}, {})",
                latitude, longitude
            )));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(RouterError::InvalidPosition(format!(
                "latitude {} outside [-90, 90]",
                latitude
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(RouterError::InvalidPosition(format!(
                "longitude {} outside [-180, 180]",
                longitude
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Same position with both coordinates rounded to 6 decimal digits.
    pub fn rounded(&self) -> Self {
        Self {
            latitude: round6(self.latitude),
            longitude: round6(self.longitude),
        }
    }

    /// `[latitude, longitude]` pair, the order used by route payloads.
    pub fn as_pair(&self) -> [f64; 2] {
        [self.latitude, self.longitude]
    }
}

/// Round to 6 decimal digits (about 0.11 m at the equator).
pub fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

/// A geographic bounding box in degrees.
///
/// `x` is longitude and `y` is latitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Smallest box covering every position, or `None` for an empty input.
    pub fn from_positions<'a, I>(positions: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Position>,
    {
        let mut iter = positions.into_iter();
        let first = iter.next()?;
        let mut bbox = Self::new(first.longitude, first.latitude, first.longitude, first.latitude);
        for p in iter {
            bbox.min_x = bbox.min_x.min(p.longitude);
            bbox.min_y = bbox.min_y.min(p.latitude);
            bbox.max_x = bbox.max_x.max(p.longitude);
            bbox.max_y = bbox.max_y.max(p.latitude);
        }
        Some(bbox)
    }

    /// Width of the bounding box in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Center of the box.
    pub fn center(&self) -> Position {
        Position {
            latitude: (self.min_y + self.max_y) / 2.0,
            longitude: (self.min_x + self.max_x) / 2.0,
        }
    }

    /// Check if a position is contained within this bbox (edges inclusive).
    pub fn contains(&self, position: &Position) -> bool {
        position.longitude >= self.min_x
            && position.longitude <= self.max_x
            && position.latitude >= self.min_y
            && position.latitude <= self.max_y
    }
}
