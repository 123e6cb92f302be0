//! Wind vector glyph geometry.
//!
//! A glyph is a straight shaft from the balloon position plus a small
//! triangular head at the tip. Direction is taken in degrees clockwise from
//! north, so the shaft runs `cos(angle)` along latitude and `sin(angle)` along
//! longitude.
//!
//! The shaft length is a fixed offset in coordinate degrees, not a distance:
//! glyphs look stretched east-west at high latitudes. This is a visual scale
//! only.

use router_common::{Position, WindSample};

/// Shaft length in coordinate degrees.
pub const DEFAULT_GLYPH_SCALE: f64 = 0.5;

/// Offset of the arrow head corners from the tip, in coordinate degrees.
pub const DEFAULT_HEAD_SIZE: f64 = 0.001;

/// Geometry and label of one wind vector.
#[derive(Debug, Clone, PartialEq)]
pub struct WindGlyph {
    pub origin: Position,
    pub tip: Position,
    /// Triangle: tip, then the two back corners.
    pub head: [Position; 3],
    pub label: String,
}

impl WindGlyph {
    /// Build the glyph for `wind` anchored at `origin`.
    ///
    /// Returns `None` when the wind sample has a non-finite speed or
    /// direction.
    pub fn new(origin: Position, wind: &WindSample, scale: f64, head_size: f64) -> Option<Self> {
        if !wind.speed.is_finite() || !wind.direction.is_finite() {
            return None;
        }

        let angle = wind.direction.to_radians();
        let tip = offset(
            origin,
            angle.cos() * scale,
            angle.sin() * scale,
        );
        let head = [
            tip,
            offset(tip, -head_size, -head_size),
            offset(tip, -head_size, head_size),
        ];

        Some(Self {
            origin,
            tip,
            head,
            label: wind_label(wind),
        })
    }
}

/// Popup text for a wind sample.
pub fn wind_label(wind: &WindSample) -> String {
    format!(
        "Wind Speed: {:.2} m/s\nDirection: {:.2}°",
        wind.speed, wind.direction
    )
}

/// Shift a position by raw degree offsets, clamped to valid coordinates.
fn offset(origin: Position, d_lat: f64, d_lon: f64) -> Position {
    Position {
        latitude: (origin.latitude + d_lat).clamp(-90.0, 90.0),
        longitude: (origin.longitude + d_lon).clamp(-180.0, 180.0),
    }
}
