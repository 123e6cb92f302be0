//! GeoJSON export of surface contents.
//!
//! Coordinates are written in GeoJSON order, `[longitude, latitude]`.

use router_common::{BoundingBox, Position};
use serde::Serialize;

use crate::surface::{ElementId, MarkerStyle, OverlayElement, Shape};

/// A GeoJSON FeatureCollection.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeatureCollection {
    /// Type identifier (always "FeatureCollection").
    #[serde(rename = "type")]
    pub type_: String,

    /// `[min_lon, min_lat, max_lon, max_lat]` of the fitted view, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f64; 4]>,

    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self {
            type_: "FeatureCollection".to_string(),
            bbox: None,
            features: Vec::new(),
        }
    }

    pub fn with_bbox(mut self, bounds: &BoundingBox) -> Self {
        self.bbox = Some([bounds.min_x, bounds.min_y, bounds.max_x, bounds.max_y]);
        self
    }
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::new()
    }
}

/// A GeoJSON Feature.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Feature {
    /// Type identifier (always "Feature").
    #[serde(rename = "type")]
    pub type_: String,
    pub id: String,
    pub geometry: Geometry,
    pub properties: Properties,
}

impl Feature {
    /// Convert a drawn element. Tile layers have no geometry and yield `None`.
    pub fn from_element(id: ElementId, element: &OverlayElement) -> Option<Self> {
        let (geometry, marker, color) = match &element.shape {
            Shape::TileLayer { .. } => return None,
            Shape::Marker { position, style } => (Geometry::point(position), Some(*style), None),
            Shape::Polyline { points, color, .. } => {
                (Geometry::line_string(points), None, Some(*color))
            }
            Shape::Polygon { points, color } => (Geometry::polygon(points), None, Some(*color)),
        };

        Some(Self {
            type_: "Feature".to_string(),
            id: id.to_string(),
            geometry,
            properties: Properties {
                category: element.kind.map(|k| k.as_str()),
                label: element.label.clone(),
                marker,
                color,
            },
        })
    }
}

/// GeoJSON geometry types used by overlays.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: [f64; 2] },
    LineString { coordinates: Vec<[f64; 2]> },
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
}

impl Geometry {
    pub fn point(position: &Position) -> Self {
        Geometry::Point {
            coordinates: lon_lat(position),
        }
    }

    pub fn line_string(points: &[Position]) -> Self {
        Geometry::LineString {
            coordinates: points.iter().map(lon_lat).collect(),
        }
    }

    /// Single-ring polygon; the ring is closed if it is not already.
    pub fn polygon(points: &[Position]) -> Self {
        let mut ring: Vec<[f64; 2]> = points.iter().map(lon_lat).collect();
        if let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied()) {
            if first != last {
                ring.push(first);
            }
        }
        Geometry::Polygon {
            coordinates: vec![ring],
        }
    }
}

/// Feature properties carried over from the overlay element.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Properties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<MarkerStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
}

fn lon_lat(position: &Position) -> [f64; 2] {
    [position.longitude, position.latitude]
}
