//! The map surface abstraction.

use std::fmt;

use router_common::{BoundingBox, Position, RouterResult};
use serde::Serialize;

/// Opaque handle to an element drawn on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "el-{}", self.0)
    }
}

/// Category tag of an overlay element owned by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlayKind {
    Marker,
    WindVector,
    Route,
}

impl OverlayKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverlayKind::Marker => "marker",
            OverlayKind::WindVector => "wind-vector",
            OverlayKind::Route => "route",
        }
    }
}

/// Visual variant of a point marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerStyle {
    Balloon,
    Start,
    End,
    /// Start and end of a single-point route.
    StartEnd,
}

/// Geometry and styling of a surface element.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Base raster layer. Never owned by the engine.
    TileLayer {
        url_template: String,
        attribution: String,
    },
    Marker {
        position: Position,
        style: MarkerStyle,
    },
    Polyline {
        points: Vec<Position>,
        color: &'static str,
        weight: f32,
    },
    Polygon {
        points: Vec<Position>,
        color: &'static str,
    },
}

/// An element to be drawn, with its category and popup label.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayElement {
    /// `None` for elements the engine does not own (tile layers).
    pub kind: Option<OverlayKind>,
    pub shape: Shape,
    pub label: Option<String>,
}

impl OverlayElement {
    pub fn new(kind: OverlayKind, shape: Shape) -> Self {
        Self {
            kind: Some(kind),
            shape,
            label: None,
        }
    }

    pub fn tile_layer(url_template: impl Into<String>, attribution: impl Into<String>) -> Self {
        Self {
            kind: None,
            shape: Shape::TileLayer {
                url_template: url_template.into(),
                attribution: attribution.into(),
            },
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// What the surface currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Viewport {
    Center { center: Position, zoom: u8 },
    Bounds { bounds: BoundingBox },
}

/// A mutable drawing surface holding overlay elements.
///
/// Implementations only need to draw and forget; the engine keeps track of
/// which handles it owns.
pub trait MapSurface {
    /// Draw an element and return its handle.
    fn add(&mut self, element: OverlayElement) -> RouterResult<ElementId>;

    /// Remove an element. Returns false if the handle was unknown.
    fn remove(&mut self, id: ElementId) -> bool;

    fn set_view(&mut self, center: Position, zoom: u8);

    /// Adjust the view so `bounds` is fully visible.
    fn fit_bounds(&mut self, bounds: BoundingBox);

    /// Release the surface. Later `add` calls fail.
    fn destroy(&mut self);
}
