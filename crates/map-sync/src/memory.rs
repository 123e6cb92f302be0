//! Retained in-memory surface.
//!
//! `MemorySurface` is a cheap handle: clones share the same scene, so a caller
//! can hand one clone to the engine and keep another to inspect or export what
//! is drawn.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use router_common::{BoundingBox, Position, RouterError, RouterResult};
use tracing::debug;

use crate::geojson::{Feature, FeatureCollection};
use crate::surface::{ElementId, MapSurface, OverlayElement, OverlayKind, Shape, Viewport};

#[derive(Debug, Default)]
struct Scene {
    /// Keyed by id; ids are allocated increasing so iteration is insertion order.
    elements: BTreeMap<ElementId, OverlayElement>,
    next_id: u64,
    viewport: Option<Viewport>,
    destroyed: bool,
}

/// Surface that keeps every element in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    scene: Arc<Mutex<Scene>>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn scene(&self) -> MutexGuard<'_, Scene> {
        self.scene.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of elements currently drawn, tile layers included.
    pub fn len(&self) -> usize {
        self.scene().elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scene().elements.is_empty()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.scene().elements.contains_key(&id)
    }

    /// Snapshot of all elements in drawing order.
    pub fn elements(&self) -> Vec<(ElementId, OverlayElement)> {
        self.scene()
            .elements
            .iter()
            .map(|(id, el)| (*id, el.clone()))
            .collect()
    }

    /// Elements tagged with `kind`, in drawing order.
    pub fn elements_of(&self, kind: OverlayKind) -> Vec<OverlayElement> {
        self.scene()
            .elements
            .values()
            .filter(|el| el.kind == Some(kind))
            .cloned()
            .collect()
    }

    /// Count of elements tagged with `kind`.
    pub fn count(&self, kind: OverlayKind) -> usize {
        self.scene()
            .elements
            .values()
            .filter(|el| el.kind == Some(kind))
            .count()
    }

    /// Number of base tile layers drawn.
    pub fn tile_layers(&self) -> usize {
        self.scene()
            .elements
            .values()
            .filter(|el| matches!(el.shape, Shape::TileLayer { .. }))
            .count()
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.scene().viewport
    }

    pub fn is_destroyed(&self) -> bool {
        self.scene().destroyed
    }

    /// Export the drawn overlays as a GeoJSON FeatureCollection.
    pub fn to_geojson(&self) -> FeatureCollection {
        let scene = self.scene();
        let features = scene
            .elements
            .iter()
            .filter_map(|(id, el)| Feature::from_element(*id, el))
            .collect();

        let mut collection = FeatureCollection::new();
        if let Some(Viewport::Bounds { bounds }) = scene.viewport {
            collection = collection.with_bbox(&bounds);
        }
        collection.features = features;
        collection
    }
}

impl MapSurface for MemorySurface {
    fn add(&mut self, element: OverlayElement) -> RouterResult<ElementId> {
        let mut scene = self.scene();
        if scene.destroyed {
            return Err(RouterError::SurfaceUnavailable(
                "surface has been destroyed".to_string(),
            ));
        }
        let id = ElementId(scene.next_id);
        scene.next_id += 1;
        scene.elements.insert(id, element);
        Ok(id)
    }

    fn remove(&mut self, id: ElementId) -> bool {
        self.scene().elements.remove(&id).is_some()
    }

    fn set_view(&mut self, center: Position, zoom: u8) {
        let mut scene = self.scene();
        if !scene.destroyed {
            scene.viewport = Some(Viewport::Center { center, zoom });
        }
    }

    fn fit_bounds(&mut self, bounds: BoundingBox) {
        let mut scene = self.scene();
        if !scene.destroyed {
            scene.viewport = Some(Viewport::Bounds { bounds });
        }
    }

    fn destroy(&mut self) {
        let mut scene = self.scene();
        if !scene.destroyed {
            debug!(elements = scene.elements.len(), "Destroying memory surface");
            scene.elements.clear();
            scene.viewport = None;
            scene.destroyed = true;
        }
    }
}
