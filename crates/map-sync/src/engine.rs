//! Map synchronization engine.
//!
//! Reconciles balloon markers, wind glyphs and the route overlay onto the
//! surface it owns. After every refresh cycle the surface holds:
//!
//! - one marker per balloon sample with a valid position,
//! - one wind glyph per wind sample whose ordinal has such a balloon,
//! - at most one route overlay, matching the latest published route.
//!
//! The engine only removes elements it drew itself, found through its own
//! handle set rather than by inspecting the surface.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use router_client::RouteService;
use router_common::{BalloonSample, Position, Route, RouterError, RouterResult, WindSample};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::glyph::{WindGlyph, DEFAULT_GLYPH_SCALE, DEFAULT_HEAD_SIZE};
use crate::surface::{ElementId, MapSurface, MarkerStyle, OverlayElement, OverlayKind, Shape};

pub const DEFAULT_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const DEFAULT_TILE_ATTRIBUTION: &str = "© OpenStreetMap contributors";

const WIND_COLOR: &str = "red";
const WIND_WEIGHT: f32 = 5.0;
const ROUTE_COLOR: &str = "blue";
const ROUTE_WEIGHT: f32 = 3.0;

/// Engine settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Initial view center before any data arrives.
    pub center: Position,
    pub zoom: u8,
    /// Wind glyph shaft length, in coordinate degrees.
    pub wind_glyph_scale: f64,
    pub arrow_head_size: f64,
    pub tile_url: String,
    pub tile_attribution: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            // San Francisco
            center: Position {
                latitude: 37.7749,
                longitude: -122.4194,
            },
            zoom: 4,
            wind_glyph_scale: DEFAULT_GLYPH_SCALE,
            arrow_head_size: DEFAULT_HEAD_SIZE,
            tile_url: DEFAULT_TILE_URL.to_string(),
            tile_attribution: DEFAULT_TILE_ATTRIBUTION.to_string(),
        }
    }
}

/// One logical overlay and the surface elements that make it up.
#[derive(Debug)]
struct TrackedOverlay {
    kind: OverlayKind,
    elements: Vec<ElementId>,
}

/// Counters describing what the engine currently shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EngineStats {
    pub markers: usize,
    pub wind_glyphs: usize,
    pub route_overlays: usize,
    pub refresh_cycles: u64,
    pub last_snapshot_at: Option<DateTime<Utc>>,
    pub mounted: bool,
}

/// Keeps one map surface in sync with telemetry, wind and route inputs.
pub struct MapSyncEngine<S: MapSurface> {
    config: EngineConfig,
    surface: Option<S>,
    tracked: Vec<TrackedOverlay>,
    telemetry: Option<Vec<BalloonSample>>,
    wind: Option<Vec<WindSample>>,
    route: Option<Arc<Route>>,
    refresh_cycles: u64,
    last_snapshot_at: Option<DateTime<Utc>>,
    disposed: bool,
}

impl<S: MapSurface> MapSyncEngine<S> {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            surface: None,
            tracked: Vec::new(),
            telemetry: None,
            wind: None,
            route: None,
            refresh_cycles: 0,
            last_snapshot_at: None,
            disposed: false,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The owned surface, once mounted.
    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn is_mounted(&self) -> bool {
        self.surface.is_some()
    }

    /// Create the surface (first call only) and load the initial snapshots.
    ///
    /// A failed snapshot fetch is logged and does not fail the mount.
    pub async fn mount<F, R>(&mut self, create_surface: F, service: &R) -> RouterResult<()>
    where
        F: FnOnce() -> S,
        R: RouteService + ?Sized,
    {
        self.attach(create_surface)?;
        self.refresh_snapshots(service).await;
        Ok(())
    }

    /// Create the surface at the default view without fetching anything.
    ///
    /// Calling this again while mounted keeps the existing surface.
    pub fn attach<F>(&mut self, create_surface: F) -> RouterResult<()>
    where
        F: FnOnce() -> S,
    {
        if self.disposed {
            return Err(RouterError::SurfaceUnavailable(
                "engine has been disposed".to_string(),
            ));
        }
        if self.surface.is_some() {
            return Ok(());
        }

        let mut surface = create_surface();
        surface.set_view(self.config.center, self.config.zoom);
        // The tile layer belongs to the surface, not to the engine.
        surface.add(OverlayElement::tile_layer(
            self.config.tile_url.clone(),
            self.config.tile_attribution.clone(),
        ))?;
        self.surface = Some(surface);

        info!(
            latitude = self.config.center.latitude,
            longitude = self.config.center.longitude,
            zoom = self.config.zoom,
            "Mounted map surface"
        );

        self.reconcile()
    }

    /// Fetch telemetry then wind and apply both as one input change.
    ///
    /// Returns whether new snapshots were applied. On any fetch failure the
    /// current overlays are left as they are.
    pub async fn refresh_snapshots<R>(&mut self, service: &R) -> bool
    where
        R: RouteService + ?Sized,
    {
        let telemetry = match service.fetch_telemetry().await {
            Ok(samples) => samples,
            Err(e) => {
                warn!(error = %e, kind = e.kind(), "Telemetry fetch failed, keeping previous overlays");
                return false;
            }
        };
        let wind = match service.fetch_wind().await {
            Ok(samples) => samples,
            Err(e) => {
                warn!(error = %e, kind = e.kind(), "Wind fetch failed, keeping previous overlays");
                return false;
            }
        };

        self.telemetry = Some(telemetry);
        self.wind = Some(wind);
        self.last_snapshot_at = Some(Utc::now());

        match self.reconcile() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to draw snapshots");
                false
            }
        }
    }

    /// Replace the telemetry input and reconcile.
    pub fn set_telemetry(&mut self, samples: Vec<BalloonSample>) -> RouterResult<()> {
        self.telemetry = Some(samples);
        self.reconcile()
    }

    /// Replace the wind input and reconcile.
    pub fn set_wind(&mut self, samples: Vec<WindSample>) -> RouterResult<()> {
        self.wind = Some(samples);
        self.reconcile()
    }

    /// Replace the route input and reconcile.
    ///
    /// `None` leaves any route overlay already drawn in place.
    pub fn set_route(&mut self, route: Option<Arc<Route>>) -> RouterResult<()> {
        self.route = route;
        self.reconcile()
    }

    pub fn route(&self) -> Option<&Route> {
        self.route.as_deref()
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            markers: self.count(OverlayKind::Marker),
            wind_glyphs: self.count(OverlayKind::WindVector),
            route_overlays: self.count(OverlayKind::Route),
            refresh_cycles: self.refresh_cycles,
            last_snapshot_at: self.last_snapshot_at,
            mounted: self.surface.is_some(),
        }
    }

    fn count(&self, kind: OverlayKind) -> usize {
        self.tracked.iter().filter(|t| t.kind == kind).count()
    }

    /// Destroy the surface and release every tracked element.
    ///
    /// Idempotent, and safe to call on an engine that was never mounted.
    pub fn dispose(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            for overlay in self.tracked.drain(..) {
                for id in overlay.elements {
                    surface.remove(id);
                }
            }
            surface.destroy();
            info!(refresh_cycles = self.refresh_cycles, "Disposed map surface");
        }
        self.tracked.clear();
        self.disposed = true;
    }

    /// Run one refresh cycle against the current inputs.
    fn reconcile(&mut self) -> RouterResult<()> {
        let Some(surface) = self.surface.as_mut() else {
            return Ok(());
        };

        // Markers and wind glyphs are always rebuilt from scratch.
        let mut kept = Vec::with_capacity(self.tracked.len());
        for overlay in self.tracked.drain(..) {
            if overlay.kind == OverlayKind::Route {
                kept.push(overlay);
            } else {
                for id in overlay.elements {
                    surface.remove(id);
                }
            }
        }
        self.tracked = kept;

        if let Some(telemetry) = &self.telemetry {
            draw_markers(surface, telemetry, &mut self.tracked)?;

            if let Some(wind) = &self.wind {
                draw_wind(surface, telemetry, wind, &self.config, &mut self.tracked)?;
            }
        }

        if let Some(route) = &self.route {
            let previous: Vec<TrackedOverlay> = {
                let (route_overlays, rest) = self
                    .tracked
                    .drain(..)
                    .partition(|t| t.kind == OverlayKind::Route);
                self.tracked = rest;
                route_overlays
            };
            for overlay in previous {
                for id in overlay.elements {
                    surface.remove(id);
                }
            }
            draw_route(surface, route, &mut self.tracked)?;
        }

        self.refresh_cycles += 1;
        debug!(
            cycle = self.refresh_cycles,
            markers = self.count(OverlayKind::Marker),
            wind_glyphs = self.count(OverlayKind::WindVector),
            route_overlays = self.count(OverlayKind::Route),
            "Reconciled overlays"
        );
        Ok(())
    }
}

impl<S: MapSurface> Drop for MapSyncEngine<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn draw_markers<S: MapSurface>(
    surface: &mut S,
    telemetry: &[BalloonSample],
    tracked: &mut Vec<TrackedOverlay>,
) -> RouterResult<()> {
    for sample in telemetry {
        let Some(position) = sample.position else {
            continue;
        };
        let element = OverlayElement::new(
            OverlayKind::Marker,
            Shape::Marker {
                position,
                style: MarkerStyle::Balloon,
            },
        )
        .with_label(format!(
            "Balloon {}: {}, {}",
            sample.index, position.latitude, position.longitude
        ));
        let id = surface.add(element)?;
        tracked.push(TrackedOverlay {
            kind: OverlayKind::Marker,
            elements: vec![id],
        });
    }
    Ok(())
}

fn draw_wind<S: MapSurface>(
    surface: &mut S,
    telemetry: &[BalloonSample],
    wind: &[WindSample],
    config: &EngineConfig,
    tracked: &mut Vec<TrackedOverlay>,
) -> RouterResult<()> {
    // Alignment is purely by ordinal.
    let anchors: HashMap<usize, Position> = telemetry
        .iter()
        .filter_map(|s| s.position.map(|p| (s.index, p)))
        .collect();

    for sample in wind {
        let Some(origin) = anchors.get(&sample.index) else {
            continue;
        };
        let Some(glyph) =
            WindGlyph::new(*origin, sample, config.wind_glyph_scale, config.arrow_head_size)
        else {
            debug!(index = sample.index, "Skipping wind sample with non-finite values");
            continue;
        };

        let shaft = surface.add(
            OverlayElement::new(
                OverlayKind::WindVector,
                Shape::Polyline {
                    points: vec![glyph.origin, glyph.tip],
                    color: WIND_COLOR,
                    weight: WIND_WEIGHT,
                },
            )
            .with_label(glyph.label),
        )?;
        let head = surface.add(OverlayElement::new(
            OverlayKind::WindVector,
            Shape::Polygon {
                points: glyph.head.to_vec(),
                color: WIND_COLOR,
            },
        ))?;
        tracked.push(TrackedOverlay {
            kind: OverlayKind::WindVector,
            elements: vec![shaft, head],
        });
    }
    Ok(())
}

fn draw_route<S: MapSurface>(
    surface: &mut S,
    route: &Route,
    tracked: &mut Vec<TrackedOverlay>,
) -> RouterResult<()> {
    let (Some(start), Some(end), Some(bounds)) = (route.start(), route.end(), route.bounds())
    else {
        debug!("Published route is empty, nothing to draw");
        return Ok(());
    };

    let mut elements = Vec::with_capacity(3);
    elements.push(surface.add(OverlayElement::new(
        OverlayKind::Route,
        Shape::Polyline {
            points: route.coordinates().to_vec(),
            color: ROUTE_COLOR,
            weight: ROUTE_WEIGHT,
        },
    ))?);

    if route.len() == 1 {
        elements.push(surface.add(endpoint_marker(*start, MarkerStyle::StartEnd, "Start / End"))?);
    } else {
        elements.push(surface.add(endpoint_marker(*start, MarkerStyle::Start, "Start"))?);
        elements.push(surface.add(endpoint_marker(*end, MarkerStyle::End, "End"))?);
    }

    surface.fit_bounds(bounds);
    tracked.push(TrackedOverlay {
        kind: OverlayKind::Route,
        elements,
    });
    Ok(())
}

fn endpoint_marker(position: Position, style: MarkerStyle, name: &str) -> OverlayElement {
    OverlayElement::new(OverlayKind::Route, Shape::Marker { position, style }).with_label(format!(
        "{}: {:.6}, {:.6}",
        name, position.latitude, position.longitude
    ))
}
