//! Map synchronization engine.
//!
//! Owns one map surface and reconciles three independently refreshed inputs
//! onto it: balloon position markers, wind vector glyphs and the current
//! route overlay. Every element the engine draws is tracked by handle, so a
//! refresh never duplicates or leaks overlays and never touches elements it
//! did not create.

pub mod engine;
pub mod geojson;
pub mod glyph;
pub mod memory;
pub mod surface;

pub use engine::{EngineConfig, EngineStats, MapSyncEngine};
pub use glyph::WindGlyph;
pub use memory::MemorySurface;
pub use surface::{ElementId, MapSurface, MarkerStyle, OverlayElement, OverlayKind, Shape, Viewport};
