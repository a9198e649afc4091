//! Overlay layout and switching constants used across the tracker.
//!
//! Values marked as defaults can be overridden through
//! [`OverlayConfig`](crate::config::OverlayConfig); the remainder are fixed
//! by the screen-space layout of a ship's visuals.

/// Distance at which a ship's near actor hands over to its far actor.
pub const NEAR_FAR_THRESHOLD: f32 = 1750.0;
/// Default diameter of the ship marker in pixels.
pub const MARKER_SIZE: f32 = 25.0;
/// Icon offset from the screen point, as a multiple of the marker size.
pub const ICON_OFFSET_FACTOR: f32 = 1.45;
/// Horizontal gap between the marker edge and the label.
pub const LABEL_GAP_X: f32 = 10.0;
/// Vertical drop of the label below the marker's top edge.
pub const LABEL_DROP_Y: f32 = 30.0;
/// Default marker colour when a ship's crew is unknown.
pub const DEFAULT_MARKER_COLOR: [u8; 3] = [255, 255, 255];
/// Camera-space depth below which a point counts as behind the viewer.
pub const MIN_PROJECTION_DEPTH: f32 = 0.1;
