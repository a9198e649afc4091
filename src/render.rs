//! Screen-space primitives drawn for each ship.
//!
//! The overlay does not draw anything itself. It drives a [`RenderBackend`]
//! through create/update/dispose calls and keeps, per ship, a [`ShipVisuals`]
//! triple of icon, marker and label. [`RetainedBackend`] is an in-memory
//! backend that records primitive state; the replay tool and the tests use
//! it in place of a window.

use glam::Vec2;
use hashbrown::HashMap;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::crew::Rgb;
use crate::names::ShipClass;
use crate::{ICON_OFFSET_FACTOR, LABEL_DROP_Y, LABEL_GAP_X};

/// Backend-assigned handle of one primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimitiveId(pub u64);

/// Handle of an icon image loaded by the backend at start-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IconHandle(pub u32);

/// Icon images shared by every ship, one per class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconSet {
    /// Sloop icon.
    pub sloop: IconHandle,
    /// Brigantine icon.
    pub brigantine: IconHandle,
    /// Galleon icon.
    pub galleon: IconHandle,
}

impl IconSet {
    /// Picks the icon drawn for `class`.
    #[must_use]
    pub const fn for_class(&self, class: ShipClass) -> IconHandle {
        match class {
            ShipClass::Sloop => self.sloop,
            ShipClass::Brigantine => self.brigantine,
            ShipClass::Galleon => self.galleon,
        }
    }
}

impl Default for IconSet {
    fn default() -> Self {
        Self {
            sloop: IconHandle(0),
            brigantine: IconHandle(1),
            galleon: IconHandle(2),
        }
    }
}

/// Sink for primitive operations.
///
/// Create calls return the handle later operations refer to. No other value
/// flows back into the overlay.
pub trait RenderBackend {
    /// Creates an icon sprite at `position`.
    fn create_icon(&mut self, icon: IconHandle, position: Vec2) -> PrimitiveId;
    /// Creates a circular marker with its bounding box corner at `position`.
    fn create_marker(&mut self, position: Vec2, diameter: f32, color: Rgb) -> PrimitiveId;
    /// Creates a text label at `position`.
    fn create_label(&mut self, text: &str, position: Vec2) -> PrimitiveId;
    /// Moves a primitive.
    fn set_position(&mut self, id: PrimitiveId, position: Vec2);
    /// Shows or hides a primitive.
    fn set_visible(&mut self, id: PrimitiveId, visible: bool);
    /// Replaces a label's text.
    fn set_text(&mut self, id: PrimitiveId, text: &str);
    /// Recolours a primitive.
    fn set_color(&mut self, id: PrimitiveId, color: Rgb);
    /// Releases a primitive. The handle must not be used afterwards.
    fn dispose(&mut self, id: PrimitiveId);
}

/// Positions of a ship's three primitives for one screen point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Icon position, up and left of the point.
    pub icon: Vec2,
    /// Marker position; the marker is centred on the point.
    pub marker: Vec2,
    /// Label position, right of the marker.
    pub label: Vec2,
}

impl Placement {
    /// Lays the primitives out around `screen`.
    ///
    /// # Examples
    /// ```
    /// use glam::Vec2;
    /// use ship_overlay::render::Placement;
    /// let placement = Placement::around(Vec2::new(500.0, 400.0), 25.0);
    /// assert_eq!(placement.marker, Vec2::new(487.5, 387.5));
    /// assert_eq!(placement.label, Vec2::new(522.5, 382.5));
    /// ```
    #[must_use]
    pub fn around(screen: Vec2, marker_size: f32) -> Self {
        let half = marker_size / 2.0;
        Self {
            icon: screen - Vec2::splat(marker_size * ICON_OFFSET_FACTOR),
            marker: screen - Vec2::splat(half),
            label: screen + Vec2::new(half + LABEL_GAP_X, half - LABEL_DROP_Y),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Slot {
    id: PrimitiveId,
    position: Vec2,
}

impl Slot {
    fn move_to(&mut self, backend: &mut dyn RenderBackend, position: Vec2) {
        if self.position != position {
            backend.set_position(self.id, position);
            self.position = position;
        }
    }
}

/// Icon, marker and label owned by exactly one ship.
///
/// The triple mirrors what it last sent to the backend and skips writes that
/// would not change anything. Visibility is only ever changed for all three
/// primitives at once. [`ShipVisuals::dispose`] consumes the triple, so a
/// disposed handle cannot be reached again.
#[derive(Debug, PartialEq)]
pub struct ShipVisuals {
    icon: Slot,
    marker: Slot,
    label: Slot,
    text: String,
    color: Rgb,
    visible: bool,
}

impl ShipVisuals {
    /// Creates the three primitives hidden at `screen` (or the origin).
    pub fn create(
        backend: &mut dyn RenderBackend,
        icon: IconHandle,
        text: String,
        color: Rgb,
        marker_size: f32,
        screen: Option<Vec2>,
    ) -> Self {
        let placement = Placement::around(screen.unwrap_or(Vec2::ZERO), marker_size);
        let at_origin = screen.is_none();
        let spot = |position: Vec2| if at_origin { Vec2::ZERO } else { position };

        let icon_slot = Slot {
            id: backend.create_icon(icon, spot(placement.icon)),
            position: spot(placement.icon),
        };
        let marker_slot = Slot {
            id: backend.create_marker(spot(placement.marker), marker_size, color),
            position: spot(placement.marker),
        };
        let label_slot = Slot {
            id: backend.create_label(&text, spot(placement.label)),
            position: spot(placement.label),
        };
        for id in [icon_slot.id, marker_slot.id, label_slot.id] {
            backend.set_visible(id, false);
        }

        Self {
            icon: icon_slot,
            marker: marker_slot,
            label: label_slot,
            text,
            color,
            visible: false,
        }
    }

    /// Moves all three primitives to their places around `screen`.
    pub fn place(&mut self, backend: &mut dyn RenderBackend, screen: Vec2, marker_size: f32) {
        let placement = Placement::around(screen, marker_size);
        self.marker.move_to(backend, placement.marker);
        self.icon.move_to(backend, placement.icon);
        self.label.move_to(backend, placement.label);
    }

    /// Replaces the label text.
    pub fn set_text(&mut self, backend: &mut dyn RenderBackend, text: &str) {
        if self.text != text {
            backend.set_text(self.label.id, text);
            text.clone_into(&mut self.text);
        }
    }

    /// Recolours the marker.
    pub fn set_color(&mut self, backend: &mut dyn RenderBackend, color: Rgb) {
        if self.color != color {
            backend.set_color(self.marker.id, color);
            self.color = color;
        }
    }

    /// Shows or hides all three primitives together.
    pub fn set_visible(&mut self, backend: &mut dyn RenderBackend, visible: bool) {
        if self.visible != visible {
            for id in self.ids() {
                backend.set_visible(id, visible);
            }
            self.visible = visible;
        }
    }

    /// Releases all three primitives.
    pub fn dispose(self, backend: &mut dyn RenderBackend) {
        for id in self.ids() {
            backend.dispose(id);
        }
    }

    /// Handles of the icon, marker and label, in that order.
    #[must_use]
    pub const fn ids(&self) -> [PrimitiveId; 3] {
        [self.icon.id, self.marker.id, self.label.id]
    }

    /// Whether the triple is currently shown.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Last position sent for the icon.
    #[must_use]
    pub const fn icon_position(&self) -> Vec2 {
        self.icon.position
    }

    /// Last position sent for the marker.
    #[must_use]
    pub const fn marker_position(&self) -> Vec2 {
        self.marker.position
    }

    /// Last position sent for the label.
    #[must_use]
    pub const fn label_position(&self) -> Vec2 {
        self.label.position
    }

    /// Current label text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Current marker colour.
    #[must_use]
    pub const fn color(&self) -> Rgb {
        self.color
    }
}

/// Kind of a retained primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimitiveKind {
    /// Icon sprite and its image.
    Icon(IconHandle),
    /// Circular marker and its diameter.
    Marker(f32),
    /// Text label.
    Label,
}

/// State of one primitive held by [`RetainedBackend`].
#[derive(Debug, Clone, PartialEq)]
pub struct RetainedPrimitive {
    /// What the primitive is.
    pub kind: PrimitiveKind,
    /// Current position.
    pub position: Vec2,
    /// Whether the primitive is drawn.
    pub visible: bool,
    /// Label text; empty for other kinds.
    pub text: String,
    /// Colour, when one was assigned.
    pub color: Option<Rgb>,
}

/// Backend that keeps primitive state in memory instead of drawing it.
///
/// Operations on unknown or disposed handles are logged and counted rather
/// than applied.
#[derive(Debug, Default)]
pub struct RetainedBackend {
    primitives: HashMap<PrimitiveId, RetainedPrimitive>,
    next_id: u64,
    created: usize,
    disposed: usize,
    writes: usize,
    rejected: usize,
}

impl RetainedBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, primitive: RetainedPrimitive) -> PrimitiveId {
        let id = PrimitiveId(self.next_id);
        self.next_id += 1;
        self.created += 1;
        self.primitives.insert(id, primitive);
        id
    }

    fn modify(&mut self, id: PrimitiveId, op: &str, apply: impl FnOnce(&mut RetainedPrimitive)) {
        if let Some(primitive) = self.primitives.get_mut(&id) {
            apply(primitive);
            self.writes += 1;
        } else {
            warn!("{op} on unknown primitive {id:?}");
            self.rejected += 1;
        }
    }

    /// Returns the live primitive behind `id`.
    #[must_use]
    pub fn get(&self, id: PrimitiveId) -> Option<&RetainedPrimitive> {
        self.primitives.get(&id)
    }

    /// Number of primitives not yet disposed.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.primitives.len()
    }

    /// Number of live primitives currently drawn.
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.primitives.values().filter(|p| p.visible).count()
    }

    /// Total primitives ever created.
    #[must_use]
    pub const fn created_count(&self) -> usize {
        self.created
    }

    /// Total primitives disposed.
    #[must_use]
    pub const fn disposed_count(&self) -> usize {
        self.disposed
    }

    /// Update operations applied to live primitives.
    #[must_use]
    pub const fn write_count(&self) -> usize {
        self.writes
    }

    /// Operations that named an unknown or disposed primitive.
    #[must_use]
    pub const fn rejected_count(&self) -> usize {
        self.rejected
    }
}

impl RenderBackend for RetainedBackend {
    fn create_icon(&mut self, icon: IconHandle, position: Vec2) -> PrimitiveId {
        self.insert(RetainedPrimitive {
            kind: PrimitiveKind::Icon(icon),
            position,
            visible: true,
            text: String::new(),
            color: None,
        })
    }

    fn create_marker(&mut self, position: Vec2, diameter: f32, color: Rgb) -> PrimitiveId {
        self.insert(RetainedPrimitive {
            kind: PrimitiveKind::Marker(diameter),
            position,
            visible: true,
            text: String::new(),
            color: Some(color),
        })
    }

    fn create_label(&mut self, text: &str, position: Vec2) -> PrimitiveId {
        self.insert(RetainedPrimitive {
            kind: PrimitiveKind::Label,
            position,
            visible: true,
            text: text.to_owned(),
            color: None,
        })
    }

    fn set_position(&mut self, id: PrimitiveId, position: Vec2) {
        self.modify(id, "set_position", |p| p.position = position);
    }

    fn set_visible(&mut self, id: PrimitiveId, visible: bool) {
        self.modify(id, "set_visible", |p| p.visible = visible);
    }

    fn set_text(&mut self, id: PrimitiveId, text: &str) {
        self.modify(id, "set_text", |p| text.clone_into(&mut p.text));
    }

    fn set_color(&mut self, id: PrimitiveId, color: Rgb) {
        self.modify(id, "set_color", |p| p.color = Some(color));
    }

    fn dispose(&mut self, id: PrimitiveId) {
        if self.primitives.remove(&id).is_some() {
            self.disposed += 1;
        } else {
            warn!("dispose of unknown primitive {id:?}");
            self.rejected += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn visuals(backend: &mut RetainedBackend, screen: Option<Vec2>) -> ShipVisuals {
        ShipVisuals::create(
            backend,
            IconHandle(3),
            "Sloop (Near) - 0m".to_owned(),
            Rgb::WHITE,
            25.0,
            screen,
        )
    }

    #[test]
    fn icon_sits_up_left_by_marker_multiple() {
        let placement = Placement::around(Vec2::new(100.0, 100.0), 25.0);
        assert_relative_eq!(placement.icon.x, 63.75);
        assert_relative_eq!(placement.icon.y, 63.75);
    }

    #[test]
    fn creation_yields_three_hidden_primitives() {
        let mut backend = RetainedBackend::new();
        let created = visuals(&mut backend, Some(Vec2::new(500.0, 400.0)));

        assert_eq!(backend.live_count(), 3);
        assert_eq!(backend.visible_count(), 0);
        assert!(!created.is_visible());
        assert_eq!(created.marker_position(), Vec2::new(487.5, 387.5));
    }

    #[test]
    fn offscreen_creation_parks_at_origin() {
        let mut backend = RetainedBackend::new();
        let created = visuals(&mut backend, None);

        for id in created.ids() {
            let primitive = backend.get(id).expect("primitive should be live");
            assert_eq!(primitive.position, Vec2::ZERO);
        }
    }

    #[test]
    fn visibility_toggles_all_three() {
        let mut backend = RetainedBackend::new();
        let mut triple = visuals(&mut backend, None);

        triple.set_visible(&mut backend, true);
        assert_eq!(backend.visible_count(), 3);
        triple.set_visible(&mut backend, false);
        assert_eq!(backend.visible_count(), 0);
    }

    #[test]
    fn unchanged_writes_are_skipped() {
        let mut backend = RetainedBackend::new();
        let mut triple = visuals(&mut backend, None);
        let screen = Vec2::new(300.0, 200.0);

        triple.place(&mut backend, screen, 25.0);
        triple.set_text(&mut backend, "Sloop (Near) - 5m");
        triple.set_color(&mut backend, Rgb::new(1, 2, 3));
        let writes = backend.write_count();

        triple.place(&mut backend, screen, 25.0);
        triple.set_text(&mut backend, "Sloop (Near) - 5m");
        triple.set_color(&mut backend, Rgb::new(1, 2, 3));
        assert_eq!(backend.write_count(), writes);
    }

    #[test]
    fn dispose_releases_every_primitive_once() {
        let mut backend = RetainedBackend::new();
        let triple = visuals(&mut backend, None);

        triple.dispose(&mut backend);
        assert_eq!(backend.live_count(), 0);
        assert_eq!(backend.disposed_count(), 3);
        assert_eq!(backend.rejected_count(), 0);
    }

    #[test]
    fn retained_backend_rejects_stale_handles() {
        let mut backend = RetainedBackend::new();
        let id = backend.create_label("x", Vec2::ZERO);
        backend.dispose(id);
        backend.set_text(id, "y");
        backend.dispose(id);

        assert_eq!(backend.rejected_count(), 2);
    }

    #[test]
    fn icon_set_picks_by_class() {
        let icons = IconSet::default();
        assert_eq!(icons.for_class(ShipClass::Galleon), IconHandle(2));
        assert_eq!(icons.for_class(ShipClass::Sloop), IconHandle(0));
    }
}
