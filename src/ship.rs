//! Per-ship lifecycle and frame update.
//!
//! A [`TrackedShip`] mirrors one ship actor living in another process. Every
//! frame it:
//!
//! 1. re-reads the identity token at its base address and retires itself if
//!    the address now holds a different actor (or nothing readable);
//! 2. reads the world position and measures the distance to the viewer;
//! 3. projects the position to the screen, hiding its visuals when off
//!    screen;
//! 4. decides whether this actor or its near/far twin should be drawn;
//! 5. moves, relabels and recolours its icon, marker and label.
//!
//! Nothing in an update returns an error. Unreadable identity retires the
//! record; an unreadable position hides it for the frame.

use glam::{Vec2, Vec3};
use log::debug;

use crate::config::{MemoryLayout, OverlayConfig, PositionHandlePolicy};
use crate::crew::{CrewId, CrewRegistry};
use crate::error::SpawnError;
use crate::geometry::{project_to_screen, world_distance, ViewerCoords};
use crate::memory::{Address, MemoryReader};
use crate::names::{ShipClass, ShipDescriptor, ShipNames, ShipVariant};
use crate::render::{IconSet, RenderBackend, ShipVisuals};
use crate::resolve::{
    read_world_position, resolve_crew, resolve_identity, resolve_position_component, ActorId,
};

/// An actor reported by the registry's scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorSighting {
    /// Identity token read during the scan.
    pub actor_id: ActorId,
    /// Actor base address.
    pub address: Address,
    /// Raw kind label.
    pub raw_kind: String,
}

/// Collaborators borrowed for one frame.
pub struct FrameContext<'a> {
    /// Reader over the external process.
    pub memory: &'a dyn MemoryReader,
    /// Live crew colours.
    pub crews: &'a dyn CrewRegistry,
    /// Primitive sink.
    pub backend: &'a mut dyn RenderBackend,
    /// Overlay settings.
    pub config: &'a OverlayConfig,
}

/// Why a live ship is not drawn this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HideReason {
    /// The ship projects outside the viewport or behind the viewer.
    OffScreen,
    /// The ship's near/far twin is the one drawn at this distance.
    OtherVariant,
    /// The ship's position could not be read this frame.
    PositionUnavailable,
}

/// Result of one [`TrackedShip::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateOutcome {
    /// All three visuals are shown.
    Visible,
    /// All three visuals are hidden.
    Hidden(HideReason),
    /// The record is dead and its visuals are disposed.
    Removed,
}

/// One ship actor mirrored onto the overlay.
#[derive(Debug)]
pub struct TrackedShip {
    identity: ActorId,
    base_address: Address,
    position_component: Address,
    raw_kind: String,
    descriptor: ShipDescriptor,
    world_coords: Vec3,
    distance: f32,
    screen_coords: Option<Vec2>,
    crew: Option<CrewId>,
    visuals: Option<ShipVisuals>,
    marked_for_removal: bool,
}

impl TrackedShip {
    /// Resolves a sighted actor and creates its visuals.
    ///
    /// The name, class, variant, crew and position component are resolved
    /// here once. The visuals are created hidden and then synchronised with
    /// the ship's first position, so they are already correct for `viewer`.
    ///
    /// # Errors
    /// Returns [`SpawnError::UnknownKind`] when `names` does not know the
    /// actor's kind, and [`SpawnError::Access`] when its position cannot be
    /// read.
    pub fn spawn(
        sighting: ActorSighting,
        names: &dyn ShipNames,
        icons: &IconSet,
        viewer: &ViewerCoords,
        ctx: &mut FrameContext<'_>,
    ) -> Result<Self, SpawnError> {
        let ActorSighting {
            actor_id,
            address,
            raw_kind,
        } = sighting;
        let layout = &ctx.config.layout;

        let Some(descriptor) = names.lookup(&raw_kind) else {
            return Err(SpawnError::UnknownKind(raw_kind));
        };
        let position_component = resolve_position_component(ctx.memory, address, layout)?;
        let world_coords = read_world_position(ctx.memory, position_component, layout)?;
        let crew = resolve_crew(ctx.memory, address, layout)
            .inspect_err(|err| debug!("{actor_id} at {address}: no crew ({err})"))
            .ok()
            .flatten();

        let distance = world_distance(world_coords, viewer.location);
        let screen_coords = project_to_screen(viewer, world_coords);
        let visuals = ShipVisuals::create(
            ctx.backend,
            icons.for_class(descriptor.class),
            label_text(&descriptor.display_name, distance),
            ctx.config.default_marker_color,
            ctx.config.marker_size,
            screen_coords,
        );
        debug!(
            "tracking {actor_id} `{}` at {address} ({:?}, {:?})",
            descriptor.display_name, descriptor.class, descriptor.variant
        );

        let mut ship = Self {
            identity: actor_id,
            base_address: address,
            position_component,
            raw_kind,
            descriptor,
            world_coords,
            distance,
            screen_coords,
            crew,
            visuals: Some(visuals),
            marked_for_removal: false,
        };
        ship.sync_visuals(ctx.crews, ctx.backend, ctx.config);
        Ok(ship)
    }

    /// Refreshes the ship for a new frame.
    ///
    /// Once an update returns [`UpdateOutcome::Removed`] every later call
    /// returns it too without reading memory or touching the backend.
    pub fn update(&mut self, viewer: &ViewerCoords, ctx: &mut FrameContext<'_>) -> UpdateOutcome {
        if self.marked_for_removal {
            return UpdateOutcome::Removed;
        }

        let layout = &ctx.config.layout;
        match resolve_identity(ctx.memory, self.base_address, layout) {
            Ok(current) if current == self.identity => {}
            Ok(current) => {
                debug!(
                    "{} at {} replaced by {current}; retiring",
                    self.identity, self.base_address
                );
                self.retire(ctx.backend);
                return UpdateOutcome::Removed;
            }
            Err(err) => {
                debug!(
                    "{} at {} unreadable ({err}); retiring",
                    self.identity, self.base_address
                );
                self.retire(ctx.backend);
                return UpdateOutcome::Removed;
            }
        }

        let Some(world) = self.read_position(ctx.memory, ctx.config) else {
            self.screen_coords = None;
            if let Some(visuals) = self.visuals.as_mut() {
                visuals.set_visible(ctx.backend, false);
            }
            return UpdateOutcome::Hidden(HideReason::PositionUnavailable);
        };
        self.world_coords = world;
        self.distance = world_distance(world, viewer.location);
        self.screen_coords = project_to_screen(viewer, world);
        self.sync_visuals(ctx.crews, ctx.backend, ctx.config)
    }

    /// Releases the ship's visuals.
    ///
    /// Consumes the record; the caller must not keep any other reference to
    /// it. Visuals already released by a retiring update are not released
    /// again.
    pub fn dispose(self, backend: &mut dyn RenderBackend) {
        if let Some(visuals) = self.visuals {
            visuals.dispose(backend);
        }
    }

    fn retire(&mut self, backend: &mut dyn RenderBackend) {
        self.marked_for_removal = true;
        self.screen_coords = None;
        if let Some(visuals) = self.visuals.take() {
            visuals.dispose(backend);
        }
    }

    fn read_position(&mut self, memory: &dyn MemoryReader, config: &OverlayConfig) -> Option<Vec3> {
        let layout = &config.layout;
        if config.position_policy == PositionHandlePolicy::EveryFrame {
            self.re_resolve_component(memory, layout)?;
        }

        match read_world_position(memory, self.position_component, layout) {
            Ok(world) => Some(world),
            Err(err) if config.position_policy == PositionHandlePolicy::ReResolveOnFailure => {
                debug!(
                    "{} position unreadable at {} ({err}); re-resolving",
                    self.identity, self.position_component
                );
                self.re_resolve_component(memory, layout)?;
                let identity = self.identity;
                read_world_position(memory, self.position_component, layout)
                    .inspect_err(|retry| debug!("{identity} position still unreadable ({retry})"))
                    .ok()
            }
            Err(err) => {
                debug!("{} position unreadable ({err})", self.identity);
                None
            }
        }
    }

    fn re_resolve_component(
        &mut self,
        memory: &dyn MemoryReader,
        layout: &MemoryLayout,
    ) -> Option<()> {
        let component = resolve_position_component(memory, self.base_address, layout)
            .inspect_err(|err| debug!("{} root component unreadable ({err})", self.identity))
            .ok()?;
        if component != self.position_component {
            debug!(
                "{} root component moved {} -> {component}",
                self.identity, self.position_component
            );
            self.position_component = component;
        }
        Some(())
    }

    fn sync_visuals(
        &mut self,
        crews: &dyn CrewRegistry,
        backend: &mut dyn RenderBackend,
        config: &OverlayConfig,
    ) -> UpdateOutcome {
        let text = label_text(&self.descriptor.display_name, self.distance);
        let color = self
            .crew
            .and_then(|crew| crews.color_of(crew))
            .unwrap_or(config.default_marker_color);
        let shown = self
            .descriptor
            .variant
            .is_shown_at(self.distance, config.near_far_threshold);

        let Some(visuals) = self.visuals.as_mut() else {
            return UpdateOutcome::Removed;
        };
        let Some(screen) = self.screen_coords else {
            visuals.set_visible(backend, false);
            return UpdateOutcome::Hidden(HideReason::OffScreen);
        };

        visuals.place(backend, screen, config.marker_size);
        visuals.set_text(backend, &text);
        visuals.set_color(backend, color);
        visuals.set_visible(backend, shown);
        if shown {
            UpdateOutcome::Visible
        } else {
            UpdateOutcome::Hidden(HideReason::OtherVariant)
        }
    }

    /// Identity token captured at spawn.
    #[must_use]
    pub const fn identity(&self) -> ActorId {
        self.identity
    }

    /// Actor base address.
    #[must_use]
    pub const fn base_address(&self) -> Address {
        self.base_address
    }

    /// Address of the root component positions are read from.
    #[must_use]
    pub const fn position_component(&self) -> Address {
        self.position_component
    }

    /// Raw kind label the ship was spawned with.
    #[must_use]
    pub fn raw_kind(&self) -> &str {
        &self.raw_kind
    }

    /// Display name shown in the label.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.descriptor.display_name
    }

    /// Ship class.
    #[must_use]
    pub const fn class(&self) -> ShipClass {
        self.descriptor.class
    }

    /// Near or far actor.
    #[must_use]
    pub const fn variant(&self) -> ShipVariant {
        self.descriptor.variant
    }

    /// Last world position read.
    #[must_use]
    pub const fn world_coords(&self) -> Vec3 {
        self.world_coords
    }

    /// Distance to the viewer at the last update.
    #[must_use]
    pub const fn distance(&self) -> f32 {
        self.distance
    }

    /// Screen position at the last update; `None` when off screen.
    #[must_use]
    pub const fn screen_coords(&self) -> Option<Vec2> {
        self.screen_coords
    }

    /// Owning crew, if one was readable at spawn.
    #[must_use]
    pub const fn crew(&self) -> Option<CrewId> {
        self.crew
    }

    /// The ship's visuals, until they are disposed.
    #[must_use]
    pub const fn visuals(&self) -> Option<&ShipVisuals> {
        self.visuals.as_ref()
    }

    /// Whether the registry should evict this record.
    #[must_use]
    pub const fn is_marked_for_removal(&self) -> bool {
        self.marked_for_removal
    }
}

/// Label text for a ship at `distance`, rounded to whole metres.
///
/// # Examples
/// ```
/// use ship_overlay::ship::label_text;
/// assert_eq!(label_text("Sloop (Near)", 1200.0), "Sloop (Near) - 1200m");
/// assert_eq!(label_text("Brig", 1750.6), "Brig - 1751m");
/// ```
#[must_use]
pub fn label_text(display_name: &str, distance: f32) -> String {
    format!("{display_name} - {distance:.0}m")
}
