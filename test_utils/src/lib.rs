//! Utility helpers for tests.
//!
//! Builders for viewers, actor images and one-frame collaborator bundles so
//! integration tests can describe a frame in a few lines.

use glam::{Vec2, Vec3};
use ship_overlay::replay::ActorImage;
use ship_overlay::{
    ActorId, Address, CrewTracker, FrameContext, FrameSummary, NameTable, OverlayConfig,
    RetainedBackend, ShipTracker, SnapshotMemory, ViewerCoords,
};

/// Viewport used by every helper.
pub const SCREEN: Vec2 = Vec2::new(1000.0, 800.0);

/// Raw kind of the near sloop actor in the built-in table.
pub const NEAR_SLOOP: &str = "BP_SmallShipTemplate_C";
/// Raw kind of the far sloop actor in the built-in table.
pub const FAR_SLOOP: &str = "BP_SmallShipNetProxy";
/// Raw kind of the near galleon actor in the built-in table.
pub const NEAR_GALLEON: &str = "BP_LargeShipTemplate_C";

/// Viewer at the origin looking along +X with a 90° field of view.
#[must_use]
pub fn viewer() -> ViewerCoords {
    ViewerCoords::looking_forward(Vec3::ZERO, 90.0, SCREEN)
}

/// Ship image straight ahead of [`viewer`] at `distance`.
#[must_use]
pub fn ship_ahead(address: u64, id: u32, raw_kind: &str, distance: f32) -> ActorImage {
    ActorImage::new(
        Address(address),
        ActorId(id),
        raw_kind,
        Vec3::new(distance, 0.0, 0.0),
    )
}

/// Memory holding `images` laid out with the default layout.
///
/// # Panics
/// Panics if an image does not fit in the address space.
#[must_use]
pub fn memory_with(images: &[ActorImage]) -> SnapshotMemory {
    let layout = OverlayConfig::default().layout;
    let mut memory = SnapshotMemory::new();
    for image in images {
        image
            .write_into(&mut memory, &layout)
            .unwrap_or_else(|e| panic!("cannot lay out {}: {e}", image.actor_id));
    }
    memory
}

/// Collaborators owned by a test for the duration of several frames.
#[derive(Debug, Default)]
pub struct World {
    /// Current memory image.
    pub memory: SnapshotMemory,
    /// Crew colours.
    pub crews: CrewTracker,
    /// Retained primitives.
    pub backend: RetainedBackend,
    /// Overlay configuration.
    pub config: OverlayConfig,
    /// Built-in name table.
    pub names: NameTable,
}

impl World {
    /// World with default configuration and the built-in name table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            names: NameTable::builtin(),
            ..Self::default()
        }
    }

    /// Replaces the memory image with `images`.
    pub fn show(&mut self, images: &[ActorImage]) {
        self.memory = memory_with(images);
    }

    /// Runs one frame: lays out `images`, offers each to `tracker` and
    /// updates every tracked ship as seen from `viewer`.
    pub fn frame(
        &mut self,
        tracker: &mut ShipTracker,
        images: &[ActorImage],
        viewer: &ViewerCoords,
    ) -> FrameSummary {
        self.show(images);
        let mut ctx = FrameContext {
            memory: &self.memory,
            crews: &self.crews,
            backend: &mut self.backend,
            config: &self.config,
        };
        for image in images {
            tracker.observe(image.sighting(), &self.names, viewer, &mut ctx);
        }
        tracker.update_all(viewer, &mut ctx)
    }
}
