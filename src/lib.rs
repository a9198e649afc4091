//! Library crate providing the ship overlay core.
//!
//! The overlay mirrors ship actors living in another process onto a 2D
//! screen overlay: a class icon, a crew-coloured marker and a
//! `"name - distance"` label per ship. Memory access, crew colours, the name
//! table and drawing are all reached through traits so the core runs the same
//! against a live process, a recorded [`replay::Scene`] or a test double.
pub mod config;
pub mod constants;
pub mod crew;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod memory;
pub mod names;
pub mod render;
pub mod replay;
pub mod resolve;
pub mod ship;
pub mod tracker;
pub use constants::*;

// Re-export commonly used items
pub use config::{MemoryLayout, OverlayConfig, PositionHandlePolicy};
pub use crew::{CrewId, CrewRegistry, CrewTracker, Rgb};
pub use error::{AccessError, ConfigError, SpawnError};
pub use geometry::{project_to_screen, world_distance, Rotation, ViewerCoords};
pub use logging::init as init_logging;
pub use memory::{Address, MemoryReader, SnapshotMemory};
pub use names::{NameTable, ShipClass, ShipDescriptor, ShipNames, ShipVariant};
pub use render::{IconHandle, IconSet, RenderBackend, RetainedBackend, ShipVisuals};
pub use replay::{replay, ReplayReport, Scene};
pub use resolve::ActorId;
pub use ship::{ActorSighting, FrameContext, HideReason, TrackedShip, UpdateOutcome};
pub use tracker::{FrameSummary, ShipTracker};

pub mod prelude {
    //! Prelude exports used in documentation examples.
    //!
    //! ```rust,no_run
    //! use ship_overlay::prelude::*;
    //! ```

    pub use crate::{
        ActorSighting, Address, FrameContext, MemoryReader, OverlayConfig, RenderBackend,
        ShipTracker, TrackedShip, UpdateOutcome, ViewerCoords,
    };
    pub use glam::{Vec2, Vec3};
}
