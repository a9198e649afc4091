//! Headless replay of recorded overlay scenes.
//!
//! A [`Scene`] is a JSON document holding the viewport, crew colours and a
//! sequence of frames. Each frame carries the viewer pose and images of the
//! actors alive in that frame. [`replay`] lays each frame's actors out in a
//! [`SnapshotMemory`] using the configured [`MemoryLayout`] and drives a
//! [`ShipTracker`] over them, exactly as a live memory reader would.

use std::fs;
use std::path::Path;

use glam::{Vec2, Vec3};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::{MemoryLayout, OverlayConfig};
use crate::crew::{CrewId, CrewTracker, Rgb};
use crate::error::{AccessError, ConfigError};
use crate::geometry::{Rotation, ViewerCoords};
use crate::memory::{Address, SnapshotMemory};
use crate::names::ShipNames;
use crate::render::{IconSet, RetainedBackend};
use crate::resolve::ActorId;
use crate::ship::{ActorSighting, FrameContext};
use crate::tracker::{FrameSummary, ShipTracker};

const REGION_ALIGN: u64 = 0x100;

/// One actor as it sits in the external process for a single frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorImage {
    /// Actor base address.
    pub address: Address,
    /// Identity token stored in the actor header.
    pub actor_id: ActorId,
    /// Raw kind label.
    pub raw_kind: String,
    /// World location of the root component.
    pub position: Vec3,
    /// Owning crew, if any.
    #[serde(default)]
    pub crew: Option<CrewId>,
}

const fn region_len(end: u64) -> u64 {
    end.div_ceil(REGION_ALIGN) * REGION_ALIGN
}

fn zeroed(len: u64, address: Address) -> Result<Vec<u8>, AccessError> {
    let size = usize::try_from(len).map_err(|_| AccessError::AddressOverflow {
        base: address,
        offset: len,
    })?;
    Ok(vec![0; size])
}

fn put(region: &mut [u8], at: u64, bytes: &[u8], base: Address) -> Result<(), AccessError> {
    let overflow = AccessError::AddressOverflow { base, offset: at };
    let from = usize::try_from(at).map_err(|_| overflow)?;
    let to = from.checked_add(bytes.len()).ok_or(overflow)?;
    region
        .get_mut(from..to)
        .ok_or(overflow)?
        .copy_from_slice(bytes);
    Ok(())
}

impl ActorImage {
    /// Creates an image with no crew.
    #[must_use]
    pub fn new(
        address: Address,
        actor_id: ActorId,
        raw_kind: impl Into<String>,
        position: Vec3,
    ) -> Self {
        Self {
            address,
            actor_id,
            raw_kind: raw_kind.into(),
            position,
            crew: None,
        }
    }

    /// Sets the owning crew.
    #[must_use]
    pub const fn with_crew(mut self, crew: CrewId) -> Self {
        self.crew = Some(crew);
        self
    }

    /// The sighting a registry would report for this actor.
    #[must_use]
    pub fn sighting(&self) -> ActorSighting {
        ActorSighting {
            actor_id: self.actor_id,
            address: self.address,
            raw_kind: self.raw_kind.clone(),
        }
    }

    fn header_len(layout: &MemoryLayout) -> u64 {
        region_len(
            layout
                .actor_id_offset
                .saturating_add(4)
                .max(layout.root_component_offset.saturating_add(8))
                .max(layout.crew_component_offset.saturating_add(8)),
        )
    }

    /// Address at which the root component is laid out.
    ///
    /// # Errors
    /// Returns [`AccessError::AddressOverflow`] near the top of the address
    /// space.
    pub fn component_address(&self, layout: &MemoryLayout) -> Result<Address, AccessError> {
        self.address.offset(Self::header_len(layout))
    }

    fn crew_component_address(&self, layout: &MemoryLayout) -> Result<Address, AccessError> {
        self.component_address(layout)?
            .offset(region_len(layout.location_offset.saturating_add(12)))
    }

    /// Writes the actor header, root component and crew component.
    ///
    /// # Errors
    /// Returns [`AccessError::AddressOverflow`] when the regions do not fit.
    pub fn write_into(
        &self,
        memory: &mut SnapshotMemory,
        layout: &MemoryLayout,
    ) -> Result<(), AccessError> {
        let component = self.component_address(layout)?;
        let crew_component = self.crew_component_address(layout)?;

        let mut header = zeroed(Self::header_len(layout), self.address)?;
        put(
            &mut header,
            layout.actor_id_offset,
            &self.actor_id.0.to_le_bytes(),
            self.address,
        )?;
        put(
            &mut header,
            layout.root_component_offset,
            &component.0.to_le_bytes(),
            self.address,
        )?;
        let crew_pointer = if self.crew.is_some() { crew_component.0 } else { 0 };
        put(
            &mut header,
            layout.crew_component_offset,
            &crew_pointer.to_le_bytes(),
            self.address,
        )?;
        memory.write(self.address, header);

        let root_len = region_len(layout.location_offset.saturating_add(12));
        let mut root = zeroed(root_len, component)?;
        let location: Vec<u8> = self
            .position
            .to_array()
            .iter()
            .flat_map(|c| c.to_le_bytes())
            .collect();
        put(&mut root, layout.location_offset, &location, component)?;
        memory.write(component, root);

        if let Some(crew) = self.crew {
            let ownership_len = region_len(layout.crew_id_offset.saturating_add(16));
            let mut ownership = zeroed(ownership_len, crew_component)?;
            put(
                &mut ownership,
                layout.crew_id_offset,
                &crew.0.to_le_bytes(),
                crew_component,
            )?;
            memory.write(crew_component, ownership);
        }
        Ok(())
    }
}

/// Viewer pose for one recorded frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewerPose {
    /// Camera location.
    pub location: Vec3,
    /// Camera orientation.
    #[serde(default)]
    pub rotation: Rotation,
}

/// One recorded frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneFrame {
    /// Viewer pose.
    pub viewer: ViewerPose,
    /// Actors alive during the frame.
    #[serde(default)]
    pub actors: Vec<ActorImage>,
}

const fn default_fov() -> f32 {
    90.0
}

/// Recorded session replayed through the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Viewport size in pixels.
    pub screen: Vec2,
    /// Horizontal field of view in degrees.
    #[serde(default = "default_fov")]
    pub fov: f32,
    /// Crew colours.
    #[serde(default)]
    pub crews: Vec<(CrewId, Rgb)>,
    /// Frames in playback order.
    pub frames: Vec<SceneFrame>,
}

impl Scene {
    /// Parses a scene document.
    ///
    /// # Errors
    /// Returns [`ConfigError::Json`] when the document is malformed.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a scene file.
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] when the file cannot be read and
    /// [`ConfigError::Json`] when it is malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let json = fs::read_to_string(path_ref).map_err(|e| ConfigError::io(path_ref, e))?;
        Self::from_json_str(&json)
    }

    const fn viewer(&self, pose: ViewerPose) -> ViewerCoords {
        ViewerCoords {
            location: pose.location,
            rotation: pose.rotation,
            fov: self.fov,
            screen: self.screen,
        }
    }
}

/// Outcome of replaying a scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayReport {
    /// Per-frame tracker summaries.
    pub frames: Vec<FrameSummary>,
    /// Ships still tracked after the last frame.
    pub ships_remaining: usize,
    /// Primitives still live after the tracker was cleared.
    pub primitives_leaked: usize,
}

/// Replays `scene` through a fresh tracker.
///
/// Actors that cannot be laid out in memory are skipped for that frame. After
/// the last frame the tracker is cleared, as on disconnect, and any primitive
/// left in the backend is reported as leaked.
#[must_use]
pub fn replay(
    scene: &Scene,
    config: &OverlayConfig,
    names: &dyn ShipNames,
    icons: IconSet,
) -> ReplayReport {
    let crews: CrewTracker = scene.crews.iter().copied().collect();
    let mut backend = RetainedBackend::new();
    let mut tracker = ShipTracker::new(icons);
    let mut frames = Vec::with_capacity(scene.frames.len());

    for (index, frame) in scene.frames.iter().enumerate() {
        let mut memory = SnapshotMemory::new();
        for actor in &frame.actors {
            if let Err(err) = actor.write_into(&mut memory, &config.layout) {
                debug!("frame {index}: skipping {}: {err}", actor.actor_id);
            }
        }

        let viewer = scene.viewer(frame.viewer);
        let mut ctx = FrameContext {
            memory: &memory,
            crews: &crews,
            backend: &mut backend,
            config,
        };
        for actor in &frame.actors {
            tracker.observe(actor.sighting(), names, &viewer, &mut ctx);
        }
        let summary = tracker.update_all(&viewer, &mut ctx);
        info!(
            "frame {index}: {} visible, {} hidden, {} removed, {} tracked",
            summary.visible,
            summary.hidden,
            summary.removed,
            tracker.len()
        );
        frames.push(summary);
    }

    let ships_remaining = tracker.len();
    tracker.clear(&mut backend);
    ReplayReport {
        frames,
        ships_remaining,
        primitives_leaked: backend.live_count(),
    }
}
