//! Registry of tracked ships.
//!
//! [`ShipTracker`] owns every [`TrackedShip`], keyed by actor base address.
//! The actor scan feeds it sightings; each frame it updates every ship and
//! evicts the ones that retired themselves.

use hashbrown::HashMap;
use log::{debug, warn};

use crate::geometry::ViewerCoords;
use crate::memory::Address;
use crate::names::ShipNames;
use crate::render::{IconSet, RenderBackend};
use crate::ship::{ActorSighting, FrameContext, TrackedShip, UpdateOutcome};

/// Counts produced by one [`ShipTracker::update_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameSummary {
    /// Ships drawn this frame.
    pub visible: usize,
    /// Live ships not drawn this frame.
    pub hidden: usize,
    /// Ships retired and evicted this frame.
    pub removed: usize,
}

/// Ships currently mirrored on the overlay.
#[derive(Debug)]
pub struct ShipTracker {
    icons: IconSet,
    ships: HashMap<Address, TrackedShip>,
}

impl ShipTracker {
    /// Creates an empty tracker drawing with `icons`.
    #[must_use]
    pub fn new(icons: IconSet) -> Self {
        Self {
            icons,
            ships: HashMap::new(),
        }
    }

    /// Starts tracking a sighted actor unless its address is already tracked.
    ///
    /// Returns `true` when a new ship was spawned. Actors that are not ships
    /// or cannot be resolved are skipped; the next scan offers them again.
    pub fn observe(
        &mut self,
        sighting: ActorSighting,
        names: &dyn ShipNames,
        viewer: &ViewerCoords,
        ctx: &mut FrameContext<'_>,
    ) -> bool {
        if self.ships.contains_key(&sighting.address) {
            return false;
        }
        let address = sighting.address;
        let actor_id = sighting.actor_id;
        match TrackedShip::spawn(sighting, names, &self.icons, viewer, ctx) {
            Ok(ship) => {
                self.ships.insert(address, ship);
                true
            }
            Err(err) => {
                warn!("not tracking {actor_id} at {address}: {err}");
                false
            }
        }
    }

    /// Updates every ship for the frame and evicts retired ones.
    pub fn update_all(
        &mut self,
        viewer: &ViewerCoords,
        ctx: &mut FrameContext<'_>,
    ) -> FrameSummary {
        let mut summary = FrameSummary::default();
        for ship in self.ships.values_mut() {
            match ship.update(viewer, ctx) {
                UpdateOutcome::Visible => summary.visible += 1,
                UpdateOutcome::Hidden(_) => summary.hidden += 1,
                UpdateOutcome::Removed => summary.removed += 1,
            }
        }

        let retired: Vec<Address> = self
            .ships
            .iter()
            .filter(|(_, ship)| ship.is_marked_for_removal())
            .map(|(address, _)| *address)
            .collect();
        for address in retired {
            if let Some(ship) = self.ships.remove(&address) {
                debug!("evicting {} at {address}", ship.identity());
                ship.dispose(ctx.backend);
            }
        }
        summary
    }

    /// Disposes every ship, as on disconnect.
    pub fn clear(&mut self, backend: &mut dyn RenderBackend) {
        for (_, ship) in self.ships.drain() {
            ship.dispose(backend);
        }
    }

    /// Ship tracked at `address`.
    #[must_use]
    pub fn get(&self, address: Address) -> Option<&TrackedShip> {
        self.ships.get(&address)
    }

    /// Iterates over tracked ships in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &TrackedShip> {
        self.ships.values()
    }

    /// Number of tracked ships.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ships.len()
    }

    /// Returns `true` when no ship is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ships.is_empty()
    }
}
