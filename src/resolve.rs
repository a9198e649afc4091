//! Resolution of an actor's identity and sub-structures from its base address.
//!
//! All functions here are thin reads through a [`MemoryLayout`]; they never
//! cache and never interpret what they read beyond its type.

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::MemoryLayout;
use crate::crew::CrewId;
use crate::error::AccessError;
use crate::memory::{read_address, read_u128, read_u32, read_vec3, Address, MemoryReader};

/// Identity token stored in every actor.
///
/// A base address whose token differs from the one captured at spawn has
/// been reused for another actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub u32);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// Reads the identity token of the actor at `base`.
///
/// # Errors
/// Returns [`AccessError`] when the actor header is unreadable.
pub fn resolve_identity(
    memory: &dyn MemoryReader,
    base: Address,
    layout: &MemoryLayout,
) -> Result<ActorId, AccessError> {
    read_u32(memory, base.offset(layout.actor_id_offset)?).map(ActorId)
}

/// Reads the address of the actor's root (position-bearing) component.
///
/// # Errors
/// Returns [`AccessError`] when the pointer slot is unreadable.
pub fn resolve_position_component(
    memory: &dyn MemoryReader,
    base: Address,
    layout: &MemoryLayout,
) -> Result<Address, AccessError> {
    read_address(memory, base.offset(layout.root_component_offset)?)
}

/// Reads the world location stored in a root component.
///
/// # Errors
/// Returns [`AccessError`] when the location is unreadable.
pub fn read_world_position(
    memory: &dyn MemoryReader,
    component: Address,
    layout: &MemoryLayout,
) -> Result<Vec3, AccessError> {
    read_vec3(memory, component.offset(layout.location_offset)?)
}

/// Reads the crew owning the ship at `base`.
///
/// A null ownership component means the ship has no crew.
///
/// # Errors
/// Returns [`AccessError`] when either hop of the pointer chain is
/// unreadable.
pub fn resolve_crew(
    memory: &dyn MemoryReader,
    base: Address,
    layout: &MemoryLayout,
) -> Result<Option<CrewId>, AccessError> {
    let component = read_address(memory, base.offset(layout.crew_component_offset)?)?;
    if component == Address(0) {
        return Ok(None);
    }
    read_u128(memory, component.offset(layout.crew_id_offset)?).map(|raw| Some(CrewId(raw)))
}
