//! Crew affiliation and colour lookup.
//!
//! Ships belonging to the same crew share a marker colour. The registry is
//! owned and mutated by the caller between frames; ships query it afresh on
//! every update and never keep a colour across frames.

use std::fmt;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Identifier of the crew owning a ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CrewId(pub u128);

impl fmt::Display for CrewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    /// Opaque white.
    pub const WHITE: Self = Self([255, 255, 255]);

    /// Creates a colour from its channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }
}

/// Source of live crew colours.
#[cfg_attr(test, mockall::automock)]
pub trait CrewRegistry {
    /// Returns the colour assigned to `crew`, if the crew is known.
    fn color_of(&self, crew: CrewId) -> Option<Rgb>;
}

/// In-memory crew registry keyed by [`CrewId`].
#[derive(Debug, Clone, Default)]
pub struct CrewTracker {
    colors: HashMap<CrewId, Rgb>,
}

impl CrewTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records or recolours a crew, returning the previous colour.
    pub fn assign(&mut self, crew: CrewId, color: Rgb) -> Option<Rgb> {
        self.colors.insert(crew, color)
    }

    /// Forgets a crew, for example after it leaves the server.
    pub fn forget(&mut self, crew: CrewId) -> Option<Rgb> {
        self.colors.remove(&crew)
    }

    /// Number of known crews.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Returns `true` when no crews are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl CrewRegistry for CrewTracker {
    fn color_of(&self, crew: CrewId) -> Option<Rgb> {
        self.colors.get(&crew).copied()
    }
}

impl FromIterator<(CrewId, Rgb)> for CrewTracker {
    fn from_iter<I: IntoIterator<Item = (CrewId, Rgb)>>(iter: I) -> Self {
        Self {
            colors: iter.into_iter().collect(),
        }
    }
}
