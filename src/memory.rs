//! Access to the external process's memory.
//!
//! The overlay never owns the memory it reads. [`MemoryReader`] is the seam
//! to whatever attaches to the live process; [`SnapshotMemory`] is an
//! in-process implementation backed by captured byte regions, used for
//! replays and tests.

use std::collections::BTreeMap;
use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::AccessError;

/// Address in the external process's address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(pub u64);

impl Address {
    /// Returns `self + offset`, failing when the sum overflows.
    ///
    /// # Errors
    /// Returns [`AccessError::AddressOverflow`] when `self + offset` does not
    /// fit in the address space.
    ///
    /// # Examples
    /// ```
    /// use ship_overlay::memory::Address;
    /// assert_eq!(Address(0x1000).offset(0x18).ok(), Some(Address(0x1018)));
    /// assert!(Address(u64::MAX).offset(1).is_err());
    /// ```
    pub const fn offset(self, offset: u64) -> Result<Self, AccessError> {
        match self.0.checked_add(offset) {
            Some(raw) => Ok(Self(raw)),
            None => Err(AccessError::AddressOverflow { base: self, offset }),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Synchronous reader over another process's memory.
#[cfg_attr(test, mockall::automock)]
pub trait MemoryReader {
    /// Reads exactly `len` bytes starting at `address`.
    ///
    /// # Errors
    /// Returns [`AccessError`] when any byte of the range is unreadable.
    fn read_bytes(&self, address: Address, len: usize) -> Result<Vec<u8>, AccessError>;
}

fn read_array<const N: usize>(
    memory: &dyn MemoryReader,
    address: Address,
) -> Result<[u8; N], AccessError> {
    let bytes = memory.read_bytes(address, N)?;
    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| AccessError::Unmapped { address, len: N })
}

/// Reads a little-endian `u32`.
///
/// # Errors
/// Propagates [`AccessError`] from the reader.
pub fn read_u32(memory: &dyn MemoryReader, address: Address) -> Result<u32, AccessError> {
    read_array::<4>(memory, address).map(u32::from_le_bytes)
}

/// Reads a little-endian `u64`.
///
/// # Errors
/// Propagates [`AccessError`] from the reader.
pub fn read_u64(memory: &dyn MemoryReader, address: Address) -> Result<u64, AccessError> {
    read_array::<8>(memory, address).map(u64::from_le_bytes)
}

/// Reads a little-endian `u128`.
///
/// # Errors
/// Propagates [`AccessError`] from the reader.
pub fn read_u128(memory: &dyn MemoryReader, address: Address) -> Result<u128, AccessError> {
    read_array::<16>(memory, address).map(u128::from_le_bytes)
}

/// Reads a pointer-sized value and interprets it as an [`Address`].
///
/// # Errors
/// Propagates [`AccessError`] from the reader.
pub fn read_address(memory: &dyn MemoryReader, address: Address) -> Result<Address, AccessError> {
    read_u64(memory, address).map(Address)
}

/// Reads three consecutive little-endian `f32` values.
///
/// # Errors
/// Propagates [`AccessError`] from the reader.
pub fn read_vec3(memory: &dyn MemoryReader, address: Address) -> Result<Vec3, AccessError> {
    let raw = read_array::<12>(memory, address)?;
    let [x0, x1, x2, x3, y0, y1, y2, y3, z0, z1, z2, z3] = raw;
    Ok(Vec3::new(
        f32::from_le_bytes([x0, x1, x2, x3]),
        f32::from_le_bytes([y0, y1, y2, y3]),
        f32::from_le_bytes([z0, z1, z2, z3]),
    ))
}

/// Memory image assembled from captured regions.
///
/// Regions are keyed by their start address. A read succeeds only when a
/// single region covers the whole requested range. Writing a region replaces
/// any region starting at the same address.
#[derive(Debug, Clone, Default)]
pub struct SnapshotMemory {
    regions: BTreeMap<Address, Vec<u8>>,
}

impl SnapshotMemory {
    /// Creates an empty image where every read fails.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the region starting at `address`.
    pub fn write(&mut self, address: Address, bytes: Vec<u8>) {
        self.regions.insert(address, bytes);
    }

    /// Removes the region starting at `address`, mimicking a freed actor.
    pub fn unmap(&mut self, address: Address) -> Option<Vec<u8>> {
        self.regions.remove(&address)
    }

    /// Overwrites bytes inside an existing region.
    ///
    /// Returns `false` when no region covers the range.
    pub fn patch(&mut self, address: Address, bytes: &[u8]) -> bool {
        let Some((&start, region)) = self.regions.range_mut(..=address).next_back() else {
            return false;
        };
        let Ok(from) = usize::try_from(address.0 - start.0) else {
            return false;
        };
        let Some(to) = from.checked_add(bytes.len()) else {
            return false;
        };
        let Some(target) = region.get_mut(from..to) else {
            return false;
        };
        target.copy_from_slice(bytes);
        true
    }

    /// Number of mapped regions.
    #[must_use]
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }
}

impl MemoryReader for SnapshotMemory {
    fn read_bytes(&self, address: Address, len: usize) -> Result<Vec<u8>, AccessError> {
        let unmapped = AccessError::Unmapped { address, len };
        let (start, region) = self
            .regions
            .range(..=address)
            .next_back()
            .ok_or(unmapped)?;
        let from = usize::try_from(address.0 - start.0).map_err(|_| unmapped)?;
        let to = from.checked_add(len).ok_or(unmapped)?;
        region.get(from..to).map(<[u8]>::to_vec).ok_or(unmapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn vec3_bytes(v: Vec3) -> Vec<u8> {
        [v.x, v.y, v.z]
            .iter()
            .flat_map(|c| c.to_le_bytes())
            .collect()
    }

    #[test]
    fn reads_inside_a_region() {
        let mut memory = SnapshotMemory::new();
        memory.write(Address(0x1000), vec![0_u8; 32]);
        assert!(memory.patch(Address(0x1008), &0xDEAD_BEEF_u32.to_le_bytes()));

        assert_eq!(read_u32(&memory, Address(0x1008)), Ok(0xDEAD_BEEF));
    }

    #[test]
    fn read_past_region_end_fails() {
        let mut memory = SnapshotMemory::new();
        memory.write(Address(0x1000), vec![0; 8]);

        assert_eq!(
            read_u64(&memory, Address(0x1004)),
            Err(AccessError::Unmapped {
                address: Address(0x1004),
                len: 8
            })
        );
    }

    #[test]
    fn read_below_first_region_fails() {
        let mut memory = SnapshotMemory::new();
        memory.write(Address(0x1000), vec![0; 8]);

        assert!(memory.read_bytes(Address(0x0FFF), 1).is_err());
    }

    #[test]
    fn reads_vec3() {
        let mut memory = SnapshotMemory::new();
        memory.write(Address(0x40), vec3_bytes(Vec3::new(1.5, -2.0, 300.25)));

        let v = read_vec3(&memory, Address(0x40)).expect("vec3 should be readable");
        assert_relative_eq!(v.x, 1.5);
        assert_relative_eq!(v.y, -2.0);
        assert_relative_eq!(v.z, 300.25);
    }

    #[test]
    fn patch_overwrites_in_place() {
        let mut memory = SnapshotMemory::new();
        memory.write(Address(0x2000), vec![0; 16]);

        assert!(memory.patch(Address(0x2004), &7_u32.to_le_bytes()));
        assert_eq!(read_u32(&memory, Address(0x2004)), Ok(7));
        assert!(!memory.patch(Address(0x200E), &7_u32.to_le_bytes()));
    }

    #[test]
    fn unmapped_region_stops_reads() {
        let mut memory = SnapshotMemory::new();
        memory.write(Address(0x3000), vec![1; 4]);
        memory.unmap(Address(0x3000));

        assert!(read_u32(&memory, Address(0x3000)).is_err());
        assert_eq!(memory.region_count(), 0);
    }
}
