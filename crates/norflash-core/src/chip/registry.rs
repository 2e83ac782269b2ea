//! Static chip registry
//!
//! Only the five allow-listed manufacturers are eligible for a capacity
//! lookup. The capacity table is a list of (capacity ID, size) pairs scanned
//! linearly.

use crate::error::{Error, Result};

const KIB: u32 = 1024;
const MIB: u32 = 1024 * 1024;

/// Capacity ID to size in bytes
///
/// Keep each pair on one line: a mismatched pair silently corrupts data.
pub const CAPACITY_TABLE: [(u8, u32); 14] = [
    (0x10, 64 * KIB),
    (0x11, 128 * KIB),
    (0x12, 256 * KIB),
    (0x13, 512 * KIB),
    (0x14, MIB),
    (0x15, 2 * MIB),
    (0x16, 4 * MIB),
    (0x17, 8 * MIB),
    (0x18, 16 * MIB),
    (0x19, 32 * MIB),
    (0x43, 8 * MIB),
    (0x4B, 8 * MIB),
    (0x00, 256 * KIB),
    (0x01, 512 * KIB),
];

/// Manufacturers the driver knows how to handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Manufacturer {
    /// Winbond (0xEF)
    Winbond,
    /// Microchip / SST (0xBF)
    Microchip,
    /// Cypress / Spansion (0x01)
    Cypress,
    /// Adesto (0x1F)
    Adesto,
    /// Micron (0x20)
    Micron,
}

impl Manufacturer {
    /// Look up a JEDEC manufacturer ID in the allow-list
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            0xEF => Some(Self::Winbond),
            0xBF => Some(Self::Microchip),
            0x01 => Some(Self::Cypress),
            0x1F => Some(Self::Adesto),
            0x20 => Some(Self::Micron),
            _ => None,
        }
    }

    /// JEDEC manufacturer ID
    pub const fn id(&self) -> u8 {
        match self {
            Self::Winbond => 0xEF,
            Self::Microchip => 0xBF,
            Self::Cypress => 0x01,
            Self::Adesto => 0x1F,
            Self::Micron => 0x20,
        }
    }

    /// Vendor name
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Winbond => "Winbond",
            Self::Microchip => "Microchip",
            Self::Cypress => "Cypress",
            Self::Adesto => "Adesto",
            Self::Micron => "Micron",
        }
    }
}

/// Capacity in bytes for a capacity ID, if the table has one
pub fn capacity_for_id(capacity_id: u8) -> Option<u32> {
    CAPACITY_TABLE
        .iter()
        .find(|(id, _)| *id == capacity_id)
        .map(|&(_, size)| size)
}

/// Resolve the capacity of a chip from its JEDEC ID bytes
///
/// Unknown manufacturers are rejected before the table is consulted.
pub fn resolve_capacity(manufacturer_id: u8, capacity_id: u8) -> Result<u32> {
    if Manufacturer::from_id(manufacturer_id).is_none() {
        return Err(Error::UnknownChip {
            manufacturer: manufacturer_id,
        });
    }
    capacity_for_id(capacity_id).ok_or(Error::UnknownCapacity { capacity_id })
}
