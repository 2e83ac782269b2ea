//! Chip descriptor

use crate::spi::{PAGE_SIZE, SFDP_SIGNATURE};

use super::Manufacturer;

/// Identity of the attached chip
///
/// Filled in once during identification. Capacity stays 0 until it has
/// been resolved and is written exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChipDescriptor {
    /// JEDEC manufacturer ID (first RDID byte)
    pub manufacturer_id: u8,
    /// Memory type ID (second RDID byte)
    pub memory_type_id: u8,
    /// Capacity ID (third RDID byte)
    pub capacity_id: u8,
    /// Whether the chip was matched against the registry
    pub supported: bool,
    /// SFDP signature word, if it was read
    pub sfdp: Option<u32>,
    capacity: u32,
}

impl ChipDescriptor {
    /// Descriptor for freshly read JEDEC ID bytes, capacity still unknown
    pub const fn from_jedec(manufacturer_id: u8, memory_type_id: u8, capacity_id: u8) -> Self {
        Self {
            manufacturer_id,
            memory_type_id,
            capacity_id,
            supported: false,
            sfdp: None,
            capacity: 0,
        }
    }

    /// Total capacity in bytes, 0 until identified
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Record the resolved capacity. Returns false if it was already set.
    pub(crate) fn set_capacity(&mut self, capacity: u32) -> bool {
        if self.capacity != 0 {
            return false;
        }
        self.capacity = capacity;
        self.supported = true;
        true
    }

    /// The 24-bit JEDEC ID (manufacturer << 16 | type << 8 | capacity)
    pub const fn jedec_id(&self) -> u32 {
        ((self.manufacturer_id as u32) << 16)
            | ((self.memory_type_id as u32) << 8)
            | (self.capacity_id as u32)
    }

    /// Known manufacturer, if allow-listed
    pub const fn manufacturer(&self) -> Option<Manufacturer> {
        Manufacturer::from_id(self.manufacturer_id)
    }

    /// Number of 256-byte pages
    pub const fn max_page(&self) -> u32 {
        self.capacity / PAGE_SIZE
    }

    /// True if the SFDP signature was read and matched
    pub fn has_sfdp(&self) -> bool {
        self.sfdp == Some(SFDP_SIGNATURE)
    }
}
