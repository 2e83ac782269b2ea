//! Vendor quirk flags

use bitflags::bitflags;

use super::Manufacturer;

bitflags! {
    /// Vendor behaviours the driver has to account for
    ///
    /// Selected once at identification time from the manufacturer and memory
    /// type, then consulted instead of re-dispatching on raw ID bytes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Quirks: u8 {
        /// Supports EN4B/EX4B switching to reach beyond 16 MiB
        const FOUR_BYTE_ADDR = 1 << 0;
        /// Suspend state is reported by SUS in status register 2
        const SUSPEND_SR2    = 1 << 1;
        /// Suspend state is reported by WSE/WSP in status register 1
        const SUSPEND_SR1    = 1 << 2;
        /// Deep power-down is not supported
        const NO_POWER_DOWN  = 1 << 3;
    }
}

impl Default for Quirks {
    fn default() -> Self {
        Quirks::empty()
    }
}

/// How global block protection is cleared at setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnlockStyle {
    /// Chip powers up unprotected, nothing to do
    #[default]
    None,
    /// EWSR followed by WRSR with the block-protect bits cleared (SST25)
    StatusRewrite,
    /// WREN followed by the dedicated ULBPR opcode (SST26)
    GlobalUnlock,
}

/// Everything vendor specific the driver needs to know about a chip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VendorProfile {
    /// Behaviour flags
    pub quirks: Quirks,
    /// Block protection unlock sequence
    pub unlock: UnlockStyle,
}

/// SST25 family memory type
const SST25_MEMORY_TYPE: u8 = 0x25;
/// SST26 family memory type
const SST26_MEMORY_TYPE: u8 = 0x26;

impl VendorProfile {
    /// Pick the profile for a manufacturer / memory type pair
    pub fn select(manufacturer: Manufacturer, memory_type: u8) -> Self {
        match manufacturer {
            Manufacturer::Winbond => Self {
                quirks: Quirks::FOUR_BYTE_ADDR | Quirks::SUSPEND_SR2,
                unlock: UnlockStyle::None,
            },
            Manufacturer::Microchip => Self {
                quirks: Quirks::SUSPEND_SR1 | Quirks::NO_POWER_DOWN,
                unlock: match memory_type {
                    SST25_MEMORY_TYPE => UnlockStyle::StatusRewrite,
                    SST26_MEMORY_TYPE => UnlockStyle::GlobalUnlock,
                    _ => UnlockStyle::None,
                },
            },
            Manufacturer::Cypress | Manufacturer::Adesto | Manufacturer::Micron => {
                Self::default()
            }
        }
    }

    /// True if addresses beyond 16 MiB can be reached
    pub fn supports_four_byte(&self) -> bool {
        self.quirks.contains(Quirks::FOUR_BYTE_ADDR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_microchip_unlock_by_family() {
        let sst25 = VendorProfile::select(Manufacturer::Microchip, 0x25);
        let sst26 = VendorProfile::select(Manufacturer::Microchip, 0x26);
        assert_eq!(sst25.unlock, UnlockStyle::StatusRewrite);
        assert_eq!(sst26.unlock, UnlockStyle::GlobalUnlock);
        assert!(sst26.quirks.contains(Quirks::NO_POWER_DOWN));
    }

    #[test]
    fn test_only_winbond_switches_address_mode() {
        assert!(VendorProfile::select(Manufacturer::Winbond, 0x40).supports_four_byte());
        assert!(!VendorProfile::select(Manufacturer::Micron, 0xBA).supports_four_byte());
    }
}
