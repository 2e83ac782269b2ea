//! Error types for norflash-core
//!
//! Every driver operation funnels its failures through [`Error`]. The
//! numeric [`Error::code`] follows the classic SPIFlash-style error numbering
//! so that codes logged by older firmware stay comparable.

use core::fmt;

/// Which addressing-width switch failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressModeSwitch {
    /// Entering 4-byte address mode (EN4B)
    Enter,
    /// Returning to 3-byte address mode (EX4B)
    Exit,
}

/// Core error type - no_std compatible, Copy so it fits the last-error slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Setup errors
    /// Capacity unknown: identification never ran or failed
    NotInitialized,
    /// Manufacturer ID is not in the supported vendor list
    UnknownChip {
        /// Manufacturer ID read from the device
        manufacturer: u8,
    },
    /// Manufacturer is supported but the capacity ID is not in the table
    UnknownCapacity {
        /// Capacity ID read from the device
        capacity_id: u8,
    },
    /// Manufacturer ID read as zero: nothing answered on the bus
    NoResponse,

    // Device state errors
    /// Busy flag never cleared within the timeout
    BusyTimeout,
    /// Write-enable latch did not set after WREN
    WriteEnableFailed,
    /// An erase or program suspend is active
    Suspended,
    /// Suspend or resume was issued but the suspend flag did not follow
    SuspendFailed,
    /// The device is in deep power-down
    PoweredDown,
    /// The 3/4-byte addressing mode could not be switched
    AddressModeFailed(AddressModeSwitch),
    /// The identified vendor does not implement this function
    Unsupported,

    // Address/data errors
    /// Address range exceeds the capacity and wrap-around is disabled
    OutOfBounds {
        /// Requested start address
        addr: u32,
        /// Requested length
        len: u32,
    },
    /// Write target contains bytes that are not erased (0xFF)
    NotErased {
        /// Address of the first non-erased byte
        addr: u32,
        /// The byte found there
        found: u8,
    },
    /// Post-write read-back did not match the data written
    VerifyFailed {
        /// Address of the first mismatch
        addr: u32,
        /// The byte that was written
        expected: u8,
        /// The byte read back
        found: u8,
    },
}

impl Error {
    /// Numeric error code (never 0, which means success)
    pub const fn code(&self) -> u8 {
        match self {
            Self::NotInitialized => 0x01,
            Self::UnknownChip { .. } => 0x02,
            Self::UnknownCapacity { .. } => 0x03,
            Self::BusyTimeout => 0x04,
            Self::OutOfBounds { .. } => 0x05,
            Self::WriteEnableFailed => 0x06,
            Self::NotErased { .. } => 0x07,
            Self::Suspended => 0x09,
            Self::SuspendFailed => 0x10,
            Self::VerifyFailed { .. } => 0x0A,
            Self::NoResponse => 0x0B,
            Self::Unsupported => 0x0C,
            Self::AddressModeFailed(AddressModeSwitch::Enter) => 0x0D,
            Self::AddressModeFailed(AddressModeSwitch::Exit) => 0x0E,
            Self::PoweredDown => 0x0F,
        }
    }

    /// True for errors that mean the chip was never (successfully) identified
    pub const fn is_setup_error(&self) -> bool {
        matches!(
            self,
            Self::NotInitialized
                | Self::UnknownChip { .. }
                | Self::UnknownCapacity { .. }
                | Self::NoResponse
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "flash not identified, call identify() first"),
            Self::UnknownChip { manufacturer } => {
                write!(f, "unsupported manufacturer ID 0x{:02X}", manufacturer)
            }
            Self::UnknownCapacity { capacity_id } => {
                write!(f, "unknown capacity ID 0x{:02X}", capacity_id)
            }
            Self::NoResponse => write!(f, "no response from flash chip"),
            Self::BusyTimeout => write!(f, "flash chip busy: timed out waiting for ready"),
            Self::WriteEnableFailed => write!(f, "write enable latch did not set"),
            Self::Suspended => write!(f, "erase/program suspend is active"),
            Self::SuspendFailed => write!(f, "suspend state did not change"),
            Self::PoweredDown => write!(f, "flash chip is powered down"),
            Self::AddressModeFailed(AddressModeSwitch::Enter) => {
                write!(f, "unable to enter 4-byte address mode")
            }
            Self::AddressModeFailed(AddressModeSwitch::Exit) => {
                write!(f, "unable to return to 3-byte address mode")
            }
            Self::Unsupported => write!(f, "function not supported by this chip"),
            Self::OutOfBounds { addr, len } => write!(
                f,
                "address range 0x{:08X}+{} is out of bounds",
                addr, len
            ),
            Self::NotErased { addr, found } => write!(
                f,
                "target not erased at 0x{:08X}: expected 0xFF, found 0x{:02X}",
                addr, found
            ),
            Self::VerifyFailed {
                addr,
                expected,
                found,
            } => write!(
                f,
                "verify failed at 0x{:08X}: expected 0x{:02X}, found 0x{:02X}",
                addr, expected, found
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
