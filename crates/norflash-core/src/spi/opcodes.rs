//! Standard JEDEC SPI flash opcodes
//!
//! The command set used by 25-series NOR flash, plus the handful of
//! vendor-specific opcodes the supported manufacturers need.

// ============================================================================
// Write control
// ============================================================================

/// Write Enable - required immediately before every program/erase
pub const WREN: u8 = 0x06;
/// Write Disable - clears WEL bit in status register
pub const WRDI: u8 = 0x04;
/// Enable Write Status Register (legacy SST command)
pub const EWSR: u8 = 0x50;

// ============================================================================
// Status register operations
// ============================================================================

/// Read Status Register 1
pub const RDSR: u8 = 0x05;
/// Read Status Register 2 (Winbond)
pub const RDSR2: u8 = 0x35;
/// Read Status Register 3 (Winbond)
pub const RDSR3: u8 = 0x15;
/// Write Status Register 1
pub const WRSR: u8 = 0x01;

// ============================================================================
// Identification
// ============================================================================

/// Read JEDEC ID (manufacturer, memory type, capacity)
pub const RDID: u8 = 0x9F;
/// Read Electronic Manufacturer & Device ID (legacy)
pub const REMS: u8 = 0x90;
/// Read Unique ID (Winbond, others)
pub const RDUID: u8 = 0x4B;
/// Read SFDP (JEDEC JESD216)
pub const RDSFDP: u8 = 0x5A;

// ============================================================================
// Read / program
// ============================================================================

/// Read Data
pub const READ: u8 = 0x03;
/// Fast Read (with dummy byte)
pub const FAST_READ: u8 = 0x0B;
/// Page Program
pub const PP: u8 = 0x02;

// ============================================================================
// Erase
// ============================================================================

/// Sector Erase 4KB
pub const SE_20: u8 = 0x20;
/// Block Erase 32KB
pub const BE_52: u8 = 0x52;
/// Block Erase 64KB
pub const BE_D8: u8 = 0xD8;
/// Chip Erase (entire chip)
pub const CE_60: u8 = 0x60;
/// Chip Erase (alternate opcode)
pub const CE_C7: u8 = 0xC7;

// ============================================================================
// 4-byte address mode control
// ============================================================================

/// Enter 4-Byte Address Mode
pub const EN4B: u8 = 0xB7;
/// Exit 4-Byte Address Mode
pub const EX4B: u8 = 0xE9;

// ============================================================================
// Power management and suspend
// ============================================================================

/// Deep Power Down
pub const DP: u8 = 0xB9;
/// Release from Deep Power Down
pub const RDP: u8 = 0xAB;
/// Erase/Program Suspend
pub const SUSPEND: u8 = 0x75;
/// Erase/Program Resume
pub const RESUME: u8 = 0x7A;

// ============================================================================
// Vendor specific
// ============================================================================

/// Global Block Protection Unlock (SST26)
pub const ULBPR: u8 = 0x98;

/// Filler byte clocked out in dummy phases
pub const DUMMY_BYTE: u8 = 0xEE;

// ============================================================================
// Status register bit definitions
// ============================================================================

/// Status Register 1: Write In Progress / Busy
pub const SR1_WIP: u8 = 0x01;
/// Status Register 1: Write Enable Latch
pub const SR1_WEL: u8 = 0x02;
/// Status Register 1 (SST26): Write Suspend-Erase status
pub const SR1_WSE: u8 = 0x04;
/// Status Register 1 (SST26): Write Suspend-Program status
pub const SR1_WSP: u8 = 0x08;
/// Status Register 1 (SST25): bits kept when clearing block protection
pub const SR1_SST25_KEEP: u8 = 0xC3;

/// Status Register 2: Suspend Status
pub const SR2_SUS: u8 = 0x80;

/// Status Register 3: current address mode (1 = 4-byte)
pub const SR3_ADS: u8 = 0x01;

// ============================================================================
// Geometry
// ============================================================================

/// Program page size
pub const PAGE_SIZE: u32 = 256;
/// Smallest erase unit
pub const SECTOR_SIZE: u32 = 4 * 1024;
/// 32KB erase block
pub const BLOCK_32K_SIZE: u32 = 32 * 1024;
/// 64KB erase block
pub const BLOCK_64K_SIZE: u32 = 64 * 1024;

/// SFDP signature "SFDP" read little-endian
pub const SFDP_SIGNATURE: u32 = 0x5044_4653;
