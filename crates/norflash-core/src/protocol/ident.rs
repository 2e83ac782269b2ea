//! Identification commands

use crate::bus::SpiBus;
use crate::spi::opcodes;

use super::Transport;

/// Read the JEDEC ID (0x9F)
///
/// Returns (manufacturer_id, memory_type_id, capacity_id).
pub fn read_jedec_id<B: SpiBus>(t: &mut Transport<B>) -> (u8, u8, u8) {
    let mut buf = [0u8; 3];
    let mut tx = t.begin(opcodes::RDID, 0);
    tx.read(&mut buf);
    tx.end();
    (buf[0], buf[1], buf[2])
}

/// Read the legacy manufacturer/device ID (0x90)
///
/// Returns (manufacturer_id, device_id).
pub fn read_manufacturer_device_id<B: SpiBus>(t: &mut Transport<B>) -> (u8, u8) {
    let mut buf = [0u8; 2];
    let mut tx = t.begin(opcodes::REMS, 0);
    tx.read(&mut buf);
    tx.end();
    (buf[0], buf[1])
}

/// Read the 64-bit factory unique ID (0x4B), most significant byte first
pub fn read_unique_id<B: SpiBus>(t: &mut Transport<B>) -> u64 {
    let mut buf = [0u8; 8];
    let mut tx = t.begin(opcodes::RDUID, 0);
    tx.read(&mut buf);
    tx.end();
    u64::from_be_bytes(buf)
}

/// Read the 32-bit SFDP signature at SFDP address 0
///
/// The signature is stored little-endian; a device with SFDP returns
/// [`opcodes::SFDP_SIGNATURE`] ("SFDP").
pub fn read_sfdp_signature<B: SpiBus>(t: &mut Transport<B>) -> u32 {
    let mut buf = [0u8; 4];
    let mut tx = t.begin(opcodes::RDSFDP, 0);
    tx.read(&mut buf);
    tx.end();
    u32::from_le_bytes(buf)
}
