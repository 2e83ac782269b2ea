//! Status register access and device synchronisation
//!
//! Free functions over a [`Transport`], one command sequence each.

use crate::bus::{Clock, SpiBus};
use crate::chip::Quirks;
use crate::error::{AddressModeSwitch, Error, Result};
use crate::spi::{opcodes, AddressWidth};

use super::Transport;

fn read_register<B: SpiBus>(t: &mut Transport<B>, opcode: u8) -> u8 {
    let mut tx = t.begin(opcode, 0);
    let value = tx.transfer(0x00);
    tx.end();
    value
}

/// Read the status register 1
pub fn read_status1<B: SpiBus>(t: &mut Transport<B>) -> u8 {
    read_register(t, opcodes::RDSR)
}

/// Read the status register 2
pub fn read_status2<B: SpiBus>(t: &mut Transport<B>) -> u8 {
    read_register(t, opcodes::RDSR2)
}

/// Read the status register 3
pub fn read_status3<B: SpiBus>(t: &mut Transport<B>) -> u8 {
    read_register(t, opcodes::RDSR3)
}

/// Check the Write In Progress bit once
pub fn is_busy<B: SpiBus>(t: &mut Transport<B>) -> bool {
    read_status1(t) & opcodes::SR1_WIP != 0
}

/// Wait for the WIP (Write In Progress) bit to clear
///
/// Polls status register 1 until WIP clears. Fails with
/// [`Error::BusyTimeout`] once at least `timeout_us` has elapsed on `clock`
/// with the device still busy, never earlier.
///
/// # Arguments
/// * `timeout_us` - Maximum time to wait
/// * `poll_delay_us` - Delay between polls, 0 to spin
pub fn wait_ready<B: SpiBus, C: Clock>(
    t: &mut Transport<B>,
    clock: &mut C,
    timeout_us: u32,
    poll_delay_us: u32,
) -> Result<()> {
    let start = clock.now_us();

    loop {
        if !is_busy(t) {
            return Ok(());
        }
        if clock.now_us().saturating_sub(start) >= u64::from(timeout_us) {
            log::debug!("Device still busy after {}us", timeout_us);
            return Err(Error::BusyTimeout);
        }
        if poll_delay_us > 0 {
            clock.delay_us(poll_delay_us);
        }
    }
}

/// Send WREN and confirm the Write Enable Latch is set
pub fn write_enable<B: SpiBus>(t: &mut Transport<B>) -> Result<()> {
    t.command(opcodes::WREN);
    if read_status1(t) & opcodes::SR1_WEL == 0 {
        return Err(Error::WriteEnableFailed);
    }
    Ok(())
}

/// Send the Write Disable command
pub fn write_disable<B: SpiBus>(t: &mut Transport<B>) {
    t.command(opcodes::WRDI);
}

/// Write status register 1 the SST25 way: EWSR, then WRSR
pub fn write_status1_ewsr<B: SpiBus>(t: &mut Transport<B>, value: u8) {
    t.command(opcodes::EWSR);
    let mut tx = t.begin(opcodes::WRSR, 0);
    tx.transfer(value);
    tx.end();
}

/// Whether an erase/program suspend is active
///
/// Winbond reports suspend in SR2, Microchip in SR1. Vendors with neither
/// quirk have no way to report it and always read as not suspended.
pub fn is_suspended<B: SpiBus>(t: &mut Transport<B>, quirks: Quirks) -> bool {
    if quirks.contains(Quirks::SUSPEND_SR2) {
        read_status2(t) & opcodes::SR2_SUS != 0
    } else if quirks.contains(Quirks::SUSPEND_SR1) {
        read_status1(t) & (opcodes::SR1_WSE | opcodes::SR1_WSP) != 0
    } else {
        false
    }
}

/// Fail with [`Error::Suspended`] if a suspend is active
pub fn check_not_suspended<B: SpiBus>(t: &mut Transport<B>, quirks: Quirks) -> Result<()> {
    if is_suspended(t, quirks) {
        return Err(Error::Suspended);
    }
    Ok(())
}

fn four_byte_active<B: SpiBus>(t: &mut Transport<B>) -> bool {
    read_status3(t) & opcodes::SR3_ADS != 0
}

/// Switch the device to 4-byte addressing and confirm through SR3
///
/// A device already in 4-byte mode is accepted as is.
pub fn enter_four_byte<B: SpiBus>(t: &mut Transport<B>) -> Result<()> {
    if !four_byte_active(t) {
        t.command(opcodes::EN4B);
        if !four_byte_active(t) {
            return Err(Error::AddressModeFailed(AddressModeSwitch::Enter));
        }
    }
    t.set_address_width(AddressWidth::FourByte);
    log::debug!("Entered 4-byte address mode");
    Ok(())
}

/// Return the device to 3-byte addressing and confirm through SR3
pub fn exit_four_byte<B: SpiBus>(t: &mut Transport<B>) -> Result<()> {
    t.command(opcodes::EX4B);
    if four_byte_active(t) {
        return Err(Error::AddressModeFailed(AddressModeSwitch::Exit));
    }
    t.set_address_width(AddressWidth::ThreeByte);
    log::debug!("Left 4-byte address mode");
    Ok(())
}
