//! Status and unique ID commands

use norflash_core::spi::opcodes;

use crate::error::Result;
use crate::session::Session;

fn flag(set: bool) -> &'static str {
    if set {
        "set"
    } else {
        "clear"
    }
}

/// Print the three status registers
pub fn run_status(session: &mut Session) -> Result<()> {
    let flash = &mut session.flash;
    let sr1 = flash.read_status1()?;
    let sr2 = flash.read_status2()?;
    let sr3 = flash.read_status3()?;

    println!("SR1: 0x{:02X}", sr1);
    println!("  WIP (busy):         {}", flag(sr1 & opcodes::SR1_WIP != 0));
    println!("  WEL (write enable): {}", flag(sr1 & opcodes::SR1_WEL != 0));
    println!("SR2: 0x{:02X}", sr2);
    println!("SR3: 0x{:02X}", sr3);
    println!("Suspended: {}", flash.is_suspended()?);
    Ok(())
}

/// Print the factory unique ID
pub fn run_unique_id(session: &mut Session) -> Result<()> {
    let id = session.flash.read_unique_id()?;
    println!("Unique ID: {:016X}", id);
    Ok(())
}
