//! Probe command implementation

use norflash_core::chip::{Quirks, UnlockStyle};

use crate::error::Result;
use crate::session::Session;

/// Print what identification found
pub fn run_probe(session: &mut Session) -> Result<()> {
    let flash = &mut session.flash;
    let chip = *flash.chip();
    let profile = *flash.profile();

    println!("Found flash chip:");
    println!(
        "  Vendor:   {}",
        chip.manufacturer().map_or("unknown", |m| m.name())
    );
    println!(
        "  JEDEC ID: {:02X} {:02X} {:02X}",
        chip.manufacturer_id, chip.memory_type_id, chip.capacity_id
    );
    println!(
        "  Size:     {} bytes ({} KiB, {} pages)",
        chip.capacity(),
        chip.capacity() / 1024,
        chip.max_page()
    );
    println!("  SFDP:     {}", if chip.has_sfdp() { "yes" } else { "no" });

    let mut features = Vec::new();
    if profile.quirks.contains(Quirks::FOUR_BYTE_ADDR) {
        features.push("4-byte addressing");
    }
    if profile
        .quirks
        .intersects(Quirks::SUSPEND_SR1 | Quirks::SUSPEND_SR2)
    {
        features.push("suspend/resume");
    }
    if !profile.quirks.contains(Quirks::NO_POWER_DOWN) {
        features.push("deep power-down");
    }
    match profile.unlock {
        UnlockStyle::None => {}
        UnlockStyle::StatusRewrite => features.push("unlocked via status rewrite"),
        UnlockStyle::GlobalUnlock => features.push("unlocked via ULBPR"),
    }
    println!("  Features: {}", features.join(", "));

    let (mfr, device) = flash.read_manufacturer_device_id()?;
    println!("  REMS:     {:02X} {:02X}", mfr, device);
    Ok(())
}
