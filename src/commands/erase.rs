//! Erase command implementation

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use norflash_core::flash::EraseSize;

use crate::cli::EraseUnit;
use crate::error::{CliError, Result};
use crate::session::Session;

impl From<EraseUnit> for EraseSize {
    fn from(unit: EraseUnit) -> Self {
        match unit {
            EraseUnit::Sector => EraseSize::Sector,
            EraseUnit::Block32 => EraseSize::Block32,
            EraseUnit::Block64 => EraseSize::Block64,
            EraseUnit::Chip => EraseSize::Chip,
        }
    }
}

/// Run the erase command
pub fn run_erase(
    session: &mut Session,
    start: Option<u32>,
    length: Option<u32>,
    unit: Option<EraseUnit>,
) -> Result<()> {
    let flash = &mut session.flash;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));

    match (unit, start, length) {
        (Some(EraseUnit::Chip), None, None) | (None, None, None) => {
            pb.set_message(format!(
                "Erasing {} bytes (this may take a while)...",
                flash.capacity()
            ));
            flash.erase_chip()?;
            pb.finish_with_message("Chip erase complete");
        }
        (Some(unit), Some(addr), None) => {
            pb.set_message(format!("Erasing {:?} at 0x{:08X}...", unit, addr));
            flash.erase(unit.into(), addr)?;
            pb.finish_with_message(format!("Erased {:?} at 0x{:08X}", unit, addr));
        }
        (None, Some(addr), Some(len)) => {
            pb.set_message(format!("Erasing 0x{:08X}+{}...", addr, len));
            flash.erase_section(addr, len)?;
            pb.finish_with_message(format!("Erased {} bytes starting at 0x{:08X}", len, addr));
        }
        _ => {
            pb.finish_and_clear();
            return Err(CliError::InvalidArguments(
                "use no options, --start with --length, or --unit with --start".into(),
            ));
        }
    }
    Ok(())
}
